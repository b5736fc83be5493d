use actix_web::{web, HttpResponse, Result, ResponseError};
use serde_json::json;
use crate::models::*;
use crate::services::WithdrawalService;

#[utoipa::path(
    get,
    path = "/withdraw-requests",
    tag = "withdrawals",
    params(
        ("status" = Option<String>, Query, description = "提现状态或 all"),
        ("doctor_id" = Option<i64>, Query, description = "医生 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "提现申请列表", body = [WithdrawalResponse]),
        (status = 400, description = "筛选值无效", body = ErrorResponse)
    )
)]
pub async fn list_withdrawals(
    withdrawal_service: web::Data<WithdrawalService>,
    query: web::Query<WithdrawalListQuery>,
) -> Result<HttpResponse> {
    match withdrawal_service.list_withdrawals(&query).await {
        Ok(requests) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "withdrawal_requests": requests
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/withdraw-requests/{id}/status",
    tag = "withdrawals",
    params(
        ("id" = i64, Path, description = "提现申请 ID")
    ),
    request_body = WithdrawalStatusUpdateRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "处理完成", body = WithdrawalResponse),
        (status = 400, description = "状态或管理员无效", body = ErrorResponse),
        (status = 404, description = "提现申请不存在", body = ErrorResponse)
    )
)]
pub async fn update_withdrawal_status(
    withdrawal_service: web::Data<WithdrawalService>,
    path: web::Path<i64>,
    request: web::Json<WithdrawalStatusUpdateRequest>,
) -> Result<HttpResponse> {
    match withdrawal_service
        .update_status(path.into_inner(), &request)
        .await
    {
        Ok((resolution, withdrawal)) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": format!("Withdrawal request {} successfully", resolution.as_str()),
            "status": resolution,
            "withdrawal_request": withdrawal
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn withdrawal_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/withdraw-requests")
            .route("", web::get().to(list_withdrawals))
            .route("/{id}/status", web::patch().to(update_withdrawal_status)),
    );
}
