use actix_web::{web, HttpResponse, Result, ResponseError};
use serde_json::json;
use crate::models::*;
use crate::services::PaymentService;

#[utoipa::path(
    get,
    path = "/payments",
    tag = "payments",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("limit" = Option<u64>, Query, description = "每页数量"),
        ("status" = Option<String>, Query, description = "pending / completed / failed / refunded / all"),
        ("gateway" = Option<String>, Query, description = "支付网关或 all"),
        ("search" = Option<String>, Query, description = "交易号、参考号、付款人")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "支付记录"),
        (status = 400, description = "筛选值无效", body = ErrorResponse)
    )
)]
pub async fn list_payments(
    payment_service: web::Data<PaymentService>,
    query: web::Query<PaymentListQuery>,
) -> Result<HttpResponse> {
    match payment_service.list_payments(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "payments": page.items,
            "pagination": page.pagination
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/payments/{id}/status",
    tag = "payments",
    params(
        ("id" = i64, Path, description = "支付记录 ID")
    ),
    request_body = StatusUpdateRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "状态已更新", body = PaymentResponse),
        (status = 400, description = "状态值无效", body = ErrorResponse),
        (status = 404, description = "支付记录不存在", body = ErrorResponse)
    )
)]
pub async fn update_payment_status(
    payment_service: web::Data<PaymentService>,
    path: web::Path<i64>,
    request: web::Json<StatusUpdateRequest>,
) -> Result<HttpResponse> {
    match payment_service
        .update_status(path.into_inner(), request.status.as_deref())
        .await
    {
        Ok(payment) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Payment status updated successfully",
            "payment": payment
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn payment_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payments")
            .route("", web::get().to(list_payments))
            .route("/{id}/status", web::patch().to(update_payment_status)),
    );
}
