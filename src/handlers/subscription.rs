use actix_web::{web, HttpResponse, Result, ResponseError};
use serde_json::json;
use crate::models::*;
use crate::services::SubscriptionService;

#[utoipa::path(
    get,
    path = "/subscriptions",
    tag = "subscriptions",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("limit" = Option<u64>, Query, description = "每页数量"),
        ("status" = Option<String>, Query, description = "active / inactive / expired / cancelled / all"),
        ("user_id" = Option<i64>, Query, description = "用户 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "订阅列表"),
        (status = 400, description = "筛选值无效", body = ErrorResponse)
    )
)]
pub async fn list_subscriptions(
    subscription_service: web::Data<SubscriptionService>,
    query: web::Query<SubscriptionListQuery>,
) -> Result<HttpResponse> {
    match subscription_service.list_subscriptions(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "subscriptions": page.items,
            "pagination": page.pagination
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/subscriptions/{id}/status",
    tag = "subscriptions",
    params(
        ("id" = i64, Path, description = "订阅 ID")
    ),
    request_body = StatusUpdateRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "状态已更新", body = SubscriptionResponse),
        (status = 400, description = "状态值无效", body = ErrorResponse),
        (status = 404, description = "订阅不存在", body = ErrorResponse)
    )
)]
pub async fn update_subscription_status(
    subscription_service: web::Data<SubscriptionService>,
    path: web::Path<i64>,
    request: web::Json<StatusUpdateRequest>,
) -> Result<HttpResponse> {
    match subscription_service
        .update_status(path.into_inner(), request.status.as_deref())
        .await
    {
        Ok(subscription) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Subscription status updated successfully",
            "subscription": subscription
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn subscription_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/subscriptions")
            .route("", web::get().to(list_subscriptions))
            .route("/{id}/status", web::patch().to(update_subscription_status)),
    );
}
