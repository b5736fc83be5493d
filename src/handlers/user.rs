use actix_web::{web, HttpResponse, Result, ResponseError};
use serde_json::json;
use crate::models::*;
use crate::services::UserService;

#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("limit" = Option<u64>, Query, description = "每页数量，最大 100"),
        ("search" = Option<String>, Query, description = "姓名或邮箱"),
        ("type" = Option<String>, Query, description = "patient / doctor / admin / all"),
        ("status" = Option<String>, Query, description = "用户状态或 all")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "用户列表"),
        (status = 400, description = "筛选值无效", body = ErrorResponse),
        (status = 401, description = "未授权", body = ErrorResponse)
    )
)]
pub async fn list_users(
    user_service: web::Data<UserService>,
    query: web::Query<UserListQuery>,
) -> Result<HttpResponse> {
    match user_service.list_users(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "users": page.items,
            "pagination": page.pagination
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/pending-doctors",
    tag = "users",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("limit" = Option<u64>, Query, description = "每页数量"),
        ("search" = Option<String>, Query, description = "姓名或邮箱")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "待审核医生"),
        (status = 401, description = "未授权", body = ErrorResponse)
    )
)]
pub async fn list_pending_doctors(
    user_service: web::Data<UserService>,
    query: web::Query<UserListQuery>,
) -> Result<HttpResponse> {
    match user_service.list_pending_doctors(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "doctors": page.items,
            "pagination": page.pagination
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(
        ("id" = i64, Path, description = "用户 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "用户详情", body = UserDetailsResponse),
        (status = 404, description = "用户不存在", body = ErrorResponse)
    )
)]
pub async fn get_user(
    user_service: web::Data<UserService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match user_service.get_user_details(path.into_inner()).await {
        Ok(details) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": details
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/users/{id}/status",
    tag = "users",
    params(
        ("id" = i64, Path, description = "用户 ID")
    ),
    request_body = StatusUpdateRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "状态已更新", body = UserResponse),
        (status = 400, description = "状态值无效", body = ErrorResponse),
        (status = 404, description = "用户不存在", body = ErrorResponse)
    )
)]
pub async fn update_user_status(
    user_service: web::Data<UserService>,
    path: web::Path<i64>,
    request: web::Json<StatusUpdateRequest>,
) -> Result<HttpResponse> {
    match user_service
        .update_status(path.into_inner(), request.status.as_deref())
        .await
    {
        Ok(user) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "User status updated successfully",
            "user": user
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    params(
        ("id" = i64, Path, description = "用户 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已删除", body = MessageResponse),
        (status = 404, description = "用户不存在", body = ErrorResponse)
    )
)]
pub async fn delete_user(
    user_service: web::Data<UserService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match user_service.delete_user(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(MessageResponse::new("User deleted successfully"))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn user_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("", web::get().to(list_users))
            .route("/{id}", web::get().to(get_user))
            .route("/{id}", web::delete().to(delete_user))
            .route("/{id}/status", web::patch().to(update_user_status)),
    )
    .route("/pending-doctors", web::get().to(list_pending_doctors));
}
