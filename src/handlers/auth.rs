use actix_web::{web, HttpRequest, HttpResponse, Result, ResponseError};
use serde_json::json;
use crate::error::AppError;
use crate::middlewares::current_admin;
use crate::models::*;
use crate::services::AuthService;

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "登录成功", body = LoginResponse),
        (status = 400, description = "缺少邮箱或密码", body = ErrorResponse),
        (status = 401, description = "凭证无效", body = ErrorResponse)
    )
)]
pub async fn login(
    auth_service: web::Data<AuthService>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    match auth_service.login(&request) {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "当前管理员", body = AdminResponse),
        (status = 401, description = "未授权", body = ErrorResponse)
    )
)]
pub async fn me(req: HttpRequest) -> Result<HttpResponse> {
    match current_admin(&req) {
        Some(claims) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "user": AdminResponse::from(claims)
        }))),
        None => Ok(AppError::AuthError("Unauthorized".to_string()).error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admins",
    tag = "auth",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "管理员列表", body = [AdminResponse]),
        (status = 401, description = "未授权", body = ErrorResponse)
    )
)]
pub async fn list_admins(auth_service: web::Data<AuthService>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "admins": auth_service.list_admins()
    })))
}

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/login", web::post().to(login))
            .route("/me", web::get().to(me)),
    )
    .route("/admins", web::get().to(list_admins));
}
