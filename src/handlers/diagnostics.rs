use actix_web::{web, HttpResponse, Result};
use crate::services::{DatabaseReport, DiagnosticsService};

#[utoipa::path(
    get,
    path = "/debug/database",
    tag = "diagnostics",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "数据库可用", body = DatabaseReport),
        (status = 500, description = "数据库不可用，附带错误详情", body = DatabaseReport)
    )
)]
pub async fn check_database(
    diagnostics_service: web::Data<DiagnosticsService>,
) -> Result<HttpResponse> {
    let report = diagnostics_service.check_database().await;
    if report.success {
        Ok(HttpResponse::Ok().json(report))
    } else {
        Ok(HttpResponse::InternalServerError().json(report))
    }
}

pub fn diagnostics_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/debug/database", web::get().to(check_database));
}
