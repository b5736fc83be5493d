use actix_web::{web, HttpResponse, Result, ResponseError};
use serde_json::json;
use crate::models::*;
use crate::services::AppointmentService;

#[utoipa::path(
    get,
    path = "/appointments",
    tag = "appointments",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("limit" = Option<u64>, Query, description = "每页数量"),
        ("status" = Option<String>, Query, description = "pending / confirmed / completed / cancelled / all"),
        ("type" = Option<String>, Query, description = "预约类型或 all"),
        ("search" = Option<String>, Query, description = "医生或患者姓名、邮箱"),
        ("doctor_id" = Option<i64>, Query, description = "医生 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "预约列表"),
        (status = 400, description = "筛选值无效", body = ErrorResponse)
    )
)]
pub async fn list_appointments(
    appointment_service: web::Data<AppointmentService>,
    query: web::Query<AppointmentListQuery>,
) -> Result<HttpResponse> {
    match appointment_service.list_appointments(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "appointments": page.items,
            "pagination": page.pagination
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/appointments/{id}/status",
    tag = "appointments",
    params(
        ("id" = i64, Path, description = "预约 ID")
    ),
    request_body = StatusUpdateRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "状态已更新", body = AppointmentResponse),
        (status = 400, description = "状态值无效", body = ErrorResponse),
        (status = 404, description = "预约不存在", body = ErrorResponse)
    )
)]
pub async fn update_appointment_status(
    appointment_service: web::Data<AppointmentService>,
    path: web::Path<i64>,
    request: web::Json<StatusUpdateRequest>,
) -> Result<HttpResponse> {
    match appointment_service
        .update_status(path.into_inner(), request.status.as_deref())
        .await
    {
        Ok(appointment) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Appointment status updated successfully",
            "appointment": appointment
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn appointment_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/appointments")
            .route("", web::get().to(list_appointments))
            .route("/{id}/status", web::patch().to(update_appointment_status)),
    );
}
