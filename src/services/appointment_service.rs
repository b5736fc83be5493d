use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use crate::database::DbPool;
use crate::entities::{AppointmentStatus, appointment_entity as appointments};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::{PaginatedResponse, PaginationParams};

use super::filters::{load_users, matching_user_ids, search_pattern};

#[derive(Clone)]
pub struct AppointmentService {
    pool: DbPool,
}

impl AppointmentService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn list_appointments(
        &self,
        query: &AppointmentListQuery,
    ) -> AppResult<PaginatedResponse<AppointmentResponse>> {
        let params = PaginationParams::new(query.page, query.limit);
        let status: Option<AppointmentStatus> = parse_filter(query.status.as_deref())?;

        let mut select = appointments::Entity::find();
        if let Some(s) = status {
            select = select.filter(appointments::Column::Status.eq(s));
        }
        if let Some(t) = active_filter(query.appointment_type.as_deref()) {
            select = select.filter(appointments::Column::AppointmentType.eq(t));
        }
        if let Some(doctor_id) = query.doctor_id {
            select = select.filter(appointments::Column::DoctorId.eq(doctor_id));
        }
        if let Some(pattern) = search_pattern(query.search.as_deref()) {
            // 匹配医生或患者
            select = select.filter(
                Condition::any()
                    .add(appointments::Column::DoctorId.in_subquery(matching_user_ids(&pattern)))
                    .add(appointments::Column::PatientId.in_subquery(matching_user_ids(&pattern))),
            );
        }

        let total = select.clone().count(&*self.pool).await?;
        let rows = select
            .order_by_desc(appointments::Column::CreatedAt)
            .order_by_desc(appointments::Column::Id)
            .offset(params.get_offset())
            .limit(params.get_limit())
            .all(&*self.pool)
            .await?;

        let ids = rows
            .iter()
            .flat_map(|a| [a.doctor_id, a.patient_id])
            .collect();
        let people = load_users(&self.pool, ids).await?;

        let items = rows
            .into_iter()
            .map(|a| {
                let doctor = people.get(&a.doctor_id).map(ParticipantSummary::from);
                let patient = people.get(&a.patient_id).map(ParticipantSummary::from);
                AppointmentResponse {
                    doctor,
                    patient,
                    ..AppointmentResponse::from(a)
                }
            })
            .collect();

        Ok(PaginatedResponse::new(items, &params, total))
    }

    pub async fn update_status(
        &self,
        appointment_id: i64,
        raw_status: Option<&str>,
    ) -> AppResult<AppointmentResponse> {
        let status: AppointmentStatus = parse_status(raw_status)?;

        let result = appointments::Entity::update_many()
            .col_expr(appointments::Column::Status, Expr::value(status.into_value()))
            .col_expr(appointments::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(appointments::Column::Id.eq(appointment_id))
            .exec(&*self.pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Appointment not found".to_string()));
        }

        let appointment = appointments::Entity::find_by_id(appointment_id)
            .one(&*self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;
        log::info!("Appointment {} status set to {:?}", appointment_id, status);

        Ok(AppointmentResponse::from(appointment))
    }
}
