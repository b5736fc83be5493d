use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ColumnTrait, DbBackend, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Statement,
};
use serde_json::json;

use crate::database::DbPool;
use crate::entities::{
    AppointmentStatus, UserStatus, UserType, payment_entity as payments,
    subscription_entity as subscriptions, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::external::{EmailTemplate, Mailer};
use crate::models::*;
use crate::utils::{PaginatedResponse, PaginationParams};

use super::filters::{search_pattern, user_search_condition};

#[derive(Debug, FromQueryResult)]
struct ActivityRow {
    total_appointments: i64,
    completed_appointments: i64,
    cancelled_appointments: i64,
    total_payments: i64,
    total_spent: f64,
    total_subscriptions: i64,
    active_subscriptions: i64,
}

#[derive(Debug, FromQueryResult)]
struct RecentAppointmentRow {
    id: i64,
    appointment_date: Option<NaiveDate>,
    appointment_time: Option<NaiveTime>,
    status: AppointmentStatus,
    appointment_type: String,
    reason: Option<String>,
    created_at: Option<DateTime<Utc>>,
    user_role: String,
    other_party_name: Option<String>,
    other_party_email: Option<String>,
}

const ACTIVITY_SQL: &str = r#"
SELECT
    (SELECT COUNT(*) FROM appointments WHERE patient_id = $1 OR doctor_id = $1) AS total_appointments,
    (SELECT COUNT(*) FROM appointments WHERE (patient_id = $1 OR doctor_id = $1) AND status = $2) AS completed_appointments,
    (SELECT COUNT(*) FROM appointments WHERE (patient_id = $1 OR doctor_id = $1) AND status = $3) AS cancelled_appointments,
    (SELECT COUNT(*) FROM payment_transactions WHERE user_id = $1) AS total_payments,
    (SELECT COALESCE(SUM(amount), 0)::float8 FROM payment_transactions WHERE user_id = $1 AND status = 'completed') AS total_spent,
    (SELECT COUNT(*) FROM subscriptions WHERE user_id = $1) AS total_subscriptions,
    (SELECT COUNT(*) FROM subscriptions WHERE user_id = $1 AND is_active = true) AS active_subscriptions
"#;

const RECENT_APPOINTMENTS_SQL: &str = r#"
SELECT
    a.id, a.appointment_date, a.appointment_time, a.status, a.appointment_type, a.reason, a.created_at,
    CASE WHEN a.patient_id = $1 THEN 'patient' ELSE 'doctor' END AS user_role,
    CASE WHEN a.patient_id = $1 THEN d.first_name || ' ' || d.last_name
         ELSE p.first_name || ' ' || p.last_name END AS other_party_name,
    CASE WHEN a.patient_id = $1 THEN d.email ELSE p.email END AS other_party_email
FROM appointments a
LEFT JOIN users p ON p.id = a.patient_id
LEFT JOIN users d ON d.id = a.doctor_id
WHERE a.patient_id = $1 OR a.doctor_id = $1
ORDER BY a.created_at DESC
LIMIT 5
"#;

#[derive(Clone)]
pub struct UserService {
    pool: DbPool,
    mailer: Mailer,
}

impl UserService {
    pub fn new(pool: DbPool, mailer: Mailer) -> Self {
        Self { pool, mailer }
    }

    /// 用户列表，按注册时间倒序
    pub async fn list_users(&self, query: &UserListQuery) -> AppResult<PaginatedResponse<UserResponse>> {
        let user_type: Option<UserType> = parse_filter(query.user_type.as_deref())?;
        let status: Option<UserStatus> = parse_filter(query.status.as_deref())?;
        let params = PaginationParams::new(query.page, query.limit);
        self.paginate(params, user_type, status, query.search.as_deref())
            .await
    }

    /// 待审核医生
    pub async fn list_pending_doctors(
        &self,
        query: &UserListQuery,
    ) -> AppResult<PaginatedResponse<UserResponse>> {
        let params = PaginationParams::new(query.page, query.limit);
        self.paginate(
            params,
            Some(UserType::Doctor),
            Some(UserStatus::Pending),
            query.search.as_deref(),
        )
        .await
    }

    async fn paginate(
        &self,
        params: PaginationParams,
        user_type: Option<UserType>,
        status: Option<UserStatus>,
        search: Option<&str>,
    ) -> AppResult<PaginatedResponse<UserResponse>> {
        let mut select = users::Entity::find();
        if let Some(t) = user_type {
            select = select.filter(users::Column::UserType.eq(t));
        }
        if let Some(s) = status {
            select = select.filter(users::Column::Status.eq(s));
        }
        if let Some(pattern) = search_pattern(search) {
            select = select.filter(user_search_condition(&pattern));
        }

        let total = select.clone().count(&*self.pool).await?;
        let rows = select
            .order_by_desc(users::Column::CreatedAt)
            .order_by_desc(users::Column::Id)
            .offset(params.get_offset())
            .limit(params.get_limit())
            .all(&*self.pool)
            .await?;

        Ok(PaginatedResponse::new(
            rows.into_iter().map(UserResponse::from).collect(),
            &params,
            total,
        ))
    }

    pub async fn get_user_details(&self, user_id: i64) -> AppResult<UserDetailsResponse> {
        let user = users::Entity::find_by_id(user_id)
            .one(&*self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let current_subscription = subscriptions::Entity::find()
            .filter(subscriptions::Column::UserId.eq(user_id))
            .filter(subscriptions::Column::IsActive.eq(true))
            .order_by_desc(subscriptions::Column::CreatedAt)
            .one(&*self.pool)
            .await?
            .map(SubscriptionResponse::from);

        let activity = ActivityRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            ACTIVITY_SQL,
            [
                user_id.into(),
                AppointmentStatus::Completed.into_value().into(),
                AppointmentStatus::Cancelled.into_value().into(),
            ],
        ))
        .one(&*self.pool)
        .await?
        .map(|r| ActivityStats {
            total_appointments: r.total_appointments.max(0) as u64,
            completed_appointments: r.completed_appointments.max(0) as u64,
            cancelled_appointments: r.cancelled_appointments.max(0) as u64,
            total_payments: r.total_payments.max(0) as u64,
            total_spent: r.total_spent,
            total_subscriptions: r.total_subscriptions.max(0) as u64,
            active_subscriptions: r.active_subscriptions.max(0) as u64,
        })
        .unwrap_or_default();

        let recent_appointments = RecentAppointmentRow::find_by_statement(
            Statement::from_sql_and_values(DbBackend::Postgres, RECENT_APPOINTMENTS_SQL, [user_id.into()]),
        )
        .all(&*self.pool)
        .await?
        .into_iter()
        .map(|r| RecentAppointment {
            id: r.id,
            appointment_date: r.appointment_date,
            appointment_time: r.appointment_time,
            status: r.status,
            appointment_type: r.appointment_type,
            notes: r.reason,
            created_at: r.created_at,
            user_role: r.user_role,
            other_party_name: r.other_party_name,
            other_party_email: r.other_party_email,
        })
        .collect();

        let recent_payments = payments::Entity::find()
            .filter(payments::Column::UserId.eq(user_id))
            .order_by_desc(payments::Column::CreatedAt)
            .limit(5u64)
            .all(&*self.pool)
            .await?
            .into_iter()
            .map(|p| RecentPayment {
                id: p.id,
                amount: p.amount,
                currency: p.currency,
                status: p.status,
                payment_method: p.payment_method,
                payment_gateway: p.gateway,
                transaction_id: p.transaction_id,
                description: p.reference,
                created_at: p.created_at,
            })
            .collect();

        let now = Utc::now();
        let flags = security_flags(&user, now);
        let details = UserDetails {
            account_age_days: user
                .created_at
                .map(|c| (now - c).num_days())
                .unwrap_or(0),
            email_verified: user.email_verified_at.is_some(),
            last_login: user.last_online_at,
            medical_license_number: user.medical_licence.clone(),
            user: UserResponse::from(user),
        };

        Ok(UserDetailsResponse {
            user: details,
            current_subscription,
            activity_stats: activity,
            recent_appointments,
            recent_payments,
            security_flags: flags,
        })
    }

    pub async fn update_status(&self, user_id: i64, raw_status: Option<&str>) -> AppResult<UserResponse> {
        let status: UserStatus = parse_status(raw_status)?;

        let result = users::Entity::update_many()
            .col_expr(users::Column::Status, Expr::value(status.into_value()))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(user_id))
            .exec(&*self.pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        let user = users::Entity::find_by_id(user_id)
            .one(&*self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        log::info!("User {} status set to {:?}", user_id, status);

        if user.user_type == UserType::Doctor {
            let template = match status {
                UserStatus::Approved => Some(EmailTemplate::DoctorApproved),
                UserStatus::Rejected => Some(EmailTemplate::DoctorRejected),
                _ => None,
            };
            if let Some(template) = template {
                self.mailer
                    .send(template, &user.email, &json!({ "name": user.full_name() }))
                    .await;
            }
        }

        Ok(UserResponse::from(user))
    }

    pub async fn delete_user(&self, user_id: i64) -> AppResult<()> {
        let result = users::Entity::delete_by_id(user_id).exec(&*self.pool).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        log::info!("User {} deleted", user_id);
        Ok(())
    }
}
