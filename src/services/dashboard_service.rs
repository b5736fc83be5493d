use sea_orm::{ActiveEnum, DbBackend, FromQueryResult, Statement};

use crate::database::DbPool;
use crate::entities::AppointmentStatus;
use crate::error::{AppError, AppResult};
use crate::models::*;

#[derive(Debug, FromQueryResult)]
struct TotalsRow {
    total_users: i64,
    total_doctors: i64,
    total_patients: i64,
    active_subscriptions: i64,
    total_revenue: f64,
    monthly_revenue: f64,
    previous_month_revenue: f64,
    today_revenue: f64,
    total_appointments: i64,
    pending_appointments: i64,
    completed_appointments: i64,
    today_appointments: i64,
    users_this_month: i64,
    users_previous_month: i64,
    appointments_this_month: i64,
    appointments_previous_month: i64,
    subscriptions_this_month: i64,
    subscriptions_previous_month: i64,
}

// $1 = USD→MWK 汇率, $2 = pending, $3 = completed
const TOTALS_SQL: &str = r#"
WITH revenue AS (
    SELECT s.created_at,
           CASE WHEN p.currency = 'USD' THEN p.price * $1 ELSE p.price END AS amount
    FROM subscriptions s
    JOIN plans p ON p.id = s.plan_id
    WHERE s.is_active = true
),
bounds AS (
    SELECT DATE_TRUNC('month', CURRENT_DATE) AS this_month,
           DATE_TRUNC('month', CURRENT_DATE - INTERVAL '1 month') AS previous_month
)
SELECT
    (SELECT COUNT(*) FROM users) AS total_users,
    (SELECT COUNT(*) FROM users WHERE user_type = 'doctor') AS total_doctors,
    (SELECT COUNT(*) FROM users WHERE user_type = 'patient') AS total_patients,
    (SELECT COUNT(*) FROM subscriptions WHERE is_active = true) AS active_subscriptions,
    (SELECT COALESCE(SUM(amount), 0)::float8 FROM revenue) AS total_revenue,
    (SELECT COALESCE(SUM(amount), 0)::float8 FROM revenue, bounds
        WHERE created_at >= bounds.this_month) AS monthly_revenue,
    (SELECT COALESCE(SUM(amount), 0)::float8 FROM revenue, bounds
        WHERE created_at >= bounds.previous_month AND created_at < bounds.this_month) AS previous_month_revenue,
    (SELECT COALESCE(SUM(amount), 0)::float8 FROM revenue
        WHERE created_at::date = CURRENT_DATE) AS today_revenue,
    (SELECT COUNT(*) FROM appointments) AS total_appointments,
    (SELECT COUNT(*) FROM appointments WHERE status = $2) AS pending_appointments,
    (SELECT COUNT(*) FROM appointments WHERE status = $3) AS completed_appointments,
    (SELECT COUNT(*) FROM appointments WHERE created_at::date = CURRENT_DATE) AS today_appointments,
    (SELECT COUNT(*) FROM users, bounds WHERE created_at >= bounds.this_month) AS users_this_month,
    (SELECT COUNT(*) FROM users, bounds
        WHERE created_at >= bounds.previous_month AND created_at < bounds.this_month) AS users_previous_month,
    (SELECT COUNT(*) FROM appointments, bounds WHERE created_at >= bounds.this_month) AS appointments_this_month,
    (SELECT COUNT(*) FROM appointments, bounds
        WHERE created_at >= bounds.previous_month AND created_at < bounds.this_month) AS appointments_previous_month,
    (SELECT COUNT(*) FROM subscriptions, bounds
        WHERE is_active = true AND created_at >= bounds.this_month) AS subscriptions_this_month,
    (SELECT COUNT(*) FROM subscriptions, bounds
        WHERE is_active = true AND created_at >= bounds.previous_month
          AND created_at < bounds.this_month) AS subscriptions_previous_month
"#;

const USER_GROWTH_SQL: &str = r#"
SELECT TO_CHAR(DATE_TRUNC('week', created_at), 'Mon DD') AS name, COUNT(*)::float8 AS value
FROM users
WHERE created_at >= CURRENT_DATE - INTERVAL '12 weeks'
GROUP BY DATE_TRUNC('week', created_at)
ORDER BY DATE_TRUNC('week', created_at)
"#;

const REVENUE_SQL: &str = r#"
SELECT TO_CHAR(DATE_TRUNC('week', s.created_at), 'Mon DD') AS name,
       COALESCE(SUM(CASE WHEN p.currency = 'USD' THEN p.price * $1 ELSE p.price END), 0)::float8 AS value
FROM subscriptions s
JOIN plans p ON p.id = s.plan_id
WHERE s.created_at >= CURRENT_DATE - INTERVAL '12 weeks'
GROUP BY DATE_TRUNC('week', s.created_at)
ORDER BY DATE_TRUNC('week', s.created_at)
"#;

const SUBSCRIPTION_MIX_SQL: &str = r#"
SELECT p.name AS name, COUNT(s.id)::float8 AS value
FROM plans p
LEFT JOIN subscriptions s ON s.plan_id = p.id AND s.is_active = true
GROUP BY p.id, p.name
ORDER BY p.id
"#;

#[derive(Clone)]
pub struct DashboardService {
    pool: DbPool,
    usd_to_mwk_rate: f64,
}

impl DashboardService {
    pub fn new(pool: DbPool, usd_to_mwk_rate: f64) -> Self {
        Self {
            pool,
            usd_to_mwk_rate,
        }
    }

    pub async fn get_stats(&self) -> AppResult<DashboardResponse> {
        let totals = TotalsRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            TOTALS_SQL,
            [
                self.usd_to_mwk_rate.into(),
                AppointmentStatus::Pending.into_value().into(),
                AppointmentStatus::Completed.into_value().into(),
            ],
        ))
        .one(&*self.pool)
        .await?
        .ok_or_else(|| AppError::InternalError("Dashboard totals query returned no row".to_string()))?;

        let user_growth_data = self.series(USER_GROWTH_SQL, false).await?;
        let revenue_data = self.series(REVENUE_SQL, true).await?;
        let subscription_data = self.series(SUBSCRIPTION_MIX_SQL, false).await?;

        Ok(DashboardResponse {
            stats: build_stats(&totals),
            user_growth_data,
            revenue_data,
            subscription_data,
        })
    }

    async fn series(&self, sql: &str, with_rate: bool) -> AppResult<Vec<ChartPoint>> {
        let statement = if with_rate {
            Statement::from_sql_and_values(DbBackend::Postgres, sql, [self.usd_to_mwk_rate.into()])
        } else {
            Statement::from_string(DbBackend::Postgres, sql)
        };
        Ok(ChartPoint::find_by_statement(statement)
            .all(&*self.pool)
            .await?)
    }
}

fn build_stats(t: &TotalsRow) -> DashboardStats {
    DashboardStats {
        total_users: t.total_users,
        total_doctors: t.total_doctors,
        total_patients: t.total_patients,
        active_subscriptions: t.active_subscriptions,
        total_revenue: t.total_revenue,
        monthly_revenue: t.monthly_revenue,
        total_appointments: t.total_appointments,
        pending_appointments: t.pending_appointments,
        completed_appointments: t.completed_appointments,
        today_appointments: t.today_appointments,
        today_revenue: t.today_revenue,
        user_growth_percentage: growth_percentage(
            t.users_this_month as f64,
            t.users_previous_month as f64,
        ),
        revenue_growth_percentage: growth_percentage(t.monthly_revenue, t.previous_month_revenue),
        appointment_growth_percentage: growth_percentage(
            t.appointments_this_month as f64,
            t.appointments_previous_month as f64,
        ),
        subscription_growth_percentage: growth_percentage(
            t.subscriptions_this_month as f64,
            t.subscriptions_previous_month as f64,
        ),
    }
}
