use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_doctors: i64,
    pub total_patients: i64,
    pub active_subscriptions: i64,
    pub total_revenue: f64,
    pub monthly_revenue: f64,
    pub total_appointments: i64,
    pub pending_appointments: i64,
    pub completed_appointments: i64,
    pub today_appointments: i64,
    pub today_revenue: f64,
    pub user_growth_percentage: i64,
    pub revenue_growth_percentage: i64,
    pub appointment_growth_percentage: i64,
    pub subscription_growth_percentage: i64,
}

/// One point of a chart series.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, FromQueryResult)]
pub struct ChartPoint {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub stats: DashboardStats,
    pub user_growth_data: Vec<ChartPoint>,
    pub revenue_data: Vec<ChartPoint>,
    pub subscription_data: Vec<ChartPoint>,
}

/// Month-over-month change rounded to a whole percent; 0 when there is no baseline.
/// Halves round up, so -2.5 becomes -2.
pub fn growth_percentage(current: f64, previous: f64) -> i64 {
    if previous > 0.0 {
        ((current - previous) * 100.0 / previous + 0.5).floor() as i64
    } else {
        0
    }
}
