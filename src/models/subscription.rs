use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{SubscriptionStatus, subscription_entity};

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SubscriptionListQuery {
    pub page: Option<u64>,
    #[serde(alias = "per_page")]
    pub limit: Option<u64>,
    pub status: Option<String>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionResponse {
    pub id: i64,
    pub user_id: i64,
    pub plan_id: Option<i64>,
    pub plan_name: Option<String>,
    pub plan_price: Option<f64>,
    pub plan_currency: Option<String>,
    pub status: SubscriptionStatus,
    pub is_active: bool,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<subscription_entity::Model> for SubscriptionResponse {
    fn from(m: subscription_entity::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            plan_id: m.plan_id,
            plan_name: m.plan_name,
            plan_price: m.plan_price,
            plan_currency: m.plan_currency,
            status: m.status,
            is_active: m.is_active,
            start_date: m.start_date,
            end_date: m.end_date,
            created_at: m.created_at,
        }
    }
}
