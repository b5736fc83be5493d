use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{PaymentStatus, payment_entity};

use super::ParticipantSummary;

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PaymentListQuery {
    pub page: Option<u64>,
    #[serde(alias = "per_page")]
    pub limit: Option<u64>,
    /// 交易号、参考号或付款人姓名 / 邮箱
    pub search: Option<String>,
    pub status: Option<String>,
    pub gateway: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentResponse {
    pub id: i64,
    pub user_id: i64,
    pub amount: f64,
    pub currency: String,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    pub gateway: Option<String>,
    pub transaction_id: Option<String>,
    pub reference: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<ParticipantSummary>,
}

impl From<payment_entity::Model> for PaymentResponse {
    fn from(m: payment_entity::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            amount: m.amount,
            currency: m.currency,
            payment_status: m.status,
            payment_method: m.payment_method,
            gateway: m.gateway,
            transaction_id: m.transaction_id,
            reference: m.reference,
            created_at: m.created_at,
            updated_at: m.updated_at,
            user: None,
        }
    }
}
