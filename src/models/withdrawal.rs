use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{PaymentMethod, WithdrawalStatus, withdrawal_entity};

use super::ParticipantSummary;

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct WithdrawalListQuery {
    pub status: Option<String>,
    pub doctor_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WithdrawalStatusUpdateRequest {
    #[schema(example = "completed")]
    pub status: Option<String>,
    /// Admin account id that paid out the request; required for `completed`.
    #[schema(example = "admin-1")]
    pub completed_by: Option<String>,
}

/// Statuses an admin may set from the dashboard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalResolution {
    Completed,
    Failed,
}

impl WithdrawalResolution {
    pub fn as_str(self) -> &'static str {
        match self {
            WithdrawalResolution::Completed => "completed",
            WithdrawalResolution::Failed => "failed",
        }
    }
}

impl From<WithdrawalResolution> for WithdrawalStatus {
    fn from(r: WithdrawalResolution) -> Self {
        match r {
            WithdrawalResolution::Completed => WithdrawalStatus::Completed,
            WithdrawalResolution::Failed => WithdrawalStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WithdrawalResponse {
    pub id: i64,
    pub doctor_id: i64,
    pub amount: f64,
    pub payment_method: PaymentMethod,
    pub status: WithdrawalStatus,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub account_holder_name: Option<String>,
    pub mobile_provider: Option<String>,
    pub mobile_number: Option<String>,
    pub paid_by: Option<i64>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor: Option<ParticipantSummary>,
}

impl From<withdrawal_entity::Model> for WithdrawalResponse {
    fn from(m: withdrawal_entity::Model) -> Self {
        Self {
            id: m.id,
            doctor_id: m.doctor_id,
            amount: m.amount,
            payment_method: m.payment_method,
            status: m.status,
            bank_name: m.bank_name,
            account_number: m.account_number,
            account_holder_name: m.account_holder_name,
            mobile_provider: m.mobile_provider,
            mobile_number: m.mobile_number,
            paid_by: m.paid_by,
            paid_at: m.paid_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
            doctor: None,
        }
    }
}
