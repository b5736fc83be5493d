use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{AppointmentStatus, PaymentStatus, UserStatus, UserType, user_entity};

use super::SubscriptionResponse;

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UserListQuery {
    pub page: Option<u64>,
    #[serde(alias = "per_page")]
    pub limit: Option<u64>,
    /// 姓名或邮箱模糊匹配
    pub search: Option<String>,
    /// patient / doctor / admin / all
    #[serde(rename = "type", alias = "role")]
    pub user_type: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub status: UserStatus,
    pub user_type: UserType,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<user_entity::Model> for UserResponse {
    fn from(m: user_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.full_name(),
            first_name: m.first_name,
            last_name: m.last_name,
            email: m.email,
            status: m.status,
            user_type: m.user_type,
            is_active: m.is_active,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SecurityFlagKind {
    Info,
    Warning,
    Danger,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SecurityFlag {
    #[serde(rename = "type")]
    pub kind: SecurityFlagKind,
    pub message: String,
    pub severity: Severity,
}

impl SecurityFlag {
    fn new(kind: SecurityFlagKind, message: &str, severity: Severity) -> Self {
        Self {
            kind,
            message: message.to_string(),
            severity,
        }
    }
}

/// Derives account warnings from a user row.
pub fn security_flags(user: &user_entity::Model, now: DateTime<Utc>) -> Vec<SecurityFlag> {
    let mut flags = Vec::new();

    if let Some(last_online) = user.last_online_at {
        let hours = (now - last_online).num_hours();
        if hours > 24 * 30 {
            flags.push(SecurityFlag::new(
                SecurityFlagKind::Warning,
                "User has not been online for over 30 days",
                Severity::Medium,
            ));
        }
        if hours > 24 * 90 {
            flags.push(SecurityFlag::new(
                SecurityFlagKind::Danger,
                "User has not been online for over 90 days",
                Severity::High,
            ));
        }
    }

    let has_licence = user
        .medical_licence
        .as_deref()
        .is_some_and(|l| !l.trim().is_empty());
    if user.user_type == UserType::Doctor && !has_licence {
        flags.push(SecurityFlag::new(
            SecurityFlagKind::Warning,
            "Doctor profile missing medical license number",
            Severity::Medium,
        ));
    }

    if user.email_verified_at.is_none() {
        flags.push(SecurityFlag::new(
            SecurityFlagKind::Warning,
            "Email address not verified",
            Severity::Medium,
        ));
    }

    if user.google_id.is_some() && user.password.is_none() {
        flags.push(SecurityFlag::new(
            SecurityFlagKind::Info,
            "User signed up with Google (no password set)",
            Severity::Low,
        ));
    }

    flags
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ActivityStats {
    pub total_appointments: u64,
    pub completed_appointments: u64,
    pub cancelled_appointments: u64,
    pub total_payments: u64,
    pub total_spent: f64,
    pub total_subscriptions: u64,
    pub active_subscriptions: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecentAppointment {
    pub id: i64,
    pub appointment_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, example = "14:30:00")]
    pub appointment_time: Option<NaiveTime>,
    pub status: AppointmentStatus,
    #[serde(rename = "type")]
    pub appointment_type: String,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    /// "patient" or "doctor" from the viewed user's side
    pub user_role: String,
    pub other_party_name: Option<String>,
    pub other_party_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecentPayment {
    pub id: i64,
    pub amount: f64,
    pub currency: String,
    pub status: PaymentStatus,
    pub payment_method: Option<String>,
    pub payment_gateway: Option<String>,
    pub transaction_id: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDetails {
    #[serde(flatten)]
    pub user: UserResponse,
    pub account_age_days: i64,
    pub email_verified: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub medical_license_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDetailsResponse {
    pub user: UserDetails,
    pub current_subscription: Option<SubscriptionResponse>,
    pub activity_stats: ActivityStats,
    pub recent_appointments: Vec<RecentAppointment>,
    pub recent_payments: Vec<RecentPayment>,
    pub security_flags: Vec<SecurityFlag>,
}
