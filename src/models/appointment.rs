use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{AppointmentStatus, appointment_entity, user_entity};

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AppointmentListQuery {
    pub page: Option<u64>,
    #[serde(alias = "per_page")]
    pub limit: Option<u64>,
    /// 医生或患者姓名 / 邮箱
    pub search: Option<String>,
    pub status: Option<String>,
    /// text / voice / video / all
    #[serde(rename = "type")]
    pub appointment_type: Option<String>,
    pub doctor_id: Option<i64>,
}

/// Name and email of a party to an appointment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ParticipantSummary {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<&user_entity::Model> for ParticipantSummary {
    fn from(u: &user_entity::Model) -> Self {
        Self {
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            email: u.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AppointmentResponse {
    pub id: i64,
    pub doctor_id: i64,
    pub patient_id: i64,
    pub appointment_type: String,
    pub status: AppointmentStatus,
    pub scheduled_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, example = "14:30:00")]
    pub scheduled_time: Option<NaiveTime>,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor: Option<ParticipantSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient: Option<ParticipantSummary>,
}

impl From<appointment_entity::Model> for AppointmentResponse {
    fn from(m: appointment_entity::Model) -> Self {
        Self {
            id: m.id,
            doctor_id: m.doctor_id,
            patient_id: m.patient_id,
            appointment_type: m.appointment_type,
            status: m.status,
            scheduled_date: m.appointment_date,
            scheduled_time: m.appointment_time,
            notes: m.reason,
            created_at: m.created_at,
            updated_at: m.updated_at,
            doctor: None,
            patient: None,
        }
    }
}
