pub mod appointment;
pub mod auth;
pub mod dashboard;
pub mod diagnostics;
pub mod health;
pub mod payment;
pub mod subscription;
pub mod user;
pub mod withdrawal;

pub use appointment::appointment_config;
pub use auth::auth_config;
pub use dashboard::dashboard_config;
pub use diagnostics::diagnostics_config;
pub use health::health_config;
pub use payment::payment_config;
pub use subscription::subscription_config;
pub use user::user_config;
pub use withdrawal::withdrawal_config;

use actix_web::{error, web};
use crate::error::AppError;

/// Malformed bodies and query strings use the shared error shape.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = match &err {
            error::JsonPayloadError::ContentType => "Content-Type must be application/json".to_string(),
            other => format!("Invalid JSON body: {}", other),
        };
        error::Error::from(AppError::ValidationError(message))
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        error::Error::from(AppError::ValidationError(format!("Invalid query string: {}", err)))
    })
}

/// Non-numeric ids and other bad path segments.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        error::Error::from(AppError::ValidationError(format!("Invalid path parameter: {}", err)))
    })
}

/// Everything under `/api`.
pub fn api_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(json_config())
            .app_data(query_config())
            .app_data(path_config())
            .configure(auth_config)
            .configure(user_config)
            .configure(appointment_config)
            .configure(payment_config)
            .configure(subscription_config)
            .configure(withdrawal_config)
            .configure(dashboard_config)
            .configure(diagnostics_config),
    );
}
