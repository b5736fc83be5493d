mod filters;

pub mod appointment_service;
pub mod auth_service;
pub mod dashboard_service;
pub mod diagnostics_service;
pub mod payment_service;
pub mod subscription_service;
pub mod user_service;
pub mod withdrawal_service;

pub use appointment_service::*;
pub use auth_service::*;
pub use dashboard_service::*;
pub use diagnostics_service::*;
pub use payment_service::*;
pub use subscription_service::*;
pub use user_service::*;
pub use withdrawal_service::*;
