pub mod appointment;
pub mod auth;
pub mod common;
pub mod dashboard;
pub mod payment;
pub mod subscription;
pub mod user;
pub mod withdrawal;

pub use appointment::*;
pub use auth::*;
pub use common::*;
pub use dashboard::*;
pub use payment::*;
pub use subscription::*;
pub use user::*;
pub use withdrawal::*;
