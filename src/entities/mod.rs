pub mod appointments;
pub mod doctor_wallets;
pub mod payment_transactions;
pub mod plans;
pub mod subscriptions;
pub mod users;
pub mod wallet_transactions;
pub mod withdrawal_requests;

pub use appointments as appointment_entity;
pub use doctor_wallets as doctor_wallet_entity;
pub use payment_transactions as payment_entity;
pub use plans as plan_entity;
pub use subscriptions as subscription_entity;
pub use users as user_entity;
pub use wallet_transactions as wallet_transaction_entity;
pub use withdrawal_requests as withdrawal_entity;

pub use appointments::AppointmentStatus;
pub use payment_transactions::PaymentStatus;
pub use subscriptions::SubscriptionStatus;
pub use users::{UserStatus, UserType};
pub use withdrawal_requests::{PaymentMethod, WithdrawalStatus};
