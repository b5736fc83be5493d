use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::*;
use crate::handlers;
use crate::models::*;
use crate::services::DatabaseReport;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::login,
        handlers::auth::me,
        handlers::auth::list_admins,
        handlers::user::list_users,
        handlers::user::list_pending_doctors,
        handlers::user::get_user,
        handlers::user::update_user_status,
        handlers::user::delete_user,
        handlers::appointment::list_appointments,
        handlers::appointment::update_appointment_status,
        handlers::payment::list_payments,
        handlers::payment::update_payment_status,
        handlers::subscription::list_subscriptions,
        handlers::subscription::update_subscription_status,
        handlers::withdrawal::list_withdrawals,
        handlers::withdrawal::update_withdrawal_status,
        handlers::dashboard::get_stats,
        handlers::diagnostics::check_database,
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            AdminResponse,
            StatusUpdateRequest,
            MessageResponse,
            ApiError,
            ErrorResponse,
            UserStatus,
            UserType,
            UserResponse,
            UserDetails,
            UserDetailsResponse,
            ActivityStats,
            RecentAppointment,
            RecentPayment,
            SecurityFlag,
            SecurityFlagKind,
            Severity,
            AppointmentStatus,
            AppointmentResponse,
            ParticipantSummary,
            PaymentStatus,
            PaymentResponse,
            SubscriptionStatus,
            SubscriptionResponse,
            WithdrawalStatus,
            PaymentMethod,
            WithdrawalResolution,
            WithdrawalStatusUpdateRequest,
            WithdrawalResponse,
            DashboardStats,
            DashboardResponse,
            ChartPoint,
            DatabaseReport,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Admin authentication"),
        (name = "users", description = "User management"),
        (name = "appointments", description = "Appointment management"),
        (name = "payments", description = "Payment transactions"),
        (name = "subscriptions", description = "Subscriptions"),
        (name = "withdrawals", description = "Doctor withdrawal requests"),
        (name = "dashboard", description = "Dashboard statistics"),
        (name = "diagnostics", description = "Operational checks"),
    ),
    info(
        title = "Clinic Admin API",
        version = "1.0.0",
        description = "Administrative REST API for the telemedicine platform"
    ),
    servers(
        (url = "/api", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
