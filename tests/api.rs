use std::collections::BTreeMap;
use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, Error, test, web};
use chrono::Utc;
use sea_orm::{
    DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Transaction, Value,
};
use serde_json::json;

use clinic_admin::config::{AdminAccountConfig, EmailConfig};
use clinic_admin::entities::*;
use clinic_admin::external::Mailer;
use clinic_admin::handlers;
use clinic_admin::middlewares::AuthMiddleware;
use clinic_admin::services::*;
use clinic_admin::utils::JwtService;

const SECRET: &str = "integration-secret";
const PASSWORD: &str = "correct horse";

fn jwt() -> JwtService {
    JwtService::new(SECRET, 3600)
}

fn admins() -> Vec<AdminAccountConfig> {
    vec![AdminAccountConfig {
        id: "admin-1".into(),
        email: "ops@clinic.test".into(),
        name: "Ops".into(),
        role: "admin".into(),
        password_hash: bcrypt::hash(PASSWORD, 4).unwrap(),
    }]
}

fn token() -> String {
    jwt()
        .generate_token("admin-1", "ops@clinic.test", "Ops", "admin")
        .unwrap()
}

fn bearer() -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token()))
}

fn build_app(
    db: Arc<DatabaseConnection>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    let mailer = Mailer::new(EmailConfig::default());
    App::new()
        .wrap(AuthMiddleware::new(jwt()))
        .app_data(web::Data::new(AuthService::new(admins(), jwt())))
        .app_data(web::Data::new(UserService::new(db.clone(), mailer.clone())))
        .app_data(web::Data::new(AppointmentService::new(db.clone())))
        .app_data(web::Data::new(PaymentService::new(db.clone())))
        .app_data(web::Data::new(SubscriptionService::new(db.clone())))
        .app_data(web::Data::new(WithdrawalService::new(
            db.clone(),
            AuthService::new(admins(), jwt()),
            mailer,
        )))
        .app_data(web::Data::new(DashboardService::new(db.clone(), 1800.0)))
        .app_data(web::Data::new(DiagnosticsService::new(db)))
        .configure(handlers::health_config)
        .configure(handlers::api_config)
}

fn connect(mock: MockDatabase) -> Arc<DatabaseConnection> {
    Arc::new(mock.into_connection())
}

fn empty_db() -> Arc<DatabaseConnection> {
    connect(MockDatabase::new(DatabaseBackend::Postgres))
}

/// Statements the app sent; the app must be dropped first so the connection is no longer shared.
fn transaction_log(db: Arc<DatabaseConnection>) -> Vec<Transaction> {
    match Arc::try_unwrap(db) {
        Ok(conn) => conn.into_transaction_log(),
        Err(_) => panic!("database connection is still shared"),
    }
}

fn body_json(bytes: &[u8]) -> serde_json::Value {
    serde_json::from_slice(bytes).unwrap_or(serde_json::Value::Null)
}

/// Runs a request and returns status plus JSON body, including middleware rejections.
macro_rules! send {
    ($app:expr, $req:expr) => {{
        match test::try_call_service(&$app, $req.to_request()).await {
            Ok(resp) => {
                let status = resp.status();
                let body = test::read_body(resp).await;
                (status, body_json(&body))
            }
            Err(err) => {
                let resp = err.error_response();
                let status = resp.status();
                let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
                (status, body_json(&body))
            }
        }
    }};
}

fn user(id: i64, user_type: UserType, status: UserStatus) -> user_entity::Model {
    user_entity::Model {
        id,
        first_name: "Chikondi".into(),
        last_name: "Phiri".into(),
        email: format!("user{id}@clinic.test"),
        password: Some("$2b$04$x".into()),
        user_type,
        status,
        is_active: true,
        medical_licence: None,
        google_id: None,
        email_verified_at: None,
        last_online_at: None,
        created_at: Some(Utc::now()),
        updated_at: Some(Utc::now()),
    }
}

fn withdrawal(status: WithdrawalStatus) -> withdrawal_entity::Model {
    withdrawal_entity::Model {
        id: 7,
        doctor_id: 42,
        amount: 25_000.0,
        payment_method: PaymentMethod::MobileMoney,
        status,
        bank_name: None,
        account_number: None,
        account_holder_name: None,
        mobile_provider: Some("Airtel".into()),
        mobile_number: Some("0999000000".into()),
        paid_by: None,
        paid_at: None,
        created_at: Some(Utc::now()),
        updated_at: Some(Utc::now()),
    }
}

fn updated(rows: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected: rows,
    }
}

#[actix_web::test]
async fn health_is_public() {
    let app = test::init_service(build_app(empty_db())).await;
    let (status, body) = send!(app, test::TestRequest::get().uri("/health"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn api_requires_bearer_token() {
    let app = test::init_service(build_app(empty_db())).await;

    let (status, body) = send!(app, test::TestRequest::get().uri("/api/users"));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized");
    assert_eq!(body["success"], false);

    let (status, _) = send!(
        app,
        test::TestRequest::patch()
            .uri("/api/payments/1/status")
            .insert_header(("Authorization", "Bearer not-a-token"))
            .set_json(json!({"status": "completed"}))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let forged = JwtService::new("other-secret", 3600)
        .generate_token("admin-1", "ops@clinic.test", "Ops", "admin")
        .unwrap();
    let (status, _) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("Authorization", format!("Bearer {forged}")))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn login_rejects_bad_credentials() {
    let app = test::init_service(build_app(empty_db())).await;

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({"email": "ops@clinic.test", "password": "wrong"}))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({"email": "ops@clinic.test"}))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email and password are required");
}

#[actix_web::test]
async fn login_token_opens_protected_routes() {
    let app = test::init_service(build_app(empty_db())).await;

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({"email": "ops@clinic.test", "password": PASSWORD}))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["id"], "admin-1");
    assert!(body["user"].get("password_hash").is_none());
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("Authorization", format!("Bearer {token}")))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "ops@clinic.test");

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/admins")
            .insert_header(("Authorization", format!("Bearer {token}")))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["admins"][0]["id"], "admin-1");
}

#[actix_web::test]
async fn malformed_json_uses_error_shape() {
    let app = test::init_service(build_app(empty_db())).await;
    let (status, body) = send!(
        app,
        test::TestRequest::patch()
            .uri("/api/users/1/status")
            .insert_header(bearer())
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{not json")
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["message"].as_str().unwrap().starts_with("Invalid JSON body"));
}

#[actix_web::test]
async fn user_status_update_returns_fresh_row() {
    let db = connect(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([updated(1)])
            .append_query_results([[user(5, UserType::Patient, UserStatus::Suspended)]]),
    );
    let app = test::init_service(build_app(db)).await;

    let (status, body) = send!(
        app,
        test::TestRequest::patch()
            .uri("/api/users/5/status")
            .insert_header(bearer())
            .set_json(json!({"status": "suspended"}))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User status updated successfully");
    assert_eq!(body["user"]["id"], 5);
    assert_eq!(body["user"]["status"], "suspended");
}

#[actix_web::test]
async fn doctor_approval_survives_email_fallback() {
    let db = connect(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([updated(1)])
            .append_query_results([[user(9, UserType::Doctor, UserStatus::Approved)]]),
    );
    let app = test::init_service(build_app(db)).await;

    let (status, body) = send!(
        app,
        test::TestRequest::patch()
            .uri("/api/users/9/status")
            .insert_header(bearer())
            .set_json(json!({"status": "approved"}))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["status"], "approved");
}

#[actix_web::test]
async fn invalid_status_is_rejected_before_touching_the_database() {
    let db = empty_db();
    let app = test::init_service(build_app(db.clone())).await;

    for uri in [
        "/api/users/1/status",
        "/api/appointments/1/status",
        "/api/payments/1/status",
        "/api/subscriptions/1/status",
    ] {
        let (status, body) = send!(
            app,
            test::TestRequest::patch()
                .uri(uri)
                .insert_header(bearer())
                .set_json(json!({"status": "invalid_value"}))
        );
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["message"], "Invalid status", "{uri}");
    }

    let (status, body) = send!(
        app,
        test::TestRequest::patch()
            .uri("/api/appointments/1/status")
            .insert_header(bearer())
            .set_json(json!({}))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid status");

    drop(app);
    assert!(transaction_log(db).is_empty());
}

#[actix_web::test]
async fn missing_rows_are_not_found() {
    let db = connect(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([updated(0), updated(0), updated(0)]),
    );
    let app = test::init_service(build_app(db)).await;

    let (status, body) = send!(
        app,
        test::TestRequest::patch()
            .uri("/api/appointments/404/status")
            .insert_header(bearer())
            .set_json(json!({"status": "cancelled"}))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Appointment not found");

    let (status, body) = send!(
        app,
        test::TestRequest::patch()
            .uri("/api/payments/404/status")
            .insert_header(bearer())
            .set_json(json!({"status": "refunded"}))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Payment not found");

    let (status, body) = send!(
        app,
        test::TestRequest::delete()
            .uri("/api/users/404")
            .insert_header(bearer())
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
}

#[actix_web::test]
async fn payment_status_is_exposed_as_payment_status() {
    let payment = payment_entity::Model {
        id: 3,
        user_id: 5,
        amount: 9.99,
        currency: "USD".into(),
        status: PaymentStatus::Refunded,
        payment_method: Some("card".into()),
        gateway: Some("paychangu".into()),
        transaction_id: Some("tx-3".into()),
        reference: None,
        created_at: None,
        updated_at: None,
    };
    let db = connect(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([updated(1)])
            .append_query_results([[payment]]),
    );
    let app = test::init_service(build_app(db)).await;

    let (status, body) = send!(
        app,
        test::TestRequest::patch()
            .uri("/api/payments/3/status")
            .insert_header(bearer())
            .set_json(json!({"status": "refunded"}))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payment"]["payment_status"], "refunded");
    assert_eq!(body["message"], "Payment status updated successfully");
}

#[actix_web::test]
async fn subscription_status_also_sets_is_active() {
    let subscription = subscription_entity::Model {
        id: 11,
        user_id: 5,
        plan_id: Some(1),
        plan_name: Some("Basic".into()),
        plan_price: Some(10.0),
        plan_currency: Some("USD".into()),
        status: SubscriptionStatus::Cancelled,
        is_active: false,
        start_date: None,
        end_date: None,
        created_at: None,
        updated_at: None,
    };
    let db = connect(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([updated(1)])
            .append_query_results([[subscription]]),
    );
    let app = test::init_service(build_app(db.clone())).await;

    let (status, body) = send!(
        app,
        test::TestRequest::patch()
            .uri("/api/subscriptions/11/status")
            .insert_header(bearer())
            .set_json(json!({"status": "cancelled"}))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subscription"]["status"], "cancelled");
    assert_eq!(body["subscription"]["is_active"], false);

    drop(app);
    let log = format!("{:?}", transaction_log(db));
    assert!(log.contains("is_active"), "{log}");
    assert!(log.contains("Bool(Some(false))"), "{log}");
}

#[actix_web::test]
async fn user_list_is_paginated() {
    let count_row = BTreeMap::from([("num_items", Value::BigInt(Some(21)))]);
    let db = connect(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row]])
            .append_query_results([[user(1, UserType::Doctor, UserStatus::Pending)]]),
    );
    let app = test::init_service(build_app(db)).await;

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/users?page=2&limit=10&type=doctor&status=all&search=phiri")
            .insert_header(bearer())
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"][0]["user_type"], "doctor");
    assert_eq!(body["pagination"]["total"], 21);
    assert_eq!(body["pagination"]["total_pages"], 3);
    assert_eq!(body["pagination"]["current_page"], 2);
}

#[actix_web::test]
async fn unknown_list_filter_is_rejected() {
    let app = test::init_service(build_app(empty_db())).await;
    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/payments?status=bogus")
            .insert_header(bearer())
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid status");
}

#[actix_web::test]
async fn withdrawal_update_validates_input() {
    let db = empty_db();
    let app = test::init_service(build_app(db.clone())).await;

    let cases = [
        (json!({"status": "approved"}), "Invalid status"),
        (json!({"status": "paid"}), "Invalid status"),
        (
            json!({"status": "completed"}),
            "completed_by is required for completed status",
        ),
        (
            json!({"status": "completed", "completed_by": "admin-9"}),
            "Invalid admin ID provided",
        ),
        (
            json!({"status": "failed", "completed_by": "admin-9"}),
            "Invalid admin ID provided",
        ),
    ];
    for (payload, message) in cases {
        let (status, body) = send!(
            app,
            test::TestRequest::patch()
                .uri("/api/withdraw-requests/7/status")
                .insert_header(bearer())
                .set_json(payload)
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], message);
    }

    drop(app);
    assert!(transaction_log(db).is_empty());
}

#[actix_web::test]
async fn failed_withdrawal_does_not_touch_wallet() {
    let db = connect(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[withdrawal(WithdrawalStatus::Pending)]])
            .append_exec_results([updated(1)])
            .append_query_results([[withdrawal(WithdrawalStatus::Failed)]])
            .append_query_results([[user(42, UserType::Doctor, UserStatus::Approved)]]),
    );
    let app = test::init_service(build_app(db.clone())).await;

    let (status, body) = send!(
        app,
        test::TestRequest::patch()
            .uri("/api/withdraw-requests/7/status")
            .insert_header(bearer())
            .set_json(json!({"status": "failed"}))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Withdrawal request failed successfully");
    assert_eq!(body["status"], "failed");
    assert_eq!(body["withdrawal_request"]["status"], "failed");

    drop(app);
    let log = format!("{:?}", transaction_log(db));
    assert!(!log.contains("wallet_transactions"), "{log}");
}

#[actix_web::test]
async fn completed_withdrawal_debits_wallet() {
    let admin_row = user_entity::Model {
        email: "ops@clinic.test".into(),
        ..user(1, UserType::Admin, UserStatus::Active)
    };
    let paid = withdrawal_entity::Model {
        paid_by: Some(1),
        paid_at: Some(Utc::now()),
        ..withdrawal(WithdrawalStatus::Completed)
    };
    let db = connect(
        MockDatabase::new(DatabaseBackend::Postgres)
            // paid_by lookup
            .append_query_results([[admin_row]])
            // locked withdrawal row
            .append_query_results([[withdrawal(WithdrawalStatus::Pending)]])
            // no wallet yet
            .append_query_results([Vec::<doctor_wallet_entity::Model>::new()])
            // withdrawal update, wallet insert, balance update, ledger insert
            .append_exec_results([updated(1), updated(1), updated(1), updated(1)])
            .append_query_results([[paid]])
            .append_query_results([[user(42, UserType::Doctor, UserStatus::Approved)]]),
    );
    let app = test::init_service(build_app(db.clone())).await;

    let (status, body) = send!(
        app,
        test::TestRequest::patch()
            .uri("/api/withdraw-requests/7/status")
            .insert_header(bearer())
            .set_json(json!({"status": "completed", "completed_by": "admin-1"}))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Withdrawal request completed successfully");
    assert_eq!(body["withdrawal_request"]["paid_by"], 1);
    assert_eq!(body["withdrawal_request"]["doctor"]["email"], "user42@clinic.test");

    drop(app);
    let log = format!("{:?}", transaction_log(db));
    assert!(log.contains("doctor_wallets"), "{log}");
    assert!(log.contains("Withdrawal processed - Mobile Money"), "{log}");
}

#[actix_web::test]
async fn completed_withdrawal_cannot_be_completed_twice() {
    let db = connect(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user_entity::Model>::new()])
            .append_query_results([[withdrawal(WithdrawalStatus::Completed)]]),
    );
    let app = test::init_service(build_app(db)).await;

    let (status, body) = send!(
        app,
        test::TestRequest::patch()
            .uri("/api/withdraw-requests/7/status")
            .insert_header(bearer())
            .set_json(json!({"status": "completed", "completed_by": "admin-1"}))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Withdrawal request has already been completed");
}

#[actix_web::test]
async fn failed_withdrawal_records_the_admin() {
    let admin_row = user_entity::Model {
        email: "ops@clinic.test".into(),
        ..user(1, UserType::Admin, UserStatus::Active)
    };
    let failed = withdrawal_entity::Model {
        paid_by: Some(1),
        paid_at: Some(Utc::now()),
        ..withdrawal(WithdrawalStatus::Failed)
    };
    let db = connect(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[admin_row]])
            .append_query_results([[withdrawal(WithdrawalStatus::Pending)]])
            .append_exec_results([updated(1)])
            .append_query_results([[failed]])
            .append_query_results([[user(42, UserType::Doctor, UserStatus::Approved)]]),
    );
    let app = test::init_service(build_app(db.clone())).await;

    let (status, body) = send!(
        app,
        test::TestRequest::patch()
            .uri("/api/withdraw-requests/7/status")
            .insert_header(bearer())
            .set_json(json!({"status": "failed", "completed_by": "admin-1"}))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["withdrawal_request"]["status"], "failed");
    assert_eq!(body["withdrawal_request"]["paid_by"], 1);

    drop(app);
    let log = format!("{:?}", transaction_log(db));
    assert!(log.contains("paid_by"), "{log}");
    assert!(!log.contains("wallet_transactions"), "{log}");
}

#[actix_web::test]
async fn missing_withdrawal_is_not_found() {
    let db = connect(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<withdrawal_entity::Model>::new()]),
    );
    let app = test::init_service(build_app(db)).await;

    let (status, body) = send!(
        app,
        test::TestRequest::patch()
            .uri("/api/withdraw-requests/404/status")
            .insert_header(bearer())
            .set_json(json!({"status": "failed"}))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Withdrawal request not found");
}

#[actix_web::test]
async fn missing_user_and_subscription_are_not_found() {
    let db = connect(
        MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([updated(0), updated(0)]),
    );
    let app = test::init_service(build_app(db)).await;

    let (status, body) = send!(
        app,
        test::TestRequest::patch()
            .uri("/api/users/404/status")
            .insert_header(bearer())
            .set_json(json!({"status": "active"}))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");

    let (status, body) = send!(
        app,
        test::TestRequest::patch()
            .uri("/api/subscriptions/404/status")
            .insert_header(bearer())
            .set_json(json!({"status": "expired"}))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Subscription not found");
}

#[actix_web::test]
async fn appointment_status_update_returns_new_status() {
    let appointment = appointment_entity::Model {
        id: 12,
        patient_id: 5,
        doctor_id: 42,
        appointment_date: None,
        appointment_time: None,
        appointment_type: "video".into(),
        status: AppointmentStatus::Completed,
        reason: Some("Follow-up".into()),
        created_at: None,
        updated_at: Some(Utc::now()),
    };
    let db = connect(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([updated(1)])
            .append_query_results([[appointment]]),
    );
    let app = test::init_service(build_app(db)).await;

    let (status, body) = send!(
        app,
        test::TestRequest::patch()
            .uri("/api/appointments/12/status")
            .insert_header(bearer())
            .set_json(json!({"status": "completed"}))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Appointment status updated successfully");
    assert_eq!(body["appointment"]["id"], 12);
    assert_eq!(body["appointment"]["status"], "completed");
    assert_eq!(body["appointment"]["notes"], "Follow-up");
}

#[actix_web::test]
async fn user_details_include_activity_and_flags() {
    let activity = BTreeMap::from([
        ("total_appointments", Value::BigInt(Some(4))),
        ("completed_appointments", Value::BigInt(Some(3))),
        ("cancelled_appointments", Value::BigInt(Some(1))),
        ("total_payments", Value::BigInt(Some(2))),
        ("total_spent", Value::Double(Some(19.5))),
        ("total_subscriptions", Value::BigInt(Some(1))),
        ("active_subscriptions", Value::BigInt(Some(0))),
    ]);
    let db = connect(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user(5, UserType::Patient, UserStatus::Active)]])
            .append_query_results([Vec::<subscription_entity::Model>::new()])
            .append_query_results([[activity]])
            .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
            .append_query_results([Vec::<payment_entity::Model>::new()])
            .append_query_results([Vec::<user_entity::Model>::new()]),
    );
    let app = test::init_service(build_app(db.clone())).await;

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/users/5")
            .insert_header(bearer())
    );
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["user"]["id"], 5);
    assert_eq!(data["user"]["email_verified"], false);
    assert!(data["current_subscription"].is_null());
    assert_eq!(data["activity_stats"]["completed_appointments"], 3);
    assert_eq!(data["activity_stats"]["total_spent"], 19.5);
    assert_eq!(data["recent_appointments"], json!([]));
    assert_eq!(data["security_flags"][0]["message"], "Email address not verified");

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/users/404")
            .insert_header(bearer())
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");

    // current subscription and counts both key on is_active
    drop(app);
    let log = format!("{:?}", transaction_log(db));
    assert!(log.contains("Bool(Some(true))"), "{log}");
    assert!(!log.contains("'active'"), "{log}");
}

#[actix_web::test]
async fn dashboard_stats_report_growth() {
    let totals = BTreeMap::from([
        ("total_users", Value::BigInt(Some(120))),
        ("total_doctors", Value::BigInt(Some(20))),
        ("total_patients", Value::BigInt(Some(99))),
        ("active_subscriptions", Value::BigInt(Some(30))),
        ("total_revenue", Value::Double(Some(54_000.0))),
        ("monthly_revenue", Value::Double(Some(18_000.0))),
        ("previous_month_revenue", Value::Double(Some(12_000.0))),
        ("today_revenue", Value::Double(Some(0.0))),
        ("total_appointments", Value::BigInt(Some(400))),
        ("pending_appointments", Value::BigInt(Some(12))),
        ("completed_appointments", Value::BigInt(Some(300))),
        ("today_appointments", Value::BigInt(Some(4))),
        ("users_this_month", Value::BigInt(Some(39))),
        ("users_previous_month", Value::BigInt(Some(40))),
        ("appointments_this_month", Value::BigInt(Some(40))),
        ("appointments_previous_month", Value::BigInt(Some(0))),
        ("subscriptions_this_month", Value::BigInt(Some(6))),
        ("subscriptions_previous_month", Value::BigInt(Some(8))),
    ]);
    let point = |name: &str, value: f64| {
        BTreeMap::from([("name", Value::from(name)), ("value", Value::Double(Some(value)))])
    };
    let db = connect(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[totals]])
            .append_query_results([vec![point("2026-W40", 3.0), point("2026-W41", 5.0)]])
            .append_query_results([vec![point("2026-W41", 18_000.0)]])
            .append_query_results([vec![point("Basic", 30.0)]]),
    );
    let app = test::init_service(build_app(db)).await;

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/dashboard/stats")
            .insert_header(bearer())
    );
    assert_eq!(status, StatusCode::OK);
    let stats = &body["data"]["stats"];
    assert_eq!(stats["totalUsers"], 120);
    assert_eq!(stats["revenueGrowthPercentage"], 50);
    // -2.5 rounds up
    assert_eq!(stats["userGrowthPercentage"], -2);
    assert_eq!(stats["appointmentGrowthPercentage"], 0);
    assert_eq!(stats["subscriptionGrowthPercentage"], -25);
    assert_eq!(body["data"]["userGrowthData"][1]["value"], 5.0);
    assert_eq!(body["data"]["subscriptionData"][0]["name"], "Basic");
}

#[actix_web::test]
async fn withdrawal_list_includes_doctor() {
    let db = connect(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[withdrawal(WithdrawalStatus::Pending)]])
            .append_query_results([[user(42, UserType::Doctor, UserStatus::Approved)]]),
    );
    let app = test::init_service(build_app(db)).await;

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/withdraw-requests?status=pending")
            .insert_header(bearer())
    );
    assert_eq!(status, StatusCode::OK);
    let first = &body["withdrawal_requests"][0];
    assert_eq!(first["id"], 7);
    assert_eq!(first["status"], "pending");
    assert_eq!(first["doctor"]["email"], "user42@clinic.test");
}

#[actix_web::test]
async fn database_check_reports_failure_detail() {
    let app = test::init_service(build_app(Arc::new(DatabaseConnection::Disconnected))).await;
    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/debug/database")
            .insert_header(bearer())
    );
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Database connection failed");
    assert!(body["error"].as_str().unwrap().contains("Disconnected"), "{body}");
    assert!(body["details"].is_string());

    let app = test::init_service(build_app(empty_db())).await;
    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/debug/database")
            .insert_header(bearer())
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["backend"], "Postgres");
}

#[actix_web::test]
async fn non_numeric_id_uses_error_shape() {
    let db = empty_db();
    let app = test::init_service(build_app(db.clone())).await;

    let (status, body) = send!(
        app,
        test::TestRequest::patch()
            .uri("/api/users/abc/status")
            .insert_header(bearer())
            .set_json(json!({"status": "active"}))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().starts_with("Invalid path parameter"), "{body}");

    drop(app);
    assert!(transaction_log(db).is_empty());
}

#[actix_web::test]
async fn huge_page_number_is_clamped() {
    let count_row = BTreeMap::from([("num_items", Value::BigInt(Some(3)))]);
    let db = connect(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row]])
            .append_query_results([Vec::<user_entity::Model>::new()]),
    );
    let app = test::init_service(build_app(db)).await;

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/users?page=18446744073709551615&limit=100")
            .insert_header(bearer())
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"], json!([]));
    assert_eq!(body["pagination"]["current_page"], i64::MAX as u64 / 100);
}
