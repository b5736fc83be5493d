use actix_web::{App, HttpServer, middleware::Logger, web};
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use chrono::Local;  // timestamp in log lines

use clinic_admin::{
    config::Config,
    database::{create_pool, run_migrations},
    external::Mailer,
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    utils::{JwtService, hash_password},
};

fn init_logger() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // `clinic-admin hash-password <password>` 生成管理员配置用的 bcrypt 哈希
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(String::as_str) == Some("hash-password") {
        let Some(password) = args.get(2) else {
            eprintln!("usage: clinic-admin hash-password <password>");
            std::process::exit(2);
        };
        match hash_password(password) {
            Ok(hash) => println!("{}", hash),
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    init_logger();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration");

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    if config.database.run_migrations {
        run_migrations(&pool)
            .await
            .expect("Failed to run database migrations");
    }

    let jwt_service = JwtService::new(&config.jwt.secret, config.jwt.expires_in);
    let mailer = Mailer::new(config.email.clone());
    if config.email.api_url.is_empty() {
        log::warn!("Email API not configured, notifications will be logged only");
    }

    // 创建服务
    let auth_service = AuthService::new(config.admins.clone(), jwt_service.clone());
    let user_service = UserService::new(pool.clone(), mailer.clone());
    let appointment_service = AppointmentService::new(pool.clone());
    let payment_service = PaymentService::new(pool.clone());
    let subscription_service = SubscriptionService::new(pool.clone());
    let withdrawal_service =
        WithdrawalService::new(pool.clone(), auth_service.clone(), mailer.clone());
    let dashboard_service = DashboardService::new(pool.clone(), config.dashboard.usd_to_mwk_rate);
    let diagnostics_service = DiagnosticsService::new(pool.clone());

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .wrap(create_cors())
            .wrap(Logger::default())
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(appointment_service.clone()))
            .app_data(web::Data::new(payment_service.clone()))
            .app_data(web::Data::new(subscription_service.clone()))
            .app_data(web::Data::new(withdrawal_service.clone()))
            .app_data(web::Data::new(dashboard_service.clone()))
            .app_data(web::Data::new(diagnostics_service.clone()))
            .configure(swagger_config)
            .configure(handlers::health_config)
            .configure(handlers::api_config)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
