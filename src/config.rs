use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub admins: Vec<AdminAccountConfig>,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    #[serde(default)]
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expires_in: i64, // seconds
}

/// Operator identity allowed to sign in to the dashboard.
///
/// `password_hash` is a bcrypt hash; plaintext passwords are never configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminAccountConfig {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default = "default_admin_role")]
    pub role: String,
    pub password_hash: String,
}

fn default_admin_role() -> String {
    "admin".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// HTTP endpoint of the transactional mail API. Empty means log-only delivery.
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
    pub from_address: String,
    pub from_name: String,
    pub app_url: String,
    pub support_address: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_key: String::new(),
            from_address: "no-reply@localhost".to_string(),
            from_name: "Clinic Admin".to_string(),
            app_url: "http://localhost:3000".to_string(),
            support_address: "support@localhost".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Revenue is reported in MWK; USD plan prices are multiplied by this rate.
    pub usd_to_mwk_rate: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            usd_to_mwk_rate: 1800.0,
        }
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 配置文件不存在时完全依赖环境变量
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => Self::from_toml_str(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                let database_url = get_env("DATABASE_URL")
                    .ok_or("DATABASE_URL is not set and no config.toml was found")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                        run_migrations: get_env_parse("DB_RUN_MIGRATIONS", false),
                    },
                    jwt: JwtConfig {
                        secret: get_env("JWT_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        expires_in: get_env_parse("JWT_EXPIRES_IN", 86_400i64),
                    },
                    admins: Vec::new(),
                    email: EmailConfig::default(),
                    dashboard: DashboardConfig::default(),
                }
            }
            Err(e) => {
                return Err(format!("Failed to read config file {config_path}: {e}").into());
            }
        };

        config.apply_env_overrides();

        if config.admins.is_empty() {
            log::warn!("No admin accounts configured; dashboard login is disabled");
        }
        if config.jwt.secret == "change-me-in-production" {
            log::warn!("JWT_SECRET is using the built-in default");
        }

        Ok(config)
    }

    pub fn from_toml_str(config_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        toml::from_str(config_str)
            .map_err(|e| format!("Failed to parse config file: {e}").into())
    }

    /// 环境变量覆盖（即便文件存在时也覆盖）
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Ok(v) = env::var("DB_RUN_MIGRATIONS")
            && let Ok(b) = v.parse()
        {
            self.database.run_migrations = b;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            self.jwt.expires_in = n;
        }

        // Email
        if let Ok(v) = env::var("EMAIL_API_URL") {
            self.email.api_url = v;
        }
        if let Ok(v) = env::var("EMAIL_API_KEY") {
            self.email.api_key = v;
        }
        if let Ok(v) = env::var("EMAIL_FROM_ADDRESS") {
            self.email.from_address = v;
        }
        if let Ok(v) = env::var("EMAIL_FROM_NAME") {
            self.email.from_name = v;
        }
        if let Ok(v) = env::var("APP_URL") {
            self.email.app_url = v;
        }
        if let Ok(v) = env::var("SUPPORT_EMAIL") {
            self.email.support_address = v;
        }

        if let Ok(v) = env::var("USD_TO_MWK_RATE")
            && let Ok(rate) = v.parse()
        {
            self.dashboard.usd_to_mwk_rate = rate;
        }

        // 单个管理员账号可直接通过环境变量注入
        if let (Ok(email), Ok(password_hash)) =
            (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD_HASH"))
        {
            let name = env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string());
            match self.admins.iter_mut().find(|a| a.email == email) {
                Some(existing) => {
                    existing.password_hash = password_hash;
                    existing.name = name;
                }
                None => {
                    let id = format!("admin-{}", self.admins.len() + 1);
                    self.admins.push(AdminAccountConfig {
                        id,
                        email,
                        name,
                        role: default_admin_role(),
                        password_hash,
                    });
                }
            }
        }
    }
}
