use serde::Serialize;
use utoipa::ToSchema;

use crate::database::{DbPool, ping};

#[derive(Debug, Serialize, ToSchema)]
pub struct DatabaseReport {
    pub success: bool,
    pub message: String,
    pub backend: Option<String>,
    /// Error text and its debug form, only present when the ping fails.
    pub error: Option<String>,
    pub details: Option<String>,
}

#[derive(Clone)]
pub struct DiagnosticsService {
    pool: DbPool,
}

impl DiagnosticsService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// 数据库连通性检查，失败时原样返回错误信息
    pub async fn check_database(&self) -> DatabaseReport {
        match ping(&self.pool).await {
            Ok(backend) => DatabaseReport {
                success: true,
                message: "Database connection successful".to_string(),
                backend: Some(backend),
                error: None,
                details: None,
            },
            Err(e) => {
                log::error!("Database diagnostics failed: {:?}", e);
                DatabaseReport {
                    success: false,
                    message: "Database connection failed".to_string(),
                    backend: None,
                    error: Some(e.to_string()),
                    details: Some(format!("{:?}", e)),
                }
            }
        }
    }
}
