use crate::config::AdminAccountConfig;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::*;

#[derive(Clone)]
pub struct AuthService {
    admins: Vec<AdminAccountConfig>,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(admins: Vec<AdminAccountConfig>, jwt_service: JwtService) -> Self {
        Self {
            admins,
            jwt_service,
        }
    }

    pub fn login(&self, request: &LoginRequest) -> AppResult<LoginResponse> {
        let email = request.email.as_deref().map(str::trim).unwrap_or_default();
        let password = request.password.as_deref().unwrap_or_default();
        if email.is_empty() || password.is_empty() {
            return Err(AppError::ValidationError(
                "Email and password are required".to_string(),
            ));
        }

        let invalid = || AppError::AuthError("Invalid credentials".to_string());
        if !is_valid_email(email) {
            return Err(invalid());
        }
        let email = normalize_email(email);

        let admin = self
            .admins
            .iter()
            .find(|a| normalize_email(&a.email) == email)
            .ok_or_else(invalid)?;

        // 哈希格式错误也视为凭证无效
        let matches = verify_password(password, &admin.password_hash).unwrap_or_else(|e| {
            log::error!("Admin {} has an unusable password hash: {}", admin.id, e);
            false
        });
        if !matches {
            log::warn!("Failed login attempt for {}", email);
            return Err(invalid());
        }

        let token =
            self.jwt_service
                .generate_token(&admin.id, &admin.email, &admin.name, &admin.role)?;
        log::info!("Admin {} logged in", admin.id);

        Ok(LoginResponse {
            success: true,
            message: "Login successful".to_string(),
            token,
            expires_in: self.jwt_service.expires_in(),
            user: AdminResponse::from(admin),
        })
    }

    pub fn list_admins(&self) -> Vec<AdminResponse> {
        self.admins.iter().map(AdminResponse::from).collect()
    }

    pub fn find_admin(&self, id: &str) -> Option<&AdminAccountConfig> {
        self.admins.iter().find(|a| a.id == id)
    }
}
