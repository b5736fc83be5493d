use crate::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Claims carried by an admin access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: String, // admin id
    pub email: String,
    pub name: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expires_in: i64,
}

impl JwtService {
    pub fn new(secret: &str, expires_in: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expires_in,
        }
    }

    pub fn generate_token(&self, id: &str, email: &str, name: &str, role: &str) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.expires_in);

        let claims = Claims {
            sub: id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            role: role.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AppError::JwtError)
    }

    /// Checks signature and expiry. No revocation list exists.
    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(AppError::JwtError)
    }

    pub fn expires_in(&self) -> i64 {
        self.expires_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issues_and_verifies_token() {
        let jwt = JwtService::new("secret", 60);
        let token = jwt
            .generate_token("admin-1", "ops@example.com", "Ops", "admin")
            .unwrap();
        let claims = jwt.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "admin-1");
        assert_eq!(claims.email, "ops@example.com");
        assert_eq!(claims.exp - claims.iat, 60);
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let token = JwtService::new("one", 60)
            .generate_token("admin-1", "ops@example.com", "Ops", "admin")
            .unwrap();
        assert!(JwtService::new("two", 60).verify_token(&token).is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let jwt = JwtService::new("secret", -120);
        let token = jwt
            .generate_token("admin-1", "ops@example.com", "Ops", "admin")
            .unwrap();
        assert!(jwt.verify_token(&token).is_err());
    }

    #[test]
    fn rejects_garbage() {
        let jwt = JwtService::new("secret", 60);
        assert!(jwt.verify_token("not.a.token").is_err());
    }
}
