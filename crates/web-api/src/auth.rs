//! JWT issuance and verification.
//!
//! Tokens come in pairs: a short-lived access token presented on every
//! request and a refresh token exchanged for new access tokens.

use axum::http::{header, HeaderMap};
use chrono::Utc;
use config::JwtSettings;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub token_type: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
    pub user_id: i64,
}

#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Clone)]
pub struct TokenService {
    config: JwtSettings,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    pub fn new(config: JwtSettings) -> Self {
        let encoding_key = EncodingKey::from_secret(config.signing_key.as_ref());
        let decoding_key = DecodingKey::from_secret(config.signing_key.as_ref());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn issue_pair(&self, user_id: i64) -> Result<TokenPair, ApiError> {
        Ok(TokenPair {
            access: self.issue(user_id, TOKEN_TYPE_ACCESS, self.config.access_lifetime_secs)?,
            refresh: self.issue(
                user_id,
                TOKEN_TYPE_REFRESH,
                self.config.refresh_lifetime_secs,
            )?,
        })
    }

    fn issue(
        &self,
        user_id: i64,
        token_type: &str,
        lifetime_secs: i64,
    ) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = Claims {
            token_type: token_type.to_string(),
            exp: (now + chrono::Duration::seconds(lifetime_secs)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().simple().to_string(),
            user_id,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|err| {
            ApiError::internal_server_error(format!("token generation failed: {err}"))
        })
    }

    /// Check signature and expiry without looking at the token type.
    pub fn decode(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|err| ApiError::unauthorized(format!("invalid token: {err}")))
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, ApiError> {
        self.expect_type(token, TOKEN_TYPE_ACCESS)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Claims, ApiError> {
        self.expect_type(token, TOKEN_TYPE_REFRESH)
    }

    fn expect_type(&self, token: &str, expected: &str) -> Result<Claims, ApiError> {
        let claims = self.decode(token)?;
        if claims.token_type != expected {
            return Err(ApiError::unauthorized(format!(
                "token has wrong type: expected {expected}"
            )));
        }
        Ok(claims)
    }

    /// Trade a refresh token for a fresh access token.
    pub fn refresh_access(&self, refresh_token: &str) -> Result<String, ApiError> {
        let claims = self.verify_refresh(refresh_token)?;
        self.issue(
            claims.user_id,
            TOKEN_TYPE_ACCESS,
            self.config.access_lifetime_secs,
        )
    }

    /// Extract and verify the bearer token from request headers.
    pub fn user_from_headers(&self, headers: &HeaderMap) -> Result<i64, ApiError> {
        let auth_header = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("missing authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("invalid authorization header format"))?;

        Ok(self.verify_access(token)?.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(JwtSettings {
            signing_key: "test-signing-key-with-enough-entropy".to_string(),
            access_lifetime_secs: 300,
            refresh_lifetime_secs: 86_400,
        })
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let service = service();

        let pair = service.issue_pair(7).unwrap();

        let access = service.verify_access(&pair.access).unwrap();
        assert_eq!(access.user_id, 7);
        assert_eq!(access.token_type, TOKEN_TYPE_ACCESS);
        assert!(!access.jti.is_empty());

        let refresh = service.verify_refresh(&pair.refresh).unwrap();
        assert_eq!(refresh.user_id, 7);
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let service = service();
        let pair = service.issue_pair(7).unwrap();

        assert!(service.verify_access(&pair.refresh).is_err());
        assert!(service.verify_refresh(&pair.access).is_err());
    }

    #[test]
    fn test_garbage_and_foreign_tokens_are_rejected() {
        let service = service();
        assert!(service.decode("not-a-token").is_err());

        let other = TokenService::new(JwtSettings {
            signing_key: "a-completely-different-signing-key".to_string(),
            access_lifetime_secs: 300,
            refresh_lifetime_secs: 86_400,
        });
        let pair = other.issue_pair(7).unwrap();
        assert!(service.verify_access(&pair.access).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = service();
        // Beyond the validator's default leeway.
        let expired = service.issue(7, TOKEN_TYPE_ACCESS, -120).unwrap();

        assert!(service.decode(&expired).is_err());
    }

    #[test]
    fn test_refresh_access_issues_a_usable_token() {
        let service = service();
        let pair = service.issue_pair(9).unwrap();

        let access = service.refresh_access(&pair.refresh).unwrap();

        assert_eq!(service.verify_access(&access).unwrap().user_id, 9);
        assert!(service.refresh_access(&pair.access).is_err());
    }
}
