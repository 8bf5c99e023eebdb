//! Bearer-token sessions.
//!
//! A session token identifies the contributor of uploads and commits.

use axum::http::{header, HeaderMap};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Session management error
#[derive(Debug, Error)]
pub enum SessionError {
    /// JWT encoding failed
    #[error("Failed to encode JWT: {0}")]
    JwtEncode(#[from] jsonwebtoken::errors::Error),

    /// No bearer token on the request
    #[error("Missing bearer token")]
    MissingToken,

    /// Token expired
    #[error("Session token expired")]
    TokenExpired,

    /// Invalid token
    #[error("Invalid session token")]
    InvalidToken,
}

/// JWT claims for session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Contributor identifier
    pub user_id: String,

    /// Token expiration timestamp (Unix epoch)
    pub exp: u64,

    /// Issued at timestamp (Unix epoch)
    pub iat: u64,
}

/// Issues and checks session tokens
pub struct SessionManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_secs: u64,
}

impl SessionManager {
    /// Create a new session manager with the given JWT secret and expiry
    pub fn new(jwt_secret: &str, token_expiry_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            token_expiry_secs,
        }
    }

    /// Token lifetime in seconds
    pub fn token_expiry_secs(&self) -> u64 {
        self.token_expiry_secs
    }

    /// Generate a new session token for the given user
    pub fn generate_token(&self, user_id: &str) -> Result<String, SessionError> {
        let now = retort_domain::unix_now();

        let claims = SessionClaims {
            user_id: user_id.to_string(),
            exp: now + self.token_expiry_secs,
            iat: now,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Validate a session token and extract claims
    pub fn validate_token(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let validation = Validation::default();
        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::TokenExpired,
                _ => SessionError::InvalidToken,
            })?;

        Ok(token_data.claims)
    }

    /// Resolve the contributor behind an `Authorization: Bearer` header
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<String, SessionError> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(SessionError::MissingToken)?;

        Ok(self.validate_token(token)?.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_generate_and_validate_token() {
        let manager = SessionManager::new("test-secret", 3600);
        let token = manager.generate_token("chemist-1").unwrap();

        let claims = manager.validate_token(&token).unwrap();
        assert_eq!(claims.user_id, "chemist-1");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_expired_token() {
        let manager = SessionManager::new("test-secret", 3600);
        let now = retort_domain::unix_now();

        let claims = SessionClaims {
            user_id: "chemist-1".to_string(),
            exp: now - 100,
            iat: now - 200,
        };
        let token = encode(&Header::default(), &claims, &manager.encoding_key).unwrap();

        let result = manager.validate_token(&token);
        assert!(matches!(result, Err(SessionError::TokenExpired)));
    }

    #[test]
    fn test_wrong_secret() {
        let manager1 = SessionManager::new("secret1", 3600);
        let manager2 = SessionManager::new("secret2", 3600);

        let token = manager1.generate_token("chemist-1").unwrap();
        let result = manager2.validate_token(&token);
        assert!(matches!(result, Err(SessionError::InvalidToken)));
    }

    #[test]
    fn test_authenticate_from_headers() {
        let manager = SessionManager::new("test-secret", 3600);
        let token = manager.generate_token("chemist-2").unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        assert_eq!(manager.authenticate(&headers).unwrap(), "chemist-2");
    }

    #[test]
    fn test_authenticate_requires_bearer_scheme() {
        let manager = SessionManager::new("test-secret", 3600);
        let mut headers = HeaderMap::new();
        assert!(matches!(
            manager.authenticate(&headers),
            Err(SessionError::MissingToken)
        ));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(matches!(
            manager.authenticate(&headers),
            Err(SessionError::MissingToken)
        ));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer nonsense"));
        assert!(matches!(
            manager.authenticate(&headers),
            Err(SessionError::InvalidToken)
        ));
    }
}
