//! Bearer token authentication
//!
//! Tokens are HS256 JWTs carrying `{user_id, role, email, exp?}`. The
//! `Authorization` header may hold the bare token or `Bearer <token>`.

use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::state::AppState;
use crate::{Result, StoreWeatherError};

const MISSING_HEADER: &str = "Authorization header missing";
const INVALID_CREDENTIALS: &str = "Could not validate credentials";
const NOT_ENOUGH_PERMISSIONS: &str = "You don't have enough permissions";

/// Authenticated caller, as decoded from the token claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: String,
    pub role: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

pub struct JwtAuth {
    secret: Option<String>,
    validation: Validation,
}

impl JwtAuth {
    #[must_use]
    pub fn new(secret: Option<String>) -> Self {
        if secret.is_none() {
            warn!("No auth secret configured, every bearer token will be rejected");
        }
        let mut validation = Validation::new(Algorithm::HS256);
        // exp is checked when present but not required
        validation.required_spec_claims = HashSet::new();
        validation.validate_exp = true;
        Self { secret, validation }
    }

    /// Decode the raw `Authorization` header value
    pub fn authenticate(&self, header: Option<&str>) -> Result<AuthUser> {
        let header = header
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| StoreWeatherError::unauthorized(MISSING_HEADER))?;
        let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();

        let secret = self
            .secret
            .as_deref()
            .ok_or_else(|| StoreWeatherError::unauthorized(INVALID_CREDENTIALS))?;

        let data = jsonwebtoken::decode::<AuthUser>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &self.validation,
        )
        .map_err(|e| {
            debug!("Rejected token: {}", e);
            StoreWeatherError::unauthorized(INVALID_CREDENTIALS)
        })?;

        if data.claims.user_id.is_empty() {
            return Err(StoreWeatherError::unauthorized(INVALID_CREDENTIALS));
        }
        Ok(data.claims)
    }

    /// Sign claims with the configured secret
    pub fn issue(&self, user: &AuthUser) -> Result<String> {
        let secret = self
            .secret
            .as_deref()
            .ok_or_else(|| StoreWeatherError::config("No auth secret configured"))?;
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            user,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| StoreWeatherError::general(format!("Failed to sign token: {e}")))
    }
}

/// Optional role allow-list; `None` admits any authenticated user
#[derive(Debug, Clone, Default)]
pub struct RoleChecker {
    allowed_roles: Option<Vec<String>>,
}

impl RoleChecker {
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn only<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_roles: Some(roles.into_iter().map(Into::into).collect()),
        }
    }

    pub fn check(&self, user: &AuthUser) -> Result<()> {
        match &self.allowed_roles {
            None => Ok(()),
            Some(roles) if roles.iter().any(|r| *r == user.role) => Ok(()),
            Some(_) => Err(StoreWeatherError::unauthorized(NOT_ENOUGH_PERMISSIONS)),
        }
    }
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = StoreWeatherError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> std::result::Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        state.auth.authenticate(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SECRET: &str = "test-secret-key";

    fn user(role: &str) -> AuthUser {
        AuthUser {
            user_id: "u1".to_string(),
            role: role.to_string(),
            email: "u1@example.com".to_string(),
            exp: None,
        }
    }

    #[rstest]
    #[case::bare(false)]
    #[case::bearer(true)]
    fn test_accepts_bare_and_bearer(#[case] bearer: bool) {
        let auth = JwtAuth::new(Some(SECRET.to_string()));
        let token = auth.issue(&user("admin")).unwrap();
        let header = if bearer {
            format!("Bearer {token}")
        } else {
            token
        };
        assert_eq!(auth.authenticate(Some(&header)).unwrap(), user("admin"));
    }

    #[test]
    fn test_missing_header() {
        let auth = JwtAuth::new(Some(SECRET.to_string()));
        let err = auth.authenticate(None).unwrap_err();
        assert_eq!(err.to_string(), MISSING_HEADER);
        assert_eq!(err.code(), crate::ErrorCode::Unauthorized);
    }

    #[test]
    fn test_wrong_secret_and_expired() {
        let issuer = JwtAuth::new(Some("another-secret".to_string()));
        let auth = JwtAuth::new(Some(SECRET.to_string()));

        let token = issuer.issue(&user("staff")).unwrap();
        let err = auth.authenticate(Some(&token)).unwrap_err();
        assert_eq!(err.to_string(), INVALID_CREDENTIALS);

        let mut expired = user("staff");
        expired.exp = Some(1_000_000);
        let token = auth.issue(&expired).unwrap();
        assert!(auth.authenticate(Some(&token)).is_err());

        assert!(auth.authenticate(Some("garbage")).is_err());
    }

    #[test]
    fn test_role_checker() {
        assert!(RoleChecker::any().check(&user("staff")).is_ok());

        let admins = RoleChecker::only(["admin", "owner"]);
        assert!(admins.check(&user("owner")).is_ok());
        let err = admins.check(&user("staff")).unwrap_err();
        assert_eq!(err.to_string(), NOT_ENOUGH_PERMISSIONS);
    }
}
