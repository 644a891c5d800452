//! JWT token service
//!
//! Issues and validates HS256 access tokens carrying the profile id, store,
//! role name and permission list.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Signing secret (at least 32 bytes)
    pub secret: String,
    pub expiration_minutes: i64,
    pub issuer: String,
    pub audience: String,
}

impl JwtConfig {
    /// Read `JWT_*` variables
    ///
    /// Without `JWT_SECRET` a random secret is generated, so tokens do not
    /// survive a restart. Production logs this at `error`.
    pub fn from_env(environment: &str) -> Self {
        let secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if secret.len() >= 32 => secret,
            Ok(_) => {
                tracing::error!("JWT_SECRET must be at least 32 characters, generating a random one");
                generate_printable_secret()
            }
            Err(_) if environment == "production" => {
                tracing::error!("JWT_SECRET not set in production, tokens will not survive a restart");
                generate_printable_secret()
            }
            Err(_) => {
                tracing::warn!("JWT_SECRET not set, generating a temporary development key");
                generate_printable_secret()
            }
        };

        Self {
            secret,
            expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(720), // one night shift
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "club-server".to_string()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "club-clients".to_string()),
        }
    }
}

/// Claims stored in the token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Profile id
    pub sub: String,
    pub store_id: i64,
    pub username: String,
    pub display_name: String,
    /// Store role name
    pub role: String,
    /// Comma separated
    pub permissions: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),
}

const SECRET_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_=+.";

/// Generate a 64-character printable secret from the system RNG
pub fn generate_printable_secret() -> String {
    let rng = SystemRandom::new();
    let mut bytes = [0u8; 64];
    if rng.fill(&mut bytes).is_err() {
        // ring's SystemRandom only fails when the OS RNG is unavailable
        tracing::error!("System RNG unavailable, falling back to a time-derived secret");
        return format!("club-fallback-{}-{}", Utc::now().timestamp_nanos_opt().unwrap_or(0), uuid::Uuid::new_v4());
    }
    bytes
        .iter()
        .map(|b| SECRET_ALPHABET[*b as usize % SECRET_ALPHABET.len()] as char)
        .collect()
}

/// Token subject: who the token is issued for
#[derive(Debug, Clone)]
pub struct TokenSubject<'a> {
    pub profile_id: i64,
    pub store_id: i64,
    pub username: &'a str,
    pub display_name: &'a str,
    pub role: &'a str,
    pub permissions: &'a [String],
}

#[derive(Debug, Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn generate_token(&self, subject: &TokenSubject<'_>) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.expiration_minutes);

        let claims = Claims {
            sub: subject.profile_id.to_string(),
            store_id: subject.store_id,
            username: subject.username.to_string(),
            display_name: subject.display_name.to_string(),
            role: subject.role.to_string(),
            permissions: subject.permissions.join(","),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }

    /// Extract the token from an `Authorization` header value
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

/// Authenticated user, built from validated claims
///
/// Inserted into request extensions by [`super::require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub store_id: i64,
    pub username: String,
    pub display_name: String,
    pub role_name: String,
    pub permissions: Vec<String>,
}

impl TryFrom<Claims> for CurrentUser {
    type Error = JwtError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| JwtError::InvalidToken(format!("Invalid subject: {}", claims.sub)))?;
        let permissions = if claims.permissions.is_empty() {
            vec![]
        } else {
            claims
                .permissions
                .split(',')
                .map(|s| s.to_string())
                .collect()
        };

        Ok(Self {
            id,
            store_id: claims.store_id,
            username: claims.username,
            display_name: claims.display_name,
            role_name: claims.role,
            permissions,
        })
    }
}

impl CurrentUser {
    /// The system `admin` role holds every permission
    pub fn is_admin(&self) -> bool {
        self.role_name == "admin"
    }

    /// Check a permission
    ///
    /// 1. admin has everything
    /// 2. `all` grants everything
    /// 3. exact match, or `x:*` matching any `x:<action>`
    pub fn has_permission(&self, permission: &str) -> bool {
        if self.is_admin() {
            return true;
        }

        self.permissions.iter().any(|p| {
            if p == "all" || p == permission {
                return true;
            }
            match p.strip_suffix(":*") {
                Some(prefix) => permission
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with(':')),
                None => false,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::with_config(JwtConfig {
            secret: "unit-test-secret-that-is-long-enough!".into(),
            expiration_minutes: 60,
            issuer: "club-server".into(),
            audience: "club-clients".into(),
        })
    }

    fn user(role: &str, permissions: &[&str]) -> CurrentUser {
        CurrentUser {
            id: 1,
            store_id: 1,
            username: "mika".into(),
            display_name: "Mika".into(),
            role_name: role.into(),
            permissions: permissions.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_token_roundtrip() {
        let service = service();
        let permissions = vec!["tables:manage".to_string(), "casts:*".to_string()];
        let token = service
            .generate_token(&TokenSubject {
                profile_id: 42,
                store_id: 1,
                username: "mika",
                display_name: "Mika",
                role: "staff",
                permissions: &permissions,
            })
            .unwrap();

        let claims = service.validate_token(&token).unwrap();
        let current = CurrentUser::try_from(claims).unwrap();
        assert_eq!(current.id, 42);
        assert_eq!(current.store_id, 1);
        assert_eq!(current.role_name, "staff");
        assert_eq!(current.permissions, permissions);
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let token = service()
            .generate_token(&TokenSubject {
                profile_id: 1,
                store_id: 1,
                username: "a",
                display_name: "A",
                role: "staff",
                permissions: &[],
            })
            .unwrap();
        let other = JwtService::with_config(JwtConfig {
            secret: "a-completely-different-secret-value!!".into(),
            ..service().config
        });
        assert!(matches!(
            other.validate_token(&token),
            Err(JwtError::InvalidSignature)
        ));
    }

    #[test]
    fn test_permission_wildcards() {
        let u = user("staff", &["casts:*", "orders:manage"]);
        assert!(u.has_permission("casts:manage"));
        assert!(u.has_permission("orders:manage"));
        assert!(!u.has_permission("castsx:manage"));
        assert!(!u.has_permission("tables:manage"));

        assert!(user("staff", &["all"]).has_permission("salary:manage"));
        assert!(user("admin", &[]).has_permission("roles:manage"));
    }

    #[test]
    fn test_printable_secret() {
        let a = generate_printable_secret();
        let b = generate_printable_secret();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
    }
}
