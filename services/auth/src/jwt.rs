//! JWT service for token generation and validation
//!
//! This module signs and validates HS256 tokens with the process-wide shared
//! secret. Three audiences are issued: session tokens carried in the auth
//! cookie, password-reset tokens and email-verification tokens. A token is
//! only accepted for the audience it was issued for.

use anyhow::Result;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::Error as JwtError, get_current_timestamp,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::User;

/// Upper bound for any token lifetime (10 years)
pub const MAX_TOKEN_LIFETIME: u64 = 10 * 365 * 24 * 60 * 60;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared secret used to sign and verify every token
    pub secret: String,
    /// Session token lifetime in seconds (default: 7 days)
    pub session_lifetime: u64,
    /// Password reset token lifetime in seconds (default: 1 hour)
    pub reset_token_lifetime: u64,
    /// Verification token lifetime in seconds (default: 1 hour)
    pub verify_token_lifetime: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: Shared signing secret (required)
    /// - `JWT_SESSION_LIFETIME`: Session token lifetime in seconds (default: 604800)
    /// - `JWT_RESET_TOKEN_LIFETIME`: Reset token lifetime in seconds (default: 3600)
    /// - `JWT_VERIFY_TOKEN_LIFETIME`: Verification token lifetime in seconds (default: 3600)
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable not set"))?;

        if secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }

        let session_lifetime = lifetime_from_env("JWT_SESSION_LIFETIME", 604800)?; // 7 days
        let reset_token_lifetime = lifetime_from_env("JWT_RESET_TOKEN_LIFETIME", 3600)?;
        let verify_token_lifetime = lifetime_from_env("JWT_VERIFY_TOKEN_LIFETIME", 3600)?;

        Ok(JwtConfig {
            secret,
            session_lifetime,
            reset_token_lifetime,
            verify_token_lifetime,
        })
    }
}

fn lifetime_from_env(name: &str, default: u64) -> Result<u64> {
    let lifetime = std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default);

    if lifetime > MAX_TOKEN_LIFETIME {
        anyhow::bail!("{} must not exceed {} seconds", name, MAX_TOKEN_LIFETIME);
    }

    Ok(lifetime)
}

/// What a token may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenAudience {
    /// Session token stored in the auth cookie
    Session,
    /// Single-use password reset token
    ResetPassword,
    /// Email verification token
    Verify,
}

impl TokenAudience {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenAudience::Session => "feedhub:auth",
            TokenAudience::ResetPassword => "feedhub:reset",
            TokenAudience::Verify => "feedhub:verify",
        }
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// Audience, see [`TokenAudience`]
    pub aud: String,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
    /// Email the verification token was issued for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Fingerprint of the password hash a reset token was issued against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_fgpt: Option<String>,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service; lifetimes are capped at [`MAX_TOKEN_LIFETIME`]
    pub fn new(mut config: JwtConfig) -> Self {
        config.session_lifetime = config.session_lifetime.min(MAX_TOKEN_LIFETIME);
        config.reset_token_lifetime = config.reset_token_lifetime.min(MAX_TOKEN_LIFETIME);
        config.verify_token_lifetime = config.verify_token_lifetime.min(MAX_TOKEN_LIFETIME);

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        JwtService {
            encoding_key,
            decoding_key,
            config,
        }
    }

    fn issue(
        &self,
        sub: Uuid,
        audience: TokenAudience,
        lifetime: u64,
        email: Option<String>,
        password_fgpt: Option<String>,
    ) -> Result<String, JwtError> {
        let now = get_current_timestamp();

        let claims = Claims {
            sub,
            aud: audience.as_str().to_string(),
            iat: now,
            exp: now.saturating_add(lifetime),
            email,
            password_fgpt,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }

    /// Generate a session token for a user
    pub fn generate_session_token(&self, user: &User) -> Result<String, JwtError> {
        self.issue(
            user.id,
            TokenAudience::Session,
            self.config.session_lifetime,
            None,
            None,
        )
    }

    /// Generate a password reset token bound to the current password hash
    pub fn generate_reset_token(&self, user: &User, fingerprint: String) -> Result<String, JwtError> {
        self.issue(
            user.id,
            TokenAudience::ResetPassword,
            self.config.reset_token_lifetime,
            None,
            Some(fingerprint),
        )
    }

    /// Generate an email verification token for a user
    pub fn generate_verify_token(&self, user: &User) -> Result<String, JwtError> {
        self.issue(
            user.id,
            TokenAudience::Verify,
            self.config.verify_token_lifetime,
            Some(user.email.clone()),
            None,
        )
    }

    /// Validate a token for the given audience and return the claims
    pub fn validate_token(&self, token: &str, audience: TokenAudience) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_audience(&[audience.as_str()]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(token_data.claims)
    }

    /// Get the session token lifetime
    pub fn session_lifetime(&self) -> u64 {
        self.config.session_lifetime
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serial_test::serial;

    fn config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            session_lifetime: 604800,
            reset_token_lifetime: 3600,
            verify_token_lifetime: 3600,
        }
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "alice@example.com".to_string(),
            hashed_password: "hash".to_string(),
            is_active: true,
            is_superuser: false,
            is_verified: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_session_token_round_trip() {
        let service = JwtService::new(config("test-secret"));
        let user = user();

        let token = service.generate_session_token(&user).unwrap();
        let claims = service
            .validate_token(&token, TokenAudience::Session)
            .unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.aud, "feedhub:auth");
        assert_eq!(claims.exp - claims.iat, 604800);
        assert!(claims.email.is_none());
    }

    #[test]
    fn test_token_rejected_for_other_audience() {
        let service = JwtService::new(config("test-secret"));
        let user = user();

        let verify = service.generate_verify_token(&user).unwrap();
        assert!(service.validate_token(&verify, TokenAudience::Session).is_err());

        let claims = service.validate_token(&verify, TokenAudience::Verify).unwrap();
        assert_eq!(claims.email.as_deref(), Some("alice@example.com"));

        let reset = service
            .generate_reset_token(&user, "fingerprint".to_string())
            .unwrap();
        assert!(service.validate_token(&reset, TokenAudience::Session).is_err());
        assert!(service.validate_token(&reset, TokenAudience::Verify).is_err());
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let service = JwtService::new(config("test-secret"));
        let forger = JwtService::new(config("another-secret"));

        let token = forger.generate_session_token(&user()).unwrap();
        assert!(service.validate_token(&token, TokenAudience::Session).is_err());
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let service = JwtService::new(config("test-secret"));

        let victim = service.generate_session_token(&user()).unwrap();
        let attacker = service.generate_session_token(&user()).unwrap();

        // Graft the attacker's payload onto the victim's signature
        let victim_parts: Vec<&str> = victim.split('.').collect();
        let attacker_parts: Vec<&str> = attacker.split('.').collect();
        let forged = format!(
            "{}.{}.{}",
            victim_parts[0], attacker_parts[1], victim_parts[2]
        );

        assert!(service.validate_token(&forged, TokenAudience::Session).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = JwtService::new(config("test-secret"));
        let now = get_current_timestamp();

        let claims = Claims {
            sub: Uuid::new_v4(),
            aud: TokenAudience::Session.as_str().to_string(),
            iat: now - 7200,
            exp: now - 3600,
            email: None,
            password_fgpt: None,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(service.validate_token(&token, TokenAudience::Session).is_err());
    }

    #[test]
    #[serial]
    fn test_jwt_config_from_env() {
        unsafe {
            std::env::remove_var("JWT_SECRET");
        }
        assert!(JwtConfig::from_env().is_err());

        unsafe {
            std::env::set_var("JWT_SECRET", "   ");
        }
        assert!(JwtConfig::from_env().is_err());

        unsafe {
            std::env::set_var("JWT_SECRET", "s3cret");
            std::env::set_var("JWT_SESSION_LIFETIME", "60");
        }
        let config = JwtConfig::from_env().unwrap();
        assert_eq!(config.secret, "s3cret");
        assert_eq!(config.session_lifetime, 60);
        assert_eq!(config.reset_token_lifetime, 3600);
        assert_eq!(config.verify_token_lifetime, 3600);

        unsafe {
            std::env::set_var("JWT_SESSION_LIFETIME", u64::MAX.to_string());
        }
        assert!(JwtConfig::from_env().is_err());

        unsafe {
            std::env::remove_var("JWT_SECRET");
            std::env::remove_var("JWT_SESSION_LIFETIME");
        }
    }

    #[test]
    fn test_oversized_lifetimes_are_capped() {
        let service = JwtService::new(JwtConfig {
            secret: "test-secret".to_string(),
            session_lifetime: u64::MAX,
            reset_token_lifetime: u64::MAX,
            verify_token_lifetime: 3600,
        });
        assert_eq!(service.session_lifetime(), MAX_TOKEN_LIFETIME);

        let token = service.generate_session_token(&user()).unwrap();
        let claims = service
            .validate_token(&token, TokenAudience::Session)
            .unwrap();
        assert_eq!(claims.exp - claims.iat, MAX_TOKEN_LIFETIME);
    }
}
