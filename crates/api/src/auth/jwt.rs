//! Access tokens for surveyors and admins.
//!
//! Tokens are HS256 JWTs carrying the user id and role. There are no refresh
//! tokens; clients log in again once a token expires.

use aquasurvey_core::roles::validate_role;
use aquasurvey_core::types::DbId;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default access token lifetime: one day.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 24 * 60;

/// Payload of every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id.
    pub sub: DbId,
    /// `"Admin"` or `"Surveyor"`.
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    /// Random token id.
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC secret used to sign and verify tokens.
    pub secret: String,
    pub access_token_expiry_mins: i64,
}

impl JwtConfig {
    /// Read `JWT_SECRET` (required) and `JWT_ACCESS_EXPIRY_MINS` (default 1440).
    ///
    /// # Panics
    ///
    /// Panics if the secret is missing or empty, or the expiry is not a
    /// positive integer.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_token_expiry_mins: i64 = std::env::var("JWT_ACCESS_EXPIRY_MINS")
            .map(|v| v.parse().expect("JWT_ACCESS_EXPIRY_MINS must be an integer"))
            .unwrap_or(DEFAULT_ACCESS_EXPIRY_MINS);
        assert!(
            access_token_expiry_mins > 0,
            "JWT_ACCESS_EXPIRY_MINS must be positive"
        );

        Self {
            secret,
            access_token_expiry_mins,
        }
    }

    /// Token lifetime in seconds, as reported to clients in `expires_in`.
    pub fn ttl_secs(&self) -> i64 {
        self.access_token_expiry_mins * 60
    }
}

/// Sign a token for `user_id` acting as `role`.
pub fn generate_access_token(
    user_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, JwtError> {
    let iat = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        exp: iat + config.ttl_secs(),
        iat,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Check signature and expiry and return the claims.
///
/// A token whose role is not one the platform knows is rejected as invalid,
/// even when correctly signed.
pub fn validate_token(token: &str, config: &JwtConfig) -> Result<Claims, JwtError> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        // Requires and checks `exp`.
        &Validation::new(Algorithm::HS256),
    )?
    .claims;

    if validate_role(&claims.role).is_err() {
        return Err(ErrorKind::InvalidToken.into());
    }
    Ok(claims)
}
