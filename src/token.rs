//! Signed, expiring tokens for the account lifecycle.
//!
//! Every token is an HS256 JWT whose `purpose` claim pins it to one flow, so a
//! password-reset link can never be replayed as a login token.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::configuration::JwtSettings;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Access,
    VerifyEmail,
    ResetPassword,
}

impl TokenPurpose {
    pub fn lifetime(&self) -> Duration {
        match self {
            TokenPurpose::Access => Duration::days(7),
            TokenPurpose::VerifyEmail => Duration::days(1),
            TokenPurpose::ResetPassword => Duration::hours(1),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub purpose: TokenPurpose,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Invalid or expired token")]
    Invalid(#[from] jsonwebtoken::errors::Error),
    #[error("Token was issued for another purpose")]
    WrongPurpose,
}

pub fn generate_token(
    user_id: Uuid,
    purpose: TokenPurpose,
    settings: &JwtSettings,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        purpose,
        iat: now.timestamp(),
        exp: (now + purpose.lifetime()).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.secret.as_bytes()),
    )
}

pub fn decode_token(
    token: &str,
    expected: TokenPurpose,
    settings: &JwtSettings,
) -> Result<Claims, TokenError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.secret.as_bytes()),
        &Validation::default(),
    )?;
    if data.claims.purpose != expected {
        return Err(TokenError::WrongPurpose);
    }
    Ok(data.claims)
}
