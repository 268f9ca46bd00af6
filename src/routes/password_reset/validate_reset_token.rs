use actix_web::{
    web::{Data, Json},
    HttpResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::configuration::JwtSettings;
use crate::token::{decode_token, TokenPurpose};

#[derive(Deserialize, Debug)]
pub struct ResetTokenRequest {
    pub token: String,
}

/// Lets the reset form check a link before asking for a new password.
pub async fn validate_reset_token(
    body: Json<ResetTokenRequest>,
    jwt: Data<JwtSettings>,
) -> HttpResponse {
    match decode_token(body.token.trim(), TokenPurpose::ResetPassword, &jwt) {
        Ok(claims) => HttpResponse::Ok().json(json!({
            "data": { "user_id": claims.sub }
        })),
        Err(err) => {
            tracing::error!("Reset token verification error: {}", err);
            HttpResponse::BadRequest().json(json!({
                "error": "Invalid or expired reset token"
            }))
        }
    }
}
