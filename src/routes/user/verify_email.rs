use actix_web::{
    web::{Data, Json},
    HttpResponse,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use tracing::Instrument;

use crate::configuration::JwtSettings;
use crate::token::{decode_token, TokenPurpose};
use crate::util::ResponseMessage;

#[derive(Deserialize, Debug)]
pub struct VerifyEmailRequest {
    pub token: String,
}

pub async fn verify_email(
    body: Json<VerifyEmailRequest>,
    connection: Data<PgPool>,
    jwt: Data<JwtSettings>,
) -> HttpResponse {
    let claims = match decode_token(body.token.trim(), TokenPurpose::VerifyEmail, &jwt) {
        Ok(claims) => claims,
        Err(err) => {
            tracing::error!("Rejected verification token: {}", err);
            return HttpResponse::BadRequest().json(json!({
                "error": "Invalid or expired verification token"
            }));
        }
    };

    let query_span = tracing::info_span!("Marking user email as verified", user_id = %claims.sub);
    let result = sqlx::query("UPDATE users SET is_verified = TRUE, updated_at = $2 WHERE id = $1")
        .bind(claims.sub)
        .bind(Utc::now())
        .execute(connection.get_ref())
        .instrument(query_span)
        .await;

    match result {
        Ok(done) if done.rows_affected() == 0 => {
            tracing::error!("Verification token for unknown user {}", claims.sub);
            HttpResponse::BadRequest().json(json!({
                "error": "Invalid or expired verification token"
            }))
        }
        Ok(_) => {
            tracing::info!("User {} verified their email", claims.sub);
            HttpResponse::Ok().json(ResponseMessage::new("Email verified"))
        }
        Err(err) => {
            tracing::error!("Failed to verify email {:?}", err);
            HttpResponse::InternalServerError().json(json!({
                "error": "Failed to verify email"
            }))
        }
    }
}
