use actix_web::{
    web::{Data, Json},
    HttpResponse,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use tracing::Instrument;
use validator::Validate;

use crate::configuration::JwtSettings;
use crate::routes::{hash_password, validate_password};
use crate::token::{decode_token, TokenPurpose};
use crate::util::{validation_error_response, ResponseMessage};

#[derive(Deserialize, Validate)]
pub struct UpdatePassword {
    pub token: String,
    #[validate(custom(function = "validate_password"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

pub async fn reset_password(
    body: Json<UpdatePassword>,
    connection: Data<PgPool>,
    jwt: Data<JwtSettings>,
) -> HttpResponse {
    let claims = match decode_token(body.token.trim(), TokenPurpose::ResetPassword, &jwt) {
        Ok(claims) => claims,
        Err(err) => {
            tracing::error!("Rejected reset token: {}", err);
            return HttpResponse::BadRequest().json(json!({
                "error": "Invalid or expired reset token"
            }));
        }
    };
    if let Err(errors) = body.validate() {
        return validation_error_response(&errors);
    }

    let password_hash = match hash_password(&body.password) {
        Ok(hash) => hash,
        Err(err) => {
            tracing::error!("Failed to hash password {}", err);
            return HttpResponse::InternalServerError()
                .json(ResponseMessage::new("Failed to reset password"));
        }
    };

    let query_span = tracing::info_span!("Update User Password", user_id = %claims.sub);
    let query_res = sqlx::query("UPDATE users SET password_hash = $1, updated_at = $2 WHERE id = $3")
        .bind(password_hash)
        .bind(Utc::now())
        .bind(claims.sub)
        .execute(connection.get_ref())
        .instrument(query_span)
        .await;

    match query_res {
        Ok(done) if done.rows_affected() == 0 => {
            tracing::error!("Reset token for unknown user {}", claims.sub);
            HttpResponse::NotFound().json(json!({
                "error": "User not found"
            }))
        }
        Ok(_) => {
            tracing::info!("User completed the password update process");
            HttpResponse::Ok().json(ResponseMessage::new("Password updated"))
        }
        Err(err) => {
            tracing::error!("database error {:?}", err);
            HttpResponse::InternalServerError()
                .json(ResponseMessage::new("Failed to reset password"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::first_validation_message;

    #[test]
    fn confirmation_must_match() {
        let body = UpdatePassword {
            token: "t".to_string(),
            password: "Abcdefg1!".to_string(),
            confirm_password: "Abcdefg1?".to_string(),
        };
        let errors = body.validate().unwrap_err();
        assert_eq!(
            first_validation_message(&errors).as_deref(),
            Some("Passwords do not match")
        );
    }
}
