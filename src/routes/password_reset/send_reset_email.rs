use actix_web::{
    web::{Data, Json},
    HttpResponse,
};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;
use validator::Validate;

use crate::configuration::JwtSettings;
use crate::email::{password_reset_email, EmailClient};
use crate::routes::normalize_email;
use crate::token::{generate_token, TokenPurpose};
use crate::util::{validation_error_response, ResponseMessage};

#[derive(Deserialize, Debug, Validate)]
pub struct PasswordResetRequest {
    #[validate(email(message = "Not a valid email"))]
    pub email: String,
}

#[derive(Debug, sqlx::FromRow)]
struct ResetTarget {
    id: Uuid,
    name: String,
    email: String,
}

const RESET_REQUESTED: &str = "If an account exists with that email, a password reset link has been sent";

/// Always answers the same way so the endpoint can't be used to probe for
/// registered addresses.
pub async fn send_password_reset_email(
    body: Json<PasswordResetRequest>,
    connection: Data<PgPool>,
    email_client: Data<EmailClient>,
    jwt: Data<JwtSettings>,
) -> HttpResponse {
    if let Err(errors) = body.validate() {
        return validation_error_response(&errors);
    }
    let email = normalize_email(&body.email);
    let query_span = tracing::info_span!("Looking up password reset target", %email);
    let result = sqlx::query_as::<_, ResetTarget>("SELECT id, name, email FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(connection.get_ref())
        .instrument(query_span)
        .await;

    let user = match result {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::info!("Password reset requested for unknown email");
            return HttpResponse::Ok().json(ResponseMessage::new(RESET_REQUESTED));
        }
        Err(err) => {
            tracing::error!("Password reset request error {:?}", err);
            return HttpResponse::InternalServerError()
                .json(ResponseMessage::new("Failed to process password reset request"));
        }
    };

    match generate_token(user.id, TokenPurpose::ResetPassword, &jwt) {
        Ok(token) => {
            let content = password_reset_email(&user.name, &email_client.reset_url(&token));
            if let Err(err) = email_client.send(&user.email, content).await {
                tracing::error!("Password reset email error {}", err);
            }
        }
        Err(err) => tracing::error!("Error generating reset token {}", err),
    }
    HttpResponse::Ok().json(ResponseMessage::new(RESET_REQUESTED))
}
