use actix_web::{
    web::{Data, Json},
    HttpResponse,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use tracing::Instrument;
use validator::Validate;

use super::{normalize_email, verify_password};
use crate::configuration::JwtSettings;
use crate::middleware::User;
use crate::token::{generate_token, TokenPurpose};
use crate::util::validation_error_response;

#[derive(Deserialize, Validate)]
pub struct UserData {
    #[validate(email(message = "Not a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password can't be empty"))]
    pub password: String,
}

#[derive(sqlx::FromRow)]
struct StoredUser {
    #[sqlx(flatten)]
    user: User,
    password_hash: String,
}

fn invalid_credentials() -> HttpResponse {
    HttpResponse::Unauthorized().json(json!({
        "error": "Invalid email or password"
    }))
}

pub async fn user_login(
    body: Json<UserData>,
    connection: Data<PgPool>,
    jwt: Data<JwtSettings>,
) -> HttpResponse {
    if let Err(errors) = body.validate() {
        return validation_error_response(&errors);
    }
    let email = normalize_email(&body.email);
    let query_span = tracing::info_span!("Handle user login", %email);

    let result = sqlx::query_as::<_, StoredUser>(
        r#"
            SELECT id, name, email, role, is_verified, created_at, updated_at, password_hash
            FROM users WHERE email = $1
        "#,
    )
    .bind(&email)
    .fetch_optional(connection.get_ref())
    .instrument(query_span)
    .await;

    let stored = match result {
        Ok(Some(stored)) => stored,
        Ok(None) => {
            tracing::info!("Login attempt for unknown email");
            return invalid_credentials();
        }
        Err(err) => {
            tracing::error!("Error getting user from database {}", err);
            return HttpResponse::InternalServerError().json(json!({
                "error": "Something went wrong"
            }));
        }
    };
    if !verify_password(&body.password, &stored.password_hash) {
        tracing::error!("Wrong password for user {}", stored.user.id);
        return invalid_credentials();
    }

    match generate_token(stored.user.id, TokenPurpose::Access, &jwt) {
        Ok(token) => {
            tracing::info!("successful Login");
            HttpResponse::Ok().json(json!({
                "data": {
                    "token": token,
                    "user": stored.user
                }
            }))
        }
        Err(err) => {
            tracing::error!("Error Generating token {}", err);
            HttpResponse::InternalServerError().json(json!({
                "error": "Something went wrong"
            }))
        }
    }
}
