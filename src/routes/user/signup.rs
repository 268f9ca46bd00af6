use actix_web::{
    web::{Data, Json},
    HttpResponse,
};
use chrono::Utc;
use serde::Deserialize;
use sqlx::Error::Database;
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;
use validator::Validate;

use super::{hash_password, normalize_email, validate_password, validate_user_name};
use crate::configuration::JwtSettings;
use crate::email::{welcome_email, EmailClient};
use crate::token::{generate_token, TokenPurpose};
use crate::util::{validation_error_response, ResponseMessage};

#[derive(Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(custom(function = "validate_user_name"))]
    name: String,
    #[validate(email(message = "Not a valid email"))]
    email: String,
    #[validate(custom(function = "validate_password"))]
    password: String,
}

impl std::fmt::Debug for CreateUserRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish()
    }
}

pub async fn user_signup(
    body: Json<CreateUserRequest>,
    connection: Data<PgPool>,
    email_client: Data<EmailClient>,
    jwt: Data<JwtSettings>,
) -> HttpResponse {
    tracing::info!("Got request body: {:?}", body);
    if let Err(errors) = body.validate() {
        return validation_error_response(&errors);
    }
    let query_span = tracing::info_span!("Saving new user details in the database", ?body);
    let password_hash = match hash_password(&body.password) {
        Ok(hash) => {
            tracing::info!("Password hashed successfully");
            hash
        }
        Err(err) => {
            tracing::error!("Failed to hash password {}", err);
            return HttpResponse::InternalServerError()
                .json(ResponseMessage::new("Failed to create user"));
        }
    };

    let user_id = Uuid::new_v4();
    let email = normalize_email(&body.email);
    let name = body.name.trim().to_string();
    let now = Utc::now();
    let result = sqlx::query(
        r#"
            INSERT INTO users (id, name, email, password_hash, role, is_verified, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 'user', FALSE, $5, $6)
        "#,
    )
    .bind(user_id)
    .bind(&name)
    .bind(&email)
    .bind(password_hash)
    .bind(now)
    .bind(now)
    .execute(connection.get_ref())
    .instrument(query_span)
    .await;

    if let Err(err) = result {
        return match err {
            Database(err)
                if err
                    .message()
                    .contains("duplicate key value violates unique constraint")
                    && err.message().contains("email") =>
            {
                tracing::error!("Email already exists in the database");
                HttpResponse::BadRequest().json(ResponseMessage::new("Email already exists"))
            }
            _ => {
                tracing::error!("Failed to create user {:?}", err);
                HttpResponse::InternalServerError()
                    .json(ResponseMessage::new("Failed to create user"))
            }
        };
    }
    tracing::info!("User created successfully");

    match generate_token(user_id, TokenPurpose::VerifyEmail, &jwt) {
        Ok(token) => {
            let content = welcome_email(&name, &email_client.verification_url(&token));
            if let Err(err) = email_client.send(&email, content).await {
                tracing::error!("Welcome email error {}", err);
            }
        }
        Err(err) => tracing::error!("Error generating verification token {}", err),
    }

    HttpResponse::Created().json(ResponseMessage::new(
        "User created successfully, check your email to verify your account",
    ))
}
