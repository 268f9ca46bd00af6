use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::env;
use validator::{ValidationErrors, ValidationErrorsKind};

#[derive(Serialize, Deserialize, Debug)]
pub struct ResponseMessage {
    pub message: String,
}

impl ResponseMessage {
    pub fn new(message: &str) -> Self {
        ResponseMessage {
            message: message.to_string(),
        }
    }
}

pub fn check_for_necessary_env() -> Result<(), std::io::Error> {
    for name in ["JWT_SECRET"] {
        if env::var(name).map(|value| value.is_empty()).unwrap_or(true) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} must be set", name),
            ));
        }
    }
    Ok(())
}

/// First human readable message found in a validation report, descending into
/// nested structs and lists.
pub fn first_validation_message(errors: &ValidationErrors) -> Option<String> {
    for kind in errors.errors().values() {
        let message = match kind {
            ValidationErrorsKind::Field(field_errors) => field_errors
                .iter()
                .find_map(|err| err.message.as_ref().map(|message| message.to_string())),
            ValidationErrorsKind::Struct(inner) => first_validation_message(inner),
            ValidationErrorsKind::List(items) => {
                items.values().find_map(|inner| first_validation_message(inner))
            }
        };
        if message.is_some() {
            return message;
        }
    }
    None
}

/// 400 response for a body that failed `validator` checks.
pub fn validation_error_response(errors: &ValidationErrors) -> HttpResponse {
    match first_validation_message(errors) {
        Some(message) => {
            tracing::error!("Error: {}", message);
            HttpResponse::BadRequest().json(json!({
                "error": message
            }))
        }
        None => HttpResponse::BadRequest().finish(),
    }
}
