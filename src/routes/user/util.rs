use std::borrow::Cow;

use actix_web::{
    web::{self, get, post},
    Scope,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use regex::Regex;
use sqlx::PgPool;
use validator::ValidationError;

use crate::configuration::JwtSettings;
use crate::middleware::Authentication;

use super::{get_user, user_login, user_signup, verify_email};

pub fn user_source(db_pool: &PgPool, jwt: &JwtSettings) -> Scope {
    web::scope("/auth")
        .route("/register", post().to(user_signup))
        .route("/verify-email", post().to(verify_email))
        .route("/login", post().to(user_login))
        .route(
            "/me",
            get()
                .to(get_user)
                .wrap(Authentication::new(db_pool.clone(), jwt.clone())),
        )
}

const CHECK_FOR_UPPERCASE: &str = ".*[A-Z].*";
const CHECK_FOR_LOWERCASE: &str = ".*[a-z].*";
const CHECK_FOR_NUMBER: &str = ".*[0-9].*";
const CHECK_FOR_SPECIAL_CHARACTER: &str = r".*[^A-Za-z0-9].*";
const FORBIDDEN_CHARACTERS: &[char] = &['/', '(', ')', '"', '<', '>', '\\', '{', '}', '\''];

fn contains_match(pattern: &str, text: &str) -> bool {
    match Regex::new(pattern) {
        Ok(regex) => regex.is_match(text),
        Err(err) => {
            tracing::error!("Invalid password pattern {} {}", pattern, err);
            false
        }
    }
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < 8 {
        return Err(ValidationError::new("Password length")
            .with_message(Cow::from("Password must be at least 8 characters long")));
    }
    if !contains_match(CHECK_FOR_UPPERCASE, password) {
        return Err(
            ValidationError::new("Password missing UpperCase").with_message(Cow::from(
                "Password must contain at least one uppercase letter",
            )),
        );
    }
    if !contains_match(CHECK_FOR_LOWERCASE, password) {
        return Err(
            ValidationError::new("Password missing LowerCase").with_message(Cow::from(
                "Password must contain at least one lowercase letter",
            )),
        );
    }
    if !contains_match(CHECK_FOR_NUMBER, password) {
        return Err(ValidationError::new("Password missing Number")
            .with_message(Cow::from("Password must contain at least one number")));
    }
    if !contains_match(CHECK_FOR_SPECIAL_CHARACTER, password) {
        return Err(
            ValidationError::new("Password missing Special Char").with_message(Cow::from(
                "Password must contain at least one special character",
            )),
        );
    }
    Ok(())
}

pub fn validate_user_name(user_name: &str) -> Result<(), ValidationError> {
    if user_name.trim().is_empty() {
        return Err(ValidationError::new("User name content error")
            .with_message(Cow::from("Name can't be empty")));
    }
    if user_name.chars().count() > 50 {
        return Err(ValidationError::new("User name length error")
            .with_message(Cow::from("Name must be less than 50 characters")));
    }
    if user_name.chars().any(|c| FORBIDDEN_CHARACTERS.contains(&c)) {
        return Err(
            ValidationError::new("User name content error").with_message(Cow::from(
                "Name cannot contain any of the following characters [/, (, ), \", <, >, \\, {, }, ']",
            )),
        );
    }
    Ok(())
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// False for a wrong password and for a hash that can't be parsed.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(err) => {
            tracing::error!("Stored password hash is unreadable {}", err);
            false
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: Result<(), ValidationError>) -> String {
        result.unwrap_err().message.unwrap().to_string()
    }

    #[test]
    fn password_policy_names_the_missing_class() {
        assert_eq!(
            message(validate_password("Ab1!")),
            "Password must be at least 8 characters long"
        );
        assert_eq!(
            message(validate_password("abcdefg1!")),
            "Password must contain at least one uppercase letter"
        );
        assert_eq!(
            message(validate_password("ABCDEFG1!")),
            "Password must contain at least one lowercase letter"
        );
        assert_eq!(
            message(validate_password("Abcdefgh!")),
            "Password must contain at least one number"
        );
        assert_eq!(
            message(validate_password("Abcdefgh1")),
            "Password must contain at least one special character"
        );
        assert!(validate_password("Abcdefg1!").is_ok());
    }

    #[test]
    fn names_reject_markup_characters() {
        assert!(validate_user_name("Sara Ali").is_ok());
        assert!(validate_user_name("   ").is_err());
        assert!(validate_user_name("<b>").is_err());
        assert!(validate_user_name(&"a".repeat(51)).is_err());
    }

    #[test]
    fn hashed_passwords_verify() {
        let hash = hash_password("Abcdefg1!").unwrap();
        assert!(verify_password("Abcdefg1!", &hash));
        assert!(!verify_password("Abcdefg2!", &hash));
        assert!(!verify_password("Abcdefg1!", "not a hash"));
    }

    #[test]
    fn emails_are_compared_lowercase() {
        assert_eq!(normalize_email("  Sara@Example.COM "), "sara@example.com");
    }
}
