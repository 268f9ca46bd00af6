use actix_web::{
    web::{self, patch, post},
    Scope,
};

use super::{reset_password, send_password_reset_email, validate_reset_token};

/// Registered ahead of the `/auth` scope, which would otherwise claim these
/// paths.
pub fn password_reset_source() -> Scope {
    web::scope("/auth/password")
        .route("/forgot", post().to(send_password_reset_email))
        .route("/verify", post().to(validate_reset_token))
        .route("/reset", patch().to(reset_password))
}
