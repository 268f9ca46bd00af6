use actix_web::{
    web::{self, get},
    Scope,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::get_genres;

#[derive(Serialize, Debug, Clone, sqlx::FromRow)]
pub struct Genre {
    pub id: Uuid,
    pub name_english: String,
    pub name_arabic: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const GENRE_COLUMNS: &str =
    "SELECT id, name_english, name_arabic, is_active, created_at, updated_at FROM genres";

pub fn genre_source() -> Scope {
    web::scope("/genres").route("", get().to(get_genres))
}
