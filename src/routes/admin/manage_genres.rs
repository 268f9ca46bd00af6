use std::borrow::Cow;

use actix_web::{
    web::{Data, Json, Path},
    HttpResponse,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::routes::{Genre, GENRE_COLUMNS};
use crate::util::{validation_error_response, ResponseMessage};

use super::{parse_path_id, AdminError};

fn validate_genre_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("Genre name content error")
            .with_message(Cow::from("Genre name can't be empty")));
    }
    if name.chars().count() > 100 {
        return Err(ValidationError::new("Genre name length error")
            .with_message(Cow::from("Genre name must be less than 100 characters")));
    }
    Ok(())
}

#[derive(Deserialize, Debug, Validate)]
pub struct GenreInput {
    #[validate(custom(function = "validate_genre_name"))]
    pub name_english: String,
    #[validate(custom(function = "validate_genre_name"))]
    pub name_arabic: String,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

fn active_by_default() -> bool {
    true
}

pub async fn list_all_genres(connection: Data<PgPool>) -> HttpResponse {
    let query_span = tracing::info_span!("Fetching every genre");
    let sql = format!("{} ORDER BY name_english ASC", GENRE_COLUMNS);
    match sqlx::query_as::<_, Genre>(&sql)
        .fetch_all(connection.get_ref())
        .instrument(query_span)
        .await
    {
        Ok(genres) => HttpResponse::Ok().json(json!({ "data": genres })),
        Err(err) => AdminError::Database(err).response(),
    }
}

pub async fn create_genre(body: Json<GenreInput>, connection: Data<PgPool>) -> HttpResponse {
    if let Err(errors) = body.validate() {
        return validation_error_response(&errors);
    }
    let query_span = tracing::info_span!("Saving new genre in the database", ?body);
    let now = Utc::now();
    let result = sqlx::query_as::<_, Genre>(
        r#"
            INSERT INTO genres (id, name_english, name_arabic, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name_english, name_arabic, is_active, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(body.name_english.trim())
    .bind(body.name_arabic.trim())
    .bind(body.is_active)
    .bind(now)
    .bind(now)
    .fetch_one(connection.get_ref())
    .instrument(query_span)
    .await;

    match result {
        Ok(genre) => {
            tracing::info!("Genre {} created", genre.id);
            HttpResponse::Created().json(json!({ "data": genre }))
        }
        Err(err) => AdminError::Database(err).response(),
    }
}

pub async fn update_genre(
    path: Path<String>,
    body: Json<GenreInput>,
    connection: Data<PgPool>,
) -> HttpResponse {
    let genre_id = match parse_path_id(&path.into_inner(), AdminError::GenreNotFound) {
        Ok(id) => id,
        Err(response) => return response,
    };
    if let Err(errors) = body.validate() {
        return validation_error_response(&errors);
    }
    let query_span = tracing::info_span!("Updating genre", %genre_id);
    let result = sqlx::query_as::<_, Genre>(
        r#"
            UPDATE genres SET name_english = $2, name_arabic = $3, is_active = $4, updated_at = $5
            WHERE id = $1
            RETURNING id, name_english, name_arabic, is_active, created_at, updated_at
        "#,
    )
    .bind(genre_id)
    .bind(body.name_english.trim())
    .bind(body.name_arabic.trim())
    .bind(body.is_active)
    .bind(Utc::now())
    .fetch_optional(connection.get_ref())
    .instrument(query_span)
    .await;

    match result {
        Ok(Some(genre)) => HttpResponse::Ok().json(json!({ "data": genre })),
        Ok(None) => AdminError::GenreNotFound.response(),
        Err(err) => AdminError::Database(err).response(),
    }
}

/// Removes the genre; links to movies go with it.
pub async fn delete_genre(path: Path<String>, connection: Data<PgPool>) -> HttpResponse {
    let genre_id = match parse_path_id(&path.into_inner(), AdminError::GenreNotFound) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let query_span = tracing::info_span!("Deleting genre", %genre_id);
    let result = sqlx::query("DELETE FROM genres WHERE id = $1")
        .bind(genre_id)
        .execute(connection.get_ref())
        .instrument(query_span)
        .await;
    match result {
        Ok(done) if done.rows_affected() == 0 => AdminError::GenreNotFound.response(),
        Ok(_) => {
            tracing::info!("Genre {} deleted", genre_id);
            HttpResponse::Ok().json(ResponseMessage::new("Genre deleted"))
        }
        Err(err) => AdminError::Database(err).response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genre_names_must_be_present_and_short() {
        let input = |english: &str| GenreInput {
            name_english: english.to_string(),
            name_arabic: "دراما".to_string(),
            is_active: true,
        };
        assert!(input("Drama").validate().is_ok());
        assert!(input("  ").validate().is_err());
        assert!(input(&"x".repeat(101)).validate().is_err());
        assert!(input(&"x".repeat(100)).validate().is_ok());
    }

    #[test]
    fn new_genres_are_active_unless_told_otherwise() {
        let input: GenreInput =
            serde_json::from_str(r#"{"name_english": "Drama", "name_arabic": "دراما"}"#).unwrap();
        assert!(input.is_active);
    }
}
