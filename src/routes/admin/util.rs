use actix_web::{
    web::{self, delete, get, post, put},
    HttpResponse, Scope,
};
use serde_json::json;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::Instrument;
use uuid::Uuid;

use crate::configuration::JwtSettings;
use crate::middleware::Authentication;

use super::{
    create_genre, create_movie, delete_genre, delete_movie, get_admin_movie, list_all_genres,
    list_movies, update_genre, update_movie,
};

pub fn admin_source(db_pool: &PgPool, jwt: &JwtSettings) -> Scope {
    let guard = || Authentication::admin(db_pool.clone(), jwt.clone());
    web::scope("/admin")
        .route("/movies", get().to(list_movies).wrap(guard()))
        .route("/movies", post().to(create_movie).wrap(guard()))
        .route("/movies/{id}", get().to(get_admin_movie).wrap(guard()))
        .route("/movies/{id}", put().to(update_movie).wrap(guard()))
        .route("/movies/{id}", delete().to(delete_movie).wrap(guard()))
        .route("/genres", get().to(list_all_genres).wrap(guard()))
        .route("/genres", post().to(create_genre).wrap(guard()))
        .route("/genres/{id}", put().to(update_genre).wrap(guard()))
        .route("/genres/{id}", delete().to(delete_genre).wrap(guard()))
}

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("Movie not found")]
    MovieNotFound,
    #[error("Genre not found")]
    GenreNotFound,
    #[error("Unknown genre id {0}")]
    UnknownGenre(Uuid),
    #[error("Director must be an existing user")]
    UnknownDirector,
    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl AdminError {
    pub fn response(&self) -> HttpResponse {
        match self {
            AdminError::MovieNotFound | AdminError::GenreNotFound => {
                HttpResponse::NotFound().json(json!({ "error": self.to_string() }))
            }
            AdminError::UnknownGenre(_) | AdminError::UnknownDirector => {
                HttpResponse::BadRequest().json(json!({ "error": self.to_string() }))
            }
            AdminError::Database(err) => {
                tracing::error!("Database error {:?}", err);
                HttpResponse::InternalServerError().json(json!({
                    "error": "something went wrong"
                }))
            }
        }
    }

    /// Maps the director foreign key violation to a client error.
    pub fn from_write(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err)
                if db_err.message().contains("foreign key constraint")
                    && db_err.message().contains("director_id") =>
            {
                AdminError::UnknownDirector
            }
            _ => AdminError::Database(err),
        }
    }
}

/// Parses an id path segment, answering 404 for anything that isn't a UUID.
pub fn parse_path_id(id: &str, not_found: AdminError) -> Result<Uuid, HttpResponse> {
    Uuid::parse_str(id.trim()).map_err(|_| {
        tracing::info!("Invalid id format {:?}", id);
        not_found.response()
    })
}

/// Fails with the first requested genre that doesn't exist.
pub async fn ensure_genres_exist(
    tx: &mut Transaction<'_, Postgres>,
    genre_ids: &[Uuid],
) -> Result<(), AdminError> {
    if genre_ids.is_empty() {
        return Ok(());
    }
    let query_span = tracing::info_span!("Checking requested genres", ?genre_ids);
    let found: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM genres WHERE id = ANY($1)")
        .bind(genre_ids)
        .fetch_all(&mut **tx)
        .instrument(query_span)
        .await?;
    match genre_ids.iter().find(|id| !found.contains(id)) {
        Some(missing) => Err(AdminError::UnknownGenre(*missing)),
        None => Ok(()),
    }
}

/// Replaces the genre links of a movie.
pub async fn link_genres(
    tx: &mut Transaction<'_, Postgres>,
    movie_id: Uuid,
    genre_ids: &[Uuid],
) -> Result<(), AdminError> {
    let query_span = tracing::info_span!("Linking movie genres", %movie_id);
    sqlx::query("DELETE FROM movie_genres WHERE movie_id = $1")
        .bind(movie_id)
        .execute(&mut **tx)
        .instrument(query_span.clone())
        .await?;
    if genre_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        r#"
            INSERT INTO movie_genres (movie_id, genre_id)
            SELECT $1, UNNEST($2::uuid[])
        "#,
    )
    .bind(movie_id)
    .bind(genre_ids)
    .execute(&mut **tx)
    .instrument(query_span)
    .await?;
    Ok(())
}
