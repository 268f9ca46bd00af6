use actix_web::{
    web::{Data, Json},
    HttpResponse,
};
use chrono::Utc;
use serde_json::json;
use sqlx::{types::Json as JsonColumn, PgPool};
use tracing::Instrument;
use uuid::Uuid;
use validator::Validate;

use crate::catalog::{find_movie, MovieCatalog, MovieRecord, MovieStatus};
use crate::email::{new_movie_email, EmailClient};
use crate::routes::catalog_error_response;
use crate::util::validation_error_response;

use super::{ensure_genres_exist, link_genres, AdminError, MovieInput};

pub async fn create_movie(
    body: Json<MovieInput>,
    connection: Data<PgPool>,
    catalog: Data<dyn MovieCatalog>,
    email_client: Data<EmailClient>,
) -> HttpResponse {
    if let Err(errors) = body.validate() {
        return validation_error_response(&errors);
    }
    let input = body.into_inner();

    let movie_id = match insert_movie(connection.get_ref(), &input).await {
        Ok(id) => id,
        Err(err) => return err.response(),
    };
    tracing::info!("Movie {} created", movie_id);

    let movie = match find_movie(catalog.get_ref(), &movie_id.to_string()).await {
        Ok(movie) => movie,
        Err(err) => return catalog_error_response(&err),
    };

    if input.notify_subscribers && movie.status == MovieStatus::Published {
        let pool = connection.get_ref().clone();
        let client = email_client.get_ref().clone();
        let announced = movie.clone();
        actix_web::rt::spawn(async move {
            notify_subscribers(&pool, &client, &announced).await;
        });
    }

    HttpResponse::Created().json(json!({ "data": movie }))
}

async fn insert_movie(pool: &PgPool, input: &MovieInput) -> Result<Uuid, AdminError> {
    let query_span = tracing::info_span!("Saving new movie in the database");
    let movie_id = Uuid::new_v4();
    let genre_ids = input.genre_ids();
    let now = Utc::now();

    let mut tx = pool.begin().await?;
    ensure_genres_exist(&mut tx, &genre_ids).await?;
    sqlx::query(
        r#"
            INSERT INTO movies (id, title_english, title_arabic, plot_english, plot_arabic,
                year, budget, rating, director_id, writer_ids, cast_ids, poster, cover,
                videos, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
        "#,
    )
    .bind(movie_id)
    .bind(input.title_english.trim())
    .bind(input.title_arabic.trim())
    .bind(input.plot_english.trim())
    .bind(input.plot_arabic.trim())
    .bind(input.year)
    .bind(input.budget)
    .bind(input.rating.unwrap_or(0.0))
    .bind(input.director_id)
    .bind(&input.writer_ids)
    .bind(&input.cast_ids)
    .bind(&input.poster)
    .bind(&input.cover)
    .bind(JsonColumn(input.videos()))
    .bind(input.status)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .instrument(query_span)
    .await
    .map_err(AdminError::from_write)?;
    link_genres(&mut tx, movie_id, &genre_ids).await?;
    tx.commit().await?;
    Ok(movie_id)
}

#[derive(Debug, sqlx::FromRow)]
struct Subscriber {
    name: String,
    email: String,
}

/// Emails every verified user about a newly published movie. Failures are
/// logged per recipient.
async fn notify_subscribers(pool: &PgPool, client: &EmailClient, movie: &MovieRecord) {
    let query_span = tracing::info_span!("Fetching verified users", movie_id = %movie.id);
    let subscribers = sqlx::query_as::<_, Subscriber>(
        "SELECT name, email FROM users WHERE is_verified = TRUE",
    )
    .fetch_all(pool)
    .instrument(query_span)
    .await;
    let subscribers = match subscribers {
        Ok(subscribers) => subscribers,
        Err(err) => {
            tracing::error!("Failed to load subscribers {:?}", err);
            return;
        }
    };

    let movie_url = client.movie_url(&movie.id.to_string());
    for subscriber in subscribers {
        let content = new_movie_email(
            &subscriber.name,
            &movie.title_english,
            &movie.title_arabic,
            &movie_url,
        );
        if let Err(err) = client.send(&subscriber.email, content).await {
            tracing::error!("Failed to notify {} {}", subscriber.email, err);
        }
    }
    tracing::info!("New movie {} announced", movie.id);
}
