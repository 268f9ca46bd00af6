use actix_web::{
    web::{Data, Json, Path},
    HttpResponse,
};
use chrono::Utc;
use serde_json::json;
use sqlx::{types::Json as JsonColumn, PgPool};
use tracing::Instrument;
use uuid::Uuid;
use validator::Validate;

use crate::catalog::{find_movie, CatalogError, MovieCatalog, MovieRecord};
use crate::media::MediaStore;
use crate::routes::catalog_error_response;
use crate::util::validation_error_response;

use super::{ensure_genres_exist, link_genres, parse_path_id, AdminError, MovieInput};

pub async fn update_movie(
    path: Path<String>,
    body: Json<MovieInput>,
    connection: Data<PgPool>,
    catalog: Data<dyn MovieCatalog>,
    media: Data<MediaStore>,
) -> HttpResponse {
    let movie_id = match parse_path_id(&path.into_inner(), AdminError::MovieNotFound) {
        Ok(id) => id,
        Err(response) => return response,
    };
    if let Err(errors) = body.validate() {
        return validation_error_response(&errors);
    }
    let input = body.into_inner();

    let previous = match catalog.find(movie_id).await {
        Ok(movie) => movie,
        Err(CatalogError::NotFound) => return AdminError::MovieNotFound.response(),
        Err(err) => return catalog_error_response(&err),
    };

    if let Err(err) = save_movie(connection.get_ref(), movie_id, &input).await {
        return err.response();
    }
    tracing::info!("Movie {} updated", movie_id);

    let updated = match find_movie(catalog.get_ref(), &movie_id.to_string()).await {
        Ok(movie) => movie,
        Err(err) => return catalog_error_response(&err),
    };
    media.delete_all(replaced_media(&previous, &updated)).await;

    HttpResponse::Ok().json(json!({ "data": updated }))
}

async fn save_movie(pool: &PgPool, movie_id: Uuid, input: &MovieInput) -> Result<(), AdminError> {
    let query_span = tracing::info_span!("Updating movie in the database", %movie_id);
    let genre_ids = input.genre_ids();

    let mut tx = pool.begin().await?;
    ensure_genres_exist(&mut tx, &genre_ids).await?;
    let result = sqlx::query(
        r#"
            UPDATE movies SET title_english = $2, title_arabic = $3, plot_english = $4,
                plot_arabic = $5, year = $6, budget = $7, rating = $8, director_id = $9,
                writer_ids = $10, cast_ids = $11, poster = $12, cover = $13, videos = $14,
                status = $15, updated_at = $16
            WHERE id = $1
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
    .bind(Utc::now())
    .execute(&mut *tx)
    .instrument(query_span)
    .await
    .map_err(AdminError::from_write)?;
    if result.rows_affected() == 0 {
        return Err(AdminError::MovieNotFound);
    }
    link_genres(&mut tx, movie_id, &genre_ids).await?;
    tx.commit().await?;
    Ok(())
}

/// Media URLs the previous version referenced and the update dropped.
fn replaced_media<'a>(previous: &'a MovieRecord, updated: &MovieRecord) -> Vec<&'a str> {
    let kept = updated.media_urls();
    previous
        .media_urls()
        .into_iter()
        .filter(|url| !kept.contains(url))
        .collect()
}
