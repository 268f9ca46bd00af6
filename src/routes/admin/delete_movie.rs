use actix_web::{
    web::{Data, Path},
    HttpResponse,
};
use sqlx::PgPool;
use tracing::Instrument;

use crate::catalog::{CatalogError, MovieCatalog};
use crate::media::MediaStore;
use crate::routes::catalog_error_response;
use crate::util::ResponseMessage;

use super::{parse_path_id, AdminError};

/// Deletes the movie row (genre links cascade) and then its stored media.
pub async fn delete_movie(
    path: Path<String>,
    connection: Data<PgPool>,
    catalog: Data<dyn MovieCatalog>,
    media: Data<MediaStore>,
) -> HttpResponse {
    let movie_id = match parse_path_id(&path.into_inner(), AdminError::MovieNotFound) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let movie = match catalog.find(movie_id).await {
        Ok(movie) => movie,
        Err(CatalogError::NotFound) => return AdminError::MovieNotFound.response(),
        Err(err) => return catalog_error_response(&err),
    };

    let query_span = tracing::info_span!("Deleting movie", %movie_id);
    let result = sqlx::query("DELETE FROM movies WHERE id = $1")
        .bind(movie_id)
        .execute(connection.get_ref())
        .instrument(query_span)
        .await;
    match result {
        Ok(done) if done.rows_affected() == 0 => return AdminError::MovieNotFound.response(),
        Ok(_) => tracing::info!("Movie {} deleted", movie_id),
        Err(err) => return AdminError::Database(err).response(),
    }

    media.delete_all(movie.media_urls()).await;
    HttpResponse::Ok().json(ResponseMessage::new("Movie deleted"))
}
