use actix_web::{
    web::{Data, Path},
    HttpRequest, HttpResponse,
};
use serde_json::json;

use crate::catalog::{find_movie, related_movies, CatalogError, MovieCatalog, MovieStatus};
use crate::configuration::JwtSettings;
use crate::middleware::access_claims;

use super::catalog_error_response;

/// Published movie by id. Full videos are reserved for signed-in viewers;
/// everyone else only sees trailers.
pub async fn get_movie_info(
    req: HttpRequest,
    path: Path<String>,
    catalog: Data<dyn MovieCatalog>,
    jwt: Data<JwtSettings>,
) -> HttpResponse {
    let movie_id = path.into_inner();
    let movie = match find_movie(catalog.get_ref(), &movie_id).await {
        Ok(movie) if movie.status == MovieStatus::Published => movie,
        Ok(_) => {
            tracing::info!("Movie {} is not published", movie_id);
            return catalog_error_response(&CatalogError::NotFound);
        }
        Err(err) => return catalog_error_response(&err),
    };

    let related = match related_movies(catalog.get_ref(), &movie).await {
        Ok(related) => related,
        Err(err) => {
            tracing::error!("Failed to load related movies for {} {:?}", movie.id, err);
            Vec::new()
        }
    };

    let (movie, related) = if access_claims(&req, &jwt).is_some() {
        (movie, related)
    } else {
        (
            movie.retain_trailers(),
            related.into_iter().map(|movie| movie.retain_trailers()).collect(),
        )
    };

    HttpResponse::Ok().json(json!({
        "data": movie,
        "related": related
    }))
}
