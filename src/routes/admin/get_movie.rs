use actix_web::{
    web::{Data, Path},
    HttpResponse,
};
use serde_json::json;

use crate::catalog::{find_movie, MovieCatalog};
use crate::routes::catalog_error_response;

pub async fn get_admin_movie(path: Path<String>, catalog: Data<dyn MovieCatalog>) -> HttpResponse {
    match find_movie(catalog.get_ref(), &path.into_inner()).await {
        Ok(movie) => HttpResponse::Ok().json(json!({ "data": movie })),
        Err(err) => catalog_error_response(&err),
    }
}
