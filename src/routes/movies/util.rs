use actix_web::{
    web::{self, get},
    HttpResponse, Scope,
};
use serde_json::json;

use crate::catalog::{CatalogError, RawCatalogParams};

use super::{get_movie_count, get_movie_info, get_movie_list};

pub fn movie_source() -> Scope {
    web::scope("/movies")
        .route("", get().to(get_movie_list))
        .route("/count", get().to(get_movie_count))
        .route("/{id}", get().to(get_movie_info))
}

/// Query string pairs as received, `genre` possibly repeated.
pub type CatalogQueryString = web::Query<Vec<(String, String)>>;

pub fn raw_params(query: CatalogQueryString) -> RawCatalogParams {
    RawCatalogParams::from_pairs(query.into_inner())
}

pub fn catalog_error_response(err: &CatalogError) -> HttpResponse {
    match err {
        CatalogError::NotFound => HttpResponse::NotFound().json(json!({
            "error": err.to_string()
        })),
        CatalogError::FetchFailed(_) => HttpResponse::InternalServerError().json(json!({
            "error": err.to_string()
        })),
    }
}
