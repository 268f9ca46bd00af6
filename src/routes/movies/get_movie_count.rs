use actix_web::{web::Data, HttpResponse};
use serde_json::json;

use crate::catalog::{query, CatalogQuery, MovieCatalog, QueryOutcome};

use super::{catalog_error_response, raw_params, CatalogQueryString};

pub async fn get_movie_count(
    query_string: CatalogQueryString,
    catalog: Data<dyn MovieCatalog>,
) -> HttpResponse {
    let request = CatalogQuery::public(&raw_params(query_string)).counting();

    match query(catalog.get_ref(), &request).await {
        Ok(QueryOutcome::Count(total)) => HttpResponse::Ok().json(json!({
            "data": { "total": total }
        })),
        Ok(QueryOutcome::Page(movies)) => HttpResponse::Ok().json(json!({
            "data": { "total": movies.len() }
        })),
        Err(err) => catalog_error_response(&err),
    }
}
