use actix_web::{web::Data, HttpResponse};

use crate::catalog::{listing, CatalogQuery, MovieCatalog};
use crate::routes::{catalog_error_response, raw_params, CatalogQueryString};

/// Same listing as the public one, drafts included unless `status` says
/// otherwise.
pub async fn list_movies(
    query: CatalogQueryString,
    catalog: Data<dyn MovieCatalog>,
) -> HttpResponse {
    let request = CatalogQuery::admin(&raw_params(query));
    tracing::info!("Admin movie listing {:?}", request);
    match listing(catalog.get_ref(), &request).await {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(err) => catalog_error_response(&err),
    }
}
