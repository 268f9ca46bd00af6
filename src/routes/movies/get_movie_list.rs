use actix_web::{web::Data, HttpRequest, HttpResponse};

use crate::catalog::{listing, CatalogQuery, MovieCatalog};
use crate::configuration::JwtSettings;
use crate::middleware::access_claims;

use super::{catalog_error_response, raw_params, CatalogQueryString};

pub async fn get_movie_list(
    req: HttpRequest,
    query: CatalogQueryString,
    catalog: Data<dyn MovieCatalog>,
    jwt: Data<JwtSettings>,
) -> HttpResponse {
    let request = CatalogQuery::public(&raw_params(query));
    tracing::info!("Listing published movies {:?}", request);

    let mut page = match listing(catalog.get_ref(), &request).await {
        Ok(page) => page,
        Err(err) => return catalog_error_response(&err),
    };
    if access_claims(&req, &jwt).is_none() {
        page.data = page
            .data
            .into_iter()
            .map(|movie| movie.retain_trailers())
            .collect();
    }
    HttpResponse::Ok().json(page)
}
