use actix_web::{web::Data, HttpResponse};
use serde_json::json;
use sqlx::PgPool;
use tracing::Instrument;

use super::{Genre, GENRE_COLUMNS};

pub async fn get_genres(connection: Data<PgPool>) -> HttpResponse {
    let query_span = tracing::info_span!("Fetching active genres");
    let sql = format!("{} WHERE is_active = TRUE ORDER BY name_english ASC", GENRE_COLUMNS);
    let result = sqlx::query_as::<_, Genre>(&sql)
        .fetch_all(connection.get_ref())
        .instrument(query_span)
        .await;

    match result {
        Ok(genres) => HttpResponse::Ok().json(json!({ "data": genres })),
        Err(err) => {
            tracing::error!("Failed to fetch genres {:?}", err);
            HttpResponse::InternalServerError().json(json!({
                "error": "Failed to fetch genres"
            }))
        }
    }
}
