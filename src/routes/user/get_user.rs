use std::rc::Rc;

use actix_web::{HttpMessage, HttpRequest, HttpResponse};
use serde_json::json;

use crate::middleware::User;

pub async fn get_user(req: HttpRequest) -> HttpResponse {
    let extension = req.extensions();
    match extension.get::<Rc<User>>() {
        Some(user) => {
            tracing::info!("sending user info");
            HttpResponse::Ok().json(json!({ "data": user.as_ref() }))
        }
        None => {
            tracing::info!("User field not found in req object");
            HttpResponse::NotFound().json(json!({
                "error": "user not found"
            }))
        }
    }
}
