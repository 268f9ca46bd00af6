
use actix_web::{test, web, App};
use movie_platform::routes::health_check;
use serde::Deserialize;
use test_startup::*;

#[derive(Deserialize)]
struct ResponseMessage {
    message: String,
}

#[actix_rt::test]
async fn health_check_answers_without_a_database() {
    let app = test::init_service(App::new().route("/", web::get().to(health_check))).await;
    let req = test::TestRequest::get().uri("/").to_request();
    let body: ResponseMessage = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.message, "Movie Platform is up");
}

#[actix_rt::test]
#[ignore = "requires a running Postgres instance"]
async fn check_server_health() {
    let app = spawn_app().await;
    let client: reqwest::Client = reqwest::Client::new();

    let res = client
        .get(app.url("/"))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(res.status().is_success());
    let body = res
        .json::<ResponseMessage>()
        .await
        .expect("Failed to parse the response body");
    assert_eq!(body.message.as_str(), "Movie Platform is up");
}
