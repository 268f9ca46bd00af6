use std::net::TcpListener;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{
    dev::Server,
    http::header,
    web::{self, Data},
    App, HttpServer,
};
use sqlx::PgPool;
use tracing_actix_web::TracingLogger;

use crate::catalog::{MovieCatalog, PgMovieCatalog};
use crate::configuration::Settings;
use crate::email::EmailClient;
use crate::media::MediaStore;
use crate::routes::{
    admin_source, genre_source, health_check, movie_source, password_reset_source, user_source,
};

fn configure_cors(frontend_url: &str) -> Cors {
    let cors = Cors::default();
    let cors = if frontend_url == "*" {
        cors.allow_any_origin()
    } else {
        cors.allowed_origin(frontend_url)
    };
    cors.allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE"])
        .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT])
        .allowed_header(header::CONTENT_TYPE)
        .max_age(3600)
}

pub fn run_server(
    listener: TcpListener,
    db_pool: PgPool,
    settings: &Settings,
) -> Result<Server, std::io::Error> {
    let email_client = EmailClient::new(&settings.email, &settings.application.app_url)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string()))?;
    let catalog: Arc<dyn MovieCatalog> = Arc::new(PgMovieCatalog::new(db_pool.clone()));

    let catalog = Data::from(catalog);
    let email_client = Data::new(email_client);
    let media = Data::new(MediaStore::new(&settings.media));
    let jwt = settings.jwt.clone();
    let jwt_data = Data::new(jwt.clone());
    let frontend_url = settings.application.frontend_url.clone();
    let db_pool = Data::new(db_pool);

    let server = HttpServer::new(move || {
        let cors = configure_cors(frontend_url.as_str());

        App::new()
            .wrap(cors)
            .wrap(TracingLogger::default())
            .route("/", web::get().to(health_check))
            .service(movie_source())
            .service(genre_source())
            .service(password_reset_source())
            .service(user_source(db_pool.get_ref(), &jwt))
            .service(admin_source(db_pool.get_ref(), &jwt))
            .app_data(db_pool.clone())
            .app_data(catalog.clone())
            .app_data(email_client.clone())
            .app_data(media.clone())
            .app_data(jwt_data.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
