use std::net::TcpListener;
use std::time::Duration;

use dotenv::dotenv;
use movie_platform::configuration::get_configuration;
use movie_platform::startup::run_server;
use movie_platform::telemetry::{get_subscriber, init_subscriber, DEFAULT_ENV_FILTER};
use movie_platform::util::check_for_necessary_env;
use sqlx::postgres::PgPoolOptions;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    let subscriber = get_subscriber("movie_platform", DEFAULT_ENV_FILTER, std::io::stdout);
    init_subscriber(subscriber);
    check_for_necessary_env()?;

    let configuration = get_configuration("configuration").map_err(|err| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!(
                "Failed to read `configuration.json`. Please make sure it exists and is valid JSON: {}",
                err
            ),
        )
    })?;

    let connection_pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(
            configuration.database.acquire_timeout_seconds,
        ))
        .connect(configuration.database.connection_string().as_str())
        .await
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::ConnectionRefused, err))?;
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Listening on {}", address);
    run_server(listener, connection_pool, &configuration)?.await
}
