use std::net::TcpListener;
use std::sync::Arc;

use coreapi::configuration::get_configuration;
use coreapi::startup::run;
use coreapi::telemetry::init_telemetry;
use coreapi::users::PgUserRepository;
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "Configuration error")
    })?;

    init_telemetry(&configuration.application.log_level);
    tracing::info!(
        app_name = %configuration.application.name,
        environment = %configuration.application.environment,
        "Configuration loaded"
    );

    if configuration.auth.secret_key == "changeme" {
        tracing::warn!("Using the default signing secret; set APP_AUTH__SECRET_KEY");
    }

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&configuration.database.connection_string())
        .await
        .map_err(|e| {
            tracing::error!("Failed to create connection pool: {}", e);
            std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "Database connection error"
            )
        })?;
    tracing::info!("Database connection pool created");

    let address = configuration.application.address();
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let users = Arc::new(PgUserRepository::new(pool));
    run(listener, users, configuration)?.await
}
