use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use chw_status_check::config::{LoggingSettings, Settings};
use chw_status_check::core::EligibilityEvaluator;
use chw_status_check::routes::{self, AppState};
use chw_status_check::services::{ActivityStore, ConnectionProvider, PostgresActivityStore};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_logging(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match logging.format.as_str() {
        "pretty" => subscriber.pretty().init(),
        "json" => subscriber.json().init(),
        _ => subscriber.compact().init(),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    init_logging(&settings.logging);

    info!("Starting CHW status check service...");

    let connections = ConnectionProvider::from_settings(&settings.database);
    let store = PostgresActivityStore::new(connections, &settings.activity.sources).map_err(|e| {
        error!("Invalid activity source configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    info!(
        "Activity store initialized ({} sources, max {} connections)",
        settings.activity.sources.len(),
        settings.database.max_connections
    );

    let app_state = AppState {
        store: Arc::new(store) as Arc<dyn ActivityStore>,
        evaluator: EligibilityEvaluator::new(),
        request_timeout: settings.routes.request_timeout(),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(routes::json_config())
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
