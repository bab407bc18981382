use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use lume_discover::config::{LoggingSettings, Settings};
use lume_discover::core::{EventPublisher, RankingService};
use lume_discover::routes::{self, handle_json_payload_error, AppState};
use lume_discover::services::{AverageAgeCache, EventStore, PostgresEventStore};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_logging(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    init_logging(&settings.logging);

    info!("Starting Lume Discover event service...");

    let postgres = PostgresEventStore::from_settings(
        &settings.database.url,
        settings.database.max_connections,
        settings.database.min_connections,
        settings.database.acquire_timeout_secs,
        settings.database.idle_timeout_secs,
    )
    .await
    .map_err(|e| {
        error!("Failed to connect to PostgreSQL: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;

    let store: Arc<dyn EventStore> = Arc::new(postgres);

    info!(
        "PostgreSQL event store initialized (max: {} connections)",
        settings.database.max_connections.unwrap_or(10)
    );

    let paging = settings.discovery.paging_policy();
    let ranking = RankingService::new(store.clone(), paging);

    info!("Ranking service initialized with paging policy: {:?}", paging);

    let average_ages = AverageAgeCache::new(
        settings.cache.average_age_capacity,
        settings.cache.average_age_ttl_secs,
    );
    let age_band = settings.age_band.policy();
    let publisher = EventPublisher::new(
        store.clone(),
        average_ages,
        age_band,
        settings.age_band.default_average_age,
    );

    info!(
        "Event publisher initialized with age band policy: {:?}, default average age {}",
        age_band, settings.age_band.default_average_age
    );

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received, cancelling in-flight scans");
                shutdown.cancel();
            }
        });
    }

    let app_state = AppState {
        ranking,
        publisher,
        store,
        shutdown,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
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
