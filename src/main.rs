// Airwatch API v0.1
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod aqi;
mod config;
mod errors;
mod models;
mod routes;
mod services;

use config::AppConfig;
use services::refresher::{RefresherState, SharedRefresherState};
use services::simpleaq::SimpleAqClient;
use services::store::{SensorStore, SharedStore};

/// Airwatch API — OpenAPI specification.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Airwatch API",
        version = "0.1.0",
        description = "Community air-quality API. Periodically pulls PM2.5 readings from \
            the SimpleAQ sensor network, derives AQI values via EPA breakpoint \
            interpolation, simulates historical and hourly series around the live \
            readings, and serves the resulting in-memory snapshot read-only.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Sensors", description = "Current sensor readings"),
        (name = "Series", description = "Simulated historical and hourly series"),
        (name = "Statistics", description = "Aggregate statistics"),
        (name = "Refresher", description = "Background snapshot refresher status"),
    ),
    paths(
        routes::health::health_check,
        routes::sensors::list_sensors,
        routes::sensors::get_statistics,
        routes::series::get_historical,
        routes::series::get_hourly,
        routes::refresher::get_refresher_status,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            models::Sensor,
            models::GeoPosition,
            aqi::AqiCategory,
            models::HistoricalPoint,
            models::HourlyPoint,
            models::MetricPoint,
            models::Statistics,
            routes::series::HistoricalSeries,
            routes::series::HourlySeries,
            services::refresher::RefresherState,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "airwatch_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    // Create SimpleAQ client
    let client = SimpleAqClient::new(
        &config.upstream_base_url,
        Duration::from_secs(config.upstream_timeout_secs),
    );

    // Shared snapshot store and refresher state
    let store: SharedStore = Arc::new(SensorStore::new());
    let refresher_state: SharedRefresherState = Arc::new(RwLock::new(RefresherState::new()));

    // Spawn the background refresher; it runs one cycle immediately, then
    // every refresh_interval_secs.
    tokio::spawn(services::refresher::run_refresher(
        client,
        store.clone(),
        refresher_state.clone(),
        Duration::from_secs(config.refresh_interval_secs),
    ));

    // CORS — read-only API, restrict methods to GET
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET])
        .allow_headers(Any);

    // Build router
    // Data routes read the snapshot store; the refresher status route reads
    // the refresher state.
    let data_routes = Router::new()
        .route("/api/sensors", get(routes::sensors::list_sensors))
        .route("/api/historical", get(routes::series::get_historical))
        .route("/api/hourly", get(routes::series::get_hourly))
        .route("/api/statistics", get(routes::sensors::get_statistics))
        .route("/api/health", get(routes::health::health_check))
        .with_state(store);

    let refresher_routes = Router::new()
        .route(
            "/api/refresher/status",
            get(routes::refresher::get_refresher_status),
        )
        .with_state(refresher_state);

    let app = Router::new()
        .merge(data_routes)
        .merge(refresher_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
