#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the restaurant safety application.
//!
//! Serves the read-only REST API used by the browser client: restaurant
//! search, inspection and safety scores, crimes near a restaurant, and
//! comparable nearby restaurants. All data comes from the `SQLite` store
//! produced by the ingestion pipeline, opened in query-only mode at
//! `DATABASE_PATH`.

pub mod audit;
mod error;
mod handlers;
pub mod interactive;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use restaurant_safety_database::{RestaurantStore, SqlRestaurantStore, db};
use restaurant_safety_query::{QueryError, RestaurantQueries};

pub use error::Endpoint;

/// Request timeout used when `REQUEST_TIMEOUT_SECS` is unset or invalid.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared application state.
pub struct AppState {
    /// Query orchestrator over the restaurant store.
    pub queries: RestaurantQueries,
    /// Upper bound on the time spent answering one request.
    pub request_timeout: Duration,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn RestaurantStore>, request_timeout: Duration) -> Self {
        Self {
            queries: RestaurantQueries::new(store),
            request_timeout,
        }
    }

    /// Runs one orchestrated query under the request timeout.
    ///
    /// # Errors
    ///
    /// Returns the query's own error, or [`QueryError::Timeout`] if it did
    /// not finish in time.
    pub async fn run<T, F>(&self, query: F) -> Result<T, QueryError>
    where
        F: Future<Output = Result<T, QueryError>>,
    {
        tokio::time::timeout(self.request_timeout, query)
            .await
            .map_err(|_| QueryError::Timeout(self.request_timeout))?
    }
}

/// Reads `REQUEST_TIMEOUT_SECS`, falling back to
/// [`DEFAULT_REQUEST_TIMEOUT`].
#[must_use]
pub fn request_timeout_from_env() -> Duration {
    std::env::var("REQUEST_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|&secs| secs > 0)
        .map_or(DEFAULT_REQUEST_TIMEOUT, Duration::from_secs)
}

/// Registers every API route on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .route("/health", web::get().to(handlers::health))
        .route("/searchRestaurant", web::get().to(handlers::search_restaurant))
        .route("/getRestaurantInfo", web::get().to(handlers::restaurant_info))
        .route("/getInspectionScore", web::get().to(handlers::inspection_score))
        .route("/getSafetyScore", web::get().to(handlers::safety_score))
        .route("/getDangerScore", web::get().to(handlers::danger_score))
        .route("/getCrimeNearRes", web::get().to(handlers::crime_near_restaurant))
        .route(
            "/getRestaurantInspection",
            web::get().to(handlers::restaurant_inspection),
        )
        .route("/getNearbyRestaurant", web::get().to(handlers::nearby_restaurant))
        .route(
            "/getRestaurantOverallScore",
            web::get().to(handlers::overall_score),
        )
        .route(
            "/getRestaurantSummary",
            web::get().to(handlers::restaurant_summary),
        )
        .route("/getCrimeByID", web::get().to(handlers::crime_by_id))
        .route("/getCrimeRankByID", web::get().to(handlers::crime_rank_by_id));
}

/// Starts the restaurant safety API server.
///
/// Opens the store at `DATABASE_PATH` and serves the API on
/// `BIND_ADDR:PORT`. This is a regular async function; the caller is
/// responsible for providing the async runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
///
/// # Panics
///
/// Panics if the database cannot be opened.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    log::info!("Opening restaurant database...");
    let db_conn = db::connect_from_env()
        .await
        .expect("Failed to open restaurant database");

    let request_timeout = request_timeout_from_env();
    let state = web::Data::new(AppState::new(
        Arc::new(SqlRestaurantStore::new(Arc::from(db_conn))),
        request_timeout,
    ));

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!(
        "Starting server on {bind_addr}:{port} (request timeout {}s)",
        request_timeout.as_secs()
    );

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
