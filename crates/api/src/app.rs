use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use domain::services::{Collaborators, EventProcessor, ProcessorSettings, StaleSessionReaper};
use persistence::repositories::{
    CompanyRepository, DeviceRepository, PgAttendanceStore, ProfileRepository,
};
use shared::jwt::{JwtError, TokenVerifier};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{admin, clock, health, work_sessions};
use crate::services::notification_sink;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub processor: EventProcessor,
    pub reaper: StaleSessionReaper,
    pub verifier: Arc<TokenVerifier>,
}

/// Errors while wiring the application services.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Invalid JWT configuration: {0}")]
    Jwt(#[from] JwtError),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Backends the application runs against.
#[derive(Clone)]
pub struct Services {
    pub collaborators: Collaborators,
    pub verifier: Arc<TokenVerifier>,
}

impl Services {
    /// Postgres-backed collaborators with the configured notification sink.
    pub fn postgres(pool: PgPool, config: &Config) -> Result<Self, StartupError> {
        let verifier = TokenVerifier::from_rsa_pem(&config.jwt.public_key, config.jwt.leeway_secs)?;

        let collaborators = Collaborators {
            profiles: Arc::new(ProfileRepository::new(pool.clone())),
            companies: Arc::new(CompanyRepository::new(pool.clone())),
            devices: Arc::new(DeviceRepository::new(pool.clone())),
            store: Arc::new(PgAttendanceStore::new(pool)),
            notifier: notification_sink(&config.notifications)?,
        };

        Ok(Self {
            collaborators,
            verifier: Arc::new(verifier),
        })
    }
}

impl AppState {
    pub fn new(config: Config, services: Services) -> Self {
        let attendance = &config.attendance;
        let settings = ProcessorSettings {
            geofence_radius_meters: attendance.geofence_radius_meters,
            event_log_policy: attendance.event_log_policy(),
        };
        let reaper = StaleSessionReaper::new(
            services.collaborators.store.clone(),
            attendance.max_session_minutes,
            attendance.reaper_batch_size,
        );

        Self {
            processor: EventProcessor::new(services.collaborators, settings),
            reaper,
            verifier: services.verifier,
            config: Arc::new(config),
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Authenticated routes; the ActingProfile extractor checks the bearer token
    let attendance_routes = Router::new()
        .route("/api/v1/clock/:action", post(clock::register_clock_event))
        .route("/api/v1/work-sessions", get(work_sessions::list_work_sessions))
        .route(
            "/api/v1/work-sessions/current",
            get(work_sessions::current_work_session),
        )
        .route(
            "/api/v1/admin/work-sessions/auto-close",
            post(admin::auto_close_work_sessions),
        );

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(attendance_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
