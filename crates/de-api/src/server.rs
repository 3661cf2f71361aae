//! API server implementation.

use axum::{middleware, Router};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[allow(unused_imports)]
use crate::dto::*;
use crate::error::ErrorResponse;
use crate::middleware::{cors_layer, request_id, request_logging, security_headers};
use crate::routes;
use crate::state::AppState;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Address to bind to.
    pub bind_address: SocketAddr,
    /// Enable Swagger UI.
    pub enable_swagger: bool,
    /// Allowed CORS origins; empty defers to the environment.
    pub cors_origins: Vec<String>,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 8080)),
            enable_swagger: true,
            cors_origins: Vec::new(),
        }
    }
}

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::health::readiness_check,
        crate::routes::health::liveness_check,
        crate::routes::register::register,
        crate::routes::register::list_registrations,
        crate::routes::test_sms::send_test_sms,
        crate::routes::test_gmail::send_test_email,
        crate::routes::test_gmail::gmail_status,
        crate::routes::geology::get_geology,
        crate::routes::population::get_population,
        crate::routes::nasa::get_neos,
        crate::routes::debug::debug_status,
        crate::routes::debug::debug_users,
        crate::routes::impact::simulate_impact,
        crate::routes::alerts::run_check,
        crate::routes::alerts::last_check,
        crate::routes::metrics::prometheus_metrics,
    ),
    components(
        schemas(
            HealthResponse,
            TransportHealth,
            RegisterRequest,
            RegisterResponse,
            RegistrationsResponse,
            UserSummary,
            DeliveryResult,
            TestSmsRequest,
            TestEmailRequest,
            GmailStatusResponse,
            GeologyResponse,
            PopulationResponse,
            DebugResponse,
            MonitorStatus,
            DebugUsersResponse,
            ImpactRequest,
            ImpactSite,
            ImpactResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Registration", description = "Impact alert registration"),
        (name = "Testing", description = "Provider test messages"),
        (name = "Lookup", description = "NASA, USGS and Nominatim lookups"),
        (name = "Simulation", description = "Impact physics and risk"),
        (name = "Alerts", description = "Threat monitor"),
        (name = "Debug", description = "Demo diagnostics"),
        (name = "Metrics", description = "System metrics"),
    ),
    info(
        title = "DefendEarth API",
        version = "0.1.0",
        description = "Asteroid impact simulation and planetary defense alerts",
        license(name = "MIT"),
    )
)]
pub struct ApiDoc;

/// API server.
pub struct ApiServer {
    config: ApiServerConfig,
    state: AppState,
}

impl ApiServer {
    /// Creates a new API server.
    pub fn new(state: AppState, config: ApiServerConfig) -> Self {
        Self { config, state }
    }

    /// Creates a new API server with default configuration.
    pub fn with_state(state: AppState) -> Self {
        Self::new(state, ApiServerConfig::default())
    }

    /// Builds the router.
    pub fn router(&self) -> Router {
        routes::health::init_start_time();

        let mut app = routes::create_router(self.state.clone());

        if self.config.enable_swagger {
            app = app.merge(
                SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
            );
        }

        // Innermost first.
        app.layer(middleware::from_fn(security_headers))
            .layer(middleware::from_fn(request_logging))
            .layer(middleware::from_fn(request_id))
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(Some(self.config.cors_origins.as_slice())))
            .layer(CatchPanicLayer::new())
    }

    /// Runs the server until Ctrl+C or SIGTERM.
    pub async fn run(self) -> Result<(), std::io::Error> {
        self.run_until(shutdown_signal()).await
    }

    /// Runs the server with a custom shutdown signal.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), std::io::Error>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let addr = self.config.bind_address;

        info!("Starting API server on {}", addr);

        let listener = TcpListener::bind(addr).await?;

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("API server shut down gracefully");
        Ok(())
    }
}

/// Default shutdown signal handler.
///
/// A handler that cannot be installed never fires; the other one still can.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
