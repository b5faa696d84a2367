//! Application startup and lifecycle management.

use crate::config::PricingConfig;
use crate::handlers::api_router;
use crate::services::{
    get_metrics, init_metrics, InMemoryStore, PricingCalculator, RegionalResolver,
    SimulationComposer, TemporalRuleService, TierCatalog,
};
use axum::{http::StatusCode, middleware, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: PricingConfig,
    pub catalog: Arc<TierCatalog>,
    pub rules: Arc<TemporalRuleService>,
    pub calculator: Arc<PricingCalculator>,
    pub simulator: Arc<SimulationComposer>,
}

/// Health check endpoint for Docker/K8s liveness probes.
async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "pricing-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Readiness check endpoint for K8s readiness probes.
async fn readiness_check() -> StatusCode {
    StatusCode::OK
}

/// Metrics endpoint for Prometheus scraping.
async fn metrics_handler() -> impl IntoResponse {
    let metrics = get_metrics();
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        metrics,
    )
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
    store: Arc<InMemoryStore>,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: PricingConfig) -> Result<Self, AppError> {
        Self::build_with_store(config, Arc::new(InMemoryStore::new())).await
    }

    /// Build the application against a pre-populated store.
    /// Use this in tests to seed geography and ride references before serving.
    pub async fn build_with_store(
        config: PricingConfig,
        store: Arc<InMemoryStore>,
    ) -> Result<Self, AppError> {
        init_metrics();

        let catalog = Arc::new(TierCatalog::new(store.clone()));
        let rules = Arc::new(TemporalRuleService::new(store.clone()));
        let resolver = Arc::new(RegionalResolver::new(store.clone()));
        let calculator = Arc::new(PricingCalculator::new(store.clone(), resolver));
        let simulator = Arc::new(SimulationComposer::new(
            calculator.clone(),
            rules.clone(),
        ));

        let state = AppState {
            config: config.clone(),
            catalog,
            rules,
            calculator,
            simulator,
        };

        let addr = format!("{}:{}", config.common.host, config.common.port);
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port = port, "Pricing service listener bound");

        Ok(Self {
            port,
            listener,
            state,
            store,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get a handle to the backing store.
    pub fn store(&self) -> Arc<InMemoryStore> {
        self.store.clone()
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = Router::new()
            .route("/health", get(health_check))
            .route("/ready", get(readiness_check))
            .route("/metrics", get(metrics_handler))
            .merge(api_router(self.state))
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn(metrics_middleware))
            .layer(middleware::from_fn(request_id_middleware))
            .layer(CorsLayer::permissive());

        tracing::info!(
            service = "pricing-service",
            version = env!("CARGO_PKG_VERSION"),
            port = self.port,
            "Service ready to accept connections"
        );

        axum::serve(self.listener, router).await.map_err(|e| {
            tracing::error!(error = %e, "HTTP server error");
            std::io::Error::other(format!("HTTP server error: {}", e))
        })
    }
}
