//! HTTP API for the registration service.

mod handlers;
mod middleware;
mod types;

pub use handlers::*;
pub use middleware::{logging_middleware, rate_limit_middleware, RateLimitState};
pub use types::*;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use registration_store::RegistrationStore;
use tower_http::trace::TraceLayer;

/// Period during which submissions are accepted.
#[derive(Debug, Clone, Copy)]
pub struct RegistrationWindow {
    /// First day submissions are accepted
    pub opens_on: NaiveDate,
}

impl RegistrationWindow {
    pub fn opening_on(opens_on: NaiveDate) -> Self {
        Self { opens_on }
    }

    /// Window that is already open.
    pub fn always_open() -> Self {
        Self {
            opens_on: NaiveDate::MIN,
        }
    }

    pub fn is_open(&self, today: NaiveDate) -> bool {
        today >= self.opens_on
    }
}

/// Shared application state, built once at startup and handed to every
/// handler.
#[derive(Clone)]
pub struct AppState {
    /// Accepted registrations
    pub registrations: RegistrationStore,
    /// When submissions open
    pub window: RegistrationWindow,
}

impl AppState {
    /// Create new application state.
    pub fn new(registrations: RegistrationStore, window: RegistrationWindow) -> Self {
        Self {
            registrations,
            window,
        }
    }
}

/// Create the API router with default rate limiting.
pub fn create_router(state: AppState) -> Router {
    create_router_with_rate_limit(state, RateLimitState::new(60))
}

/// Create the API router with custom rate limiting.
pub fn create_router_with_rate_limit(state: AppState, rate_limit: RateLimitState) -> Router {
    let limited = Router::new()
        .route(
            "/v1/registrations",
            post(handlers::submit_json).get(handlers::list_registrations),
        )
        .route("/v1/registrations/form", post(handlers::submit_form))
        .route("/v1/registrations/:cpf", get(handlers::get_registration))
        .route("/v1/cpf/:cpf", get(handlers::check_cpf))
        .route_layer(axum_middleware::from_fn_with_state(
            rate_limit,
            rate_limit_middleware,
        ));

    Router::new()
        // Health check (no rate limiting)
        .route("/health", get(handlers::health))
        .merge(limited)
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
