//! HTTP API application wiring (axum router + service wiring).
//!
//! This folder is structured like:
//! - `services.rs`: stores and credential/token plumbing
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Extension, Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, CorsLayer};
use tower_http::trace::TraceLayer;

use skyportal_auth::{
    Hs256TokenCodec, MethodMatch, Policy, Requirement, Role,
};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Runtime configuration, resolved by `main.rs` (env vars) or tests.
pub struct AppConfig {
    pub jwt_secret: String,
    pub admin_username: String,
    /// bcrypt hash of the admin password.
    pub admin_password_hash: String,
    pub cors_origin: String,
}

/// The production access rule table, in evaluation order.
///
/// First match wins: the public GET rule for flights is deliberately listed
/// before the admin-only write rules covering the same paths. The fallback is
/// open so routes outside `/api` (health) stay reachable.
fn access_policy() -> Policy {
    Policy::builder()
        .route(
            MethodMatch::Exact(Method::POST),
            "/api/users/register",
            Requirement::Public,
        )
        .route(
            MethodMatch::Exact(Method::POST),
            "/api/users/login",
            Requirement::Public,
        )
        .route(
            MethodMatch::Exact(Method::POST),
            "/api/admin/login",
            Requirement::Public,
        )
        .route(
            MethodMatch::Exact(Method::GET),
            "/api/flights/**",
            Requirement::Public,
        )
        .route(
            MethodMatch::Exact(Method::POST),
            "/api/flights/**",
            Requirement::HasRole(Role::ADMIN),
        )
        .route(
            MethodMatch::Exact(Method::PUT),
            "/api/flights/**",
            Requirement::HasRole(Role::ADMIN),
        )
        .route(
            MethodMatch::Exact(Method::DELETE),
            "/api/flights/**",
            Requirement::HasRole(Role::ADMIN),
        )
        .route(
            MethodMatch::Any,
            "/api/bookings/**",
            Requirement::Authenticated,
        )
        .fallback(Requirement::Public)
        .build()
}

/// CORS for the browser client.
///
/// Credentialed requests forbid wildcard headers, so allowed headers mirror
/// the preflight request instead.
fn cors_layer(origin: &str) -> CorsLayer {
    let origin = match origin.parse::<HeaderValue>() {
        Ok(v) => v,
        Err(_) => {
            tracing::warn!(origin, "invalid CORS origin; falling back to http://localhost:3000");
            HeaderValue::from_static("http://localhost:3000")
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
            Method::PATCH,
        ])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(config: AppConfig) -> Router {
    let codec = Arc::new(Hs256TokenCodec::new(config.jwt_secret.as_bytes()));

    let auth_state = middleware::AuthState {
        decoder: codec.clone(),
        policy: Arc::new(access_policy()),
    };

    let services = Arc::new(services::AppServices::new(
        codec,
        services::AdminCredentials::new(config.admin_username, config.admin_password_hash),
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", routes::router())
        .layer(
            // ServiceBuilder order is outermost-first: tracing, then CORS
            // (preflights must never hit the policy gate), then identity
            // resolution, then policy enforcement, which needs the resolved
            // identity.
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config.cors_origin))
                .layer(axum::middleware::from_fn_with_state(
                    auth_state.clone(),
                    middleware::resolve_identity,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth_state,
                    middleware::enforce_policy,
                ))
                .layer(Extension(services)),
        )
}
