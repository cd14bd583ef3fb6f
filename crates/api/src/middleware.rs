use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use skyportal_auth::{Decision, DenyReason, Policy, RequestContext, Role, TokenDecoder};

use crate::app::errors::json_error;
use crate::context::AuthContext;

#[derive(Clone)]
pub struct AuthState {
    pub decoder: Arc<dyn TokenDecoder>,
    pub policy: Arc<Policy>,
}

/// Resolve the caller's identity from the `Authorization` header.
///
/// Never rejects: a missing or unverifiable credential leaves the request
/// anonymous. Whether anonymity is acceptable for the route is the policy
/// layer's decision, not this one's.
pub async fn resolve_identity(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    if let Some(token) = extract_bearer(req.headers()) {
        match state.decoder.decode(token, Utc::now()) {
            Ok(claims) => {
                req.extensions_mut().insert(AuthContext::from(claims));
            }
            Err(e) => {
                tracing::debug!(error = %e, "discarding unverifiable bearer credential");
            }
        }
    }

    next.run(req).await
}

/// Enforce the access policy for every request.
///
/// Must run after `resolve_identity`: the resolved identity is an input to
/// the decision.
pub async fn enforce_policy(
    State(state): State<AuthState>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let decision = {
        let identity = req.extensions().get::<AuthContext>();
        let roles: &[Role] = identity.map(AuthContext::roles).unwrap_or(&[]);

        state.policy.evaluate(&RequestContext {
            method: req.method(),
            path: req.uri().path(),
            authenticated: identity.is_some(),
            roles,
        })
    };

    match decision {
        Decision::Allow => next.run(req).await,
        Decision::Deny(reason) => {
            tracing::debug!(
                method = %req.method(),
                path = req.uri().path(),
                reason = reason.as_str(),
                "request denied by access policy"
            );

            let (status, message) = match reason {
                DenyReason::Unauthenticated => {
                    (StatusCode::UNAUTHORIZED, "authentication required")
                }
                DenyReason::Forbidden => (StatusCode::FORBIDDEN, "insufficient role"),
            };
            json_error(status, reason.as_str(), message)
        }
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;

    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }

    Some(token)
}
