use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use skyportal_auth::{PasswordHasher, UserAccount};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterRequest>,
) -> axum::response::Response {
    if body.password.trim().is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "password cannot be empty",
        );
    }

    let password_hash = match services.hasher.hash(&body.password) {
        Ok(h) => h,
        Err(e) => {
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "hash_error", e.to_string())
        }
    };

    let account = match UserAccount::register(&body.email, &body.name, password_hash) {
        Ok(a) => a,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Err(e) = services.users.insert(account.clone()) {
        return errors::domain_error_to_response(e);
    }

    let token = match services.issue_token(account.id, &account.email, account.roles.clone()) {
        Ok(t) => t,
        Err(e) => {
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "token_error", e.to_string())
        }
    };

    tracing::info!(email = %account.email, "user registered");

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "token": token,
            "user": dto::user_to_json(&account),
        })),
    )
        .into_response()
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    let Some(account) = services.users.find_by_email(&body.email) else {
        return invalid_credentials();
    };

    match services.hasher.verify(&body.password, &account.password_hash) {
        Ok(true) => {}
        Ok(false) => return invalid_credentials(),
        Err(e) => {
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "hash_error", e.to_string())
        }
    }

    let token = match services.issue_token(account.id, &account.email, account.roles.clone()) {
        Ok(t) => t,
        Err(e) => {
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "token_error", e.to_string())
        }
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "token": token,
            "user": dto::user_to_json(&account),
        })),
    )
        .into_response()
}

/// Same response for unknown email and wrong password; login does not reveal
/// which one failed.
fn invalid_credentials() -> axum::response::Response {
    errors::json_error(
        StatusCode::UNAUTHORIZED,
        "invalid_credentials",
        "invalid email or password",
    )
}
