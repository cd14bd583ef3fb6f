use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use skyportal_auth::Role;

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/login", post(login))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::AdminLoginRequest>,
) -> axum::response::Response {
    let ok = match services
        .admin
        .verify(&services.hasher, &body.username, &body.password)
    {
        Ok(ok) => ok,
        Err(e) => {
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "hash_error", e.to_string())
        }
    };

    if !ok {
        return errors::json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "invalid admin credentials",
        );
    }

    let token = match services.issue_token(
        services.admin.admin_id(),
        services.admin.username(),
        vec![Role::ADMIN],
    ) {
        Ok(t) => t,
        Err(e) => {
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "token_error", e.to_string())
        }
    };

    tracing::info!(username = %services.admin.username(), "admin logged in");

    (StatusCode::OK, Json(serde_json::json!({ "token": token }))).into_response()
}
