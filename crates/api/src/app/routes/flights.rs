use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use skyportal_core::FlightId;

use crate::app::{dto, errors};
use crate::app::services::{AppServices, Flight};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/search", get(search))
        .route("/:id", get(get_flight).put(update).delete(remove))
}

pub async fn list(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    (StatusCode::OK, Json(services.flights.list())).into_response()
}

pub async fn search(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::FlightSearchQuery>,
) -> axum::response::Response {
    let results = services.flights.search(&query.from, &query.to, query.date);
    (StatusCode::OK, Json(results)).into_response()
}

pub async fn get_flight(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: FlightId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid flight id"),
    };

    match services.flights.get(id) {
        Some(flight) => (StatusCode::OK, Json(flight)).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "flight not found"),
    }
}

pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::FlightPayload>,
) -> axum::response::Response {
    let flight = Flight {
        id: FlightId::new(),
        code: body.code,
        airline: body.airline,
        from: body.from,
        to: body.to,
        depart_at: body.depart_at,
        arrive_at: body.arrive_at,
        price: body.price,
        status: body.status.unwrap_or_else(|| "Scheduled".to_string()),
    };

    services.flights.insert(flight.clone());
    tracing::info!(code = %flight.code, id = %flight.id, "flight added to catalog");

    (StatusCode::CREATED, Json(flight)).into_response()
}

pub async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::FlightPayload>,
) -> axum::response::Response {
    let id: FlightId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid flight id"),
    };

    let updated = services.flights.update(id, |flight| {
        flight.code = body.code;
        flight.airline = body.airline;
        flight.from = body.from;
        flight.to = body.to;
        flight.depart_at = body.depart_at;
        flight.arrive_at = body.arrive_at;
        flight.price = body.price;
        if let Some(status) = body.status {
            flight.status = status;
        }
    });

    match updated {
        Some(flight) => (StatusCode::OK, Json(flight)).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "flight not found"),
    }
}

pub async fn remove(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: FlightId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid flight id"),
    };

    if services.flights.remove(id) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        errors::json_error(StatusCode::NOT_FOUND, "not_found", "flight not found")
    }
}
