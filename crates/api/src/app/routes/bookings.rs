use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use skyportal_core::{BookingId, FlightId};

use crate::app::{dto, errors};
use crate::app::services::{AppServices, Booking, BookingStatus};
use crate::context::AuthContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create))
        .route("/my-bookings", get(my_bookings))
        .route("/:id", get(get_booking).patch(update).delete(cancel))
}

pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<dto::CreateBookingRequest>,
) -> axum::response::Response {
    let flight_id: FlightId = match body.flight_id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid flight id"),
    };

    if services.flights.get(flight_id).is_none() {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "flight not found");
    }

    if body.passenger_name.trim().is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "passenger name cannot be empty",
        );
    }

    let booking = Booking {
        id: BookingId::new(),
        owner: auth.user_id(),
        flight_id,
        passenger_name: body.passenger_name.trim().to_string(),
        passenger_email: body
            .passenger_email
            .trim()
            .to_lowercase(),
        passenger_phone: body.passenger_phone.unwrap_or_default(),
        seat_preference: body
            .seat_preference
            .unwrap_or_else(|| "Economy".to_string()),
        status: BookingStatus::Confirmed,
        booking_date: Utc::now(),
    };

    services.bookings.insert(booking.clone());
    tracing::info!(booking = %booking.id, flight = %flight_id, "booking confirmed");

    (StatusCode::CREATED, Json(booking)).into_response()
}

pub async fn my_bookings(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
) -> axum::response::Response {
    let bookings = services.bookings.list_for(auth.user_id());
    (StatusCode::OK, Json(bookings)).into_response()
}

pub async fn get_booking(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: BookingId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid booking id"),
    };

    match services.bookings.get(auth.user_id(), id) {
        Some(booking) => (StatusCode::OK, Json(booking)).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "booking not found"),
    }
}

pub async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateBookingRequest>,
) -> axum::response::Response {
    let id: BookingId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid booking id"),
    };

    let updated = services.bookings.update(auth.user_id(), id, |booking| {
        if let Some(name) = body.passenger_name {
            booking.passenger_name = name;
        }
        if let Some(email) = body.passenger_email {
            booking.passenger_email = email;
        }
        if let Some(phone) = body.passenger_phone {
            booking.passenger_phone = phone;
        }
        if let Some(seat) = body.seat_preference {
            booking.seat_preference = seat;
        }
    });

    match updated {
        Some(booking) => (StatusCode::OK, Json(booking)).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "booking not found"),
    }
}

pub async fn cancel(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: BookingId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid booking id"),
    };

    let cancelled = services
        .bookings
        .update(auth.user_id(), id, |booking| {
            booking.status = BookingStatus::Cancelled;
        });

    match cancelled {
        Some(booking) => {
            tracing::info!(booking = %booking.id, "booking cancelled");
            (StatusCode::OK, Json(booking)).into_response()
        }
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "booking not found"),
    }
}
