use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use skyportal_auth::UserAccount;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightPayload {
    pub code: String,
    pub airline: String,
    pub from: String,
    pub to: String,
    pub depart_at: DateTime<Utc>,
    pub arrive_at: DateTime<Utc>,
    pub price: u64,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FlightSearchQuery {
    pub from: String,
    pub to: String,
    /// Departure date, `YYYY-MM-DD`.
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub flight_id: String,
    pub passenger_name: String,
    pub passenger_email: String,
    pub passenger_phone: Option<String>,
    pub seat_preference: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingRequest {
    pub passenger_name: Option<String>,
    pub passenger_email: Option<String>,
    pub passenger_phone: Option<String>,
    pub seat_preference: Option<String>,
}

// -------------------------
// Response mapping
// -------------------------

/// Public view of an account (never includes the password hash).
pub fn user_to_json(account: &UserAccount) -> serde_json::Value {
    json!({
        "id": account.id.to_string(),
        "email": account.email,
        "name": account.display_name,
    })
}
