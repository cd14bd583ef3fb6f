//! Service wiring and in-memory stores.
//!
//! Stores are process-local (dev/test grade): flat collections behind a
//! `Mutex`, scoped lookups where ownership matters. Swapping in a persistent
//! backend is a concern for this file only.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use skyportal_auth::{
    BcryptHasher, Claims, Hs256TokenCodec, PasswordError, PasswordHasher, Role, TokenError,
    UserAccount,
};
use skyportal_core::{BookingId, DomainError, FlightId, UserId};

/// Token lifetime for issued credentials.
const TOKEN_TTL_HOURS: i64 = 12;

// ─────────────────────────────────────────────────────────────────────────────
// Flights
// ─────────────────────────────────────────────────────────────────────────────

/// A flight in the catalog.
///
/// JSON field names are camelCase; they are the wire contract the web client
/// consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub id: FlightId,
    pub code: String,
    pub airline: String,
    pub from: String,
    pub to: String,
    pub depart_at: DateTime<Utc>,
    pub arrive_at: DateTime<Utc>,
    pub price: u64,
    pub status: String,
}

#[derive(Default)]
pub struct FlightStore {
    inner: Mutex<Vec<Flight>>,
}

impl FlightStore {
    pub fn list(&self) -> Vec<Flight> {
        self.inner.lock().unwrap().clone()
    }

    pub fn get(&self, id: FlightId) -> Option<Flight> {
        self.inner.lock().unwrap().iter().find(|f| f.id == id).cloned()
    }

    pub fn insert(&self, flight: Flight) {
        self.inner.lock().unwrap().push(flight);
    }

    pub fn update(&self, id: FlightId, apply: impl FnOnce(&mut Flight)) -> Option<Flight> {
        let mut flights = self.inner.lock().unwrap();
        let flight = flights.iter_mut().find(|f| f.id == id)?;
        apply(flight);
        Some(flight.clone())
    }

    pub fn remove(&self, id: FlightId) -> bool {
        let mut flights = self.inner.lock().unwrap();
        let before = flights.len();
        flights.retain(|f| f.id != id);
        flights.len() != before
    }

    /// Search by route, optionally narrowed to a departure date.
    ///
    /// Airport codes compare case-insensitively (the client sends whatever
    /// the user typed).
    pub fn search(&self, from: &str, to: &str, date: Option<NaiveDate>) -> Vec<Flight> {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .filter(|f| {
                f.from.eq_ignore_ascii_case(from)
                    && f.to.eq_ignore_ascii_case(to)
                    && date.map_or(true, |d| f.depart_at.date_naive() == d)
            })
            .cloned()
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Bookings
// ─────────────────────────────────────────────────────────────────────────────

/// Booking lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

/// A booking a user holds against a flight.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    /// Owning user; bookings are only ever visible to their owner.
    #[serde(skip_serializing)]
    pub owner: UserId,
    pub flight_id: FlightId,
    pub passenger_name: String,
    pub passenger_email: String,
    pub passenger_phone: String,
    pub seat_preference: String,
    pub status: BookingStatus,
    pub booking_date: DateTime<Utc>,
}

#[derive(Default)]
pub struct BookingStore {
    inner: Mutex<HashMap<BookingId, Booking>>,
}

impl BookingStore {
    pub fn insert(&self, booking: Booking) {
        self.inner.lock().unwrap().insert(booking.id, booking);
    }

    /// Owner-scoped lookup: another user's booking reads as absent.
    pub fn get(&self, owner: UserId, id: BookingId) -> Option<Booking> {
        self.inner
            .lock()
            .unwrap()
            .get(&id)
            .filter(|b| b.owner == owner)
            .cloned()
    }

    pub fn list_for(&self, owner: UserId) -> Vec<Booking> {
        let mut bookings: Vec<Booking> = self
            .inner
            .lock()
            .unwrap()
            .values()
            .filter(|b| b.owner == owner)
            .cloned()
            .collect();
        bookings.sort_by_key(|b| b.booking_date);
        bookings
    }

    pub fn update(
        &self,
        owner: UserId,
        id: BookingId,
        apply: impl FnOnce(&mut Booking),
    ) -> Option<Booking> {
        let mut bookings = self.inner.lock().unwrap();
        let booking = bookings.get_mut(&id).filter(|b| b.owner == owner)?;
        apply(booking);
        Some(booking.clone())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct UserStore {
    inner: Mutex<HashMap<String, UserAccount>>,
}

impl UserStore {
    /// Insert a new account, keyed by normalized email.
    pub fn insert(&self, account: UserAccount) -> Result<(), DomainError> {
        let mut users = self.inner.lock().unwrap();
        if users.contains_key(&account.email) {
            return Err(DomainError::conflict("email already registered"));
        }
        users.insert(account.email.clone(), account);
        Ok(())
    }

    pub fn find_by_email(&self, email: &str) -> Option<UserAccount> {
        let email = email.trim().to_lowercase();
        self.inner.lock().unwrap().get(&email).cloned()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Admin credentials
// ─────────────────────────────────────────────────────────────────────────────

/// Configured admin login (no account row; the identity is synthetic and
/// lives for the process).
pub struct AdminCredentials {
    username: String,
    password_hash: String,
    admin_id: UserId,
}

impl AdminCredentials {
    pub fn new(username: String, password_hash: String) -> Self {
        Self {
            username,
            password_hash,
            admin_id: UserId::new(),
        }
    }

    pub fn admin_id(&self) -> UserId {
        self.admin_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn verify(
        &self,
        hasher: &dyn PasswordHasher,
        username: &str,
        password: &str,
    ) -> Result<bool, PasswordError> {
        if username != self.username {
            return Ok(false);
        }
        hasher.verify(password, &self.password_hash)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AppServices
// ─────────────────────────────────────────────────────────────────────────────

pub struct AppServices {
    pub users: UserStore,
    pub flights: FlightStore,
    pub bookings: BookingStore,
    pub hasher: BcryptHasher,
    pub tokens: Arc<Hs256TokenCodec>,
    pub admin: AdminCredentials,
}

impl AppServices {
    pub fn new(tokens: Arc<Hs256TokenCodec>, admin: AdminCredentials) -> Self {
        Self {
            users: UserStore::default(),
            flights: FlightStore::default(),
            bookings: BookingStore::default(),
            hasher: BcryptHasher::default(),
            tokens,
            admin,
        }
    }

    /// Mint a bearer token for a resolved identity.
    pub fn issue_token(
        &self,
        user_id: UserId,
        email: &str,
        roles: Vec<Role>,
    ) -> Result<String, TokenError> {
        let claims = Claims::new(
            user_id,
            email,
            roles,
            Utc::now(),
            chrono::Duration::hours(TOKEN_TTL_HOURS),
        );
        self.tokens.issue(&claims)
    }
}
