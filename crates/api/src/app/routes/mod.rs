use axum::Router;

pub mod admin;
pub mod bookings;
pub mod flights;
pub mod system;
pub mod users;

/// Router for everything under `/api`.
///
/// Handlers carry no authentication or role checks of their own; the policy
/// middleware is the single enforcement point.
pub fn router() -> Router {
    Router::new()
        .nest("/users", users::router())
        .nest("/admin", admin::router())
        .nest("/flights", flights::router())
        .nest("/bookings", bookings::router())
}
