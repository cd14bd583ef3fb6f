use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

use skyportal_api::app::{build_app, AppConfig};
use skyportal_auth::{BcryptHasher, Claims, PasswordHasher, Role};
use skyportal_core::UserId;

const JWT_SECRET: &str = "test-secret";
const ADMIN_PASSWORD: &str = "admin123";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, bound to an ephemeral port. Cost 4 is bcrypt's
        // minimum and keeps the admin hash cheap; production uses the default.
        let admin_password_hash = BcryptHasher::new(4)
            .hash(ADMIN_PASSWORD)
            .expect("failed to hash admin password");

        let app = build_app(AppConfig {
            jwt_secret: JWT_SECRET.to_string(),
            admin_username: "admin".to_string(),
            admin_password_hash,
            cors_origin: "http://localhost:3000".to_string(),
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(roles: Vec<Role>) -> String {
    mint_jwt_issued_at(roles, Utc::now())
}

fn mint_jwt_issued_at(roles: Vec<Role>, issued_at: chrono::DateTime<Utc>) -> String {
    let claims = Claims::new(
        UserId::new(),
        "caller@example.com",
        roles,
        issued_at,
        ChronoDuration::minutes(10),
    );

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn flight_payload() -> serde_json::Value {
    let depart = Utc::now() + ChronoDuration::hours(4);
    let arrive = Utc::now() + ChronoDuration::hours(6);
    json!({
        "code": "AI-101",
        "airline": "Air India",
        "from": "DEL",
        "to": "BOM",
        "departAt": depart.to_rfc3339(),
        "arriveAt": arrive.to_rfc3339(),
        "price": 6500,
    })
}

#[tokio::test]
async fn anonymous_can_browse_flights() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/flights", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/api/flights/search?from=DEL&to=BOM", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn flight_writes_are_gated_by_admin_role() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let url = format!("{}/api/flights", srv.base_url);

    // No credential: unauthenticated, not forbidden.
    let res = client.post(&url).json(&flight_payload()).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthenticated");

    // Authenticated without the role: forbidden.
    let user_token = mint_jwt(vec![]);
    let res = client
        .post(&url)
        .bearer_auth(&user_token)
        .json(&flight_payload())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "forbidden");

    // Admin role: allowed, end to end.
    let admin_token = mint_jwt(vec![Role::ADMIN]);
    let res = client
        .post(&url)
        .bearer_auth(&admin_token)
        .json(&flight_payload())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: serde_json::Value = res.json().await.unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    // Update and delete ride the same admin rules.
    let res = client
        .put(format!("{}/{}", url, id))
        .bearer_auth(&admin_token)
        .json(&flight_payload())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .delete(format!("{}/{}", url, id))
        .bearer_auth(&user_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .delete(format!("{}/{}", url, id))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn bookings_require_authentication_only() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let url = format!("{}/api/bookings/my-bookings", srv.base_url);

    let res = client.get(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // An expired token is treated as no identity at all.
    let expired = mint_jwt_issued_at(vec![], Utc::now() - ChronoDuration::hours(2));
    let res = client.get(&url).bearer_auth(expired).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Any valid identity suffices; no role needed.
    let token = mint_jwt(vec![]);
    let res = client.get(&url).bearer_auth(token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn register_login_and_book_flow() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Register a user; registration is public and returns a usable token.
    let res = client
        .post(format!("{}/api/users/register", srv.base_url))
        .json(&json!({
            "name": "Alice Smith",
            "email": "Alice@Example.com",
            "password": "hunter2",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    let user_token = body["token"].as_str().unwrap().to_string();
    assert_eq!(body["user"]["email"], "alice@example.com");

    // Login with the normalized email works too.
    let res = client
        .post(format!("{}/api/users/login", srv.base_url))
        .json(&json!({ "email": "alice@example.com", "password": "hunter2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(format!("{}/api/users/login", srv.base_url))
        .json(&json!({ "email": "alice@example.com", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Admin seeds a flight.
    let admin_token = mint_jwt(vec![Role::ADMIN]);
    let res = client
        .post(format!("{}/api/flights", srv.base_url))
        .bearer_auth(&admin_token)
        .json(&flight_payload())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let flight: serde_json::Value = res.json().await.unwrap();
    let flight_id = flight["id"].as_str().unwrap().to_string();

    // The user books it.
    let res = client
        .post(format!("{}/api/bookings", srv.base_url))
        .bearer_auth(&user_token)
        .json(&json!({
            "flightId": flight_id,
            "passengerName": "Alice Smith",
            "passengerEmail": "alice@example.com",
            "seatPreference": "Window",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let booking: serde_json::Value = res.json().await.unwrap();
    assert_eq!(booking["status"], "Confirmed");
    let booking_id = booking["id"].as_str().unwrap().to_string();

    // Visible in the owner's list.
    let res = client
        .get(format!("{}/api/bookings/my-bookings", srv.base_url))
        .bearer_auth(&user_token)
        .send()
        .await
        .unwrap();
    let bookings: serde_json::Value = res.json().await.unwrap();
    assert_eq!(bookings.as_array().unwrap().len(), 1);

    // Another authenticated user cannot see it (existence is not revealed).
    let other_token = mint_jwt(vec![]);
    let res = client
        .get(format!("{}/api/bookings/{}", srv.base_url, booking_id))
        .bearer_auth(&other_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Cancelling flips the status.
    let res = client
        .delete(format!("{}/api/bookings/{}", srv.base_url, booking_id))
        .bearer_auth(&user_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let cancelled: serde_json::Value = res.json().await.unwrap();
    assert_eq!(cancelled["status"], "Cancelled");
}

#[tokio::test]
async fn duplicate_registration_is_a_conflict() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let url = format!("{}/api/users/register", srv.base_url);
    let body = json!({
        "name": "Bob",
        "email": "bob@example.com",
        "password": "hunter2",
    });

    let res = client.post(&url).json(&body).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client.post(&url).json(&body).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn admin_login_mints_an_admin_capable_token() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let url = format!("{}/api/admin/login", srv.base_url);

    let res = client
        .post(&url)
        .json(&json!({ "username": "admin", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(&url)
        .json(&json!({ "username": "admin", "password": ADMIN_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let token = body["token"].as_str().unwrap().to_string();

    // The minted token really carries the admin role.
    let res = client
        .post(format!("{}/api/flights", srv.base_url))
        .bearer_auth(&token)
        .json(&flight_payload())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn invalid_bearer_is_anonymous_not_an_error() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Public routes keep working with a garbage credential attached.
    let res = client
        .get(format!("{}/api/flights", srv.base_url))
        .bearer_auth("garbage")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Protected routes see the same request as unauthenticated.
    let res = client
        .get(format!("{}/api/bookings/my-bookings", srv.base_url))
        .bearer_auth("garbage")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn preflight_is_answered_before_the_policy_gate() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // A browser preflight carries no bearer token; it must not 401.
    let res = client
        .request(
            reqwest::Method::OPTIONS,
            format!("{}/api/bookings", srv.base_url),
        )
        .header("Origin", "http://localhost:3000")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "authorization,content-type")
        .send()
        .await
        .unwrap();
    assert!(res.status().is_success());

    let headers = res.headers();
    assert_eq!(
        headers["access-control-allow-origin"],
        "http://localhost:3000"
    );
    assert_eq!(headers["access-control-allow-credentials"], "true");
    assert_eq!(headers["access-control-max-age"], "3600");
    let allowed_methods = headers["access-control-allow-methods"].to_str().unwrap();
    assert!(allowed_methods.contains("POST"));
    assert!(allowed_methods.contains("PATCH"));
}

#[tokio::test]
async fn unmatched_routes_fall_through_to_the_open_default() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
