use skyportal_api::app::AppConfig;
use skyportal_auth::{BcryptHasher, PasswordHasher};

#[tokio::main]
async fn main() {
    skyportal_observability::init();

    let jwt_secret = std::env::var("SKYPORTAL_JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("SKYPORTAL_JWT_SECRET not set; using insecure dev default");
        "dev-secret".to_string()
    });

    let admin_username =
        std::env::var("SKYPORTAL_ADMIN_USER").unwrap_or_else(|_| "admin".to_string());
    let admin_password = std::env::var("SKYPORTAL_ADMIN_PASSWORD").unwrap_or_else(|_| {
        tracing::warn!("SKYPORTAL_ADMIN_PASSWORD not set; using insecure dev default");
        "admin123".to_string()
    });

    let cors_origin = std::env::var("SKYPORTAL_CORS_ORIGIN")
        .unwrap_or_else(|_| "http://localhost:3000".to_string());

    let addr = std::env::var("SKYPORTAL_ADDR").unwrap_or_else(|_| "0.0.0.0:7171".to_string());

    let admin_password_hash = BcryptHasher::default()
        .hash(&admin_password)
        .expect("failed to hash admin password");

    let app = skyportal_api::app::build_app(AppConfig {
        jwt_secret,
        admin_username,
        admin_password_hash,
        cors_origin,
    });

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind listen address");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
