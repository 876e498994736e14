//! Listings Marketplace Service - Main Application Entry Point
//!
//! REST API behind the public listings site and the admin panel. The public
//! site browses listings (filtered and split into premium / vip / normal
//! tiers), comments, stories and chats with the operator; the admin panel
//! manages all of it behind an API key.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Authentication**: Admin API key with SHA-256 hashing
//! - **Realtime**: In-process broadcast hub exposed as Server-Sent Events
//! - **Format**: JSON requests/responses
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool
//! 3. Run database migrations
//! 4. Register the bootstrap admin key, if configured
//! 5. Start the expired-story purge task
//! 6. Build HTTP router with routes and middleware
//! 7. Start server on configured port

mod config;
mod db;
mod error;
mod extract;
mod handlers;
mod middleware;
mod models;
mod services;
mod state;

use std::time::Duration;

use tracing_subscriber::EnvFilter;

use axum::{
    Router,
    http::StatusCode,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the full HTTP router.
///
/// Public routes live under `/api/v1`, admin routes under `/admin/v1` behind
/// the admin key middleware.
fn build_router(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.config.request_timeout_secs);

    let public_routes = Router::new()
        .route("/api/v1/listings", get(handlers::listings::list_listings))
        .route(
            "/api/v1/listings/{id}",
            get(handlers::listings::get_listing),
        )
        .route(
            "/api/v1/listings/{id}/comments",
            get(handlers::comments::list_comments).post(handlers::comments::create_comment),
        )
        .route(
            "/api/v1/listings/{id}/conversations",
            post(handlers::chat::start_conversation),
        )
        .route(
            "/api/v1/conversations/{id}/messages",
            get(handlers::chat::get_messages).post(handlers::chat::send_visitor_message),
        )
        .route(
            "/api/v1/conversations/{id}/stream",
            get(handlers::chat::stream_messages),
        )
        .route("/api/v1/categories", get(handlers::catalog::list_categories))
        .route("/api/v1/cities", get(handlers::catalog::list_cities))
        .route("/api/v1/stories", get(handlers::stories::list_stories));

    let admin_routes = Router::new()
        // Listings
        .route(
            "/admin/v1/listings",
            get(handlers::listings::admin_list_listings).post(handlers::listings::create_listing),
        )
        .route(
            "/admin/v1/listings/{id}",
            get(handlers::listings::admin_get_listing)
                .put(handlers::listings::update_listing)
                .delete(handlers::listings::delete_listing),
        )
        // Catalog
        .route(
            "/admin/v1/categories",
            post(handlers::catalog::create_category),
        )
        .route(
            "/admin/v1/categories/{id}",
            axum::routing::delete(handlers::catalog::delete_category),
        )
        .route("/admin/v1/cities", post(handlers::catalog::create_city))
        .route(
            "/admin/v1/cities/{id}",
            axum::routing::delete(handlers::catalog::delete_city),
        )
        // Comment moderation
        .route(
            "/admin/v1/comments/pending",
            get(handlers::comments::list_pending),
        )
        .route(
            "/admin/v1/comments/{id}/approve",
            post(handlers::comments::approve_comment),
        )
        .route(
            "/admin/v1/comments/{id}",
            axum::routing::delete(handlers::comments::delete_comment),
        )
        // Chat inbox
        .route(
            "/admin/v1/conversations",
            get(handlers::chat::list_conversations),
        )
        .route(
            "/admin/v1/conversations/{id}/messages",
            post(handlers::chat::send_admin_reply),
        )
        .route(
            "/admin/v1/conversations/{id}/read",
            post(handlers::chat::mark_read),
        )
        // Stories
        .route("/admin/v1/stories", post(handlers::stories::create_story))
        .route(
            "/admin/v1/stories/{id}",
            axum::routing::delete(handlers::stories::delete_story),
        )
        // Housekeeping
        .route(
            "/admin/v1/notifications",
            get(handlers::admin::notifications),
        )
        .route(
            "/admin/v1/keys",
            get(handlers::admin::list_keys).post(handlers::admin::create_key),
        )
        .route(
            "/admin/v1/keys/{id}",
            axum::routing::delete(handlers::admin::revoke_key),
        )
        // Apply authentication middleware to all routes in this group
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::admin_auth_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(public_routes)
        .merge(admin_routes)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env()?;
    config.validate()?;
    tracing::info!("Configuration loaded");

    let pool = db::create_pool(&config.database_url, config.database_max_connections).await?;
    tracing::info!("Database pool created");

    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    if let Some(ref key) = config.admin_bootstrap_key {
        if services::api_key_service::ensure_bootstrap_key(&pool, key).await? {
            tracing::info!("Bootstrap admin key registered");
        }
    }

    services::story_service::spawn_purge_task(
        pool.clone(),
        Duration::from_secs(config.story_purge_interval_secs.max(1)),
    );

    let addr = format!("0.0.0.0:{}", config.server_port);
    let state = AppState::new(pool, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    /// State whose pool never connects; only usable for requests rejected
    /// before any query runs.
    fn offline_state() -> AppState {
        let config: config::Config = envy::from_iter(vec![(
            "DATABASE_URL".to_string(),
            "postgres://localhost:1/unused".to_string(),
        )])
        .unwrap();

        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();

        AppState::new(pool, config)
    }

    async fn error_body(response: axum::response::Response) -> serde_json::Value {
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("application/json"), "{content_type}");

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn error_code(response: axum::response::Response) -> String {
        error_body(response).await["error"]["code"]
            .as_str()
            .unwrap()
            .to_string()
    }

    fn post_json(uri: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn admin_routes_require_bearer_key() {
        let app = build_router(offline_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/admin/v1/listings")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(response).await, "invalid_api_key");
    }

    #[tokio::test]
    async fn admin_routes_reject_non_bearer_scheme() {
        let app = build_router(offline_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/admin/v1/cities")
                    .header("Authorization", "Basic YWRtaW46YWRtaW4=")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"name":"Ankara"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_filter_value_is_bad_request() {
        let app = build_router(offline_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/listings?city=all&height=giant")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_code(response).await, "invalid_request");
    }

    #[tokio::test]
    async fn malformed_listing_id_is_rejected() {
        let app = build_router(offline_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/listings/not-a-uuid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = error_body(response).await;
        assert_eq!(body["error"]["code"], "invalid_request");
        assert!(body["error"]["message"].as_str().unwrap().contains("id"));
    }

    #[tokio::test]
    async fn malformed_query_parameter_is_rejected_as_json() {
        let app = build_router(offline_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/stories?listing_id=bad")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_code(response).await, "invalid_request");
    }

    #[tokio::test]
    async fn malformed_json_body_is_rejected_as_json() {
        let app = build_router(offline_state());
        let uri = format!("/api/v1/listings/{}/comments", uuid::Uuid::new_v4());

        let response = app.oneshot(post_json(&uri, "{not json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_code(response).await, "invalid_request");
    }

    #[tokio::test]
    async fn missing_body_field_is_rejected_as_json() {
        let app = build_router(offline_state());
        let uri = format!("/api/v1/listings/{}/comments", uuid::Uuid::new_v4());

        let response = app
            .oneshot(post_json(&uri, r#"{"author_name":"Ece"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = error_body(response).await;
        assert_eq!(body["error"]["code"], "invalid_request");
        assert!(body["error"]["message"].as_str().unwrap().contains("body"));
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let app = build_router(offline_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/unknown")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
