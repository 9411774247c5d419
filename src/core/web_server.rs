//! HTTP surface: the inbound webhook plus operational endpoints.
//!
//! The webhook endpoint always answers 200 "ok" — a non-success status would
//! make the platform retry the delivery, so malformed bodies and handler
//! failures are absorbed upstream of the response.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::error::AppResult;
use crate::telegram::dispatcher::{dispatch, HandlerDeps};
use crate::telegram::update::Event;

/// Builds the application router. Exposed separately from
/// [`start_web_server`] so tests can drive it without a socket.
pub fn router(deps: HandlerDeps) -> Router {
    Router::new()
        .route("/webhook", post(webhook_handler))
        .route("/health", get(health_handler))
        .route("/set_webhook", post(set_webhook_handler))
        .route("/delete_webhook", post(delete_webhook_handler))
        .with_state(deps)
}

/// Start the web server and block until shutdown.
pub async fn start_web_server(port: u16, deps: HandlerDeps) -> AppResult<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(deps);

    log::info!("Starting web server on http://{}", addr);
    log::info!("  POST /webhook        - Telegram update delivery");
    log::info!("  GET  /health         - Health check");
    log::info!("  POST /set_webhook    - Register the configured HTTPS_URL");
    log::info!("  POST /delete_webhook - Deregister the webhook");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {err}");
        return;
    }
    log::info!("Shutdown signal received, stopping web server");
}

/// POST /webhook — parse, dispatch, and acknowledge no matter what.
async fn webhook_handler(State(deps): State<HandlerDeps>, body: Bytes) -> &'static str {
    let event = Event::parse(&body);
    dispatch(event, &deps).await;
    "ok"
}

/// GET /health — simple health check.
async fn health_handler() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

/// POST /set_webhook — register the configured public URL with the platform.
async fn set_webhook_handler(State(deps): State<HandlerDeps>) -> Response {
    let Some(url) = deps.config.webhook_url.clone() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "ok": false, "error": "HTTPS_URL is not configured" })),
        )
            .into_response();
    };

    match deps.gateway.set_webhook(&url).await {
        Ok(raw) => Json(raw).into_response(),
        Err(err) => {
            log::error!("setWebhook call failed: {err}");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "ok": false, "error": err.to_string() })),
            )
                .into_response()
        }
    }
}

/// POST /delete_webhook — deregister the webhook with the platform.
async fn delete_webhook_handler(State(deps): State<HandlerDeps>) -> Response {
    match deps.gateway.delete_webhook().await {
        Ok(raw) => Json(raw).into_response(),
        Err(err) => {
            log::error!("deleteWebhook call failed: {err}");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "ok": false, "error": err.to_string() })),
            )
                .into_response()
        }
    }
}
