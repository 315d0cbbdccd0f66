//! Store redirect service.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::LOCATION, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::Result;
use crate::os_detector::OsDetector;
use crate::redirect::{classify_request, StoreDestinations};
use crate::reporter::{ErrorReport, ErrorReporter};

#[derive(Clone)]
pub struct AppState {
    pub detector: Arc<OsDetector>,
    pub destinations: Arc<StoreDestinations>,
    pub reporter: ErrorReporter,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let detector = match &config.rules_path {
            Some(path) => OsDetector::from_yaml_file(path)?,
            None => OsDetector::new()?,
        };
        let reporter = match &config.error_report_url {
            Some(url) => ErrorReporter::new(url)?,
            None => ErrorReporter::disabled(),
        };
        Ok(Self {
            detector: Arc::new(detector),
            destinations: Arc::new(StoreDestinations::new(&config.store_urls)?),
            reporter,
        })
    }
}

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

pub fn build_app(state: AppState, redirect_path: &str) -> Router {
    Router::new()
        .route(redirect_path, get(store_redirect))
        .route("/health", get(health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

/// Answers every request with `302 Found`. A missing or unrecognized
/// User-Agent lands on the fallback URL.
async fn store_redirect(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let class = classify_request(&state.detector, &headers);
    tracing::info!(os = %class, "store redirect");
    found(state.destinations.for_class(class).clone())
}

fn found(location: HeaderValue) -> Response {
    (StatusCode::FOUND, [(LOCATION, location)]).into_response()
}

async fn health() -> impl IntoResponse {
    Json(HealthData { status: "ok" })
}

/// Middleware that extracts or generates a request ID.
///
/// An incoming `x-request-id` is reused, otherwise a `UUIDv4` is generated.
/// The ID is stored as a [`RequestId`] extension and echoed on the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Bind `config.bind_addr` and serve until Ctrl-C or SIGTERM.
///
/// A bind or accept-loop failure is delivered to the error reporter before
/// it is returned.
pub async fn serve(config: &AppConfig) -> Result<()> {
    let state = AppState::from_config(config)?;
    let reporter = state.reporter.clone();
    let app = build_app(state, &config.redirect_path);

    let result = run(config, app).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "store redirect server stopped");
        if let Err(send_err) = reporter.send(&ErrorReport::from_error(e)).await {
            tracing::warn!(error = %send_err, "error report delivery failed");
        }
    }
    result
}

async fn run(config: &AppConfig, app: Router) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        addr = %config.bind_addr,
        path = %config.redirect_path,
        "store redirect listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
