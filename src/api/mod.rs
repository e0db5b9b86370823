use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::auth::gate;
use crate::errors::AppError;
use crate::AppState;

pub mod handlers;

const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "Origin, Accept, Content-Type, X-Requested-With, X-CSRF-Token";
const ALLOW_HEADERS_WITH_AUTH: &str =
    "Origin, Accept, Content-Type, X-Requested-With, X-CSRF-Token, Authorization";

/// Build the full application router.
///
/// `/`, `/echo` and `/data` sit behind the bearer gate when
/// `auth_enabled` is set; `/health` and `/login` are always public.
pub fn router(state: Arc<AppState>) -> Router {
    let allow_headers = if state.config.auth_enabled {
        ALLOW_HEADERS_WITH_AUTH
    } else {
        ALLOW_HEADERS
    };

    Router::new()
        .route("/", gate(&state, get(handlers::index).fallback(not_found)))
        .route("/health", get(handlers::health).fallback(not_found))
        .route("/echo", gate(&state, get(handlers::echo).fallback(not_found)))
        .route(
            "/data",
            gate(&state, post(handlers::add_timestamp).fallback(not_found)),
        )
        .route("/login", post(handlers::login).fallback(not_found))
        .fallback(not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(preflight))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(allow_headers),
        ))
        .layer(middleware::from_fn(request_id_middleware))
}

async fn not_found() -> AppError {
    AppError::NotFound
}

/// Middleware: answers every OPTIONS request with an empty 200 before
/// routing, so preflights never reach the gate.
async fn preflight(req: Request, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    next.run(req).await
}

/// Middleware: injects a unique X-Request-Id into every response.
/// This allows clients to correlate errors with server logs.
async fn request_id_middleware(req: Request, next: Next) -> Response {
    let req_id = uuid::Uuid::new_v4().to_string();
    let mut resp = next.run(req).await;
    if let Ok(val) = HeaderValue::from_str(&req_id) {
        resp.headers_mut().insert("x-request-id", val);
    }
    resp
}
