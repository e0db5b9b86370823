use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::MethodRouter,
};
use chrono::{DateTime, Utc};

use super::{AuthOutcome, Rejection, TokenService};
use crate::errors::AppError;
use crate::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Pull the bearer token out of `Authorization` and verify it.
///
/// The prefix match is exact: `bearer x` or `Bearer  x` with two spaces
/// does not count as a bearer header.
pub fn check(headers: &HeaderMap, tokens: &TokenService, now: DateTime<Utc>) -> AuthOutcome {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(Rejection::MissingHeader)?;
    let value = value.to_str().map_err(|_| Rejection::MalformedHeader)?;
    let token = value
        .strip_prefix(BEARER_PREFIX)
        .ok_or(Rejection::MalformedHeader)?;

    tokens.verify(token, now)
}

/// Middleware: runs the wrapped handler only when `check` succeeds,
/// otherwise answers 401 itself.
pub async fn require_bearer(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    match check(req.headers(), &state.tokens, Utc::now()) {
        Ok(claims) => {
            tracing::debug!(username = %claims.username, path = %req.uri().path(), "request authorized");
            next.run(req).await
        }
        Err(rejection) => {
            tracing::warn!(
                method = %req.method(),
                path = %req.uri().path(),
                reason = rejection.reason(),
                "request rejected by auth gate"
            );
            AppError::unauthorized(rejection.message()).into_response()
        }
    }
}

/// Wrap a route so its handlers sit behind `require_bearer`.
///
/// With auth disabled the route is returned untouched. Either way the
/// handler's own success response passes through unchanged.
pub fn gate(
    state: &Arc<AppState>,
    route: MethodRouter<Arc<AppState>>,
) -> MethodRouter<Arc<AppState>> {
    if !state.config.auth_enabled {
        return route;
    }
    route.route_layer(middleware::from_fn_with_state(state.clone(), require_bearer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::body::Body;
    use axum::http::{HeaderValue, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use chrono::Duration;
    use tower::ServiceExt;

    use crate::auth::{Credentials, INVALID_TOKEN, NO_VALID_HEADER};
    use crate::config::Config;

    const SECRET: &str = "gate-secret";

    fn headers_with(auth: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
        headers
    }

    fn state(auth_enabled: bool) -> Arc<AppState> {
        let config = Config {
            auth_enabled,
            ..Config::new(SECRET)
        };
        Arc::new(AppState::new(config, Credentials::new("alice", "correct")))
    }

    // ── check ───────────────────────────────────────────────

    #[test]
    fn test_missing_header() {
        let svc = TokenService::new(SECRET);
        assert_eq!(
            check(&HeaderMap::new(), &svc, Utc::now()),
            Err(Rejection::MissingHeader)
        );
    }

    #[test]
    fn test_wrong_scheme_is_malformed() {
        let svc = TokenService::new(SECRET);
        for value in ["Token xyz", "bearer xyz", "Bearerxyz", "Basic YWxpY2U6Y29ycmVjdA=="] {
            assert_eq!(
                check(&headers_with(value), &svc, Utc::now()),
                Err(Rejection::MalformedHeader),
                "{value}"
            );
        }
    }

    #[test]
    fn test_valid_bearer_token() {
        let svc = TokenService::new(SECRET);
        let now = Utc::now();
        let token = svc.issue("alice", now).unwrap();

        let claims = check(&headers_with(&format!("Bearer {token}")), &svc, now).unwrap();
        assert_eq!(claims.username, "alice");
    }

    #[test]
    fn test_bad_and_expired_tokens() {
        let svc = TokenService::new(SECRET);
        let now = Utc::now();

        assert_eq!(
            check(&headers_with("Bearer nonsense"), &svc, now),
            Err(Rejection::InvalidSignature)
        );

        let old = svc.issue("alice", now - Duration::days(2)).unwrap();
        assert_eq!(
            check(&headers_with(&format!("Bearer {old}")), &svc, now),
            Err(Rejection::Expired)
        );
    }

    #[test]
    fn test_rejection_messages_are_collapsed() {
        assert_eq!(Rejection::MissingHeader.message(), NO_VALID_HEADER);
        assert_eq!(Rejection::MalformedHeader.message(), NO_VALID_HEADER);
        assert_eq!(Rejection::InvalidSignature.message(), INVALID_TOKEN);
        assert_eq!(Rejection::Expired.message(), INVALID_TOKEN);
    }

    // ── gate ────────────────────────────────────────────────

    fn counting_app(state: &Arc<AppState>, hits: Arc<AtomicUsize>) -> Router {
        let handler = move || {
            let hits = hits.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                (StatusCode::ACCEPTED, "inner")
            }
        };
        Router::new()
            .route("/p", gate(state, get(handler)))
            .with_state(state.clone())
    }

    fn get_p(auth: Option<&str>) -> axum::http::Request<Body> {
        let mut builder = axum::http::Request::builder().method("GET").uri("/p");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_gate_blocks_without_invoking_handler() {
        let state = state(true);
        let hits = Arc::new(AtomicUsize::new(0));
        let app = counting_app(&state, hits.clone());

        for auth in [None, Some("Token xyz"), Some("Bearer garbage")] {
            let resp = app.clone().oneshot(get_p(auth)).await.unwrap();
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        }
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_gate_passes_response_through_unchanged() {
        let state = state(true);
        let hits = Arc::new(AtomicUsize::new(0));
        let app = counting_app(&state, hits.clone());
        let token = state.tokens.issue("alice", Utc::now()).unwrap();

        let resp = app
            .oneshot(get_p(Some(&format!("Bearer {token}"))))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"inner");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gate_is_noop_when_auth_disabled() {
        let state = state(false);
        let hits = Arc::new(AtomicUsize::new(0));
        let app = counting_app(&state, hits.clone());

        let resp = app.oneshot(get_p(None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
