use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::auth::cookies;
use crate::auth::session::SessionStore;
use crate::errors::AppError;
use crate::state::AppState;

/// Per-request identity context, built from the incoming cookies before any
/// handler logic runs. There is no framework-global login state; handlers
/// receive this explicitly.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Resolved user id, `None` for anonymous requests. Invalid, expired,
    /// or tampered session cookies land here as `None`, never as an error.
    pub current_user_id: Option<i64>,
    /// Raw session cookie value, kept so logout can destroy the binding
    /// even when it no longer resolves to a user.
    pub session_id: Option<String>,
    /// The CSRF token cookie accompanying this request, if any.
    pub csrf_cookie: Option<String>,
}

impl RequestContext {
    pub fn from_headers(headers: &HeaderMap, sessions: &SessionStore) -> Self {
        let session_id = cookies::get(headers, cookies::SESSION_COOKIE);
        let csrf_cookie = cookies::get(headers, cookies::CSRF_COOKIE);
        let current_user_id = session_id
            .as_deref()
            .and_then(|sid| sessions.current_identity(sid));
        Self {
            current_user_id,
            session_id,
            csrf_cookie,
        }
    }

    /// Typed gate for handlers that need an authenticated caller.
    pub fn require_user(&self) -> Result<i64, AppError> {
        self.current_user_id.ok_or(AppError::Unauthorized)
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for RequestContext {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers, &state.sessions))
    }
}

/// Middleware guard composed in front of protected routers: anonymous
/// requests are rejected with the fixed unauthorized payload before the
/// handler is reached.
pub async fn require_login(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ctx = RequestContext::from_headers(req.headers(), &state.sessions);
    if ctx.current_user_id.is_none() {
        tracing::warn!("Rejected unauthenticated request to {}", req.uri().path());
        return Err(AppError::Unauthorized);
    }
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn no_cookies_means_anonymous() {
        let sessions = SessionStore::new(1);
        let ctx = RequestContext::from_headers(&HeaderMap::new(), &sessions);
        assert_eq!(ctx.current_user_id, None);
        assert_eq!(ctx.session_id, None);
        assert!(ctx.require_user().is_err());
    }

    #[test]
    fn valid_session_cookie_resolves_the_user() {
        let sessions = SessionStore::new(1);
        let sid = sessions.login(7);
        let headers = headers_with_cookie(&format!("session={}; csrf_token=tok", sid));
        let ctx = RequestContext::from_headers(&headers, &sessions);
        assert_eq!(ctx.current_user_id, Some(7));
        assert_eq!(ctx.csrf_cookie.as_deref(), Some("tok"));
        assert_eq!(ctx.require_user().unwrap(), 7);
    }

    #[test]
    fn tampered_session_cookie_is_anonymous_not_an_error() {
        let sessions = SessionStore::new(1);
        sessions.login(7);
        let headers = headers_with_cookie("session=forged-session-id");
        let ctx = RequestContext::from_headers(&headers, &sessions);
        assert_eq!(ctx.current_user_id, None);
        // The raw cookie is still available so logout can clear it.
        assert_eq!(ctx.session_id.as_deref(), Some("forged-session-id"));
    }
}
