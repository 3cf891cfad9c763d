use std::fmt::Write as _;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE, SET_COOKIE};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;
use rand::RngCore;
use serde_json::Value;

use crate::auth::cookies;
use crate::errors::AppError;
use crate::state::AppState;

/// Generate a fresh 256-bit CSRF token, hex encoded.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    let mut token = String::with_capacity(64);
    for b in &bytes {
        let _ = write!(&mut token, "{:02x}", b);
    }
    token
}

/// Double-submit comparison: the token sent with the request must equal the
/// one the client's cookie already carries. No server-side token state.
pub fn verify(cookie_token: Option<&str>, submitted: Option<&str>) -> Result<(), AppError> {
    match (cookie_token, submitted) {
        (Some(expected), Some(provided)) if expected == provided => Ok(()),
        _ => Err(AppError::Csrf),
    }
}

fn is_safe_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

/// Request-side guard for every state-changing method.
///
/// The submitted token is read from the JSON body's `csrf_token` field,
/// with the `X-CSRF-Token` header as the SPA fallback, and must match the
/// `csrf_token` cookie. Runs in front of the handlers, so a mismatch
/// rejects before any credential or store work.
pub async fn verify_request(req: Request, next: Next) -> Result<Response, AppError> {
    if is_safe_method(req.method()) {
        return Ok(next.run(req).await);
    }

    let cookie_token = cookies::get(req.headers(), cookies::CSRF_COOKIE);
    let header_token = req
        .headers()
        .get("x-csrf-token")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let (parts, body) = req.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|e| AppError::Internal(format!("failed to read request body: {}", e)))?;

    let submitted = serde_json::from_slice::<Value>(&bytes)
        .ok()
        .and_then(|v| {
            v.get("csrf_token")
                .and_then(|t| t.as_str())
                .map(str::to_string)
        })
        .or(header_token);

    verify(cookie_token.as_deref(), submitted.as_deref())?;

    let req = Request::from_parts(parts, Body::from(bytes));
    Ok(next.run(req).await)
}

/// Response-side issuer: every response gets a fresh token cookie, and JSON
/// object bodies additionally carry the token as a `csrf_token` field so
/// the frontend never has to read the HTTP-only cookie.
pub async fn attach_token(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    let token = generate_token();

    let (mut parts, body) = response.into_parts();
    parts
        .headers
        .append(SET_COOKIE, cookies::csrf_cookie(&token, &state.config));

    let is_json = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false);

    if !is_json {
        return Response::from_parts(parts, body);
    }

    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("Failed to buffer response body for CSRF injection: {}", e);
            return Response::from_parts(parts, Body::empty());
        }
    };

    let rewritten = match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(mut map)) => {
            map.insert("csrf_token".to_string(), Value::String(token));
            serde_json::to_vec(&Value::Object(map)).ok()
        }
        // Arrays and scalars pass through untouched.
        _ => None,
    };

    let bytes = match rewritten {
        Some(new_body) => new_body,
        None => bytes.to_vec(),
    };
    parts
        .headers
        .insert(CONTENT_LENGTH, axum::http::HeaderValue::from(bytes.len() as u64));
    Response::from_parts(parts, Body::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_hex_and_distinct() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn verify_requires_both_copies_to_match() {
        assert!(verify(Some("tok"), Some("tok")).is_ok());
        assert!(matches!(
            verify(Some("tok"), Some("other")),
            Err(AppError::Csrf)
        ));
        assert!(matches!(verify(Some("tok"), None), Err(AppError::Csrf)));
        assert!(matches!(verify(None, Some("tok")), Err(AppError::Csrf)));
        assert!(matches!(verify(None, None), Err(AppError::Csrf)));
    }

    #[test]
    fn safe_methods_are_exempt() {
        assert!(is_safe_method(&Method::GET));
        assert!(is_safe_method(&Method::HEAD));
        assert!(is_safe_method(&Method::OPTIONS));
        assert!(!is_safe_method(&Method::POST));
        assert!(!is_safe_method(&Method::PUT));
        assert!(!is_safe_method(&Method::DELETE));
    }
}
