use axum::http::{HeaderMap, HeaderValue};

use crate::config::AppConfig;

pub const SESSION_COOKIE: &str = "session";
pub const CSRF_COOKIE: &str = "csrf_token";

/// Pull a single cookie value out of a request's `Cookie` header.
pub fn get(headers: &HeaderMap, name: &str) -> Option<String> {
    // Header name lookup is case-insensitive already.
    let cookie = headers.get("cookie")?;
    let s = cookie.to_str().ok()?;
    for part in s.split(';') {
        let p = part.trim();
        if let Some(eq) = p.find('=') {
            let (k, v) = p.split_at(eq);
            if k == name {
                return Some(v[1..].to_string());
            }
        }
    }
    None
}

// HttpOnly always; Secure and SameSite=Strict only in production, where
// the frontend is served over HTTPS from the same site.
fn attributes(config: &AppConfig) -> &'static str {
    if config.environment.is_production() {
        "; HttpOnly; Secure; SameSite=Strict; Path=/"
    } else {
        "; HttpOnly; Path=/"
    }
}

/// `Set-Cookie` value binding the session id, capped to the session TTL.
pub fn session_cookie(session_id: &str, config: &AppConfig) -> HeaderValue {
    let value = format!(
        "{}={}; Max-Age={}{}",
        SESSION_COOKIE,
        session_id,
        config.session_ttl_hours * 3600,
        attributes(config)
    );
    HeaderValue::from_str(&value).expect("session ids are ASCII")
}

/// `Set-Cookie` value that expires the session cookie immediately.
pub fn clear_session_cookie(config: &AppConfig) -> HeaderValue {
    let value = format!(
        "{}=deleted; Expires=Thu, 01 Jan 1970 00:00:00 GMT{}",
        SESSION_COOKIE,
        attributes(config)
    );
    HeaderValue::from_str(&value).expect("static cookie format")
}

/// `Set-Cookie` value carrying the fresh CSRF token for the next request.
pub fn csrf_cookie(token: &str, config: &AppConfig) -> HeaderValue {
    let value = format!("{}={}{}", CSRF_COOKIE, token, attributes(config));
    HeaderValue::from_str(&value).expect("tokens are hex")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;

    fn config(environment: Environment) -> AppConfig {
        AppConfig {
            environment,
            database_url: "postgres://localhost/papertrade_test".into(),
            port: 5000,
            frontend_origin: "http://localhost:3000".into(),
            session_ttl_hours: 1,
        }
    }

    #[test]
    fn finds_a_cookie_among_several() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "cookie",
            HeaderValue::from_static("a=1; session=abc123; csrf_token=tok"),
        );
        assert_eq!(get(&headers, "session").as_deref(), Some("abc123"));
        assert_eq!(get(&headers, "csrf_token").as_deref(), Some("tok"));
        assert_eq!(get(&headers, "missing"), None);
    }

    #[test]
    fn absent_header_yields_none() {
        let headers = HeaderMap::new();
        assert_eq!(get(&headers, "session"), None);
    }

    #[test]
    fn header_name_lookup_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("Cookie", HeaderValue::from_static("session=abc123"));
        assert_eq!(get(&headers, "session").as_deref(), Some("abc123"));
    }

    #[test]
    fn development_cookies_skip_secure_attributes() {
        let value = csrf_cookie("deadbeef", &config(Environment::Development));
        let s = value.to_str().unwrap();
        assert!(s.starts_with("csrf_token=deadbeef"));
        assert!(s.contains("HttpOnly"));
        assert!(!s.contains("Secure"));
        assert!(!s.contains("SameSite"));
    }

    #[test]
    fn production_cookies_are_hardened() {
        let value = session_cookie("abc123", &config(Environment::Production));
        let s = value.to_str().unwrap();
        assert!(s.contains("HttpOnly"));
        assert!(s.contains("Secure"));
        assert!(s.contains("SameSite=Strict"));
        assert!(s.contains("Max-Age=3600"));
    }
}
