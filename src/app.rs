use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, Method};
use axum::routing::get;
use axum::{middleware, Router};
use tower_http::cors::CorsLayer;

use crate::auth::csrf as csrf_guard;
use crate::routes::{auth, csrf, health, news, stocks, users, watchlists};
use crate::state::AppState;

/// Assemble the full application router.
///
/// Layer order matters: the CSRF verifier sits inside CORS so preflights
/// never reach it, and the token-attaching layer wraps everything so even
/// rejection responses carry a fresh token pair.
pub fn create_app(state: AppState) -> Router {
    let origin = state
        .config
        .frontend_origin
        .parse::<HeaderValue>()
        .expect("FRONTEND_ORIGIN must be a valid header value");

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static("x-csrf-token")])
        .allow_credentials(true);

    let api = Router::new()
        .nest("/auth", auth::router())
        // Nesting maps the inner "/" to the bare "/auth" only; the frontend
        // calls session restore with the trailing slash as well.
        .route("/auth/", get(auth::whoami))
        .nest("/csrf", csrf::router())
        .nest("/users", users::router(state.clone()))
        .nest("/stock", stocks::router(state.clone()))
        .nest("/news", news::router(state.clone()))
        .nest("/watchlists", watchlists::router(state.clone()))
        .layer(middleware::from_fn(csrf_guard::verify_request))
        .layer(cors);

    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            csrf_guard::attach_token,
        ))
        .with_state(state)
}
