use crate::auth::basic_auth_middleware;
use crate::handler::{handle_update, health};
use crate::state::AppState;
use axum::Router;
use axum::middleware;
use axum::routing::get;
use std::sync::Arc;

/// Build the HTTP router
///
/// `/health` is always open. Every other path is an update request in the
/// compact or standard form and sits behind the basic-auth gate.
pub fn build_router(state: Arc<AppState>) -> Router {
    let updates = Router::new()
        .fallback(handle_update)
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            basic_auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .route("/health", get(health))
        .fallback_service(updates)
}
