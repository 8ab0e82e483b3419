//! Core Router
//!
//! Public routes are mounted as-is; privileged method routes get the
//! sign-in guard layered on individually.

use crate::core::auth::handlers as auth_handlers;
use crate::core::auth::middleware::mw_require_auth;
use crate::core::documents::handlers as docs;
use crate::core::AppState;
use axum::{
    middleware,
    routing::{get, post, MethodRouter},
    Router,
};

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        // Documents
        .route("/", get(docs::index))
        .route("/index", get(docs::index))
        .route("/new", require_auth(state, get(docs::new_form)))
        .route("/create", require_auth(state, post(docs::create)))
        .route(
            "/{name}",
            get(docs::show).merge(require_auth(state, post(docs::save))),
        )
        .route("/{name}/edit", require_auth(state, get(docs::edit_form)))
        .route(
            "/{name}/duplicate",
            require_auth(state, post(docs::duplicate)),
        )
        .route("/{name}/delete", require_auth(state, post(docs::delete)))
        // Auth routes
        .route(
            "/users/signin",
            get(auth_handlers::signin_form).post(auth_handlers::signin),
        )
        .route("/users/signout", post(auth_handlers::signout))
        .route("/health", get(health_check))
}

/// Wrap a method route so it only runs for signed-in callers
pub fn require_auth(state: &AppState, route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.route_layer(middleware::from_fn_with_state(state.clone(), mw_require_auth))
}

async fn health_check() -> &'static str {
    "OK - CMS Server"
}
