//! Auth handlers

use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use crate::core::error::Result;
use crate::core::views::{self, found, PageCtx};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tracing::info;

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Deserialize)]
pub struct SigninForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

// Keeps the password out of logs
impl std::fmt::Debug for SigninForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigninForm")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// GET /users/signin
pub async fn signin_form(State(state): State<AppState>, ctx: Ctx) -> Html<String> {
    let page = PageCtx::for_request(&state, &ctx);
    Html(views::signin_page(&page, "", None))
}

/// POST /users/signin
pub async fn signin(
    State(state): State<AppState>,
    ctx: Ctx,
    Form(form): Form<SigninForm>,
) -> Result<Response> {
    info!("POST /users/signin - {}", form.username);

    if state.auth.verify(&form.username, &form.password).await? {
        state.sessions.sign_in(ctx.session_id(), &form.username);
        state
            .sessions
            .push_notice(ctx.session_id(), "Sign in successful.");
        return Ok(found("/"));
    }

    let page = PageCtx::for_request(&state, &ctx);
    Ok((
        StatusCode::UNPROCESSABLE_ENTITY,
        Html(views::signin_page(&page, &form.username, Some(INVALID_CREDENTIALS))),
    )
        .into_response())
}

/// POST /users/signout
pub async fn signout(State(state): State<AppState>, ctx: Ctx) -> Response {
    info!("POST /users/signout");
    state.sessions.sign_out(ctx.session_id());
    state
        .sessions
        .push_notice(ctx.session_id(), "You have been signed out.");
    found("/")
}
