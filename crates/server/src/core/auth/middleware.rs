use crate::core::auth::session::SESSION_COOKIE;
use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use crate::core::views::found;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use headers::{Cookie, HeaderMapExt};
use tracing::{debug, warn};

pub const SIGN_IN_PATH: &str = "/users/signin";
pub const SIGN_IN_REQUIRED: &str = "You must be signed in to do that.";

/// Attach a `Ctx` to every request, handing out a cookie when the caller has none
pub async fn mw_session(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let presented = req
        .headers()
        .typed_get::<Cookie>()
        .and_then(|c| c.get(SESSION_COOKIE).map(str::to_string));

    let (ctx, is_new) = state.sessions.attach(presented.as_deref());
    debug!("MIDDLEWARE: session {} (new: {})", ctx.session_id(), is_new);

    let session_id = ctx.session_id().to_string();
    req.extensions_mut().insert(ctx);

    let mut res = next.run(req).await;

    if is_new {
        let cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE, session_id
        );
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                res.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => warn!("Could not encode session cookie: {}", e),
        }
    }

    res
}

/// Guard for privileged routes: signed-out callers are sent to the sign-in form
pub async fn mw_require_auth(State(state): State<AppState>, req: Request, next: Next) -> Response {
    debug!("MIDDLEWARE: require_auth");

    let ctx = req.extensions().get::<Ctx>().cloned();
    match ctx {
        Some(ctx) if ctx.is_signed_in() => next.run(req).await,
        Some(ctx) => {
            debug!("Rejected {} {}: not signed in", req.method(), req.uri().path());
            state.sessions.push_notice(ctx.session_id(), SIGN_IN_REQUIRED);
            found(SIGN_IN_PATH).into_response()
        }
        None => found(SIGN_IN_PATH).into_response(),
    }
}
