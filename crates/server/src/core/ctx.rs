use crate::core::error::{Error, Result};
use axum::{extract::FromRequestParts, http::request::Parts};

/// Per-request caller context, attached by the session middleware
#[derive(Clone, Debug)]
pub struct Ctx {
    session_id: String,
    username: Option<String>,
}

impl Ctx {
    pub fn new(session_id: String, username: Option<String>) -> Self {
        Self {
            session_id,
            username,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.username.is_some()
    }
}

impl<S> FromRequestParts<S> for Ctx
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<Ctx>()
            .cloned()
            .ok_or(Error::CtxNotInRequestExt)
    }
}
