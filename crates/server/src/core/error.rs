use crate::core::documents::StoreError;
use crate::core::views;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Session context missing from request")]
    CtxNotInRequestExt,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Error::Store(StoreError::Invalid(msg)) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            Error::Store(e @ StoreError::AlreadyExists(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            Error::Store(e @ StoreError::NotFound(_)) => (StatusCode::NOT_FOUND, e.to_string()),
            Error::Store(StoreError::Io(e)) => {
                error!("Filesystem error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "The document store could not be accessed.".to_string(),
                )
            }
            Error::CtxNotInRequestExt | Error::Internal(_) => {
                error!("Internal error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong.".to_string(),
                )
            }
        };

        (status, Html(views::error_page(status, &message))).into_response()
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal(format!("{:#}", err))
    }
}
