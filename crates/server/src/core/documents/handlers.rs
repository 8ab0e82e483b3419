//! Documents Handler
//!
//! HTML endpoints over the document store. Outcomes are reported back as
//! one-shot notices on the caller's session followed by a redirect to the
//! index; validation failures re-render the form with a 422.

use super::render::markdown_to_html;
use super::store::{DeleteOutcome, DocumentKind, StoreError};
use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use crate::core::error::Result;
use crate::core::views::{self, found, PageCtx};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct SaveForm {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateForm {
    #[serde(default)]
    pub name: String,
}

/// GET / and GET /index
pub async fn index(State(state): State<AppState>, ctx: Ctx) -> Result<Html<String>> {
    let names = state.documents.list().await?;
    let page = PageCtx::for_request(&state, &ctx);
    Ok(Html(views::index_page(&page, &names)))
}

/// GET /{name}
/// Markdown renders to HTML; everything else is served raw with a guessed type.
pub async fn show(
    Path(name): Path<String>,
    State(state): State<AppState>,
    ctx: Ctx,
) -> Result<Response> {
    let doc = match state.documents.read(&name).await {
        Ok(doc) => doc,
        Err(StoreError::NotFound(_)) => return Ok(missing(&state, &ctx, &name)),
        Err(e) => return Err(e.into()),
    };

    match doc.kind {
        DocumentKind::Markdown => {
            let rendered = markdown_to_html(&doc.text());
            let page = PageCtx::for_request(&state, &ctx);
            Ok(Html(views::markdown_page(&page, &doc.name, &rendered)).into_response())
        }
        DocumentKind::Plain => {
            let content_type = doc.content_type();
            Ok(([(header::CONTENT_TYPE, content_type)], doc.content).into_response())
        }
    }
}

/// GET /{name}/edit
pub async fn edit_form(
    Path(name): Path<String>,
    State(state): State<AppState>,
    ctx: Ctx,
) -> Result<Response> {
    match state.documents.read(&name).await {
        Ok(doc) => {
            let page = PageCtx::for_request(&state, &ctx);
            Ok(Html(views::edit_page(&page, &doc.name, &doc.text())).into_response())
        }
        Err(StoreError::NotFound(_)) => Ok(missing(&state, &ctx, &name)),
        Err(e) => Err(e.into()),
    }
}

/// POST /{name}
pub async fn save(
    Path(name): Path<String>,
    State(state): State<AppState>,
    ctx: Ctx,
    Form(form): Form<SaveForm>,
) -> Result<Response> {
    match state.documents.save(&name, form.content.as_bytes()).await {
        Ok(()) => {
            info!("{} updated by {}", name, ctx.username().unwrap_or("?"));
            state
                .sessions
                .push_notice(ctx.session_id(), format!("{} has been updated.", name));
            Ok(found("/"))
        }
        Err(StoreError::NotFound(_)) => Ok(missing(&state, &ctx, &name)),
        Err(e) => Err(e.into()),
    }
}

/// GET /new
pub async fn new_form(State(state): State<AppState>, ctx: Ctx) -> Html<String> {
    let page = PageCtx::for_request(&state, &ctx);
    Html(views::new_page(&page, "", None))
}

/// POST /create
pub async fn create(
    State(state): State<AppState>,
    ctx: Ctx,
    Form(form): Form<CreateForm>,
) -> Result<Response> {
    match state.documents.create(&form.name).await {
        Ok(name) => {
            state
                .sessions
                .push_notice(ctx.session_id(), format!("{} has been created.", name));
            Ok(found("/"))
        }
        Err(e @ (StoreError::Invalid(_) | StoreError::AlreadyExists(_))) => {
            warn!("Rejected new document {:?}: {}", form.name, e);
            let page = PageCtx::for_request(&state, &ctx);
            Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(views::new_page(&page, &form.name, Some(&e.to_string()))),
            )
                .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /{name}/duplicate
/// A missing source is a silent no-op.
pub async fn duplicate(
    Path(name): Path<String>,
    State(state): State<AppState>,
    ctx: Ctx,
) -> Result<Response> {
    match state.documents.duplicate(&name).await {
        Ok(copy) => {
            state.sessions.push_notice(
                ctx.session_id(),
                format!("{} has been duplicated as {}.", name, copy),
            );
            Ok(found("/"))
        }
        Err(StoreError::NotFound(_)) => Ok(found("/")),
        Err(e) => Err(e.into()),
    }
}

/// POST /{name}/delete
pub async fn delete(
    Path(name): Path<String>,
    State(state): State<AppState>,
    ctx: Ctx,
) -> Result<Response> {
    match state.documents.delete(&name).await? {
        DeleteOutcome::Deleted => {
            state
                .sessions
                .push_notice(ctx.session_id(), format!("{} has been deleted.", name));
            Ok(found("/"))
        }
        DeleteOutcome::Missing => Ok(missing(&state, &ctx, &name)),
    }
}

fn missing(state: &AppState, ctx: &Ctx, name: &str) -> Response {
    state
        .sessions
        .push_notice(ctx.session_id(), StoreError::NotFound(name.to_string()).to_string());
    found("/")
}
