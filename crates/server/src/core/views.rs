//! HTML views
//!
//! Plain string templates. Every interpolated value goes through `escape`.

use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt::Write;

const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'.')
    .remove(b'-')
    .remove(b'_')
    .remove(b'(')
    .remove(b')');

/// 302 Found to `location`, with a short HTML body for clients that do not follow it
pub fn found(location: &str) -> Response {
    let target = escape(location);
    let body = format!(
        "<!DOCTYPE html>\n<title>Redirecting...</title>\n\
         <p>Redirecting to <a href=\"{0}\">{0}</a>.</p>\n",
        target
    );
    let mut res = (StatusCode::FOUND, Html(body)).into_response();
    if let Ok(value) = HeaderValue::from_str(location) {
        res.headers_mut().insert(header::LOCATION, value);
    }
    res
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `/{name}` with the name percent-encoded as a single path segment
pub fn doc_href(name: &str) -> String {
    format!("/{}", utf8_percent_encode(name, PATH_SEGMENT))
}

/// Who is looking at the page, and what is pending for them
pub struct PageCtx<'a> {
    pub username: Option<&'a str>,
    pub notices: Vec<String>,
}

impl<'a> PageCtx<'a> {
    /// Build the page context for a rendered page, draining the caller's notices
    pub fn for_request(state: &AppState, ctx: &'a Ctx) -> Self {
        Self {
            username: ctx.username(),
            notices: state.sessions.take_notices(ctx.session_id()),
        }
    }
}

pub fn layout(page: &PageCtx<'_>, title: &str, body: &str) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n",
        escape(title)
    );

    html.push_str("<header>\n");
    match page.username {
        Some(user) => {
            let _ = write!(
                html,
                "<form method=\"post\" action=\"/users/signout\"><p>Signed in as {}. <button type=\"submit\">Sign Out</button></p></form>\n",
                escape(user)
            );
        }
        None => html.push_str("<p><a href=\"/users/signin\">Sign In</a></p>\n"),
    }
    html.push_str("</header>\n");

    for notice in &page.notices {
        let _ = writeln!(html, "<p class=\"notice\">{}</p>", escape(notice));
    }

    html.push_str("<main>\n");
    html.push_str(body);
    html.push_str("</main>\n</body>\n</html>\n");
    html
}

pub fn index_page(page: &PageCtx<'_>, names: &[String]) -> String {
    let signed_in = page.username.is_some();
    let mut body = String::from("<ul>\n");

    for name in names {
        let href = doc_href(name);
        let _ = write!(
            body,
            "<li><a href=\"{}\">{}</a>",
            escape(&href),
            escape(name)
        );
        if signed_in {
            let _ = write!(
                body,
                " <a href=\"{href}/edit\">Edit</a> \
                 <form class=\"inline\" method=\"post\" action=\"{href}/duplicate\"><button type=\"submit\">Duplicate</button></form> \
                 <form class=\"inline\" method=\"post\" action=\"{href}/delete\"><button type=\"submit\">Delete</button></form>",
                href = escape(&href)
            );
        }
        body.push_str("</li>\n");
    }
    body.push_str("</ul>\n");

    if signed_in {
        body.push_str("<p><a href=\"/new\">New Document</a></p>\n");
    }

    layout(page, "Documents", &body)
}

pub fn markdown_page(page: &PageCtx<'_>, name: &str, rendered: &str) -> String {
    layout(page, name, rendered)
}

pub fn edit_page(page: &PageCtx<'_>, name: &str, content: &str) -> String {
    let body = format!(
        "<h1>Edit {name}</h1>\n\
         <form method=\"post\" action=\"{action}\">\n\
         <textarea name=\"content\" rows=\"20\" cols=\"80\">\n{content}</textarea>\n\
         <button type=\"submit\">Save Changes</button>\n\
         </form>\n",
        name = escape(name),
        action = escape(&doc_href(name)),
        content = escape(content),
    );
    layout(page, &format!("Edit {}", name), &body)
}

pub fn new_page(page: &PageCtx<'_>, proposed: &str, error: Option<&str>) -> String {
    let mut body = String::from("<h1>New Document</h1>\n");
    if let Some(error) = error {
        let _ = writeln!(body, "<p class=\"error\">{}</p>", escape(error));
    }
    let _ = write!(
        body,
        "<form method=\"post\" action=\"/create\">\n\
         <label for=\"name\">Add a new document:</label>\n\
         <input id=\"name\" name=\"name\" value=\"{}\">\n\
         <button type=\"submit\">Create</button>\n\
         </form>\n",
        escape(proposed)
    );
    layout(page, "New Document", &body)
}

pub fn signin_page(page: &PageCtx<'_>, username: &str, error: Option<&str>) -> String {
    let mut body = String::from("<h1>Sign In</h1>\n");
    if let Some(error) = error {
        let _ = writeln!(body, "<p class=\"error\">{}</p>", escape(error));
    }
    let _ = write!(
        body,
        "<form method=\"post\" action=\"/users/signin\">\n\
         <label for=\"username\">Username:</label>\n\
         <input id=\"username\" name=\"username\" value=\"{}\">\n\
         <label for=\"password\">Password:</label>\n\
         <input id=\"password\" type=\"password\" name=\"password\">\n\
         <button type=\"submit\">Sign In</button>\n\
         </form>\n",
        escape(username)
    );
    layout(page, "Sign In", &body)
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let page = PageCtx {
        username: None,
        notices: Vec::new(),
    };
    let body = format!("<h1>{}</h1>\n<p>{}</p>\n", status, escape(message));
    layout(&page, status.canonical_reason().unwrap_or("Error"), &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape("<a href=\"x\">Tom & Jerry's</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn test_doc_href() {
        assert_eq!(doc_href("x(1).txt"), "/x(1).txt");
        assert_eq!(doc_href("my notes.md"), "/my%20notes.md");
        assert_eq!(doc_href("a?b#c"), "/a%3Fb%23c");
    }

    #[test]
    fn test_found() {
        let res = found("/users/signin");
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(res.headers()[header::LOCATION], "/users/signin");
        assert_eq!(
            res.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
    }

    #[tokio::test]
    async fn test_found_body_links_to_target() {
        let res = found("/a&b");
        let bytes = axum::body::to_bytes(res.into_body(), 1024).await.unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("<a href=\"/a&amp;b\">/a&amp;b</a>"));
    }

    #[test]
    fn test_edit_page_keeps_leading_newline() {
        let page = PageCtx {
            username: Some("admin"),
            notices: Vec::new(),
        };
        let html = edit_page(&page, "x.txt", "\nbody");
        assert!(html.contains("\">\n\nbody</textarea>"));
    }

    #[test]
    fn test_index_controls_only_for_signed_in() {
        let names = vec!["about.md".to_string()];
        let anon = index_page(
            &PageCtx {
                username: None,
                notices: vec!["about.md has been deleted.".to_string()],
            },
            &names,
        );
        assert!(anon.contains("<a href=\"/about.md\">about.md</a>"));
        assert!(anon.contains("about.md has been deleted."));
        assert!(!anon.contains("/about.md/edit"));
        assert!(anon.contains("Sign In"));

        let admin = index_page(
            &PageCtx {
                username: Some("admin"),
                notices: Vec::new(),
            },
            &names,
        );
        assert!(admin.contains("/about.md/edit"));
        assert!(admin.contains("/about.md/delete"));
        assert!(admin.contains("Signed in as admin."));
    }
}
