//! Page rendering over an Inertia-style protocol: the same page object is returned as
//! JSON to client visits and embedded in an HTML shell for full page loads.

use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::error::DataTableError;
use crate::templates::{self, PAGE_TEMPLATE};

pub const X_INERTIA: &str = "x-inertia";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PageObject<P> {
    pub component: String,
    pub props: P,
    pub url: String,
    #[serde(default)]
    pub version: Option<String>,
}

impl<P> PageObject<P> {
    pub fn new(component: impl Into<String>, props: P, url: impl Into<String>) -> Self {
        PageObject {
            component: component.into(),
            props,
            url: url.into(),
            version: None,
        }
    }
}

#[derive(Serialize)]
struct ShellContext<'a> {
    component: &'a str,
    page_json: String,
    body: String,
}

pub fn is_inertia_request(headers: &HeaderMap) -> bool {
    headers
        .get(X_INERTIA)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Renders `page` as JSON for client visits, or as an HTML document whose mount element
/// carries the page object and the server-rendered `body_html`.
pub fn render<P: Serialize>(
    headers: &HeaderMap,
    page: &PageObject<P>,
    body_html: impl FnOnce() -> Result<String, DataTableError>,
) -> Result<Response, DataTableError> {
    let vary = (header::VARY, HeaderValue::from_static(X_INERTIA));

    if is_inertia_request(headers) {
        let json = serde_json::to_string(page)?;
        return Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, HeaderValue::from_static("application/json")),
                vary,
                (
                    header::HeaderName::from_static(X_INERTIA),
                    HeaderValue::from_static("true"),
                ),
            ],
            json,
        )
            .into_response());
    }

    let document = templates::render(
        PAGE_TEMPLATE,
        &ShellContext {
            component: &page.component,
            page_json: serde_json::to_string(page)?,
            body: body_html()?,
        },
    )?;
    Ok(([vary], Html(document)).into_response())
}
