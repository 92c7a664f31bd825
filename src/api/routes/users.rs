use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode, Uri},
    response::Response,
    Json,
};
use log::{debug, error};
use serde::Serialize;

use crate::inertia::{self, PageObject};
use crate::query::{TableProps, TableRequest};
use crate::table::render_table;
use crate::users::{user_columns, User, USERS_COMPONENT};

use super::state::AppState;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn internal_error(context: &str, e: impl std::fmt::Display) -> (StatusCode, Json<ErrorResponse>) {
    error!("{}: {}", context, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: format!("{}: {}", context, e),
        }),
    )
}

/// GET /users
///
/// Lists users with the table's search, sort and page parameters. Client visits get
/// the page object as JSON; full loads get the HTML shell with the table rendered.
pub async fn index(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let request = TableRequest::new(uri.path(), query);
    debug!("Users listing: {:?}", request);

    let result = User::list_page(&state.db, &state.service, &request)
        .map_err(|e| internal_error("Failed to list users", e))?;

    let filters = request.params().filters();
    let props = TableProps::from_result(result, filters);
    let url = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    let page = PageObject::new(USERS_COMPONENT, props, url);

    inertia::render(&headers, &page, || {
        let props = &page.props;
        let sorting = crate::table::SortDescriptor::from_filters(&props.filters);
        render_table(
            &user_columns(),
            &props.data,
            &props.page_info,
            sorting.as_ref(),
            props.filters.search.as_deref().unwrap_or_default(),
        )
        .to_html()
    })
    .map_err(|e| internal_error("Failed to render page", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::inertia::X_INERTIA;
    use crate::query::DataTableService;
    use crate::server::create_router;
    use axum::body::Body;
    use axum::http::{header, Request};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn app(count: u32) -> (TempDir, axum::Router) {
        let dir = TempDir::new().unwrap();
        let db = Database::open(&dir.path().join("routes.db")).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        User::seed(&db, count, now).unwrap();
        let router = create_router(AppState::new(db, DataTableService::default()));
        (dir, router)
    }

    async fn get(router: axum::Router, uri: &str, inertia: bool) -> Response {
        let mut builder = Request::builder().uri(uri);
        if inertia {
            builder = builder.header(X_INERTIA, "true");
        }
        router
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_inertia_visit_returns_page_object() {
        let (_dir, router) = app(25);
        let response = get(
            router,
            "/users?search=example&sort=name&direction=asc&page=2",
            true,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[X_INERTIA], "true");

        let page: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(page["component"], "Users/Index");
        assert_eq!(
            page["url"],
            "/users?search=example&sort=name&direction=asc&page=2"
        );

        let props = &page["props"];
        assert_eq!(props["data"].as_array().unwrap().len(), 10);
        assert_eq!(props["pageInfo"]["current_page"], 2);
        assert_eq!(props["pageInfo"]["last_page"], 3);
        assert_eq!(props["pageInfo"]["total"], 25);
        assert_eq!(
            props["filters"],
            serde_json::json!({"search": "example", "sort": "name", "direction": "asc"})
        );
        assert_eq!(
            props["links"]["next"],
            "/users?search=example&sort=name&direction=asc&page=3"
        );
    }

    #[tokio::test]
    async fn test_filters_echo_is_raw_input() {
        let (_dir, router) = app(3);
        let response = get(router, "/users?sort=bogus&direction=sideways", true).await;

        let page: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(
            page["props"]["filters"],
            serde_json::json!({"sort": "bogus", "direction": "sideways"})
        );
        assert_eq!(page["props"]["data"][0]["name"], "Alice Anders");
    }

    #[tokio::test]
    async fn test_full_load_renders_html_table() {
        let (_dir, router) = app(3);
        let response = get(router, "/users?search=zzz", false).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html"));

        let body = body_string(response).await;
        assert!(body.contains("data-page=\""));
        assert!(body.contains("No results found."));
    }

    #[tokio::test]
    async fn test_page_beyond_last_is_empty() {
        let (_dir, router) = app(3);
        let response = get(router, "/users?page=9", true).await;

        let page: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(page["props"]["data"].as_array().unwrap().len(), 0);
        assert_eq!(page["props"]["pageInfo"]["current_page"], 9);
        assert_eq!(page["props"]["pageInfo"]["last_page"], 1);
    }
}
