//! Request handlers

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::{Form, Json};
use biolink_core::{
    new_id, tree, Direction, EditorView, NewNode, NodePatch, Page, PageSummary, Testimonial,
    VisitorView,
};
use biolink_gemini::SuggestionRequest;
use biolink_pages::{follow_link, Error, Submission};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::templates;
use crate::{ApiResult, AppState};

type AppStateRef = State<Arc<AppState>>;

/// `?folder=<id>` selecting the folder an edit applies to
#[derive(Debug, Default, Deserialize)]
pub struct Scope {
    pub folder: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePage {
    pub slug: String,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct MoveItem {
    pub index: usize,
    pub direction: Direction,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    pub link_id: String,
    #[serde(flatten)]
    pub submission: Submission,
}

#[derive(Debug, Serialize)]
pub struct FollowResponse {
    pub url: String,
    pub recorded: bool,
}

#[derive(Debug, Deserialize)]
pub struct BioRequest {
    pub name: String,
    #[serde(default)]
    pub keywords: String,
}

#[derive(Debug, Deserialize)]
pub struct TitleRequest {
    pub url: String,
}

pub async fn health(State(state): AppStateRef) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "pages": state.directory.pages().len(),
        "copyConfigured": state.copy.is_configured(),
    }))
}

// ── editor ──────────────────────────────────────────────────────────

pub async fn list_pages(State(state): AppStateRef) -> Json<Vec<PageSummary>> {
    Json(state.directory.summaries())
}

pub async fn create_page(
    State(state): AppStateRef,
    Json(req): Json<CreatePage>,
) -> ApiResult<(StatusCode, Json<Page>)> {
    let page = state.directory.create_page(&req.slug, &req.display_name, Utc::now())?;
    Ok((StatusCode::CREATED, Json(page)))
}

pub async fn editor_view(
    State(state): AppStateRef,
    Path(id): Path<String>,
    Query(scope): Query<Scope>,
) -> ApiResult<Json<EditorView>> {
    let cursor = state.cursor(&id, scope.folder.as_deref())?;
    Ok(Json(state.directory.editor_view(&id, &cursor)?))
}

pub async fn update_page(
    State(state): AppStateRef,
    Path(id): Path<String>,
    Json(mut page): Json<Page>,
) -> ApiResult<Json<Page>> {
    // the path decides which page is replaced
    page.id = id;
    Ok(Json(state.directory.update_page(page)?))
}

pub async fn delete_page(State(state): AppStateRef, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.directory.delete_page(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn insert_item(
    State(state): AppStateRef,
    Path(id): Path<String>,
    Query(scope): Query<Scope>,
    Json(new): Json<NewNode>,
) -> ApiResult<(StatusCode, Json<EditorView>)> {
    let node = new.build(new_id())?;
    let cursor = state.cursor(&id, scope.folder.as_deref())?;
    let page = state
        .directory
        .edit_links(&id, &cursor, |seq| tree::insert(seq, node))?;
    Ok((StatusCode::CREATED, Json(EditorView::of(page, &cursor)?)))
}

pub async fn update_item(
    State(state): AppStateRef,
    Path((id, item)): Path<(String, String)>,
    Query(scope): Query<Scope>,
    Json(patch): Json<NodePatch>,
) -> ApiResult<Json<EditorView>> {
    let cursor = state.cursor(&id, scope.folder.as_deref())?;
    ensure_in_scope(&state, &id, &cursor, &item)?;
    let patch = patch.normalized();
    let page = state
        .directory
        .edit_links(&id, &cursor, |seq| tree::update_by_id(seq, &item, &patch))?;
    Ok(Json(EditorView::of(page, &cursor)?))
}

pub async fn delete_item(
    State(state): AppStateRef,
    Path((id, item)): Path<(String, String)>,
    Query(scope): Query<Scope>,
) -> ApiResult<Json<EditorView>> {
    let cursor = state.cursor(&id, scope.folder.as_deref())?;
    ensure_in_scope(&state, &id, &cursor, &item)?;
    let page = state
        .directory
        .edit_links(&id, &cursor, |seq| tree::delete_by_id(seq, &item))?;
    Ok(Json(EditorView::of(page, &cursor)?))
}

pub async fn move_item(
    State(state): AppStateRef,
    Path(id): Path<String>,
    Query(scope): Query<Scope>,
    Json(req): Json<MoveItem>,
) -> ApiResult<Json<EditorView>> {
    let cursor = state.cursor(&id, scope.folder.as_deref())?;
    let page = state
        .directory
        .edit_links(&id, &cursor, |seq| tree::move_node(seq, req.index, req.direction))?;
    Ok(Json(EditorView::of(page, &cursor)?))
}

pub async fn page_testimonials(
    State(state): AppStateRef,
    Path(id): Path<String>,
) -> Json<Vec<Testimonial>> {
    Json(state.testimonials.for_page(&id))
}

fn ensure_in_scope(
    state: &AppState,
    page_id: &str,
    cursor: &biolink_core::EditorCursor,
    item: &str,
) -> ApiResult<()> {
    let page = state.directory.page_by_id(page_id)?;
    if cursor.scope(&page.links)?.iter().any(|n| n.id == item) {
        Ok(())
    } else {
        Err(Error::NotFound(format!("item {}", item)).into())
    }
}

// ── public ──────────────────────────────────────────────────────────

pub async fn public_view(
    State(state): AppStateRef,
    Path(slug): Path<String>,
) -> ApiResult<Json<VisitorView>> {
    Ok(Json(state.directory.visitor_view(&slug, Utc::now())?))
}

pub async fn follow(
    State(state): AppStateRef,
    Path(slug): Path<String>,
    Json(req): Json<FollowRequest>,
) -> ApiResult<Json<FollowResponse>> {
    let outcome = follow_link(
        &state.directory,
        &state.testimonials,
        &slug,
        &req.link_id,
        &req.submission,
        Utc::now(),
    )?;
    Ok(Json(FollowResponse {
        recorded: outcome.testimonial.is_recorded(),
        url: outcome.url,
    }))
}

pub async fn public_page(State(state): AppStateRef, Path(slug): Path<String>) -> Response {
    match state.directory.visitor_view(&slug, Utc::now()) {
        Ok(view) => Html(templates::render_page(&view)).into_response(),
        Err(Error::NotFound(_)) => {
            (StatusCode::NOT_FOUND, Html(templates::not_found_page(&slug))).into_response()
        }
        Err(e) => crate::ApiError(e).into_response(),
    }
}

pub async fn public_go(
    State(state): AppStateRef,
    Path((slug, link)): Path<(String, String)>,
    Form(submission): Form<Submission>,
) -> Response {
    match follow_link(
        &state.directory,
        &state.testimonials,
        &slug,
        &link,
        &submission,
        Utc::now(),
    ) {
        Ok(outcome) if outcome.url.is_empty() => {
            (StatusCode::NO_CONTENT, [(header::CACHE_CONTROL, "no-store")]).into_response()
        }
        Ok(outcome) => match HeaderValue::try_from(outcome.url.as_str()) {
            Ok(location) => (StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response(),
            Err(_) => {
                tracing::warn!("link {} on /{} has an unusable url", link, slug);
                (StatusCode::NOT_FOUND, Html(templates::not_found_page(&slug))).into_response()
            }
        },
        Err(Error::NotFound(_)) => {
            (StatusCode::NOT_FOUND, Html(templates::not_found_page(&slug))).into_response()
        }
        Err(e) => crate::ApiError(e).into_response(),
    }
}

// ── copy suggestions ────────────────────────────────────────────────

/// Always 200: a failed bio comes back as `{ "error": ... }` for the form to show inline
pub async fn suggest_bio(State(state): AppStateRef, Json(req): Json<BioRequest>) -> Json<Value> {
    let request = SuggestionRequest::bio(req.name, req.keywords);
    match state.copy.suggest(&request).await {
        Ok(text) => Json(json!({ "text": text })),
        Err(e) => Json(json!({ "error": e.to_string() })),
    }
}

pub async fn suggest_title(State(state): AppStateRef, Json(req): Json<TitleRequest>) -> Json<Value> {
    let request = SuggestionRequest::link_title(req.url);
    let text = state.copy.suggest(&request).await.unwrap_or_default();
    Json(json!({ "text": text }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_router;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use biolink_core::{ContentNode, EditorCursor, NodeKind};
    use biolink_gemini::{CopyKind, CopySuggester};
    use tower::ServiceExt;

    struct FakeCopy;

    #[async_trait]
    impl CopySuggester for FakeCopy {
        async fn suggest(&self, request: &SuggestionRequest) -> biolink_gemini::Result<String> {
            match request.kind {
                CopyKind::Bio if request.subject_text == "fail" => Err(biolink_gemini::Error::BioFailed),
                CopyKind::Bio => Ok(format!("Hi, I'm {}", request.subject_text)),
                CopyKind::LinkTitle => Ok("Shop Now".to_string()),
            }
        }

        fn is_configured(&self) -> bool {
            true
        }
    }

    fn app() -> (axum::Router, Arc<AppState>) {
        let state = Arc::new(AppState::in_memory(Arc::new(FakeCopy)));
        (create_router(state.clone()), state)
    }

    async fn call(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn create(app: &axum::Router, slug: &str) -> String {
        let (status, page) = call(
            app,
            "POST",
            "/api/pages",
            Some(json!({ "slug": slug, "displayName": "Test" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        page["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app();
        let (status, body) = call(&app, "GET", "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["copyConfigured"], true);
    }

    #[tokio::test]
    async fn test_create_and_collide() {
        let (app, _) = app();
        create(&app, "my-site").await;

        let (status, body) = call(
            &app,
            "POST",
            "/api/pages",
            Some(json!({ "slug": "My Site!", "displayName": "Other" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("my-site"));

        let (_, list) = call(&app, "GET", "/api/pages", None).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_items_inside_folder() {
        let (app, _) = app();
        let id = create(&app, "trip").await;

        let (status, view) = call(
            &app,
            "POST",
            &format!("/api/pages/{}/items", id),
            Some(json!({ "type": "folder", "title": "Day 1" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let folder_id = view["items"][0]["id"].as_str().unwrap().to_string();

        let (status, view) = call(
            &app,
            "POST",
            &format!("/api/pages/{}/items?folder={}", id, folder_id),
            Some(json!({ "type": "link", "title": "Photo", "url": "photos.example" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(view["breadcrumb"][0]["title"], "Day 1");
        assert_eq!(view["items"][0]["url"], "https://photos.example");
        let link_id = view["items"][0]["id"].as_str().unwrap().to_string();

        let (status, view) = call(
            &app,
            "PATCH",
            &format!("/api/pages/{}/items/{}?folder={}", id, link_id, folder_id),
            Some(json!({ "title": "Photos" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["items"][0]["title"], "Photos");

        let (_, public) = call(&app, "GET", "/api/public/trip", None).await;
        assert_eq!(public["items"][0]["title"], "Day 1");
        assert_eq!(public["items"][0]["children"][0]["title"], "Photos");

        // the link is not at the top level
        let (status, _) = call(&app, "DELETE", &format!("/api/pages/{}/items/{}", id, link_id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_move_and_delete_items() {
        let (app, state) = app();
        let id = create(&app, "site").await;
        for title in ["A", "B"] {
            call(
                &app,
                "POST",
                &format!("/api/pages/{}/items", id),
                Some(json!({ "type": "header", "title": title })),
            )
            .await;
        }

        let (status, view) = call(
            &app,
            "POST",
            &format!("/api/pages/{}/items/move", id),
            Some(json!({ "index": 1, "direction": "up" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["items"][0]["title"], "B");

        let b = view["items"][0]["id"].as_str().unwrap().to_string();
        let (status, _) = call(&app, "DELETE", &format!("/api/pages/{}/items/{}", id, b), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state.directory.page_by_id(&id).unwrap().links.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_title_rejected() {
        let (app, _) = app();
        let id = create(&app, "site").await;
        let (status, _) = call(
            &app,
            "POST",
            &format!("/api/pages/{}/items", id),
            Some(json!({ "type": "link", "title": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_and_delete_page() {
        let (app, state) = app();
        let id = create(&app, "site").await;

        let mut page = serde_json::to_value(state.directory.page_by_id(&id).unwrap()).unwrap();
        page["bio"] = json!("Fresh bio");
        let (status, updated) = call(&app, "PUT", &format!("/api/pages/{}", id), Some(page)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["bio"], "Fresh bio");

        let (status, _) = call(&app, "DELETE", &format!("/api/pages/{}", id), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, body) = call(&app, "GET", &format!("/api/pages/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_follow_records_testimonial() {
        let (app, state) = app();
        let id = create(&app, "shop").await;
        let (_, view) = call(
            &app,
            "POST",
            &format!("/api/pages/{}/items", id),
            Some(json!({ "type": "link", "title": "Menu", "url": "https://menu.example" })),
        )
        .await;
        let link_id = view["items"][0]["id"].as_str().unwrap().to_string();

        let (status, body) = call(
            &app,
            "POST",
            "/api/public/shop/follow",
            Some(json!({ "linkId": link_id, "visitorName": "Ayu", "content": "Yum" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["url"], "https://menu.example");
        assert_eq!(body["recorded"], true);

        let (_, body) = call(
            &app,
            "POST",
            "/api/public/shop/follow",
            Some(json!({ "linkId": link_id, "content": "anonymous" })),
        )
        .await;
        assert_eq!(body["recorded"], false);

        let (_, notes) = call(&app, "GET", &format!("/api/pages/{}/testimonials", id), None).await;
        assert_eq!(notes.as_array().unwrap().len(), 1);
        assert_eq!(notes[0]["targetLinkTitle"], "Menu");
        assert_eq!(state.testimonials.all().len(), 1);
    }

    #[tokio::test]
    async fn test_html_page_and_redirect() {
        let (app, _) = app();
        let id = create(&app, "shop").await;
        let (_, view) = call(
            &app,
            "POST",
            &format!("/api/pages/{}/items", id),
            Some(json!({ "type": "link", "title": "Menu", "url": "https://menu.example" })),
        )
        .await;
        let link_id = view["items"][0]["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(Request::get("/p/shop").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = String::from_utf8(to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()).unwrap();
        assert!(html.contains("Menu"));

        let response = app
            .clone()
            .oneshot(
                Request::post(format!("/p/shop/go/{}", link_id))
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("visitorName=&content=hi"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "https://menu.example");

        let response = app
            .oneshot(Request::get("/p/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_redirect_to_unusable_url_is_not_found() {
        let (app, state) = app();
        let id = create(&app, "shop").await;
        let link = ContentNode::new("l", "Odd", NodeKind::Link).with_url("https://example.com/a\tb\u{7f}c");
        state
            .directory
            .edit_links(&id, &EditorCursor::root(), |seq| tree::insert(seq, link))
            .unwrap();

        let response = app
            .oneshot(
                Request::post("/p/shop/go/l")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("visitorName=Ayu&content=hi"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get("location").is_none());
    }

    #[tokio::test]
    async fn test_put_rejects_children_on_link() {
        let (app, state) = app();
        let id = create(&app, "shop").await;

        let mut page = serde_json::to_value(state.directory.page_by_id(&id).unwrap()).unwrap();
        page["links"] = json!([{
            "id": "l", "type": "link", "title": "Menu", "url": "https://menu.example",
            "children": [{ "id": "secret", "type": "link", "title": "S", "isActive": false }]
        }]);
        let (status, _) = call(&app, "PUT", &format!("/api/pages/{}", id), Some(page)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, public) = call(&app, "GET", "/api/public/shop", None).await;
        assert_eq!(public["items"], json!([]));
    }

    #[tokio::test]
    async fn test_suggestions() {
        let (app, _) = app();
        let (status, body) = call(&app, "POST", "/api/suggest/bio", Some(json!({ "name": "Ayu", "keywords": "" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["text"], "Hi, I'm Ayu");

        let (status, body) = call(&app, "POST", "/api/suggest/bio", Some(json!({ "name": "fail" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"], "Failed to generate bio");

        let (_, body) = call(&app, "POST", "/api/suggest/title", Some(json!({ "url": "https://shop.example" }))).await;
        assert_eq!(body["text"], "Shop Now");
    }
}
