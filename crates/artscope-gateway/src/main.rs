//! Artscope Gateway: serves the explorer page and turns its clicks and form
//! submissions into explorer interactions. Every interaction answers with the
//! re-rendered `#app` fragment, which htmx swaps in place.
//!
//! Each browser gets its own screen, keyed by the `artscope_session` cookie.

use artscope_core::{
    ArtscopeConfig, Direction, Endpoints, Explorer, HttpApiClient, Outcome, SearchCriteria,
    SearchField, SessionId, SledCache,
};
use axum::{
    body::Body,
    extract::{Form, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SESSION_COOKIE: &str = "artscope_session";

#[derive(Clone)]
struct AppState {
    explorer: Arc<Explorer>,
}

/// Either an API link (`href`) or a fact cross-reference (`field` + `value`).
#[derive(Deserialize)]
struct FollowParams {
    href: Option<String>,
    field: Option<SearchField>,
    value: Option<String>,
}

/// The session a request belongs to.
struct Visit {
    id: SessionId,
    fresh: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ArtscopeConfig::load()?;
    if config.missing_api_key() {
        tracing::warn!("[ARTSCOPE] No API key configured (ARTSCOPE__API_KEY); the remote API will reject requests.");
    }

    let endpoints = Endpoints::from_config(&config)?;
    let cache = SledCache::open(Some(config.cache_path.as_str()))?;
    let client = HttpApiClient::from_config(&config)?;
    let explorer = Explorer::new(Arc::new(client), Arc::new(cache), endpoints)
        .with_session_idle(Duration::from_secs(config.session_idle_secs));
    let explorer = Arc::new(explorer);

    // selectors fill in once both lists arrive; the page is served meanwhile
    let prefetch = Arc::clone(&explorer);
    tokio::spawn(async move {
        prefetch.startup().await;
    });

    let app = router(AppState { explorer });

    let listener = tokio::net::TcpListener::bind(config.bind_addr.as_str()).await?;
    tracing::info!("[ARTSCOPE] Explorer listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_document))
        .route("/health", get(health))
        .route("/api/v1/status", get(status_handler))
        .route("/search", post(search_handler))
        .route("/page/:direction", post(page_handler))
        .route("/follow", get(follow_handler))
        .route("/feature/:page/:index", get(feature_handler))
        .with_state(state)
        .layer(axum::middleware::from_fn(log_request))
}

async fn log_request(request: Request<Body>, next: Next) -> Response {
    tracing::info!("[ARTSCOPE] {} {}", request.method(), request.uri().path());
    next.run(request).await
}

fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
}

fn visit(state: &AppState, headers: &HeaderMap) -> Visit {
    let (id, fresh) = state.explorer.resume_or_open(session_cookie(headers));
    Visit { id, fresh }
}

/// Attaches the session cookie when the id was issued by this request.
fn reply(visit: &Visit, body: impl IntoResponse) -> Response {
    let mut res = body.into_response();
    if visit.fresh {
        let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, visit.id);
        match HeaderValue::from_str(&cookie) {
            Ok(v) => {
                res.headers_mut().insert(header::SET_COOKIE, v);
            }
            Err(e) => tracing::warn!("[ARTSCOPE] Could not set session cookie: {}", e),
        }
    }
    res
}

async fn health() -> &'static str {
    "OK"
}

/// Single entry point: the full page.
async fn serve_document(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let visit = visit(&state, &headers);
    reply(&visit, Html(state.explorer.document_html(&visit.id).await))
}

async fn status_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let visit = visit(&state, &headers);
    let status = state.explorer.status(&visit.id).await;
    let body = Json(serde_json::json!({
        "app": "artscope-gateway",
        "version": artscope_core::version(),
        "explorer": status,
    }));
    reply(&visit, body)
}

/// POST /search: form fields classification, century, keywords.
async fn search_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(criteria): Form<SearchCriteria>,
) -> Response {
    let visit = visit(&state, &headers);
    state.explorer.search(&visit.id, criteria).await;
    reply(&visit, Html(state.explorer.app_html(&visit.id).await))
}

/// POST /page/next | /page/previous. A disabled control changes nothing.
async fn page_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(direction): Path<String>,
) -> Result<Response, (StatusCode, String)> {
    let direction = match direction.as_str() {
        "next" => Direction::Next,
        "previous" => Direction::Previous,
        other => return Err((StatusCode::NOT_FOUND, format!("unknown control: {}", other))),
    };
    let visit = visit(&state, &headers);
    state.explorer.paginate(&visit.id, direction).await;
    Ok(reply(&visit, Html(state.explorer.app_html(&visit.id).await)))
}

/// GET /follow: fact cross-reference (`field`, `value`) or API link (`href`).
async fn follow_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<FollowParams>,
) -> Result<Response, (StatusCode, String)> {
    let visit = visit(&state, &headers);
    let outcome = match (params.field, params.value, params.href) {
        (Some(field), Some(value), _) => {
            state.explorer.follow_reference(&visit.id, field, &value).await
        }
        (_, _, Some(href)) => state.explorer.follow_link(&visit.id, &href).await,
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                "expected field and value, or href".to_string(),
            ))
        }
    };
    if outcome == Outcome::Rejected {
        return Err((
            StatusCode::BAD_REQUEST,
            "link target is not on the collection API".to_string(),
        ));
    }
    Ok(reply(&visit, Html(state.explorer.app_html(&visit.id).await)))
}

/// GET /feature/{page}/{index}: preview tile clicked. 404 once that page has
/// been replaced on this session's screen.
async fn feature_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((page, index)): Path<(u64, usize)>,
) -> Result<Response, (StatusCode, String)> {
    let visit = visit(&state, &headers);
    if state.explorer.select_preview(&visit.id, page, index).await {
        Ok(reply(&visit, Html(state.explorer.app_html(&visit.id).await)))
    } else {
        Err((
            StatusCode::NOT_FOUND,
            format!("no preview {} on page {}", index, page),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use artscope_core::{ApiClient, FetchError, MemoryCache};
    use axum::body::to_bytes;
    use std::sync::Mutex;
    use tower::ServiceExt;

    const BASE: &str = "https://api.harvardartmuseums.org";

    /// Answers every object search with a one-record page titled after the
    /// keyword it was asked for.
    #[derive(Default)]
    struct EchoApi {
        calls: Mutex<Vec<String>>,
    }

    impl EchoApi {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl ApiClient for EchoApi {
        async fn fetch_json(&self, url: &str) -> Result<serde_json::Value, FetchError> {
            self.calls.lock().unwrap().push(url.to_string());
            let title = if url.contains("keyword=alice") {
                "AliceVase"
            } else if url.contains("keyword=bob") {
                "BobCoin"
            } else if url.contains("page=2") {
                "Bowl II"
            } else {
                "Bowl"
            };
            Ok(serde_json::json!({
                "info": { "next": format!("{}/object?page=2", BASE), "prev": null },
                "records": [{ "title": title, "culture": "Chinese", "contact": "info@example.org" }]
            }))
        }
    }

    fn app() -> (Router, Arc<EchoApi>, Arc<Explorer>) {
        let api = Arc::new(EchoApi::default());
        let endpoints = Endpoints::new(BASE, "k").unwrap();
        let explorer = Arc::new(Explorer::new(api.clone(), Arc::new(MemoryCache::new()), endpoints));
        let router = router(AppState {
            explorer: Arc::clone(&explorer),
        });
        (router, api, explorer)
    }

    async fn send(app: &Router, req: Request<Body>) -> Response {
        app.clone().oneshot(req).await.unwrap()
    }

    async fn body_text(res: Response) -> String {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    /// `name=value` pair from the response's Set-Cookie header.
    fn issued_cookie(res: &Response) -> String {
        let raw = res.headers()[header::SET_COOKIE].to_str().unwrap();
        raw.split(';').next().unwrap().to_string()
    }

    /// Opens a session by loading the page and returns its cookie.
    async fn open(app: &Router) -> String {
        let res = send(app, Request::get("/").body(Body::empty()).unwrap()).await;
        issued_cookie(&res)
    }

    fn search(cookie: &str, form: &'static str) -> Request<Body> {
        Request::post("/search")
            .header(header::COOKIE, cookie)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form))
            .unwrap()
    }

    fn get_with(cookie: &str, uri: &str) -> Request<Body> {
        Request::get(uri)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    }

    /// First `/feature/{page}/{index}` path in a fragment.
    fn first_tile(html: &str) -> String {
        let start = html.find(r#"hx-get="/feature/"#).unwrap() + r#"hx-get=""#.len();
        let rest = &html[start..];
        rest[..rest.find('"').unwrap()].to_string()
    }

    #[tokio::test]
    async fn index_serves_document_and_issues_session() {
        let (app, _, _) = app();
        let res = send(&app, Request::get("/").body(Body::empty()).unwrap()).await;
        assert_eq!(res.status(), StatusCode::OK);
        let cookie = issued_cookie(&res);
        assert!(cookie.starts_with("artscope_session="));
        let html = body_text(res).await;
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"id="select-classification""#));

        let again = send(&app, get_with(&cookie, "/")).await;
        assert!(again.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn search_form_renders_results() {
        let (app, api, _) = app();
        let cookie = open(&app).await;
        let res = send(&app, search(&cookie, "classification=Vessels&century=&keywords=blue+bowl")).await;
        assert_eq!(res.status(), StatusCode::OK);
        let html = body_text(res).await;
        assert!(html.starts_with(r#"<main id="app">"#));
        assert!(html.contains("<h3>Bowl</h3>"));

        let calls = api.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains("classification=Vessels"));
        assert!(calls[0].contains("keyword=blue+bowl"));
        assert!(!calls[0].contains("century="));
    }

    #[tokio::test]
    async fn next_control_fetches_stored_link() {
        let (app, api, _) = app();
        let cookie = open(&app).await;
        send(&app, search(&cookie, "keywords=bowl")).await;

        let req = Request::post("/page/next")
            .header(header::COOKIE, cookie.as_str())
            .body(Body::empty())
            .unwrap();
        let res = send(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(body_text(res).await.contains("<h3>Bowl II</h3>"));
        assert_eq!(api.calls().last().map(String::as_str), Some("https://api.harvardartmuseums.org/object?page=2"));
    }

    #[tokio::test]
    async fn unknown_control_is_not_found() {
        let (app, _, _) = app();
        let res = send(&app, Request::post("/page/sideways").body(Body::empty()).unwrap()).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn fact_reference_runs_cross_reference_search() {
        let (app, api, explorer) = app();
        let cookie = open(&app).await;
        send(&app, search(&cookie, "keywords=bowl")).await;

        let res = send(&app, get_with(&cookie, "/follow?field=culture&value=Chinese")).await;
        assert_eq!(res.status(), StatusCode::OK);
        let expected = explorer.queries().cross_reference(SearchField::Culture, "Chinese");
        assert_eq!(api.calls().last(), Some(&expected));
        assert!(body_text(res).await.contains("<h3>Bowl</h3>"));
    }

    #[tokio::test]
    async fn unknown_fact_field_is_refused() {
        let (app, api, _) = app();
        let cookie = open(&app).await;
        let res = send(&app, get_with(&cookie, "/follow?field=apikey&value=x")).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn mail_link_leaves_grid_unchanged() {
        let (app, api, _) = app();
        let cookie = open(&app).await;
        let before = body_text(send(&app, search(&cookie, "keywords=bowl")).await).await;
        let calls = api.calls().len();

        let res = send(&app, get_with(&cookie, "/follow?href=mailto%3Ainfo%40example.org")).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_text(res).await, before);
        assert_eq!(api.calls().len(), calls);
    }

    #[tokio::test]
    async fn follow_refuses_foreign_hosts() {
        let (app, api, _) = app();
        let cookie = open(&app).await;
        let res = send(&app, get_with(&cookie, "/follow?href=https%3A%2F%2Fexample.org%2Fobject")).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_preview_is_not_found() {
        let (app, _, _) = app();
        let cookie = open(&app).await;
        let res = send(&app, get_with(&cookie, "/feature/0/0")).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn sessions_do_not_share_screens() {
        let (app, _, _) = app();
        let alice = open(&app).await;
        let bob = open(&app).await;
        assert_ne!(alice, bob);

        let alice_grid = body_text(send(&app, search(&alice, "keywords=alice")).await).await;
        let tile = first_tile(&alice_grid);
        let bob_grid = body_text(send(&app, search(&bob, "keywords=bob")).await).await;
        assert!(bob_grid.contains("BobCoin"));

        let res = send(&app, get_with(&alice, &tile)).await;
        assert_eq!(res.status(), StatusCode::OK);
        let html = body_text(res).await;
        assert!(html.contains(r#"<div class="object-feature"><header><h3>AliceVase</h3>"#));
        assert!(!html.contains("BobCoin"));

        // alice's tile reference means nothing on bob's screen
        let res = send(&app, get_with(&bob, &tile)).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn replaced_page_tile_is_not_found() {
        let (app, _, _) = app();
        let cookie = open(&app).await;
        let first = body_text(send(&app, search(&cookie, "keywords=alice")).await).await;
        let tile = first_tile(&first);
        send(&app, search(&cookie, "keywords=bob")).await;

        let res = send(&app, get_with(&cookie, &tile)).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
