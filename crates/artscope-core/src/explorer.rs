//! Explorer: the interaction layer. Binds startup, search, pagination, link
//! navigation and preview selection to the gateway, renderer and view.
//!
//! Each browser session owns its own screen; only the facet lists are shared.
//! Fetches run outside the screen lock; a response is applied under one write
//! lock so previews and pagination never disagree. Every page-replacing action
//! takes a ticket, and a response is dropped when a newer one was already shown.

use crate::api::{ApiClient, Endpoints};
use crate::busy::BusyIndicator;
use crate::cache::CacheStore;
use crate::models::ReferenceEntry;
use crate::pagination::Direction;
use crate::query::{QueryBuilder, SearchCriteria, SearchField};
use crate::reference::ReferenceCatalog;
use crate::render::render_feature;
use crate::view::ViewState;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

const MAIL_SCHEME: &str = "mailto";
const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(3600);

/// Opaque browser-session identifier (carried in the gateway's cookie).
pub type SessionId = String;

/// What an interaction did to the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The fetched page (or lists) replaced what was displayed.
    Applied,
    /// Nothing to do: disabled control or inert mail link. No fetch issued.
    Ignored,
    /// A newer page was already displayed when this response arrived.
    Stale,
    /// Link target outside the API; refused without fetching.
    Rejected,
    /// The fetch failed; logged, screen unchanged.
    Failed,
}

#[derive(Default)]
struct Facets {
    classifications: Vec<ReferenceEntry>,
    centuries: Vec<ReferenceEntry>,
    revision: u64,
}

struct Screen {
    view: ViewState,
    /// `Facets::revision` last copied into `view`.
    facets_revision: u64,
}

struct Session {
    screen: RwLock<Screen>,
    busy: BusyIndicator,
    /// Seconds since the explorer started, at the last request.
    last_seen: AtomicU64,
}

impl Session {
    fn new(now: u64) -> Self {
        Self {
            screen: RwLock::new(Screen {
                view: ViewState::new(),
                facets_revision: 0,
            }),
            busy: BusyIndicator::new(),
            last_seen: AtomicU64::new(now),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExplorerStatus {
    pub classifications: usize,
    pub centuries: usize,
    pub previews: usize,
    pub total_records: Option<u64>,
    pub has_next: bool,
    pub has_previous: bool,
    pub feature_open: bool,
    pub busy: bool,
    pub sessions: usize,
}

pub struct Explorer {
    client: Arc<dyn ApiClient>,
    catalog: ReferenceCatalog,
    queries: QueryBuilder,
    /// Lit by reference-list fetches, which every session waits on.
    busy: BusyIndicator,
    issued: AtomicU64,
    facets: RwLock<Facets>,
    sessions: DashMap<SessionId, Arc<Session>>,
    session_idle: Duration,
    started: Instant,
}

impl Explorer {
    pub fn new(client: Arc<dyn ApiClient>, cache: Arc<dyn CacheStore>, endpoints: Endpoints) -> Self {
        let busy = BusyIndicator::new();
        let catalog = ReferenceCatalog::new(cache, Arc::clone(&client), endpoints.clone(), busy.clone());
        Self {
            client,
            catalog,
            queries: QueryBuilder::new(endpoints),
            busy,
            issued: AtomicU64::new(0),
            facets: RwLock::new(Facets::default()),
            sessions: DashMap::new(),
            session_idle: DEFAULT_SESSION_IDLE,
            started: Instant::now(),
        }
    }

    pub fn with_session_idle(mut self, idle: Duration) -> Self {
        self.session_idle = idle;
        self
    }

    pub fn queries(&self) -> &QueryBuilder {
        &self.queries
    }

    /// Returns the presented session if it is still live, otherwise opens a
    /// new one. The flag is true when the id was freshly issued.
    pub fn resume_or_open(&self, presented: Option<&str>) -> (SessionId, bool) {
        if let Some(id) = presented {
            if let Some(session) = self.sessions.get(id) {
                session.last_seen.store(self.now(), Ordering::Relaxed);
                return (id.to_string(), false);
            }
        }
        (self.open_session(), true)
    }

    /// Issues a new session id and drops sessions idle past the limit.
    pub fn open_session(&self) -> SessionId {
        let now = self.now();
        let idle = self.session_idle.as_secs();
        let before = self.sessions.len();
        self.sessions
            .retain(|_, s| now.saturating_sub(s.last_seen.load(Ordering::Relaxed)) < idle);
        let dropped = before.saturating_sub(self.sessions.len());
        if dropped > 0 {
            tracing::debug!(target: "artscope::explorer", dropped, "expired idle sessions");
        }

        let id = uuid::Uuid::new_v4().to_string();
        self.sessions.insert(id.clone(), Arc::new(Session::new(now)));
        tracing::debug!(target: "artscope::explorer", session = %id, "session opened");
        id
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_busy(&self, session: &str) -> bool {
        self.busy.is_busy() || self.session(session).busy.is_busy()
    }

    /// Prefetch both facet lists and populate the selectors of every session.
    /// If either list fails, neither is populated.
    pub async fn startup(&self) -> Outcome {
        match self.catalog.prefetch().await {
            Ok((classifications, centuries)) => {
                tracing::info!(
                    target: "artscope::explorer",
                    classifications = classifications.len(),
                    centuries = centuries.len(),
                    "facet lists ready"
                );
                let mut facets = self.facets.write().await;
                facets.classifications = classifications;
                facets.centuries = centuries;
                facets.revision += 1;
                Outcome::Applied
            }
            Err(e) => {
                tracing::error!(target: "artscope::explorer", error = %e, "reference prefetch failed");
                Outcome::Failed
            }
        }
    }

    /// Search submission: build the query from the selection and show its first page.
    pub async fn search(&self, session: &str, criteria: SearchCriteria) -> Outcome {
        let session = self.session(session);
        let url = self.queries.build(&criteria);
        session.screen.write().await.view.criteria = criteria;
        self.show_page(&session, &url, "search").await
    }

    /// Pagination control. A disabled control does nothing.
    pub async fn paginate(&self, session: &str, direction: Direction) -> Outcome {
        let session = self.session(session);
        let url = {
            let screen = session.screen.read().await;
            screen.view.pagination().url(direction).map(str::to_string)
        };
        match url {
            Some(url) => self.show_page(&session, &url, direction.label()).await,
            None => {
                tracing::debug!(target: "artscope::explorer", control = direction.label(), "control disabled");
                Outcome::Ignored
            }
        }
    }

    /// Navigates to an API link. Mail links are inert.
    pub async fn follow_link(&self, session: &str, href: &str) -> Outcome {
        if href.starts_with(MAIL_SCHEME) {
            return Outcome::Ignored;
        }
        if !self.queries.endpoints().is_api_url(href) {
            tracing::warn!(target: "artscope::explorer", href, "refusing to follow non-API link");
            return Outcome::Rejected;
        }
        let session = self.session(session);
        self.show_page(&session, href, "follow").await
    }

    /// Cross-reference link clicked in the feature view: search on `field = value`.
    pub async fn follow_reference(&self, session: &str, field: SearchField, value: &str) -> Outcome {
        if value.trim().is_empty() {
            return Outcome::Ignored;
        }
        let url = self.queries.cross_reference(field, value);
        let session = self.session(session);
        self.show_page(&session, &url, "follow").await
    }

    /// Preview tile clicked: show its record without refetching. Returns false
    /// when `page` is no longer on screen or `index` is not on its grid.
    pub async fn select_preview(&self, session: &str, page: u64, index: usize) -> bool {
        let session = self.session(session);
        let mut screen = session.screen.write().await;
        let feature = match screen.view.preview(page, index) {
            Some(tile) => render_feature(&tile.record, &self.queries),
            None => return false,
        };
        screen.view.feature = Some(feature);
        true
    }

    pub async fn document_html(&self, session: &str) -> String {
        let busy = self.is_busy(session);
        self.with_view(session, |view| view.document_html(busy)).await
    }

    pub async fn app_html(&self, session: &str) -> String {
        let busy = self.is_busy(session);
        self.with_view(session, |view| view.app_html(busy)).await
    }

    pub async fn status(&self, session: &str) -> ExplorerStatus {
        let busy = self.is_busy(session);
        let sessions = self.session_count();
        self.with_view(session, |view| ExplorerStatus {
            classifications: view.classifications.len(),
            centuries: view.centuries.len(),
            previews: view.previews().len(),
            total_records: view.total_records(),
            has_next: view.pagination().has_next(),
            has_previous: view.pagination().has_previous(),
            feature_open: view.feature.is_some(),
            busy,
            sessions,
        })
        .await
    }

    /// Snapshot of a session's view, for callers that inspect rather than render.
    pub async fn view(&self, session: &str) -> ViewState {
        self.with_view(session, ViewState::clone).await
    }

    fn now(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    /// The session under `id`, created empty if it does not exist yet.
    fn session(&self, id: &str) -> Arc<Session> {
        let now = self.now();
        let session = self
            .sessions
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Session::new(now)))
            .value()
            .clone();
        session.last_seen.store(now, Ordering::Relaxed);
        session
    }

    /// Runs `f` on the session's view after bringing its facet lists up to date.
    async fn with_view<T>(&self, id: &str, f: impl FnOnce(&ViewState) -> T) -> T {
        let session = self.session(id);
        let mut screen = session.screen.write().await;
        let facets = self.facets.read().await;
        if screen.facets_revision != facets.revision {
            screen.view.classifications = facets.classifications.clone();
            screen.view.centuries = facets.centuries.clone();
            screen.facets_revision = facets.revision;
        }
        f(&screen.view)
    }

    async fn show_page(&self, session: &Session, url: &str, action: &'static str) -> Outcome {
        let ticket = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let _busy = session.busy.hold();

        let page = match self.client.fetch_page(url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::error!(target: "artscope::explorer", action, error = %e, "fetch failed");
                return Outcome::Failed;
            }
        };

        let mut screen = session.screen.write().await;
        let shown = screen.view.page();
        if ticket < shown {
            tracing::debug!(target: "artscope::explorer", action, ticket, shown, "discarding stale page");
            return Outcome::Stale;
        }
        screen.view.replace_page(&page, ticket);
        tracing::info!(
            target: "artscope::explorer",
            action,
            records = page.records.len(),
            has_next = screen.view.pagination().has_next(),
            has_previous = screen.view.pagination().has_previous(),
            "page shown"
        );
        Outcome::Applied
    }
}
