//! UI tree of the single-page explorer: what is on screen and its markup.

use crate::models::{RecordPage, ReferenceEntry};
use crate::pagination::{Direction, Pagination};
use crate::query::SearchCriteria;
use crate::render::{html_escape, render_preview, FeatureView, PreviewTile};

/// Gateway routes the markup binds to.
pub mod routes {
    pub const SEARCH: &str = "/search";
    pub const PAGE: &str = "/page";
    pub const FOLLOW: &str = "/follow";
    pub const FEATURE: &str = "/feature";
    /// Element swapped by every interaction.
    pub const APP_TARGET: &str = "#app";
    /// Busy indicator lit by htmx while a request is in flight.
    pub const LOADING: &str = "#loading";
}

const HTMX_SRC: &str = "https://unpkg.com/htmx.org@1.9.12";

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 0; background: #f4f1ea; color: #222; }
#app { display: grid; grid-template-columns: 280px 1fr 1fr; gap: 1rem; padding: 1rem; }
#search { display: flex; flex-direction: column; gap: .5rem; }
.results { display: grid; grid-template-columns: repeat(auto-fill, minmax(140px, 1fr)); gap: .5rem; }
.object-preview img { max-width: 100%; }
.facts { display: grid; grid-template-columns: max-content 1fr; gap: .25rem 1rem; }
.facts .title { font-weight: bold; }
.photos img { max-width: 100%; margin-top: .5rem; }
#loading { display: none; position: fixed; top: 0; left: 0; right: 0; height: 4px; background: #a51c30; }
#loading.active, #loading.htmx-request { display: block; }
"#;

/// Everything currently displayed. Previews and pagination only ever change
/// together through [`ViewState::replace_page`].
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub classifications: Vec<ReferenceEntry>,
    pub centuries: Vec<ReferenceEntry>,
    pub criteria: SearchCriteria,
    previews: Vec<PreviewTile>,
    /// Ticket of the page the previews came from; 0 before the first page.
    page: u64,
    pagination: Pagination,
    total_records: Option<u64>,
    pub feature: Option<FeatureView>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the old grid, inserts the new tiles and swaps the pagination links
    /// in one step.
    pub fn replace_page(&mut self, page: &RecordPage, ticket: u64) {
        self.previews = page.records.iter().map(render_preview).collect();
        self.page = ticket;
        self.pagination = Pagination::from_info(&page.info);
        self.total_records = page.info.totalrecords;
    }

    pub fn previews(&self) -> &[PreviewTile] {
        &self.previews
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    /// Preview at `index`, provided the grid still shows page `page`.
    pub fn preview(&self, page: u64, index: usize) -> Option<&PreviewTile> {
        if page != self.page {
            return None;
        }
        self.previews.get(index)
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn total_records(&self) -> Option<u64> {
        self.total_records
    }

    /// Full HTML document: the single entry point served at `/`.
    pub fn document_html(&self, busy: bool) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8" />
<title>Artscope</title>
<script src="{}"></script>
<style>{}</style>
</head>
<body>
{}
</body>
</html>"#,
            HTMX_SRC,
            STYLE,
            self.app_html(busy)
        )
    }

    /// The `#app` fragment returned by every interaction.
    pub fn app_html(&self, busy: bool) -> String {
        format!(
            r#"<main id="app">{}{}<section id="feature">{}</section><div id="loading"{}></div></main>"#,
            self.search_html(),
            self.preview_html(),
            self.feature.as_ref().map(FeatureView::html).unwrap_or_default(),
            if busy { r#" class="active""# } else { "" }
        )
    }

    fn search_html(&self) -> String {
        format!(
            r##"<form id="search" hx-post="{search}" hx-target="{target}" hx-swap="outerHTML" hx-indicator="{loading}">
<label for="select-classification">Classification <span class="classification-count">({cn})</span></label>
<select id="select-classification" name="classification">{copts}</select>
<label for="select-century">Century <span class="century-count">({tn})</span></label>
<select id="select-century" name="century">{topts}</select>
<input id="keywords" name="keywords" type="text" placeholder="keywords" value="{kw}" />
<button type="submit">Search</button>
</form>"##,
            search = routes::SEARCH,
            target = routes::APP_TARGET,
            loading = routes::LOADING,
            cn = self.classifications.len(),
            copts = options_html(&self.classifications, self.criteria.classification.as_deref()),
            tn = self.centuries.len(),
            topts = options_html(&self.centuries, self.criteria.century.as_deref()),
            kw = html_escape(self.criteria.keyword.as_deref().unwrap_or_default()),
        )
    }

    fn preview_html(&self) -> String {
        let tiles: String = self
            .previews
            .iter()
            .enumerate()
            .map(|(i, t)| t.html(self.page, i))
            .collect();
        let total = self
            .total_records
            .map(|n| format!(r#"<p class="total">{} records</p>"#, n))
            .unwrap_or_default();
        format!(
            r#"<section id="preview"><div class="controls">{}{}</div>{}<div class="results">{}</div></section>"#,
            control_html(&self.pagination, Direction::Previous),
            control_html(&self.pagination, Direction::Next),
            total,
            tiles
        )
    }
}

fn options_html(entries: &[ReferenceEntry], selected: Option<&str>) -> String {
    let mut out = String::from(r#"<option value="">Any</option>"#);
    for entry in entries {
        let name = html_escape(&entry.name);
        let sel = if selected == Some(entry.name.as_str()) {
            " selected"
        } else {
            ""
        };
        out.push_str(&format!(r#"<option value="{}"{}>{}</option>"#, name, sel, name));
    }
    out
}

fn control_html(pagination: &Pagination, direction: Direction) -> String {
    let label = direction.label();
    let disabled = if pagination.url(direction).is_some() {
        ""
    } else {
        " disabled"
    };
    format!(
        r##"<button class="{label}" hx-post="{page}/{label}" hx-target="{target}" hx-swap="outerHTML" hx-indicator="{loading}"{disabled}>{label}</button>"##,
        label = label,
        page = routes::PAGE,
        target = routes::APP_TARGET,
        loading = routes::LOADING,
        disabled = disabled
    )
}
