//! Result renderer: preview tiles for the grid and the feature (detail) view.
//!
//! Both renderers are pure; they never fetch. Every interpolated value is
//! HTML-escaped. Fact links keep their API search URL server-side; the markup
//! only carries the field and value, which the gateway's follow route turns
//! back into that URL.

use crate::models::{non_empty, ArtworkRecord};
use crate::query::{QueryBuilder, SearchField};
use crate::view::routes;

/// One tile of the preview grid. Keeps the record it was rendered from so the
/// feature view can be built without a second fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewTile {
    pub record: ArtworkRecord,
    pub image: Option<String>,
    pub title: Option<String>,
}

impl PreviewTile {
    /// Markup for the tile at `index` of the page shown under ticket `page`.
    pub fn html(&self, page: u64, index: usize) -> String {
        let mut inner = String::new();
        if let Some(src) = &self.image {
            inner.push_str(&format!(r#"<img src="{}" />"#, html_escape(src)));
        }
        if let Some(title) = &self.title {
            inner.push_str(&format!("<h3>{}</h3>", html_escape(title)));
        }
        format!(
            r##"<div class="object-preview"><a href="#" hx-get="{}/{}/{}" hx-target="{}" hx-swap="outerHTML">{}</a></div>"##,
            routes::FEATURE,
            page,
            index,
            routes::APP_TARGET,
            inner
        )
    }
}

pub fn render_preview(record: &ArtworkRecord) -> PreviewTile {
    PreviewTile {
        record: record.clone(),
        image: non_empty(record.primaryimageurl.as_deref()).map(str::to_string),
        title: non_empty(record.title.as_deref()).map(str::to_string),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactContent {
    Text(String),
    /// Cross-reference: `href` is the faceted-search URL for `field = value`.
    Link {
        field: SearchField,
        value: String,
        href: String,
    },
    Mail(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fact {
    pub label: &'static str,
    pub content: FactContent,
}

impl Fact {
    fn html(&self) -> String {
        let content = match &self.content {
            FactContent::Text(t) => html_escape(t),
            FactContent::Link { field, value, .. } => {
                let vals = serde_json::json!({ "field": field.param(), "value": value }).to_string();
                format!(
                    r##"<a href="#" hx-get="{}" hx-vals="{}" hx-target="{}" hx-swap="outerHTML" hx-indicator="{}">{}</a>"##,
                    routes::FOLLOW,
                    html_escape(&vals),
                    routes::APP_TARGET,
                    routes::LOADING,
                    html_escape(value)
                )
            }
            FactContent::Mail(addr) => {
                let addr = html_escape(addr);
                format!(r#"<a target="_blank" href="mailto:{}">{}</a>"#, addr, addr)
            }
        };
        format!(
            r#"<span class="title">{}</span><span class="content">{}</span>"#,
            self.label, content
        )
    }
}

/// Detail rendering of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureView {
    pub title: Option<String>,
    pub dated: Option<String>,
    pub facts: Vec<Fact>,
    pub photos: Vec<String>,
}

impl FeatureView {
    pub fn facts_labeled<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a Fact> + 'a {
        self.facts.iter().filter(move |f| f.label == label)
    }

    pub fn html(&self) -> String {
        let mut header = String::new();
        if let Some(t) = &self.title {
            header.push_str(&format!("<h3>{}</h3>", html_escape(t)));
        }
        if let Some(d) = &self.dated {
            header.push_str(&format!("<h4>{}</h4>", html_escape(d)));
        }
        let facts: String = self.facts.iter().map(Fact::html).collect();
        let photos: String = self
            .photos
            .iter()
            .map(|src| format!(r#"<img src="{}" />"#, html_escape(src)))
            .collect();
        format!(
            r#"<div class="object-feature"><header>{}</header><section class="facts">{}</section><section class="photos">{}</section></div>"#,
            header, facts, photos
        )
    }
}

/// Builds the fact sheet. A fact whose source is empty is omitted entirely.
pub fn render_feature(record: &ArtworkRecord, queries: &QueryBuilder) -> FeatureView {
    let mut facts = Vec::new();

    let text = |facts: &mut Vec<Fact>, label: &'static str, value: Option<&str>| {
        if let Some(v) = non_empty(value) {
            facts.push(Fact {
                label,
                content: FactContent::Text(v.to_string()),
            });
        }
    };
    let link = |facts: &mut Vec<Fact>, label: &'static str, field: SearchField, value: Option<String>| {
        if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
            facts.push(Fact {
                label,
                content: FactContent::Link {
                    field,
                    href: queries.cross_reference(field, &v),
                    value: v,
                },
            });
        }
    };

    text(&mut facts, "Description", record.description.as_deref());
    link(&mut facts, "Culture", SearchField::Culture, record.culture.clone());
    text(&mut facts, "Style", record.style.as_deref());
    link(&mut facts, "Technique", SearchField::Technique, record.technique.clone());
    // medium is lowercased before it becomes a search term; other facets are not
    link(
        &mut facts,
        "Medium",
        SearchField::Medium,
        record.medium.as_deref().map(str::to_lowercase),
    );
    text(&mut facts, "Dimensions", record.dimensions.as_deref());
    for person in &record.people {
        link(&mut facts, "Person", SearchField::Person, person.displayname.clone());
    }
    text(&mut facts, "Department", record.department.as_deref());
    text(&mut facts, "Division", record.division.as_deref());
    if let Some(contact) = non_empty(record.contact.as_deref()) {
        facts.push(Fact {
            label: "Contact",
            content: FactContent::Mail(contact.to_string()),
        });
    }
    text(&mut facts, "Credit", record.creditline.as_deref());

    FeatureView {
        title: non_empty(record.title.as_deref()).map(str::to_string),
        dated: non_empty(record.dated.as_deref()).map(str::to_string),
        facts,
        photos: photo_sources(record),
    }
}

/// All image descriptors if there are any, else the primary image, else nothing.
fn photo_sources(record: &ArtworkRecord) -> Vec<String> {
    if !record.images.is_empty() {
        return record
            .images
            .iter()
            .filter_map(|img| non_empty(img.baseimageurl.as_deref()).map(str::to_string))
            .collect();
    }
    non_empty(record.primaryimageurl.as_deref())
        .map(|u| vec![u.to_string()])
        .unwrap_or_default()
}

/// Escapes HTML to prevent injection from API-provided strings.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
