//! Typed shapes of the art-collection API responses.
//!
//! Every attribute the remote contract does not guarantee is optional, so a sparse
//! record deserializes cleanly while a structurally wrong body (e.g. `records` not
//! being an array) is rejected at the boundary.

use serde::{Deserialize, Deserializer, Serialize};

/// One value of a facet reference list (a century or a classification).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objectcount: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporalorder: Option<i64>,
}

impl ReferenceEntry {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            objectcount: None,
            temporalorder: None,
        }
    }
}

/// Body of `/century` and `/classification`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceListResponse {
    pub records: Vec<ReferenceEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonDescriptor {
    #[serde(default)]
    pub displayname: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    #[serde(default)]
    pub baseimageurl: Option<String>,
}

/// An artwork as returned by `/object`. Never mutated after ingress.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtworkRecord {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub dated: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub culture: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub technique: Option<String>,
    #[serde(default)]
    pub medium: Option<String>,
    #[serde(default)]
    pub dimensions: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub people: Vec<PersonDescriptor>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub division: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub creditline: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub images: Vec<ImageDescriptor>,
    #[serde(default)]
    pub primaryimageurl: Option<String>,
}

/// Pagination block of an object search. `next`/`prev` are absent or null at the ends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub prev: Option<String>,
    #[serde(default)]
    pub totalrecords: Option<u64>,
    #[serde(default)]
    pub pages: Option<u64>,
    #[serde(default)]
    pub page: Option<u64>,
}

/// One page of object-search results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordPage {
    #[serde(default)]
    pub info: PageInfo,
    pub records: Vec<ArtworkRecord>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Treats `None` and blank strings alike; the API sends both for missing facts.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}
