//! Query builder: faceted-search URLs from the user's current selection.

use crate::api::Endpoints;
use serde::Deserialize;

/// Facet selection read at submission time. Empty strings mean "any".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchCriteria {
    #[serde(default)]
    pub classification: Option<String>,
    #[serde(default)]
    pub century: Option<String>,
    #[serde(default, alias = "keywords")]
    pub keyword: Option<String>,
}

impl SearchCriteria {
    pub fn new(classification: &str, century: &str, keyword: &str) -> Self {
        Self {
            classification: Some(classification.to_string()),
            century: Some(century.to_string()),
            keyword: Some(keyword.to_string()),
        }
    }
}

/// Facets that can be turned into cross-reference links in the feature view.
/// Deserializes from the same lowercase names `param` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    Culture,
    Technique,
    Medium,
    Person,
}

impl SearchField {
    pub fn param(self) -> &'static str {
        match self {
            SearchField::Culture => "culture",
            SearchField::Technique => "technique",
            SearchField::Medium => "medium",
            SearchField::Person => "person",
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueryBuilder {
    endpoints: Endpoints,
}

impl QueryBuilder {
    pub fn new(endpoints: Endpoints) -> Self {
        Self { endpoints }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Faceted search URL. Empty facets are left out (the API treats absent and
    /// empty alike); the keyword is passed through untouched apart from encoding.
    pub fn build(&self, criteria: &SearchCriteria) -> String {
        let facets = [
            ("classification", criteria.classification.as_deref()),
            ("century", criteria.century.as_deref()),
            ("keyword", criteria.keyword.as_deref()),
        ];
        self.endpoints.object_search(
            facets
                .into_iter()
                .filter_map(|(k, v)| v.filter(|s| !s.is_empty()).map(|v| (k, v))),
        )
    }

    /// Search URL keyed on a single field value, used as a fact link target.
    pub fn cross_reference(&self, field: SearchField, value: &str) -> String {
        self.endpoints.object_search([(field.param(), value)])
    }
}
