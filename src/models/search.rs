// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::models::project::ProjectStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use utoipa::ToSchema;

/// Default number of buckets returned per facet
pub const DEFAULT_FACET_LIMIT: usize = 36;
/// Default page size for result lists
pub const DEFAULT_PER_PAGE: usize = 30;
/// Hard upper bound on page size
pub const MAX_PER_PAGE: usize = 100;

/// Flattened projection of a project, stored in the search index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct IndexedDocument {
    pub id: i64,
    pub name: String,
    /// Un-analyzed copy of `name` for exact and prefix matching
    pub exact_name: String,
    /// Components of composite identifiers ("group:artifact", "group/name")
    pub extra_searchable_names: Vec<String>,
    pub platform: String,
    pub description: Option<String>,
    pub homepage: Option<String>,
    pub repository_url: Option<String>,
    pub repo_name: Option<String>,
    pub language: Option<String>,
    pub keywords_array: Vec<String>,
    pub normalized_licenses: Vec<String>,
    pub latest_release_number: Option<String>,
    pub status: ProjectStatus,
    pub rank: i64,
    pub stars: i64,
    pub dependents_count: i64,
    pub dependent_repos_count: i64,
    pub contributions_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub latest_release_published_at: Option<DateTime<Utc>>,
}

/// Filter values per index field. Values within a field are OR'd, fields are AND'd.
pub type Filters = BTreeMap<String, BTreeSet<String>>;

/// Bucket counts per facet field
pub type FacetBuckets = BTreeMap<String, Vec<FacetBucket>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// "asc" in any case selects ascending; anything else is descending
    pub fn parse_lenient(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("asc") {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Request to search the project index, as received over the wire
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SearchRequest {
    /// Free text; empty means browse mode
    #[serde(default)]
    pub q: String,
    /// Index field -> comma-joined accepted values
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    /// "asc" or "desc" (default: desc)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    /// Buckets per facet (default: 36)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facet_limit: Option<usize>,
    /// Autocomplete mode: prefix match on the exact name
    #[serde(default, deserialize_with = "deserialize_bool_like")]
    pub prefix: bool,
    /// Lightweight API caller: no facets, no suggestion
    #[serde(default, deserialize_with = "deserialize_bool_like")]
    pub api: bool,
    /// 1-based page number (default: 1)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    /// Page size (default: 30, max: 100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<usize>,
}

impl SearchRequest {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            ..Default::default()
        }
    }

    /// Split the wire form into the query text and typed options
    pub fn to_parts(&self) -> (String, SearchOptions) {
        let mut options = SearchOptions {
            sort: self
                .sort
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            order: self.order.as_deref().map(SortOrder::parse_lenient),
            facet_limit: self.facet_limit.unwrap_or(DEFAULT_FACET_LIMIT),
            prefix: self.prefix,
            api: self.api,
            page: self.page.unwrap_or(1).max(1),
            per_page: self
                .per_page
                .unwrap_or(DEFAULT_PER_PAGE)
                .clamp(1, MAX_PER_PAGE),
            ..Default::default()
        };
        for (field, raw) in &self.filters {
            options.add_filter(field, raw);
        }
        (self.q.trim().to_string(), options)
    }
}

/// Typed search options with their defaults applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOptions {
    pub filters: Filters,
    /// Explicit sort field; `None` selects the mode-dependent default
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
    pub facet_limit: usize,
    pub prefix: bool,
    pub api: bool,
    pub page: usize,
    pub per_page: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            filters: Filters::new(),
            sort: None,
            order: None,
            facet_limit: DEFAULT_FACET_LIMIT,
            prefix: false,
            api: false,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl SearchOptions {
    /// Add comma-joined values for `field`. Blank input leaves the filters untouched.
    pub fn add_filter(&mut self, field: &str, raw: &str) {
        let values = split_filter_values(raw);
        if values.is_empty() {
            return;
        }
        self.filters
            .entry(field.to_string())
            .or_default()
            .extend(values);
    }

    pub fn with_filter(mut self, field: &str, raw: &str) -> Self {
        self.add_filter(field, raw);
        self
    }

    /// Filters that actually constrain results (empty value sets removed)
    pub fn active_filters(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.filters.iter().filter(|(_, values)| !values.is_empty())
    }

    /// Zero-based offset of the first hit on the requested page
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }

    /// Stable cache key for facet counts computed from these options.
    ///
    /// Only the inputs of a facets request are hashed (active filters and the
    /// facet limit), as canonical JSON, so two option sets share a key only if
    /// they produce the same facet counts.
    pub fn cache_key(&self) -> String {
        #[derive(Serialize)]
        struct FacetKey<'a> {
            filters: BTreeMap<&'a String, &'a BTreeSet<String>>,
            facet_limit: usize,
        }

        let key = FacetKey {
            filters: self.active_filters().collect(),
            facet_limit: self.facet_limit,
        };
        // Serializing plain maps, strings and integers cannot fail
        let canonical = serde_json::to_string(&key).unwrap_or_default();
        format!("facets:{:x}", md5::compute(canonical.as_bytes()))
    }
}

/// Split a comma-joined filter value, trimming whitespace and dropping blanks
pub fn split_filter_values(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

/// Accept JSON booleans as well as "true"/"1"/"yes"/"on" style flags
fn deserialize_bool_like<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolLike {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    Ok(match Option::<BoolLike>::deserialize(deserializer)? {
        None => false,
        Some(BoolLike::Bool(value)) => value,
        Some(BoolLike::Int(value)) => value != 0,
        Some(BoolLike::Text(value)) => matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "on"
        ),
    })
}

/// Search hit
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchResult {
    /// The indexed document
    pub document: IndexedDocument,
    /// Relevance score
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

/// One value of a facet and how many documents carry it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FacetBucket {
    pub key: String,
    pub doc_count: u64,
}

/// Search response containing results and metadata
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    /// Total number of matching documents
    pub total: u64,
    /// Facet field -> buckets; absent for API callers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facets: Option<BTreeMap<String, Vec<FacetBucket>>>,
    /// "Did you mean" alternative for the query text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Engine-side processing time in milliseconds
    pub processing_ms: u64,
}

/// Facet counts without a result list
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FacetsResponse {
    pub facets: BTreeMap<String, Vec<FacetBucket>>,
    /// Key under which callers may cache this response
    pub cache_key: String,
}
