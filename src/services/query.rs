// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Translation of search requests into engine query DSL.
//!
//! Each part of the request (exclusions, user filters, text query, sort,
//! facet aggregations, suggestion) is built as its own immutable value and
//! assembled into a [`SearchBody`] once. Building is pure: equal inputs give
//! equal bodies, and the JSON rendering uses sorted maps throughout so the
//! serialized form is byte-stable.

use crate::models::project::ProjectStatus;
use crate::models::search::{SearchOptions, SortOrder};
use crate::services::schema::{self, Facet};
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

/// Platforms no longer supported whose documents may still linger in the index
pub const DEFAULT_RETIRED_PLATFORMS: [&str; 7] = [
    "Sublime",
    "Wordpress",
    "Atom",
    "PlatformIO",
    "Shards",
    "Emacs",
    "Jam",
];

/// Edit-distance tolerance for free-text matching
pub const FUZZINESS: f64 = 1.2;
/// Positions terms may move and still count as a phrase match
pub const PHRASE_SLOP: u32 = 2;

const EXCLUDED_STATUSES: [ProjectStatus; 2] = [ProjectStatus::Hidden, ProjectStatus::Removed];

/// Platform denylist applied to every request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetiredPlatforms(Vec<String>);

impl RetiredPlatforms {
    pub fn new<I, S>(platforms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list: Vec<String> = Vec::new();
        for platform in platforms {
            let platform = platform.as_ref().trim();
            if !platform.is_empty() && !list.iter().any(|p| p == platform) {
                list.push(platform.to_string());
            }
        }
        Self(list)
    }

    /// Parse a comma-separated list, as supplied through configuration
    pub fn parse(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    pub fn none() -> Self {
        Self(Vec::new())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn contains(&self, platform: &str) -> bool {
        self.0.iter().any(|p| p == platform)
    }
}

impl Default for RetiredPlatforms {
    fn default() -> Self {
        Self::new(DEFAULT_RETIRED_PLATFORMS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// Field equals the value
    Term { field: String, value: String },
    /// Field equals any of the values
    Terms { field: String, values: Vec<String> },
}

impl Clause {
    pub fn field(&self) -> &str {
        match self {
            Clause::Term { field, .. } | Clause::Terms { field, .. } => field,
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Clause::Term { field, value } => json!({ "term": { field.as_str(): value } }),
            Clause::Terms { field, values } => json!({ "terms": { field.as_str(): values } }),
        }
    }
}

/// Conjunction of required clauses and excluded clauses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    pub must: Vec<Clause>,
    pub must_not: Vec<Clause>,
}

impl FilterSet {
    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.must_not.is_empty()
    }

    pub fn constrains(&self, field: &str) -> bool {
        self.must.iter().any(|clause| clause.field() == field)
    }

    fn to_json(&self) -> Value {
        let mut bool_query = Map::new();
        bool_query.insert(
            "must".to_string(),
            self.must.iter().map(Clause::to_json).collect(),
        );
        if !self.must_not.is_empty() {
            bool_query.insert(
                "must_not".to_string(),
                self.must_not.iter().map(Clause::to_json).collect(),
            );
        }
        json!({ "bool": bool_query })
    }
}

/// The scored part of the query
#[derive(Debug, Clone, PartialEq)]
pub enum TextQuery {
    /// Browse mode: every visible document matches
    MatchAll,
    /// Free text scored across all weighted fields as one combined field
    MultiMatch { query: String, fields: Vec<String> },
    /// Autocomplete: raw prefix of the exact name
    Prefix { field: String, value: String },
}

impl TextQuery {
    fn to_json(&self) -> Value {
        match self {
            TextQuery::MatchAll => json!({ "match_all": {} }),
            TextQuery::MultiMatch { query, fields } => json!({
                "multi_match": {
                    "query": query,
                    "fields": fields,
                    "fuzziness": FUZZINESS,
                    "slop": PHRASE_SLOP,
                    "type": "cross_fields",
                    "operator": "and",
                }
            }),
            TextQuery::Prefix { field, value } => json!({ "prefix": { field.as_str(): value } }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub order: SortOrder,
}

impl SortKey {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    /// Most popular first: rank, then stars
    pub fn popularity() -> Vec<SortKey> {
        vec![
            SortKey::new(schema::RANK, SortOrder::Desc),
            SortKey::new(schema::STARS, SortOrder::Desc),
        ]
    }

    fn to_json(&self) -> Value {
        json!({ self.field.as_str(): self.order.as_str() })
    }
}

/// Request for a single "did you mean" alternative
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub text: String,
    pub field: String,
}

impl Suggestion {
    pub const NAME: &'static str = "did_you_mean";

    fn to_json(&self) -> Value {
        json!({
            (Self::NAME): {
                "text": self.text,
                "term": { "size": 1, "field": self.field },
            }
        })
    }
}

/// Terms aggregation for one facet, scoped by every other active filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetAggregation {
    pub facet: Facet,
    pub size: usize,
    pub filter: FilterSet,
}

impl FacetAggregation {
    fn to_json(&self) -> Value {
        json!({
            "filter": self.filter.to_json(),
            "aggs": {
                self.facet.agg_name(): {
                    "terms": { "field": self.facet.field(), "size": self.size }
                }
            }
        })
    }
}

/// Fully assembled engine request
#[derive(Debug, Clone, PartialEq)]
pub struct SearchBody {
    pub text_query: TextQuery,
    /// Unconditional status and platform exclusions
    pub exclusions: FilterSet,
    /// User filters, applied after aggregations are computed
    pub post_filter: FilterSet,
    pub aggregations: Vec<FacetAggregation>,
    pub suggestion: Option<Suggestion>,
    pub sort: Vec<SortKey>,
    pub from: usize,
    pub size: usize,
}

impl SearchBody {
    pub fn aggregation(&self, facet: Facet) -> Option<&FacetAggregation> {
        self.aggregations.iter().find(|agg| agg.facet == facet)
    }

    /// Engine query DSL for this request
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();

        body.insert(
            "query".to_string(),
            json!({
                "function_score": {
                    "query": {
                        "bool": {
                            "must": self.text_query.to_json(),
                            "filter": self.exclusions.to_json(),
                        }
                    },
                    "field_value_factor": { "field": schema::RANK, "modifier": "square" },
                    "boost_mode": "multiply",
                }
            }),
        );

        if !self.post_filter.is_empty() {
            body.insert("post_filter".to_string(), self.post_filter.to_json());
        }

        if !self.aggregations.is_empty() {
            let aggs: Map<String, Value> = self
                .aggregations
                .iter()
                .map(|agg| (agg.facet.agg_name().to_string(), agg.to_json()))
                .collect();
            body.insert("aggs".to_string(), Value::Object(aggs));
        }

        if let Some(suggestion) = &self.suggestion {
            body.insert("suggest".to_string(), suggestion.to_json());
        }

        if !self.sort.is_empty() {
            body.insert(
                "sort".to_string(),
                self.sort.iter().map(SortKey::to_json).collect(),
            );
        }

        body.insert("track_scores".to_string(), Value::Bool(true));
        body.insert("from".to_string(), json!(self.from));
        body.insert("size".to_string(), json!(self.size));

        Value::Object(body)
    }
}

impl Serialize for SearchBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Builds engine requests for project searches
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    retired_platforms: RetiredPlatforms,
}

impl QueryBuilder {
    pub fn new(retired_platforms: RetiredPlatforms) -> Self {
        Self { retired_platforms }
    }

    /// Build the full search request for `query_text` under `options`
    pub fn build(&self, query_text: &str, options: &SearchOptions) -> SearchBody {
        let has_text = !query_text.trim().is_empty();

        let aggregations = if options.api {
            Vec::new()
        } else {
            Facet::ALL
                .into_iter()
                .map(|facet| self.aggregation_spec(facet, options.facet_limit, options))
                .collect()
        };

        let suggestion = (has_text && !options.api).then(|| Suggestion {
            text: query_text.to_string(),
            field: schema::NAME.to_string(),
        });

        SearchBody {
            text_query: text_query(query_text, options),
            exclusions: self.exclusions(),
            post_filter: user_filters(options, None),
            aggregations,
            suggestion,
            sort: sort_keys(query_text, options),
            from: options.offset(),
            size: options.per_page,
        }
    }

    /// Terms aggregation for `facet`, filtered by every active filter except its own
    pub fn aggregation_spec(
        &self,
        facet: Facet,
        limit: usize,
        options: &SearchOptions,
    ) -> FacetAggregation {
        FacetAggregation {
            facet,
            size: limit,
            filter: user_filters(options, Some(facet.field())),
        }
    }

    /// Aggregations-only request for pages that show facet counts without results
    pub fn facets(&self, options: &SearchOptions) -> SearchBody {
        let options = SearchOptions {
            prefix: false,
            api: false,
            ..options.clone()
        };
        SearchBody {
            post_filter: FilterSet::default(),
            sort: Vec::new(),
            from: 0,
            size: 0,
            ..self.build("", &options)
        }
    }

    fn exclusions(&self) -> FilterSet {
        let mut must_not: Vec<Clause> = EXCLUDED_STATUSES
            .iter()
            .map(|status| Clause::Term {
                field: schema::STATUS.to_string(),
                value: status.as_str().to_string(),
            })
            .collect();

        if !self.retired_platforms.as_slice().is_empty() {
            must_not.push(Clause::Terms {
                field: schema::PLATFORM.to_string(),
                values: self.retired_platforms.as_slice().to_vec(),
            });
        }

        FilterSet {
            must: Vec::new(),
            must_not,
        }
    }
}

/// One terms clause per active filter field, skipping `except`
fn user_filters(options: &SearchOptions, except: Option<&str>) -> FilterSet {
    let must = options
        .active_filters()
        .filter(|(field, _)| Some(field.as_str()) != except)
        .map(|(field, values)| Clause::Terms {
            field: field.clone(),
            values: values.iter().cloned().collect(),
        })
        .collect();

    FilterSet {
        must,
        must_not: Vec::new(),
    }
}

fn text_query(query_text: &str, options: &SearchOptions) -> TextQuery {
    if options.prefix {
        TextQuery::Prefix {
            field: schema::EXACT_NAME.to_string(),
            value: query_text.to_string(),
        }
    } else if query_text.trim().is_empty() {
        TextQuery::MatchAll
    } else {
        TextQuery::MultiMatch {
            query: query_text.to_string(),
            fields: schema::scored_fields(),
        }
    }
}

fn sort_keys(query_text: &str, options: &SearchOptions) -> Vec<SortKey> {
    if options.prefix {
        // Relevance means nothing for a bare prefix
        return SortKey::popularity();
    }

    let has_text = !query_text.trim().is_empty();
    let order = options.order.unwrap_or(SortOrder::Desc);
    match &options.sort {
        Some(field) => vec![SortKey::new(field.as_str(), order)],
        None if has_text => vec![SortKey::new("_score", order)],
        None => SortKey::popularity(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> QueryBuilder {
        QueryBuilder::default()
    }

    #[test]
    fn test_retired_platforms_parse_dedupes_and_trims() {
        let retired = RetiredPlatforms::parse(" Atom, Jam,,Atom ");
        assert_eq!(retired.as_slice(), ["Atom", "Jam"]);
        assert!(retired.contains("Jam"));
        assert!(!retired.contains("NPM"));
    }

    #[test]
    fn test_default_retired_platforms() {
        let retired = RetiredPlatforms::default();
        assert_eq!(retired.as_slice().len(), 7);
        assert!(retired.contains("PlatformIO"));
    }

    #[test]
    fn test_exclusions_without_retired_platforms() {
        let body = QueryBuilder::new(RetiredPlatforms::none()).build("", &SearchOptions::default());
        assert_eq!(body.exclusions.must_not.len(), 2);
        assert!(body
            .exclusions
            .must_not
            .iter()
            .all(|clause| clause.field() == "status"));
    }

    #[test]
    fn test_browse_mode_uses_match_all() {
        let body = builder().build("", &SearchOptions::default());
        assert_eq!(body.text_query, TextQuery::MatchAll);
        assert_eq!(body.suggestion, None);
        assert_eq!(body.sort, SortKey::popularity());
    }

    #[test]
    fn test_prefix_with_blank_text_still_forces_popularity_sort() {
        let options = SearchOptions {
            prefix: true,
            sort: Some("created_at".to_string()),
            order: Some(SortOrder::Asc),
            ..Default::default()
        };
        let body = builder().build("", &options);
        assert_eq!(
            body.text_query,
            TextQuery::Prefix {
                field: schema::EXACT_NAME.to_string(),
                value: String::new(),
            }
        );
        assert_eq!(body.sort, SortKey::popularity());
        assert_eq!(body.suggestion, None);
    }

    #[test]
    fn test_text_query_sorts_by_score() {
        let options = SearchOptions {
            order: Some(SortOrder::Asc),
            ..Default::default()
        };
        let body = builder().build("serde", &options);
        assert_eq!(body.sort, vec![SortKey::new("_score", SortOrder::Asc)]);
    }

    #[test]
    fn test_order_without_sort_in_browse_mode_keeps_popularity() {
        let options = SearchOptions {
            order: Some(SortOrder::Asc),
            ..Default::default()
        };
        let body = builder().build("", &options);
        assert_eq!(body.sort, SortKey::popularity());
    }

    #[test]
    fn test_explicit_sort_overrides_defaults() {
        let options = SearchOptions {
            sort: Some("stars".to_string()),
            order: Some(SortOrder::Asc),
            ..Default::default()
        };
        assert_eq!(
            builder().build("serde", &options).sort,
            vec![SortKey::new("stars", SortOrder::Asc)]
        );
        assert_eq!(
            builder().build("", &options).sort,
            vec![SortKey::new("stars", SortOrder::Asc)]
        );
    }

    #[test]
    fn test_api_mode_skips_aggregations_and_suggestion() {
        let options = SearchOptions {
            api: true,
            ..Default::default()
        };
        let body = builder().build("redux", &options);
        assert!(body.aggregations.is_empty());
        assert!(body.suggestion.is_none());

        let json = body.to_json();
        assert!(json.get("aggs").is_none());
        assert!(json.get("suggest").is_none());
    }

    #[test]
    fn test_paging_maps_to_from_and_size() {
        let options = SearchOptions {
            page: 4,
            per_page: 25,
            ..Default::default()
        };
        let json = builder().build("", &options).to_json();
        assert_eq!(json["from"], 75);
        assert_eq!(json["size"], 25);
        assert_eq!(json["track_scores"], true);
    }

    #[test]
    fn test_function_score_boosts_by_squared_rank() {
        let json = builder().build("", &SearchOptions::default()).to_json();
        let function_score = &json["query"]["function_score"];
        assert_eq!(
            function_score["field_value_factor"],
            json!({ "field": "rank", "modifier": "square" })
        );
        assert_eq!(function_score["boost_mode"], "multiply");
        assert_eq!(
            function_score["query"]["bool"]["must"],
            json!({ "match_all": {} })
        );
    }

    #[test]
    fn test_aggregation_json_shape() {
        let options = SearchOptions::default().with_filter("language", "Rust");
        let agg = builder().aggregation_spec(Facet::Platform, 10, &options);
        assert_eq!(
            agg.to_json(),
            json!({
                "filter": { "bool": { "must": [ { "terms": { "language": ["Rust"] } } ] } },
                "aggs": { "platforms": { "terms": { "field": "platform", "size": 10 } } }
            })
        );
    }

    #[test]
    fn test_facets_body_has_no_hits_or_suggestion() {
        let options = SearchOptions {
            api: true,
            prefix: true,
            ..Default::default()
        }
        .with_filter("platform", "NPM");
        let body = builder().facets(&options);
        assert_eq!(body.size, 0);
        assert_eq!(body.text_query, TextQuery::MatchAll);
        assert_eq!(body.aggregations.len(), 4);
        assert!(body.suggestion.is_none());
        assert!(body.post_filter.is_empty());

        let json = body.to_json();
        assert!(json.get("sort").is_none());
        assert!(json.get("post_filter").is_none());
    }
}
