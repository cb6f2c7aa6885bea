// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Field layout of the project search index.
//!
//! Both the projector and the query builder target these names; the table is
//! the single source for which fields are scored, how heavily, and which ones
//! double as facets.

use serde_json::{json, Map, Value};

/// How a field is analyzed by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMode {
    /// Tokenized full text, optionally stemmed
    Text { stemming: bool },
    /// Un-analyzed, case-sensitive term
    Exact,
    /// Un-analyzed term that is also filterable and faceted
    Categorical,
    Date,
    Integer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub mode: FieldMode,
    /// Relevance multiplier; `None` means the field is not scored at all
    pub weight: Option<u8>,
}

impl FieldSpec {
    const fn scored(name: &'static str, mode: FieldMode, weight: u8) -> Self {
        Self {
            name,
            mode,
            weight: Some(weight),
        }
    }

    const fn unscored(name: &'static str, mode: FieldMode) -> Self {
        Self {
            name,
            mode,
            weight: None,
        }
    }

    /// Field reference for a multi-field match, e.g. `name^2`
    pub fn boosted_name(&self) -> Option<String> {
        match self.weight? {
            1 => Some(self.name.to_string()),
            weight => Some(format!("{}^{}", self.name, weight)),
        }
    }
}

pub const SCHEMA: &[FieldSpec] = &[
    FieldSpec::scored("name", FieldMode::Text { stemming: true }, 2),
    FieldSpec::scored("exact_name", FieldMode::Exact, 2),
    FieldSpec::scored("extra_searchable_names", FieldMode::Exact, 2),
    FieldSpec::scored("repo_name", FieldMode::Text { stemming: false }, 1),
    FieldSpec::scored("description", FieldMode::Text { stemming: true }, 1),
    FieldSpec::scored("homepage", FieldMode::Text { stemming: false }, 1),
    FieldSpec::scored("language", FieldMode::Categorical, 1),
    FieldSpec::scored("keywords_array", FieldMode::Categorical, 1),
    FieldSpec::scored("normalized_licenses", FieldMode::Categorical, 1),
    FieldSpec::scored("platform", FieldMode::Categorical, 1),
    FieldSpec::unscored("status", FieldMode::Exact),
    FieldSpec::unscored("created_at", FieldMode::Date),
    FieldSpec::unscored("updated_at", FieldMode::Date),
    FieldSpec::unscored("latest_release_published_at", FieldMode::Date),
    FieldSpec::unscored("rank", FieldMode::Integer),
    FieldSpec::unscored("stars", FieldMode::Integer),
    FieldSpec::unscored("dependents_count", FieldMode::Integer),
    FieldSpec::unscored("dependent_repos_count", FieldMode::Integer),
    FieldSpec::unscored("contributions_count", FieldMode::Integer),
];

pub const NAME: &str = "name";
pub const EXACT_NAME: &str = "exact_name";
pub const STATUS: &str = "status";
pub const PLATFORM: &str = "platform";
pub const RANK: &str = "rank";
pub const STARS: &str = "stars";

pub fn field(name: &str) -> Option<&'static FieldSpec> {
    SCHEMA.iter().find(|spec| spec.name == name)
}

/// Multi-field match references for every scored field, in schema order
pub fn scored_fields() -> Vec<String> {
    SCHEMA.iter().filter_map(FieldSpec::boosted_name).collect()
}

/// Categorical fields reported as facet buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Facet {
    Platform,
    Language,
    Keyword,
    License,
}

impl Facet {
    pub const ALL: [Facet; 4] = [
        Facet::Platform,
        Facet::Language,
        Facet::Keyword,
        Facet::License,
    ];

    /// Index field the facet counts
    pub fn field(&self) -> &'static str {
        match self {
            Facet::Platform => "platform",
            Facet::Language => "language",
            Facet::Keyword => "keywords_array",
            Facet::License => "normalized_licenses",
        }
    }

    /// Aggregation name used in engine requests and responses
    pub fn agg_name(&self) -> &'static str {
        match self {
            Facet::Platform => "platforms",
            Facet::Language => "languages",
            Facet::Keyword => "keywords",
            Facet::License => "licenses",
        }
    }

    pub fn from_agg_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|facet| facet.agg_name() == name)
    }
}

/// Engine index mapping for the schema
pub fn mappings() -> Value {
    let properties: Map<String, Value> = SCHEMA
        .iter()
        .map(|spec| {
            let mapping = match spec.mode {
                FieldMode::Text { stemming: true } => {
                    json!({ "type": "text", "analyzer": "snowball" })
                }
                FieldMode::Text { stemming: false } => json!({ "type": "text" }),
                FieldMode::Exact | FieldMode::Categorical => json!({ "type": "keyword" }),
                FieldMode::Date => json!({ "type": "date" }),
                FieldMode::Integer => json!({ "type": "integer" }),
            };
            (spec.name.to_string(), mapping)
        })
        .collect();

    json!({ "mappings": { "properties": properties } })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scored_fields_carry_weights() {
        assert_eq!(
            scored_fields(),
            vec![
                "name^2",
                "exact_name^2",
                "extra_searchable_names^2",
                "repo_name",
                "description",
                "homepage",
                "language",
                "keywords_array",
                "normalized_licenses",
                "platform",
            ]
        );
    }

    #[test]
    fn test_status_is_not_scored() {
        let status = field(STATUS).unwrap();
        assert_eq!(status.mode, FieldMode::Exact);
        assert_eq!(status.boosted_name(), None);
    }

    #[test]
    fn test_every_facet_is_categorical() {
        for facet in Facet::ALL {
            let spec = field(facet.field()).unwrap();
            assert_eq!(spec.mode, FieldMode::Categorical, "{}", facet.field());
        }
    }

    #[test]
    fn test_facet_agg_name_round_trip() {
        assert_eq!(Facet::from_agg_name("licenses"), Some(Facet::License));
        assert_eq!(Facet::from_agg_name("stars"), None);
    }

    #[test]
    fn test_mappings_follow_field_modes() {
        let mappings = mappings();
        let properties = &mappings["mappings"]["properties"];
        assert_eq!(properties["name"]["analyzer"], "snowball");
        assert_eq!(properties["repo_name"], json!({ "type": "text" }));
        assert_eq!(properties["exact_name"]["type"], "keyword");
        assert_eq!(properties["platform"]["type"], "keyword");
        assert_eq!(properties["updated_at"]["type"], "date");
        assert_eq!(properties["rank"]["type"], "integer");
        assert_eq!(properties.as_object().unwrap().len(), SCHEMA.len());
    }
}
