// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::models::project::Project;
use crate::models::search::IndexedDocument;

/// Build the search document for a project from its current attribute values
pub fn project(entity: &Project) -> IndexedDocument {
    IndexedDocument {
        id: entity.id,
        name: entity.name.clone(),
        exact_name: entity.name.clone(),
        extra_searchable_names: extra_searchable_names(&entity.platform, &entity.name),
        platform: entity.platform.clone(),
        description: entity.description.clone(),
        homepage: entity.homepage.clone(),
        repository_url: entity.repository_url.clone(),
        repo_name: entity.repo_name.clone(),
        language: entity.language.clone(),
        keywords_array: entity.keywords.clone(),
        normalized_licenses: entity.licenses.clone(),
        latest_release_number: entity.latest_release_number.clone(),
        status: entity.status,
        rank: entity.rank.unwrap_or(0),
        stars: entity.stars.unwrap_or(0),
        dependents_count: entity.dependents_count.unwrap_or(0),
        dependent_repos_count: entity.dependent_repos_count.unwrap_or(0),
        contributions_count: entity.contributions_count.unwrap_or(0),
        created_at: entity.created_at,
        updated_at: entity.updated_at,
        latest_release_published_at: entity.latest_release_published_at,
    }
}

/// Components of composite package identifiers.
///
/// Maven coordinates are `group:artifact`, Clojars names are `group/name`.
/// Other platforms have no composite names.
pub fn extra_searchable_names(platform: &str, name: &str) -> Vec<String> {
    let separator = match platform {
        "Maven" => ':',
        "Clojars" => '/',
        _ => return Vec::new(),
    };
    name.split(separator).map(str::to_string).collect()
}
