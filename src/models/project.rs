// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle status of a catalog project
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ProjectStatus {
    #[default]
    Active,
    /// Hidden by moderators; never shown in search results
    Hidden,
    /// Removed from its upstream registry; never shown in search results
    Removed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "Active",
            ProjectStatus::Hidden => "Hidden",
            ProjectStatus::Removed => "Removed",
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A package published on one of the supported platforms.
///
/// Owned by the catalog's persistence layer; this crate only reads it to build
/// the search projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    /// Package ecosystem identifier, e.g. "Maven" or "NPM"
    pub platform: String,
    pub description: Option<String>,
    pub homepage: Option<String>,
    pub repository_url: Option<String>,
    /// Full name ("owner/name") of the linked source repository
    pub repo_name: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub licenses: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub latest_release_number: Option<String>,
    pub rank: Option<i64>,
    pub stars: Option<i64>,
    pub dependents_count: Option<i64>,
    pub dependent_repos_count: Option<i64>,
    pub contributions_count: Option<i64>,
    #[serde(default)]
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub latest_release_published_at: Option<DateTime<Utc>>,
}

impl Project {
    /// Minimal active project, mostly useful for building fixtures
    pub fn new(id: i64, name: impl Into<String>, platform: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            platform: platform.into(),
            description: None,
            homepage: None,
            repository_url: None,
            repo_name: None,
            language: None,
            licenses: Vec::new(),
            keywords: Vec::new(),
            latest_release_number: None,
            rank: None,
            stars: None,
            dependents_count: None,
            dependent_repos_count: None,
            contributions_count: None,
            status: ProjectStatus::Active,
            created_at: now,
            updated_at: now,
            latest_release_published_at: None,
        }
    }
}

/// Write-path notification emitted by the persistence layer after commit
#[derive(Debug, Clone)]
pub enum ProjectEvent {
    Created(Project),
    Updated {
        project: Project,
        /// Names of the attributes that changed in this write
        changed_fields: Vec<String>,
    },
    Deleted {
        id: i64,
    },
}

impl ProjectEvent {
    pub fn project_id(&self) -> i64 {
        match self {
            ProjectEvent::Created(project) => project.id,
            ProjectEvent::Updated { project, .. } => project.id,
            ProjectEvent::Deleted { id } => *id,
        }
    }
}
