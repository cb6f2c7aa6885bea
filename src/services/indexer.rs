// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::models::project::ProjectEvent;
use crate::services::projector::project;
use crate::services::search::{DeleteOutcome, SearchClient};
use anyhow::{Context, Result};
use std::sync::Arc;

/// What the indexer did with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOutcome {
    Indexed,
    /// Update with no changed attributes; index left alone
    Skipped,
    Deleted,
    /// Delete for a project that was never indexed
    AlreadyAbsent,
}

/// Keeps the search index in step with project writes.
///
/// The persistence layer calls [`ProjectIndexer::handle`] after each committed
/// create, update or delete.
pub struct ProjectIndexer {
    search_client: Arc<SearchClient>,
}

impl ProjectIndexer {
    pub fn new(search_client: Arc<SearchClient>) -> Self {
        Self { search_client }
    }

    pub async fn handle(&self, event: &ProjectEvent) -> Result<IndexOutcome> {
        match event {
            ProjectEvent::Created(entity) => {
                self.search_client
                    .index_document(&project(entity))
                    .await
                    .with_context(|| format!("Failed to index new project {}", entity.id))?;
                Ok(IndexOutcome::Indexed)
            }
            ProjectEvent::Updated {
                project: entity,
                changed_fields,
            } => {
                if changed_fields.is_empty() {
                    tracing::trace!(id = entity.id, "No changed attributes, skipping reindex");
                    return Ok(IndexOutcome::Skipped);
                }
                self.search_client
                    .index_document(&project(entity))
                    .await
                    .with_context(|| format!("Failed to reindex project {}", entity.id))?;
                Ok(IndexOutcome::Indexed)
            }
            ProjectEvent::Deleted { id } => {
                let outcome = self
                    .search_client
                    .delete_document(*id)
                    .await
                    .with_context(|| format!("Failed to remove project {} from index", id))?;
                Ok(match outcome {
                    DeleteOutcome::Deleted => IndexOutcome::Deleted,
                    DeleteOutcome::NotFound => IndexOutcome::AlreadyAbsent,
                })
            }
        }
    }

    /// Handle a batch of events, logging failures instead of stopping.
    /// Returns how many events failed.
    pub async fn handle_all(&self, events: &[ProjectEvent]) -> usize {
        let mut failures = 0;
        for event in events {
            if let Err(e) = self.handle(event).await {
                tracing::warn!(
                    id = event.project_id(),
                    error = %format!("{e:#}"),
                    "Index update failed"
                );
                failures += 1;
            }
        }
        failures
    }
}
