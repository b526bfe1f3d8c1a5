//! Master lists: one list rebuilt from many sources.
//!
//! Each run gathers the film ids of every source, unions them, drops the
//! excluded ids, orders the result newest (highest id) first and saves it
//! together with a regenerated description. The user-written part of the
//! description above the separator is kept as is.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::Result;
use crate::pipeline::algebra::{difference, merge};
use crate::pipeline::changes::{DescriptionRenderer, EntryDiff};
use crate::pipeline::paginate::Paginator;
use crate::traits::client::CatalogClient;
use crate::traits::source::{EntrySource, SourceKind, SourceLabel};
use crate::types::config::MasterListConfig;
use crate::types::list::{ListOverrides, ListSnapshot, ListUpdateRequest};
use crate::types::record::{FilmId, FilmRecord};

/// Result of one master-list run.
#[derive(Debug, Clone, PartialEq)]
pub struct MasterListOutcome {
    /// Final entry ids, highest first
    pub entries: Vec<FilmId>,

    /// Change against the previous snapshot
    pub diff: EntryDiff,

    /// Full description that was (or would have been) saved
    pub description: String,

    /// False when nothing changed and no update was sent
    pub updated: bool,
}

/// Aggregates sources into a single list.
pub struct MasterList {
    sources: Vec<Box<dyn EntrySource>>,
    exclusions: Vec<Box<dyn EntrySource>>,
    excluded_ids: Vec<FilmId>,
    config: MasterListConfig,
    paginator: Paginator,
}

impl MasterList {
    pub fn new(config: MasterListConfig) -> Self {
        Self {
            sources: Vec::new(),
            exclusions: Vec::new(),
            excluded_ids: Vec::new(),
            config,
            paginator: Paginator::default(),
        }
    }

    pub fn with_paginator(mut self, paginator: Paginator) -> Self {
        self.paginator = paginator;
        self
    }

    /// Add a source whose films are included.
    pub fn with_source(mut self, source: impl EntrySource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Add a source whose films are never included.
    pub fn excluding(mut self, source: impl EntrySource + 'static) -> Self {
        self.exclusions.push(Box::new(source));
        self
    }

    /// Add ids that are never included.
    pub fn excluding_ids(mut self, ids: impl IntoIterator<Item = FilmId>) -> Self {
        self.excluded_ids.extend(ids);
        self
    }

    pub fn config(&self) -> &MasterListConfig {
        &self.config
    }

    /// Sources ordered by kind, then by each kind's sort key.
    pub fn ordered_sources(&self) -> Vec<&dyn EntrySource> {
        let mut ordered: Vec<&dyn EntrySource> = self.sources.iter().map(|s| &**s).collect();
        ordered.sort_by(|a, b| {
            a.kind()
                .cmp(&b.kind())
                .then_with(|| a.sort_key().to_lowercase().cmp(&b.sort_key().to_lowercase()))
        });
        ordered
    }

    /// Union of all sources minus exclusions, highest id first.
    pub async fn gather(&self, client: &dyn CatalogClient) -> Result<Vec<FilmId>> {
        let mut collected: Vec<Vec<FilmId>> = Vec::with_capacity(self.sources.len());
        for source in self.ordered_sources() {
            let ids = source.entry_ids(client, &self.paginator).await?;
            debug!(
                kind = ?source.kind(),
                source = %source.sort_key(),
                films = ids.len(),
                "Gathered source entries"
            );
            collected.push(ids);
        }

        let mut excluded = self.excluded_ids.clone();
        for source in &self.exclusions {
            excluded.extend(source.entry_ids(client, &self.paginator).await?);
        }

        let unioned = merge(collected.iter());
        let mut entries = difference(&unioned, &excluded);
        entries.sort_unstable_by(|a, b| b.cmp(a));
        Ok(entries)
    }

    /// Generated source sections for the description.
    pub async fn labels(&self, client: &dyn CatalogClient) -> Result<Vec<(SourceKind, SourceLabel)>> {
        let mut labels = Vec::with_capacity(self.sources.len());
        for source in self.ordered_sources() {
            labels.push((source.kind(), source.label(client).await?));
        }
        Ok(labels)
    }

    /// Rebuild the list held in `snapshot` and save it.
    ///
    /// Nothing is sent when both entries and description are unchanged. On a
    /// successful save `snapshot` is refreshed to the saved state.
    pub async fn run(
        &self,
        client: &dyn CatalogClient,
        snapshot: &mut ListSnapshot,
    ) -> Result<MasterListOutcome> {
        let entries = self.gather(client).await?;
        let diff = EntryDiff::between(&snapshot.entry_ids(), &entries);
        let renderer = DescriptionRenderer::new(&self.config);

        let mut generated = renderer.source_sections(&self.labels(client).await?);
        let changes = match renderer.render_changes(client, &diff).await? {
            Some(section) => Some(section),
            None => renderer
                .previous_changes(&snapshot.description)
                .map(str::to_string),
        };
        if let Some(changes) = changes {
            if !generated.is_empty() {
                generated.push_str("\n\n");
            }
            generated.push_str(&changes);
        }
        let description = renderer.compose(&snapshot.description, &generated);

        if diff.is_empty() && description == snapshot.description {
            info!(list = %snapshot.name, entries = entries.len(), "Master list unchanged");
            return Ok(MasterListOutcome {
                entries,
                diff,
                description,
                updated: false,
            });
        }

        let records = carry_payloads(&snapshot.entries, &entries);
        let request = ListUpdateRequest::from_snapshot(
            snapshot,
            ListOverrides::new()
                .description(description.clone())
                .entries(records.clone()),
        );
        client.submit_list_update(&request).await?;

        snapshot.description = description.clone();
        snapshot.entries = records;
        info!(
            list = %snapshot.name,
            entries = entries.len(),
            added = diff.added.len(),
            removed = diff.removed.len(),
            "Master list updated"
        );

        Ok(MasterListOutcome {
            entries,
            diff,
            description,
            updated: true,
        })
    }
}

/// Records for `ids`, reusing notes and other payload of entries already present.
fn carry_payloads(previous: &[FilmRecord], ids: &[FilmId]) -> Vec<FilmRecord> {
    let existing: HashMap<FilmId, &FilmRecord> =
        previous.iter().map(|r| (r.film_id, r)).collect();
    ids.iter()
        .map(|id| match existing.get(id) {
            Some(record) => (*record).clone(),
            None => FilmRecord::from(*id),
        })
        .collect()
}
