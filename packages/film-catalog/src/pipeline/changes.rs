//! Entry diffs and generated list descriptions.
//!
//! A managed description has two halves split by a separator line: text the
//! user wrote (always preserved) and a generated block that is rebuilt on
//! every run.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::error::{CatalogError, Result};
use crate::traits::client::CatalogClient;
use crate::traits::source::{SourceKind, SourceLabel};
use crate::types::config::MasterListConfig;
use crate::types::film::FilmSummary;
use crate::types::record::FilmId;

/// Heading of the recent-changes section.
pub const CHANGES_HEADING: &str = "-- Recent Changes --";

pub fn bold(text: &str) -> String {
    format!("<strong>{}</strong>", text)
}

pub fn link(href: &str, text: &str) -> String {
    format!("<a href=\"{}\">{}</a>", href, text)
}

/// Films added to and removed from a list, newest (highest id) first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDiff {
    pub added: Vec<FilmId>,
    pub removed: Vec<FilmId>,
}

impl EntryDiff {
    pub fn between(old: &[FilmId], new: &[FilmId]) -> Self {
        let old: BTreeSet<FilmId> = old.iter().copied().collect();
        let new: BTreeSet<FilmId> = new.iter().copied().collect();
        Self {
            added: new.iter().rev().filter(|id| !old.contains(id)).copied().collect(),
            removed: old.iter().rev().filter(|id| !new.contains(id)).copied().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Builds the generated half of a description.
#[derive(Debug, Clone)]
pub struct DescriptionRenderer<'a> {
    config: &'a MasterListConfig,
}

impl<'a> DescriptionRenderer<'a> {
    pub fn new(config: &'a MasterListConfig) -> Self {
        Self { config }
    }

    /// Text before the separator (the whole description when there is none).
    pub fn user_text<'d>(&self, description: &'d str) -> &'d str {
        description
            .split_once(self.config.separator.as_str())
            .map_or(description, |(before, _)| before)
            .trim_end()
    }

    /// Text after the separator, if the description has one.
    pub fn generated_text<'d>(&self, description: &'d str) -> Option<&'d str> {
        description
            .split_once(self.config.separator.as_str())
            .map(|(_, after)| after.trim())
    }

    /// Recent-changes section of an earlier generated block.
    pub fn previous_changes<'d>(&self, description: &'d str) -> Option<&'d str> {
        let generated = self.generated_text(description)?;
        let start = generated.find(&bold(CHANGES_HEADING))?;
        Some(generated[start..].trim_end())
    }

    /// User text, separator, then the generated block.
    pub fn compose(&self, description: &str, generated: &str) -> String {
        let user = self.user_text(description);
        let mut out = String::new();
        if !user.is_empty() {
            out.push_str(user);
            out.push_str("\n\n");
        }
        out.push_str(&self.config.separator);
        out.push_str("\n\n");
        out.push_str(generated.trim());
        out
    }

    /// One numbered section per source kind, in kind order.
    pub fn source_sections(&self, labels: &[(SourceKind, SourceLabel)]) -> String {
        let mut kinds: Vec<SourceKind> = labels.iter().map(|(kind, _)| *kind).collect();
        kinds.sort();
        kinds.dedup();

        kinds
            .into_iter()
            .map(|kind| {
                let mut section = bold(kind.heading());
                let entries = labels.iter().filter(|(k, _)| *k == kind).map(|(_, l)| l);
                for (i, label) in entries.enumerate() {
                    let anchor = link(&self.config.link(&label.path), &label.title);
                    match &label.byline {
                        Some(by) => section.push_str(&format!("\n{}. {} ( by {} )", i + 1, anchor, by)),
                        None => section.push_str(&format!("\n{}. {}", i + 1, anchor)),
                    }
                }
                section
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Recent-changes section, capped per direction.
    ///
    /// Films without a summary are left out; `None` means nothing could be
    /// rendered.
    pub fn changes_section(&self, diff: &EntryDiff, summaries: &[FilmSummary]) -> Option<String> {
        let by_id: HashMap<FilmId, &FilmSummary> = summaries.iter().map(|s| (s.id, s)).collect();

        let render = |title: &str, ids: &[FilmId]| -> Option<String> {
            let lines: Vec<String> = ids
                .iter()
                .take(self.config.change_cap)
                .filter_map(|id| match by_id.get(id) {
                    Some(film) => Some(link(&self.config.link(&film.path()), &film.name)),
                    None => {
                        warn!(film_id = %id, "No summary for changed film");
                        None
                    }
                })
                .collect();
            if lines.is_empty() {
                None
            } else {
                Some(format!("{}:\n{}", bold(title), lines.join("\n")))
            }
        };

        let parts: Vec<String> = [
            render("Last Added", &diff.added),
            render("Last Removed", &diff.removed),
        ]
        .into_iter()
        .flatten()
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(format!("{}\n{}", bold(CHANGES_HEADING), parts.join("\n\n")))
        }
    }

    /// Fetch summaries for the capped diff and render the changes section.
    ///
    /// Fails with [`CatalogError::DiffComputation`] when the diff is not
    /// empty but no line could be rendered.
    pub async fn render_changes<C: CatalogClient + ?Sized>(
        &self,
        client: &C,
        diff: &EntryDiff,
    ) -> Result<Option<String>> {
        if diff.is_empty() {
            return Ok(None);
        }
        let wanted: Vec<FilmId> = diff
            .added
            .iter()
            .take(self.config.change_cap)
            .chain(diff.removed.iter().take(self.config.change_cap))
            .copied()
            .collect();
        debug!(films = wanted.len(), "Describing changed films");
        let summaries = client.describe_films(&wanted).await?;

        match self.changes_section(diff, &summaries) {
            Some(section) => Ok(Some(section)),
            None => Err(CatalogError::DiffComputation {
                added: diff.added.len(),
                removed: diff.removed.len(),
            }),
        }
    }
}
