//! Ordered list of link entries, each with its own validation state.
//!
//! The controller is a synchronous state machine: user actions mutate one
//! entry and may hand back a [`ValidationRequest`] for the caller to run.
//! Resolved requests come back through [`EntryListController::apply_validation`].
//! Every applied change republishes the aggregate of valid entries.

use std::collections::HashMap;

use shared::{
    domain::{EntryId, LinkKind},
    error::ValidationResult,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::notifier::AggregateNotifier;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: EntryId,
    pub text: String,
    pub is_valid: bool,
    pub error: Option<String>,
    pub is_typing: bool,
    /// Sequence number of the latest validation request issued for this entry.
    pub latest_seq: u64,
}

impl Entry {
    fn empty() -> Self {
        Self {
            id: EntryId::random(),
            text: String::new(),
            is_valid: false,
            error: None,
            is_typing: false,
            latest_seq: 0,
        }
    }

    fn seeded(text: String) -> Self {
        Self {
            text,
            is_valid: true,
            ..Self::empty()
        }
    }

    pub fn status(&self) -> EntryStatus {
        if self.error.is_some() && !self.is_typing {
            EntryStatus::Errored
        } else if self.is_valid {
            EntryStatus::Valid
        } else if self.is_typing {
            EntryStatus::Typing
        } else {
            EntryStatus::Idle
        }
    }

    /// Error text to show next to the field; hidden while the user is typing.
    pub fn visible_error(&self) -> Option<&str> {
        if self.is_typing {
            None
        } else {
            self.error.as_deref()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    Idle,
    Typing,
    Valid,
    Errored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRequest {
    pub entry_id: EntryId,
    pub seq: u64,
    pub kind: LinkKind,
    pub url: String,
}

impl ValidationRequest {
    pub fn resolve(self, result: ValidationResult) -> ValidationResponse {
        ValidationResponse {
            entry_id: self.entry_id,
            seq: self.seq,
            result,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResponse {
    pub entry_id: EntryId,
    pub seq: u64,
    pub result: ValidationResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// A newer request was issued for the entry; the result was dropped.
    Stale { latest: u64 },
    UnknownEntry,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryListError {
    #[error("unknown entry {0}")]
    UnknownEntry(EntryId),
}

#[derive(Debug)]
pub struct EntryListController {
    kind: LinkKind,
    order: Vec<EntryId>,
    entries: HashMap<EntryId, Entry>,
    notifier: AggregateNotifier,
}

impl EntryListController {
    /// Seeds one valid entry per non-blank string, or a single empty entry
    /// when there is none, and publishes the initial aggregate.
    pub fn new<I, S>(kind: LinkKind, seed: I, notifier: AggregateNotifier) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seeded: Vec<Entry> = seed
            .into_iter()
            .map(Into::into)
            .filter(|text: &String| !text.trim().is_empty())
            .map(Entry::seeded)
            .collect();
        if seeded.is_empty() {
            seeded.push(Entry::empty());
        }

        let order = seeded.iter().map(|entry| entry.id).collect();
        let entries = seeded.into_iter().map(|entry| (entry.id, entry)).collect();
        let mut controller = Self {
            kind,
            order,
            entries,
            notifier,
        };
        controller.publish();
        controller
    }

    pub fn kind(&self) -> LinkKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Always false: the list keeps at least one entry.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn entry(&self, id: EntryId) -> Option<&Entry> {
        self.entries.get(&id)
    }

    pub fn id_at(&self, index: usize) -> Option<EntryId> {
        self.order.get(index).copied()
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    pub fn snapshot(&self) -> Vec<Entry> {
        self.entries().cloned().collect()
    }

    /// Texts of the entries currently marked valid, in list order.
    pub fn aggregate(&self) -> Vec<String> {
        self.entries()
            .filter(|entry| entry.is_valid)
            .map(|entry| entry.text.clone())
            .collect()
    }

    pub fn set_text(&mut self, id: EntryId, text: impl Into<String>) -> Result<(), EntryListError> {
        let entry = self.entry_mut(id)?;
        edit(entry, text.into());
        self.publish();
        Ok(())
    }

    /// Replaces the entry text with the trimmed paste and requests validation
    /// right away. A blank paste changes nothing.
    pub fn paste_text(
        &mut self,
        id: EntryId,
        text: &str,
    ) -> Result<Option<ValidationRequest>, EntryListError> {
        let kind = self.kind;
        let pasted = text.trim();
        let entry = self.entry_mut(id)?;
        if pasted.is_empty() {
            return Ok(None);
        }

        edit(entry, pasted.to_string());
        let request = issue(kind, entry);
        self.publish();
        Ok(Some(request))
    }

    /// Focus left the field: validate non-empty text and stop typing.
    pub fn blur(&mut self, id: EntryId) -> Result<Option<ValidationRequest>, EntryListError> {
        let kind = self.kind;
        let entry = self.entry_mut(id)?;
        let request = if entry.text.is_empty() {
            None
        } else {
            Some(issue(kind, entry))
        };
        entry.is_typing = false;
        self.publish();
        Ok(request)
    }

    pub fn add_entry(&mut self) -> EntryId {
        let entry = Entry::empty();
        let id = entry.id;
        self.order.push(id);
        self.entries.insert(id, entry);
        debug!(kind = %self.kind, entry_id = %id, len = self.order.len(), "entry appended");
        self.publish();
        id
    }

    /// Empties the entry in place; its id and position are kept.
    pub fn clear_entry(&mut self, id: EntryId) -> Result<(), EntryListError> {
        let entry = self.entry_mut(id)?;
        entry.text.clear();
        entry.error = None;
        entry.is_valid = false;
        self.publish();
        Ok(())
    }

    /// Applies a resolved validation if it answers the entry's latest request.
    ///
    /// Results are applied by id, independent of the entry's current text.
    pub fn apply_validation(&mut self, response: ValidationResponse) -> ApplyOutcome {
        let kind = self.kind;
        let Some(entry) = self.entries.get_mut(&response.entry_id) else {
            debug!(%kind, entry_id = %response.entry_id, "validation result for unknown entry");
            return ApplyOutcome::UnknownEntry;
        };

        if response.seq != entry.latest_seq {
            debug!(
                %kind,
                entry_id = %entry.id,
                seq = response.seq,
                latest = entry.latest_seq,
                "discarding stale validation result"
            );
            return ApplyOutcome::Stale {
                latest: entry.latest_seq,
            };
        }

        match response.result {
            Ok(()) => {
                entry.is_valid = true;
                entry.error = None;
                info!(%kind, entry_id = %entry.id, seq = response.seq, "link validated");
            }
            Err(failure) => {
                entry.is_valid = false;
                entry.error = Some(failure.message().to_string());
                info!(
                    %kind,
                    entry_id = %entry.id,
                    seq = response.seq,
                    error = %failure,
                    "link failed validation"
                );
            }
        }
        self.publish();
        ApplyOutcome::Applied
    }

    /// Number of aggregates handed to the notifier so far.
    pub fn published(&self) -> u64 {
        self.notifier.published()
    }

    fn entry_mut(&mut self, id: EntryId) -> Result<&mut Entry, EntryListError> {
        self.entries
            .get_mut(&id)
            .ok_or(EntryListError::UnknownEntry(id))
    }

    fn publish(&mut self) {
        let aggregate = self.aggregate();
        self.notifier.notify(&aggregate);
    }
}

fn edit(entry: &mut Entry, text: String) {
    entry.text = text;
    entry.is_valid = false;
    entry.error = None;
    entry.is_typing = true;
}

fn issue(kind: LinkKind, entry: &mut Entry) -> ValidationRequest {
    entry.latest_seq += 1;
    ValidationRequest {
        entry_id: entry.id,
        seq: entry.latest_seq,
        kind,
        url: entry.text.clone(),
    }
}

#[cfg(test)]
#[path = "tests/entry_list_tests.rs"]
mod tests;
