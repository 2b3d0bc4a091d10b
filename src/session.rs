// 🧭 Session - One user's ledger, display name and edit state
//
// Every UI intent maps to exactly one ledger operation. After a mutation
// the summary is recomputed and the full state is written through the
// persistence adapter. Write failures are logged and otherwise ignored:
// the in-memory session stays authoritative.

use crate::aggregate::{motivational_message, summarize, Summary};
use crate::ledger::Ledger;
use crate::storage::{KeyValueStore, Persistence};
use crate::transaction::{EditFields, NewTransaction, Transaction};
use anyhow::{Context, Result};
use log::{info, warn};

/// Placeholder shown until the user picks a name (and after a reset)
pub const DEFAULT_USER_NAME: &str = "Tu nombre";

/// Record currently being edited, with the values typed so far
#[derive(Debug, Clone, PartialEq)]
pub struct EditDraft {
    pub id: i64,
    pub fields: EditFields,
}

pub struct Session<S: KeyValueStore> {
    ledger: Ledger,
    user_name: String,
    editing: Option<EditDraft>,
    summary: Summary,
    persistence: Persistence<S>,
}

impl<S: KeyValueStore> Session<S> {
    /// Load state from `store`; `initial_name` is used only when no name
    /// has been saved yet
    pub fn open(store: S, initial_name: &str) -> Result<Self> {
        let persistence = Persistence::new(store);
        let stored = persistence.load().context("Failed to load saved data")?;

        let user_name = stored
            .user_name
            .unwrap_or_else(|| initial_name.to_string());
        let summary = summarize(&stored.ledger);

        info!(
            "session opened for '{}' with {} transactions",
            user_name,
            stored.ledger.len()
        );

        Ok(Self {
            ledger: stored.ledger,
            user_name,
            editing: None,
            summary,
            persistence,
        })
    }

    // ========================================================================
    // READ ACCESS
    // ========================================================================

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.ledger.transactions()
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    /// Aggregates as of the last mutation
    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn motivational_message(&self) -> String {
        motivational_message(self.summary.balance, &self.user_name)
    }

    pub fn editing(&self) -> Option<&EditDraft> {
        self.editing.as_ref()
    }

    /// Draft values, for front ends that type into them in place
    pub fn editing_mut(&mut self) -> Option<&mut EditDraft> {
        self.editing.as_mut()
    }

    pub fn is_editing(&self, id: i64) -> bool {
        self.editing.as_ref().is_some_and(|draft| draft.id == id)
    }

    pub fn store(&self) -> &S {
        self.persistence.store()
    }

    // ========================================================================
    // INTENTS
    // ========================================================================

    /// Returns the new id, or None when the form was incomplete
    pub fn add_transaction(&mut self, fields: NewTransaction) -> Option<i64> {
        let id = self.ledger.add(fields)?;
        info!("transaction {} added", id);
        self.commit();
        Some(id)
    }

    /// Enter edit mode for `id` with a draft of its current values
    pub fn start_edit(&mut self, id: i64) -> bool {
        match self.ledger.get(id) {
            Some(tx) => {
                self.editing = Some(EditDraft {
                    id,
                    fields: EditFields::from_transaction(tx),
                });
                true
            }
            None => false,
        }
    }

    /// Apply `fields` to `id` and leave edit mode
    pub fn save_edit(&mut self, id: i64, fields: &EditFields) -> bool {
        self.editing = None;
        if self.ledger.update(id, fields) {
            info!("transaction {} updated", id);
            self.commit();
            true
        } else {
            false
        }
    }

    /// Save whatever is in the current draft
    pub fn save_current_edit(&mut self) -> bool {
        match self.editing.take() {
            Some(draft) => self.save_edit(draft.id, &draft.fields),
            None => false,
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    pub fn delete_transaction(&mut self, id: i64) -> bool {
        if !self.ledger.remove(id) {
            return false;
        }
        if self.is_editing(id) {
            self.editing = None;
        }
        info!("transaction {} deleted", id);
        self.commit();
        true
    }

    /// Clear every transaction and restore the placeholder name
    ///
    /// Storage gets the empty ledger and the placeholder in one write, so a
    /// failed reset leaves the previous state on disk.
    pub fn reset_all(&mut self) {
        self.ledger.clear();
        self.editing = None;
        self.user_name = DEFAULT_USER_NAME.to_string();
        info!("all data reset");
        self.commit();
    }

    /// Change the display name; blank names are ignored
    pub fn rename_user(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || name == self.user_name {
            return false;
        }
        self.user_name = name.to_string();
        self.commit();
        true
    }

    /// Recompute aggregates and write everything out
    fn commit(&mut self) {
        self.summary = summarize(&self.ledger);
        if let Err(err) = self.persistence.save(&self.ledger, &self.user_name) {
            warn!("failed to save data: {:#}", err);
        }
    }
}
