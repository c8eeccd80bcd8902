//! Append-only log of decisions and their remote status

use crate::types::{CardId, ProductId, SwipeDirection};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Remote persistence status of a journaled decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum RecordStatus {
    Pending,
    Acknowledged,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub sequence: u64,
    pub card_id: CardId,
    pub product_id: ProductId,
    pub direction: SwipeDirection,
    pub recorded_at: DateTime<Utc>,
    pub status: RecordStatus,
}

/// Append-only log of every decision applied in a session.
///
/// One entry per applied decision, so `len()` always equals the swipe count.
#[derive(Debug, Default, Clone)]
pub struct DecisionJournal {
    entries: Vec<JournalEntry>,
}

impl DecisionJournal {
    pub fn append(
        &mut self,
        card_id: CardId,
        product_id: ProductId,
        direction: SwipeDirection,
    ) -> u64 {
        let sequence = self.entries.len() as u64;
        self.entries.push(JournalEntry {
            sequence,
            card_id,
            product_id,
            direction,
            recorded_at: Utc::now(),
            status: RecordStatus::Pending,
        });
        sequence
    }

    /// Update the remote status of an entry. Returns false for unknown sequences.
    pub fn mark(&mut self, sequence: u64, status: RecordStatus) -> bool {
        match usize::try_from(sequence)
            .ok()
            .and_then(|idx| self.entries.get_mut(idx))
        {
            Some(entry) => {
                entry.status = status;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&JournalEntry> {
        self.entries.last()
    }

    #[must_use]
    pub fn count(&self, pred: impl Fn(&RecordStatus) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.status)).count()
    }
}
