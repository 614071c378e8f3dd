//! Signature → identifier table built during registration.

use std::collections::HashMap;

use gridsig_types::{PatternId, Signature};

/// Maps canonical signatures to the identifiers the peer assigned them.
///
/// Insertions overwrite: if two registrations land in the same rotation
/// class, the later identifier wins.
#[derive(Debug, Clone, Default)]
pub struct PatternRegistry {
    entries: HashMap<Signature, PatternId>,
}

impl PatternRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `signature` to `id`, returning the identifier it replaced.
    pub fn register(&mut self, signature: Signature, id: PatternId) -> Option<PatternId> {
        let previous = self.entries.insert(signature, id);
        if let Some(old) = previous
            && old != id
        {
            tracing::warn!(%signature, %old, new = %id, "Signature re-registered; keeping newest id");
        }
        previous
    }

    /// The registered identifier, or [`PatternId::NOT_FOUND`].
    #[must_use]
    pub fn lookup(&self, signature: Signature) -> PatternId {
        self.get(signature).unwrap_or(PatternId::NOT_FOUND)
    }

    #[must_use]
    pub fn get(&self, signature: Signature) -> Option<PatternId> {
        self.entries.get(&signature).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
