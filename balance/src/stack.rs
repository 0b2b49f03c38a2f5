use serde::{Deserialize, Serialize};

use crate::pebble::{Pebble, PebbleId, PebbleRegistry};

/// Placed pebble ids, bottom to top, in placement order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stack {
    ids: Vec<PebbleId>,
}

impl Stack {
    pub fn ids(&self) -> &[PebbleId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: PebbleId) -> bool {
        self.ids.contains(&id)
    }

    /// Appends `id` and returns its index, or `None` if it is already stacked.
    pub(crate) fn push(&mut self, id: PebbleId) -> Option<usize> {
        if self.contains(id) {
            return None;
        }
        self.ids.push(id);
        Some(self.ids.len() - 1)
    }

    pub(crate) fn pop(&mut self) -> Option<PebbleId> {
        self.ids.pop()
    }

    pub(crate) fn clear(&mut self) {
        self.ids.clear();
    }

    /// Resolves ids against the registry, bottom to top. Ids missing from
    /// the registry are skipped.
    pub fn pebbles<'a>(&self, registry: &'a PebbleRegistry) -> Vec<&'a Pebble> {
        self.ids.iter().filter_map(|&id| registry.get(id)).collect()
    }

    /// Vertical room already taken: each stacked pebble's height plus the gap.
    pub fn height_so_far(&self, registry: &PebbleRegistry, spacing: f32) -> f32 {
        self.pebbles(registry)
            .iter()
            .map(|pebble| pebble.height() + spacing)
            .sum()
    }
}
