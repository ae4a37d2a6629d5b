//! Per-category slot ordering
//!
//! Pending identifiers of a category live in numbered slots. Absolute
//! positions may leave gaps between slots; iteration only ever yields
//! occupied slots, in slot order.

use std::collections::BTreeMap;

use crate::module::registry::declaration::Position;

/// Ordered, gap-tolerant list of identifiers for one category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySlots {
    slots: BTreeMap<usize, String>,
}

impl CategorySlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place an identifier
    ///
    /// Returns the identifier previously held by the slot, if an absolute
    /// position overwrote one.
    pub fn place(&mut self, identifier: String, position: Position) -> Option<String> {
        match position {
            Position::Append => {
                let slot = self.next_slot();
                self.slots.insert(slot, identifier);
                None
            }
            Position::Prepend => {
                let shifted = std::mem::take(&mut self.slots)
                    .into_iter()
                    .map(|(slot, id)| (slot + 1, id));
                self.slots = std::iter::once((0, identifier)).chain(shifted).collect();
                None
            }
            Position::Index(slot) => self.slots.insert(slot, identifier),
        }
    }

    /// Slot following the highest occupied one
    fn next_slot(&self) -> usize {
        self.slots
            .last_key_value()
            .map(|(slot, _)| slot + 1)
            .unwrap_or(0)
    }

    /// Occupied identifiers in slot order
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.slots.values()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.slots.values().any(|id| id == identifier)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
