//! Planner fact store contract.
//!
//! An external GOAP planner reads a sparse set of named world-state facts
//! to pick actions. Characters write their own facts through [`FactStore`];
//! [`WorldFacts`] is the in-memory store used when no planner-owned store
//! is supplied.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Current stamina of the agent (float).
pub const CURRENT_STAMINA: &str = "CurrentStamina";
/// Present while the agent is aggroed on a target.
pub const IS_ALERT: &str = "IsAlert";
/// Present while the agent is dead.
pub const IS_DEAD: &str = "IsDead";

/// Value held by a fact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FactValue {
    /// Presence/count flag
    Int(i32),
    /// Continuous value
    Float(f32),
}

impl FactValue {
    /// Presence marker used for flag-style facts.
    pub const PRESENT: Self = Self::Int(1);

    /// Read the value as a float.
    #[must_use]
    pub fn as_f32(self) -> f32 {
        match self {
            Self::Int(v) => v as f32,
            Self::Float(v) => v,
        }
    }
}

/// Key-value world state consumed by the planner.
pub trait FactStore {
    /// Check whether a fact is present.
    fn has_fact(&self, name: &str) -> bool;

    /// Look up a fact's value.
    fn fact(&self, name: &str) -> Option<FactValue>;

    /// Create or overwrite a fact.
    fn set_fact(&mut self, name: &str, value: FactValue);

    /// Remove a fact. Removing an absent fact is a no-op.
    fn remove_fact(&mut self, name: &str);
}

/// In-memory fact store.
#[derive(Debug, Clone, Default)]
pub struct WorldFacts {
    facts: AHashMap<String, FactValue>,
}

impl WorldFacts {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of facts present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Check whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

impl FactStore for WorldFacts {
    fn has_fact(&self, name: &str) -> bool {
        self.facts.contains_key(name)
    }

    fn fact(&self, name: &str) -> Option<FactValue> {
        self.facts.get(name).copied()
    }

    fn set_fact(&mut self, name: &str, value: FactValue) {
        if let Some(slot) = self.facts.get_mut(name) {
            *slot = value;
        } else {
            self.facts.insert(name.to_owned(), value);
        }
    }

    fn remove_fact(&mut self, name: &str) {
        self.facts.remove(name);
    }
}
