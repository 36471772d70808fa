//! Token allocator
//!
//! Pure in-memory state. Callers serialize access (the store mutex) so that
//! check-and-reserve is a single atomic unit.

use std::collections::{BTreeSet, HashSet};

use rand::Rng;
use serde::{Deserialize, Serialize};
use shared::models::{Counter, Order};

use super::{RANDOM_TOKEN_MAX, RANDOM_TOKEN_MIN};

/// Iteration limits for the allocation loops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocatorLimits {
    /// Max candidates tried by one sequential allocation
    pub sequential_bound: u64,
    /// Random samples before falling back to a linear scan
    pub random_samples: u32,
    /// Inclusive range for legacy random tokens
    pub random_min: u32,
    pub random_max: u32,
}

impl Default for AllocatorLimits {
    fn default() -> Self {
        Self {
            sequential_bound: 1_000_000,
            random_samples: 1000,
            random_min: RANDOM_TOKEN_MIN,
            random_max: RANDOM_TOKEN_MAX,
        }
    }
}

/// Persisted token counters (`token-state.json`)
///
/// Older files carry a single `ignoreUsed` flag; it applies to both counters
/// when the per-counter flags are missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenStateDocument {
    #[serde(rename = "B", default)]
    pub b: u64,
    #[serde(rename = "G", default)]
    pub g: u64,
    #[serde(rename = "ignoreUsedB", default, skip_serializing_if = "Option::is_none")]
    pub ignore_used_b: Option<bool>,
    #[serde(rename = "ignoreUsedG", default, skip_serializing_if = "Option::is_none")]
    pub ignore_used_g: Option<bool>,
    #[serde(rename = "ignoreUsed", default, skip_serializing)]
    pub legacy_ignore_used: Option<bool>,
}

/// One entry of `reserved-tokens.json`
///
/// Entries are plain strings; `{ "token": ... }` objects from older writers
/// are accepted too, anything else is skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReservedEntry {
    Plain(String),
    Tagged { token: String },
    Other(serde_json::Value),
}

impl ReservedEntry {
    pub fn into_token(self) -> Option<String> {
        let token = match self {
            ReservedEntry::Plain(t) | ReservedEntry::Tagged { token: t } => t,
            ReservedEntry::Other(_) => return None,
        };
        if token.is_empty() { None } else { Some(token) }
    }
}

/// Token allocator state
#[derive(Debug, Clone, Default)]
pub struct TokenAllocator {
    used: HashSet<String>,
    reserved: BTreeSet<String>,
    cursors: [u64; 2],
    ignore_used: [bool; 2],
    limits: AllocatorLimits,
}

#[inline]
fn slot(counter: Counter) -> usize {
    match counter {
        Counter::One => 0,
        Counter::Two => 1,
    }
}

impl TokenAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: AllocatorLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    /// Rebuild allocator state from the persisted documents
    ///
    /// The used set is derived from the orders collection, never persisted.
    pub fn from_documents(
        state: TokenStateDocument,
        reserved: Vec<ReservedEntry>,
        orders: &[Order],
    ) -> Self {
        let legacy = state.legacy_ignore_used.unwrap_or(false);
        let mut allocator = Self {
            used: orders.iter().map(|o| o.token.clone()).collect(),
            reserved: reserved.into_iter().filter_map(ReservedEntry::into_token).collect(),
            cursors: [state.b, state.g],
            ignore_used: [
                state.ignore_used_b.unwrap_or(legacy),
                state.ignore_used_g.unwrap_or(legacy),
            ],
            limits: AllocatorLimits::default(),
        };
        // A token that made it into an order is used, whatever the reserved file says
        let used = &allocator.used;
        allocator.reserved.retain(|t| !used.contains(t));
        allocator
    }

    pub fn set_limits(&mut self, limits: AllocatorLimits) {
        self.limits = limits;
    }

    pub fn state_document(&self) -> TokenStateDocument {
        TokenStateDocument {
            b: self.cursors[0],
            g: self.cursors[1],
            ignore_used_b: Some(self.ignore_used[0]),
            ignore_used_g: Some(self.ignore_used[1]),
            legacy_ignore_used: None,
        }
    }

    pub fn reserved_document(&self) -> Vec<String> {
        self.reserved.iter().cloned().collect()
    }

    // ========== Queries ==========

    pub fn is_reserved(&self, token: &str) -> bool {
        self.reserved.contains(token)
    }

    pub fn is_used(&self, token: &str) -> bool {
        self.used.contains(token)
    }

    pub fn is_free(&self, token: &str) -> bool {
        !self.is_reserved(token) && !self.is_used(token)
    }

    pub fn cursor(&self, counter: Counter) -> u64 {
        self.cursors[slot(counter)]
    }

    pub fn ignores_used(&self, counter: Counter) -> bool {
        self.ignore_used[slot(counter)]
    }

    pub fn reserved_count(&self) -> usize {
        self.reserved.len()
    }

    pub fn used_count(&self) -> usize {
        self.used.len()
    }

    // ========== Allocation ==========

    /// Reserve the next sequential token for a counter
    ///
    /// The cursor advances on every candidate, accepted or not, so gaps in the
    /// sequence are normal. Returns `None` after `sequential_bound` candidates;
    /// the cursor stays advanced so the next call moves on to fresh numbers.
    pub fn reserve_sequential(&mut self, counter: Counter) -> Option<String> {
        let i = slot(counter);
        let prefix = counter.token_prefix();
        for _ in 0..self.limits.sequential_bound {
            self.cursors[i] += 1;
            let candidate = format!("{}{}", prefix, self.cursors[i]);
            let used_ok = self.ignore_used[i] || !self.used.contains(&candidate);
            if used_ok && !self.reserved.contains(&candidate) {
                self.reserved.insert(candidate.clone());
                return Some(candidate);
            }
        }
        None
    }

    /// Reserve a legacy six-digit token
    ///
    /// Random sampling first, then a linear scan of the whole range.
    pub fn reserve_random(&mut self) -> Option<String> {
        let AllocatorLimits {
            random_samples,
            random_min,
            random_max,
            ..
        } = self.limits;

        let mut rng = rand::thread_rng();
        for _ in 0..random_samples {
            let candidate = rng.gen_range(random_min..=random_max).to_string();
            if self.is_free(&candidate) {
                self.reserved.insert(candidate.clone());
                return Some(candidate);
            }
        }

        let found = (random_min..=random_max)
            .map(|n| n.to_string())
            .find(|candidate| self.is_free(candidate))?;
        self.reserved.insert(found.clone());
        Some(found)
    }

    /// Reserve an exact token; false when it is already reserved or used
    pub fn reserve_specific(&mut self, token: &str) -> bool {
        if token.is_empty() || !self.is_free(token) {
            return false;
        }
        self.reserved.insert(token.to_string());
        true
    }

    /// Move a token to the used set (idempotent)
    pub fn commit(&mut self, token: &str) {
        self.reserved.remove(token);
        self.used.insert(token.to_string());
    }

    // ========== Reset ==========

    /// Restart a counter's sequence at 1
    ///
    /// Drops the counter's reserved tokens and stops checking the used set
    /// for it, so `B1` is handed out again even if an old order holds it.
    pub fn reset_counter(&mut self, counter: Counter) {
        let i = slot(counter);
        let prefix = counter.token_prefix();
        self.cursors[i] = 0;
        self.reserved.retain(|t| !t.starts_with(prefix));
        self.ignore_used[i] = true;
    }

    /// Forget everything
    pub fn reset_all(&mut self) {
        self.used.clear();
        self.reserved.clear();
        self.cursors = [0, 0];
        self.ignore_used = [false, false];
    }
}
