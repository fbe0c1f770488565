//! Read-only API-key pool
//!
//! FRED enforces per-key rate limits, so observation fetches are spread
//! across a fixed pool of credentials. Assignment is deterministic
//! round-robin by series index, which bounds any single key's share of S
//! series at ceil(S / K). The pool is never mutated after construction.

use edp_common::{EdpError, Result};

/// Fixed pool of API credentials shared by fetch workers.
#[derive(Debug, Clone)]
pub struct KeyPool {
    keys: Vec<String>,
}

impl KeyPool {
    /// Create a pool from a non-empty list of opaque credential tokens
    pub fn new(keys: Vec<String>) -> Result<Self> {
        if keys.is_empty() {
            return Err(EdpError::config("API-key pool is empty"));
        }
        Ok(Self { keys })
    }

    /// Number of credentials in the pool
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Key assigned to the work item at `index` (round-robin)
    pub fn assign(&self, index: usize) -> &str {
        &self.keys[index % self.keys.len()]
    }

    /// First key in the pool, used for single-shot requests such as the
    /// series enumeration and release metadata lookup.
    pub fn primary(&self) -> &str {
        &self.keys[0]
    }
}
