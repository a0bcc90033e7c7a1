//! Per-landmark notification cooldowns.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Tracks when each landmark key last fired a notification.
///
/// Callers pass `now` explicitly so the window logic stays deterministic
/// under test. Entries are pruned by a fixed maintenance timer, not by
/// evaluation traffic.
pub struct CooldownTable {
    /// Cooldown window length
    window: Duration,
    /// Last firing per landmark key
    fired_at: HashMap<String, Instant>,
}

impl CooldownTable {
    /// Create a table with the given cooldown window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            fired_at: HashMap::new(),
        }
    }

    /// Whether the key is inside its cooldown window.
    pub fn is_cooling(&self, key: &str, now: Instant) -> bool {
        self.fired_at
            .get(key)
            .is_some_and(|fired| now.duration_since(*fired) < self.window)
    }

    /// Check the window and, if clear, record a new firing.
    ///
    /// Returns `true` when the caller may fire a notification.
    pub fn check_and_arm(&mut self, key: &str, now: Instant) -> bool {
        if self.is_cooling(key, now) {
            return false;
        }
        self.fired_at.insert(key.to_string(), now);
        true
    }

    /// Forget a key so it may fire again immediately.
    ///
    /// Used when a landmark exits past the outer boundary and re-arms.
    pub fn clear(&mut self, key: &str) {
        self.fired_at.remove(key);
    }

    /// Drop entries older than the cooldown window.
    pub fn prune(&mut self, now: Instant) {
        let window = self.window;
        let before = self.fired_at.len();
        self.fired_at
            .retain(|_, fired| now.duration_since(*fired) < window);
        let removed = before - self.fired_at.len();
        if removed > 0 {
            tracing::debug!(removed, "Pruned expired cooldown entries");
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.fired_at.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.fired_at.is_empty()
    }
}
