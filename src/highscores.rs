//! Local phase 2 record
//!
//! The best endurance rally ever reached on this device, with its holder.
//! Persisted through a `ScoreStore`, read once at startup.

use serde::{Deserialize, Serialize};

use crate::persistence::ScoreStore;

/// Holder shown while nobody owns the record
pub const NO_HOLDER: &str = "-";

/// Best phase 2 rally count and who made it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordEntry {
    pub holder: String,
    pub value: u32,
}

impl Default for RecordEntry {
    fn default() -> Self {
        Self {
            holder: NO_HOLDER.to_string(),
            value: 0,
        }
    }
}

impl RecordEntry {
    /// Store key for the record value
    pub const VALUE_KEY: &'static str = "rally_pong_record_value";
    /// Store key for the record holder
    pub const HOLDER_KEY: &'static str = "rally_pong_record_holder";

    pub fn new(holder: impl Into<String>, value: u32) -> Self {
        Self {
            holder: holder.into(),
            value,
        }
    }

    /// Whether a rally count strictly beats this record
    pub fn is_beaten_by(&self, rallies: u32) -> bool {
        rallies > self.value
    }

    /// Load the record; missing, unreadable or garbled entries mean "no record"
    pub fn load(store: &impl ScoreStore) -> Self {
        let value = match store.get(Self::VALUE_KEY) {
            Ok(Some(raw)) => raw.trim().parse::<u32>().unwrap_or(0),
            Ok(None) => 0,
            Err(e) => {
                log::warn!("Record unavailable ({}), starting fresh", e);
                return Self::default();
            }
        };
        let holder = store
            .get(Self::HOLDER_KEY)
            .ok()
            .flatten()
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| NO_HOLDER.to_string());

        log::info!("Loaded record {} ({})", value, holder);
        Self { holder, value }
    }

    /// Persist the record; failures are logged and otherwise ignored
    pub fn save(&self, store: &mut impl ScoreStore) {
        let result = store
            .set(Self::VALUE_KEY, &self.value.to_string())
            .and_then(|_| store.set(Self::HOLDER_KEY, &self.holder));
        match result {
            Ok(()) => log::info!("Record saved: {} ({})", self.value, self.holder),
            Err(e) => log::warn!("Could not save record: {}", e),
        }
    }

    /// Display form used by the HUD, e.g. `42 (Ana)`
    pub fn label(&self) -> String {
        format!("{} ({})", self.value, self.holder)
    }
}
