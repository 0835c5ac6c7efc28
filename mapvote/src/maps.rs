//! Map pool and recency cooldown
//!
//! [`MapCooldown`] keeps an ordered ledger of recently played map identities
//! (most-recent-last) and excludes them from candidacy. The ledger is capped
//! at `size + 1` entries so the slot occupied by the currently loaded map
//! never eats into the configured exclusion window.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::host::CurrentMap;

/// One entry of the rotation pool. Immutable once loaded from configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Map {
    /// Engine-loadable id: a level name (`de_mirage`), a bare workshop id
    /// (`3124567099`), or a `ws:`-prefixed workshop id
    pub id: String,
    /// Display name shown in menus and chat
    pub name: String,
}

impl Map {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Workshop id when this map must go through the download-and-load path.
    pub fn workshop_id(&self) -> Option<&str> {
        if let Some(rest) = self.id.strip_prefix("ws:") {
            return Some(rest);
        }
        if !self.id.is_empty() && self.id.chars().all(|c| c.is_ascii_digit()) {
            return Some(&self.id);
        }
        None
    }
}

/// The configured rotation pool.
#[derive(Debug, Clone, Default)]
pub struct MapList {
    maps: Vec<Map>,
}

impl MapList {
    pub fn new(maps: Vec<Map>) -> Self {
        Self { maps }
    }

    pub fn all(&self) -> &[Map] {
        &self.maps
    }

    /// First map whose display name contains `query`, case-insensitive.
    /// Matches the loose lookup players use when typing a partial name.
    pub fn find(&self, query: &str) -> Option<&Map> {
        let query = query.to_lowercase();
        self.maps
            .iter()
            .find(|m| m.name.to_lowercase().contains(&query))
    }

    /// Exact display-name match, case-insensitive.
    pub fn by_name(&self, name: &str) -> Option<&Map> {
        self.maps.iter().find(|m| m.name.eq_ignore_ascii_case(name))
    }

    /// Map matching either identity of the currently loaded level.
    pub fn by_current(&self, current: &CurrentMap) -> Option<&Map> {
        self.maps.iter().find(|m| {
            m.id.eq_ignore_ascii_case(&current.name)
                || current
                    .workshop_id
                    .as_deref()
                    .is_some_and(|ws| m.id.eq_ignore_ascii_case(ws))
        })
    }
}

/// Bounded recency ledger of played maps.
#[derive(Debug, Clone, Default)]
pub struct MapCooldown {
    /// Normalized identities, oldest first
    ledger: Vec<String>,
    size: i32,
}

fn normalize(identity: &str) -> String {
    identity.trim().to_lowercase()
}

impl MapCooldown {
    pub fn new(size: i32) -> Self {
        Self {
            ledger: Vec::new(),
            size,
        }
    }

    /// Record a map start. Re-adding an identity moves it to the
    /// most-recent position; the ledger never holds duplicates and never
    /// exceeds `size + 1` entries.
    pub fn record_map_start(&mut self, name: &str, workshop_id: Option<&str>) {
        if self.size <= 0 {
            self.ledger.clear();
            return;
        }

        let identity = normalize(workshop_id.filter(|w| !w.is_empty()).unwrap_or(name));
        self.ledger.retain(|entry| entry != &identity);
        self.ledger.push(identity);

        let limit = self.size as usize + 1;
        while self.ledger.len() > limit {
            self.ledger.remove(0);
        }
        debug!(ledger = ?self.ledger, "map cooldown updated");
    }

    /// Whether `identity` is excluded from candidacy.
    ///
    /// The currently loaded map is never reported on cooldown, even if a
    /// stale ledger entry matches it; `current` must therefore be queried
    /// fresh for every check.
    pub fn is_on_cooldown(&self, identity: &str, current: &CurrentMap) -> bool {
        let identity = normalize(identity);
        if !self.ledger.contains(&identity) {
            return false;
        }

        if identity == normalize(&current.name) {
            return false;
        }
        if let Some(ws) = current.workshop_id.as_deref() {
            if !ws.is_empty() && identity == normalize(ws) {
                return false;
            }
        }
        true
    }

    /// Map overload: a map is on cooldown if either of its identities is.
    pub fn is_map_on_cooldown(&self, map: &Map, current: &CurrentMap) -> bool {
        self.is_on_cooldown(&map.id, current) || self.is_on_cooldown(&map.name, current)
    }
}
