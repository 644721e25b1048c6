//! Scanned code history.
//!
//! Keeps scanned codes in scan order and mirrors them into one settings slot:
//! - append skips content that is already present (exact, case-sensitive)
//! - every mutation rewrites the whole snapshot
//! - a snapshot that cannot be read or decoded loads as an empty history
//! - duplicate content in a snapshot loads once, first occurrence kept
//!
//! Persistence failures are logged and never returned to the caller.

pub mod settings;

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use settings::SettingsStore;

/// Settings slot holding the serialized history.
pub const SNAPSHOT_SLOT: &str = "scannedCodes";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedCode {
    pub id: Uuid,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ScannedCode {
    pub fn new(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        ScannedCode {
            id: Uuid::new_v4(),
            content: content.into(),
            timestamp,
        }
    }

    /// First eight hex digits of the id, enough to tell codes apart in a listing.
    pub fn short_id(&self) -> String {
        let mut id = self.id.simple().to_string();
        id.truncate(8);
        id
    }
}

pub struct CodeStore<S: SettingsStore> {
    codes: Vec<ScannedCode>,
    settings: S,
}

impl<S: SettingsStore> CodeStore<S> {
    /// Opens the history backed by `settings` and loads the last snapshot.
    pub fn open(settings: S) -> Self {
        let mut store = CodeStore {
            codes: Vec::new(),
            settings,
        };
        store.load();
        store
    }

    pub fn append(&mut self, content: &str) -> Option<ScannedCode> {
        self.append_at(content, Utc::now())
    }

    pub fn append_at(&mut self, content: &str, timestamp: DateTime<Utc>) -> Option<ScannedCode> {
        if self.contains(content) {
            log::debug!("skipping duplicate code: {content}");
            return None;
        }

        let code = ScannedCode::new(content, timestamp);
        self.codes.push(code.clone());
        self.persist();
        log::info!("stored code {}", code.id);
        Some(code)
    }

    pub fn remove(&mut self, id: Uuid) -> Option<ScannedCode> {
        let index = self.codes.iter().position(|c| c.id == id);
        let removed = index.map(|i| self.codes.remove(i));
        self.persist();
        removed
    }

    pub fn clear_all(&mut self) {
        self.codes.clear();
        self.persist();
    }

    /// Replaces the in-memory history with the persisted snapshot.
    pub fn load(&mut self) {
        self.codes = match self.settings.read(SNAPSHOT_SLOT) {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(codes) => codes,
                Err(e) => {
                    log::warn!("discarding unreadable history snapshot: {e}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("failed to read history snapshot: {e}");
                Vec::new()
            }
        };

        let mut seen = HashSet::new();
        let before = self.codes.len();
        self.codes.retain(|c| seen.insert(c.content.clone()));
        if self.codes.len() < before {
            log::warn!(
                "dropped {} duplicate codes from history snapshot",
                before - self.codes.len()
            );
        }
        log::debug!("loaded {} scanned codes", self.codes.len());
    }

    pub fn persist(&mut self) {
        if let Err(e) = self.try_persist() {
            log::error!("failed to save history snapshot: {e}");
        }
    }

    fn try_persist(&mut self) -> Result<()> {
        let bytes = serde_json::to_vec(&self.codes)?;
        self.settings.write(SNAPSHOT_SLOT, &bytes)
    }

    pub fn contains(&self, content: &str) -> bool {
        self.codes.iter().any(|c| c.content == content)
    }

    /// Codes in scan order, oldest first.
    pub fn codes(&self) -> &[ScannedCode] {
        &self.codes
    }

    /// Codes most recent first, the order they are listed in.
    pub fn recent(&self) -> impl Iterator<Item = &ScannedCode> {
        self.codes.iter().rev()
    }

    pub fn get(&self, id: Uuid) -> Option<&ScannedCode> {
        self.codes.iter().find(|c| c.id == id)
    }

    /// Finds the single code whose id starts with `prefix` (hyphens optional).
    pub fn resolve(&self, prefix: &str) -> Result<&ScannedCode> {
        let needle = normalize_id(prefix);
        if needle.is_empty() {
            return Err(Error::UnknownId(prefix.to_string()));
        }

        let mut matches = self
            .codes
            .iter()
            .filter(|c| c.id.simple().to_string().starts_with(&needle));

        match (matches.next(), matches.next()) {
            (Some(code), None) => Ok(code),
            (Some(_), Some(_)) => Err(Error::AmbiguousId(prefix.to_string())),
            (None, _) => Err(Error::UnknownId(prefix.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }
}

fn normalize_id(prefix: &str) -> String {
    prefix
        .chars()
        .filter(|c| *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
