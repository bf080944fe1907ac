//! Key/value persistence
//!
//! Everything the game remembers between sessions (best score, leaderboard,
//! player profile, settings) is a string under a fixed key. The browser build
//! stores it in `window.localStorage`; tests and the native build use
//! [`MemoryStore`].

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;

#[cfg(target_arch = "wasm32")]
mod local;
#[cfg(target_arch = "wasm32")]
pub use local::LocalStore;

/// Key holding the best score as a decimal integer
pub const HIGH_SCORE_KEY: &str = "ninjaSlingHighScore";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Best score so far, 0 if nothing was stored yet
pub fn load_high_score(store: &impl KeyValueStore) -> Result<u32> {
    match store.get(HIGH_SCORE_KEY)? {
        Some(raw) => Ok(raw.trim().parse()?),
        None => Ok(0),
    }
}

pub fn save_high_score(store: &mut impl KeyValueStore, score: u32) -> Result<()> {
    store.set(HIGH_SCORE_KEY, &score.to_string())
}

/// Read a JSON document, `None` if the key is absent
pub fn load_json<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Result<Option<T>> {
    store
        .get(key)?
        .map(|json| serde_json::from_str(&json))
        .transpose()
        .map_err(Into::into)
}

pub fn save_json<T: Serialize>(store: &mut impl KeyValueStore, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}
