//! `window.localStorage` backend

use web_sys::Storage;

use super::KeyValueStore;
use crate::error::{Error, Result};

pub struct LocalStore {
    storage: Storage,
}

impl LocalStore {
    /// Fails in private browsing modes that disable storage
    pub fn open() -> Result<Self> {
        let window =
            web_sys::window().ok_or_else(|| Error::StorageUnavailable("no window".into()))?;
        let storage = window
            .local_storage()
            .map_err(|e| Error::StorageUnavailable(format!("{e:?}")))?
            .ok_or_else(|| Error::StorageUnavailable("localStorage disabled".into()))?;
        Ok(Self { storage })
    }
}

fn access_error(key: &str, err: wasm_bindgen::JsValue) -> Error {
    Error::Storage {
        key: key.to_string(),
        reason: format!("{err:?}"),
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage.get_item(key).map_err(|e| access_error(key, e))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.storage
            .set_item(key, value)
            .map_err(|e| access_error(key, e))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| access_error(key, e))
    }
}
