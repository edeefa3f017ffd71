//! Browser LocalStorage backend

use web_sys::Storage;

use super::KeyValueStore;
use crate::error::StoreError;

/// Keys are namespaced as `<prefix>_<key>`
pub struct LocalStorageStore {
    storage: Storage,
    prefix: String,
}

impl LocalStorageStore {
    pub fn open(prefix: &str) -> Result<Self, StoreError> {
        let storage = web_sys::window()
            .ok_or_else(|| StoreError::Unavailable("no window".to_string()))?
            .local_storage()
            .map_err(|_| StoreError::Unavailable("LocalStorage access denied".to_string()))?
            .ok_or_else(|| StoreError::Unavailable("LocalStorage disabled".to_string()))?;
        Ok(Self {
            storage,
            prefix: prefix.to_string(),
        })
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}_{}", self.prefix, key)
    }

    fn js_error(key: &str, err: wasm_bindgen::JsValue) -> StoreError {
        StoreError::Io {
            key: key.to_string(),
            source: std::io::Error::other(format!("{err:?}")),
        }
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage
            .get_item(&self.full_key(key))
            .map_err(|e| Self::js_error(key, e))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage
            .set_item(&self.full_key(key), value)
            .map_err(|e| Self::js_error(key, e))
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.storage
            .remove_item(&self.full_key(key))
            .map_err(|e| Self::js_error(key, e))
    }
}
