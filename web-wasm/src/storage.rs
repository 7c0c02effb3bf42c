//! localStorage による進捗の永続化

use gloo::storage::{LocalStorage, Storage};
use mokeke_common::{Error, ProgressStore, Result};

/// `window.localStorage` に保存する [`ProgressStore`]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

impl ProgressStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        LocalStorage::raw()
            .get_item(key)
            .map_err(|e| Error::Storage(format!("読込失敗: {:?}", e)))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|e| Error::Storage(format!("保存失敗: {:?}", e)))
    }
}
