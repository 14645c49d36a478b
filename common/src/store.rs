//! 状態ストア
//!
//! 割り当てと変更履歴を保存するキー・値ストアの抽象。
//! 値はJSON文字列のまま保存する（ブラウザのローカルストレージと同じ形）。

use crate::error::Result;
use std::collections::HashMap;

/// 割り当ての保存キー
pub const ASSIGNMENTS_KEY: &str = "assignments";
/// 変更履歴の保存キー
pub const CHANGE_LOG_KEY: &str = "changeLog";

/// キー・値ストア
pub trait StateStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;

    /// 開いた時点で読めなかったデータの説明（あれば）
    fn load_warning(&self) -> Option<String> {
        None
    }
}

impl<S: StateStore + ?Sized> StateStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }

    fn load_warning(&self) -> Option<String> {
        (**self).load_warning()
    }
}

/// メモリ上のストア（テスト用）
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StateStore for MemoryStore {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(store.len(), 1);

        store.remove("k").unwrap();
        assert!(store.is_empty());
    }

    fn write_empty<S: StateStore>(mut store: S) {
        store.set(ASSIGNMENTS_KEY, "{}").unwrap();
    }

    #[test]
    fn test_mut_ref_forwards() {
        let mut store = MemoryStore::new();
        write_empty(&mut store);
        assert_eq!(store.get(ASSIGNMENTS_KEY).unwrap().as_deref(), Some("{}"));
    }
}
