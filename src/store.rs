//! ファイル保存の状態ストア
//!
//! キー → JSON文字列 をひとつのJSONファイルに保存する。
//! 書き込みのたびにファイル全体を書き直す（後勝ち）。

use floor_assign_common::{Error, Result, StateStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// 状態ファイルの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreFile {
    /// バージョン（互換性チェック用）
    version: u32,
    entries: BTreeMap<String, String>,
}

/// ファイル保存のストア
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
    load_warning: Option<String>,
}

impl FileStore {
    const CURRENT_VERSION: u32 = 1;

    /// 状態ファイルを開く（無い・壊れている場合は空）
    ///
    /// 読めなかった理由は `load_warning` に残る。次の書き込みでファイルは上書きされる。
    pub fn open(path: &Path) -> Self {
        let (entries, load_warning) = match Self::read_entries(path) {
            Ok(entries) => (entries, None),
            Err(warning) => {
                log::warn!("{}", warning);
                (BTreeMap::new(), Some(warning))
            }
        };
        Self {
            path: path.to_path_buf(),
            entries,
            load_warning,
        }
    }

    fn read_entries(path: &Path) -> std::result::Result<BTreeMap<String, String>, String> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }

        let file = File::open(path)
            .map_err(|e| format!("状態ファイルを開けません: {} ({})", path.display(), e))?;

        match serde_json::from_reader::<_, StoreFile>(BufReader::new(file)) {
            Ok(store) if store.version == Self::CURRENT_VERSION => Ok(store.entries),
            Ok(store) => Err(format!(
                "状態ファイルのバージョン不一致 ({})、空で開始します: {}",
                store.version,
                path.display()
            )),
            Err(e) => Err(format!(
                "状態ファイルが壊れています、空で開始します: {} ({})",
                path.display(),
                e
            )),
        }
    }

    fn flush(&self) -> Result<()> {
        let store_err = |e: std::io::Error| Error::Store(format!("{}: {}", self.path.display(), e));

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(store_err)?;
            }
        }

        let file = File::create(&self.path).map_err(store_err)?;
        let mut writer = BufWriter::new(file);
        let store = StoreFile {
            version: Self::CURRENT_VERSION,
            entries: self.entries.clone(),
        };
        serde_json::to_writer_pretty(&mut writer, &store)?;
        writer.flush().map_err(store_err)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StateStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn load_warning(&self) -> Option<String> {
        self.load_warning.clone()
    }
}
