//! 進捗ファイルストア
//!
//! 保存キー（`mokeke:v1:{hash}`）→ 値（JSON文字列）のマップを1つのJSONファイルに保存する。
//! ブラウザ版の localStorage に相当する。

use mokeke_common::{ProgressStore, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::warn;

/// ストアファイルの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreFile {
    /// バージョン（互換性チェック用）
    version: u32,
    /// 保存キー → 値
    entries: BTreeMap<String, String>,
}

impl Default for StoreFile {
    fn default() -> Self {
        Self {
            version: FileStore::CURRENT_VERSION,
            entries: BTreeMap::new(),
        }
    }
}

/// JSONファイルに保存する [`ProgressStore`]
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    data: StoreFile,
}

impl FileStore {
    const CURRENT_VERSION: u32 = 1;

    /// ストアファイルを開く（存在しない・壊れている・バージョン違いなら空）
    pub fn open(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            data: Self::read(path),
        }
    }

    fn read(path: &Path) -> StoreFile {
        if !path.exists() {
            return StoreFile::default();
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(_) => return StoreFile::default(),
        };

        let reader = BufReader::new(file);
        match serde_json::from_reader::<_, StoreFile>(reader) {
            Ok(data) => {
                if data.version != Self::CURRENT_VERSION {
                    warn!(version = data.version, "ストアのバージョン不一致、空として扱います");
                    return StoreFile::default();
                }
                data
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ストアを読み込めないため空として扱います");
                StoreFile::default()
            }
        }
    }

    /// ファイルに書き出す
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(&self.path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &self.data)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 保存件数
    pub fn len(&self) -> usize {
        self.data.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.entries.is_empty()
    }
}

impl ProgressStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.data.entries.insert(key.to_string(), value.to_string());
        self.save()
    }
}
