use crate::error::{Result, TrackerError};
use mokeke_common::ScoringWeights;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 既定のリストファイル候補（先頭から順に探す）
pub const DEFAULT_LIST_CANDIDATES: &[&str] = &[
    "mokekelist_latest.txt",
    "mokekelist_lastest.txt",
    "mokekelist_20250906.txt",
    "mokekelist.txt",
];

const APP_DIR: &str = "mokeke";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 画像一覧CSV（image_data.csv）
    pub catalog_path: Option<PathBuf>,
    /// リストファイル候補
    pub list_candidates: Vec<String>,
    /// 進捗の保存先（未設定なら設定ディレクトリの progress.json）
    pub store_path: Option<PathBuf>,
    /// 文字コード判定の重み
    pub scoring: ScoringWeights,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| TrackerError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join(APP_DIR))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// 進捗ファイルのパス
    pub fn resolved_store_path(&self) -> Result<PathBuf> {
        match &self.store_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::config_dir()?.join("progress.json")),
        }
    }

    pub fn set_catalog_path(&mut self, path: PathBuf) -> Result<()> {
        self.catalog_path = Some(path);
        self.save()
    }

    fn default_config() -> Self {
        Self {
            catalog_path: None,
            list_candidates: DEFAULT_LIST_CANDIDATES.iter().map(|s| s.to_string()).collect(),
            store_path: None,
            scoring: ScoringWeights::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_candidates() {
        let config = Config::default();
        assert_eq!(config.list_candidates[0], "mokekelist_latest.txt");
        assert_eq!(config.list_candidates.len(), 4);
        assert!(config.catalog_path.is_none());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"catalog_path": "data/image_data.csv"}"#).expect("解析失敗");
        assert_eq!(config.catalog_path, Some(PathBuf::from("data/image_data.csv")));
        assert_eq!(config.list_candidates.len(), 4);
        assert_eq!(config.scoring, ScoringWeights::default());
    }
}
