//! セッション管理モジュール
//!
//! 1回のリスト読み込みに対応する状態（項目・入手済みID・使用済み画像・画像の手動指定）を保持する。
//! 新しいリストを読み込むたびに [`Session::load`] で作り直す。
//!
//! ## 処理フロー
//! 1. 生テキストのハッシュから保存キーを決める（`mokeke:v1:{hash}`）
//! 2. [`ProgressMode`] に従って入手済みIDを読み込む/初期化する
//! 3. リストを解析し（TSV形式では画像も照合）、入手日のある項目を反映する
//! 4. 変更があれば [`ProgressStore`] に保存する

use crate::catalog::{ImageCatalog, ImageRecord};
use crate::encoding::{decode_with, ScoringWeights};
use crate::error::{Error, Result};
use crate::hash::{overrides_key, storage_key};
use crate::list::parse_auto;
use crate::matcher::{find_image, MatchQuery, UsedImages};
use crate::types::{Item, ParsedList};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info, warn};

/// キー・値の永続化インターフェース
pub trait ProgressStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// メモリ上のストア（テスト・一時利用向け）
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

impl ProgressStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// 読み込み時の入手済み状態の扱い
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressMode {
    /// 保存済みの状態に入手日のある項目を追加
    #[default]
    Merge,
    /// 入手日のある項目だけで上書き
    Overwrite,
    /// すべて未入手にする
    AllUnchecked,
}

/// 進捗の集計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub total: usize,
    pub done: usize,
    pub todo: usize,
}

/// カテゴリ別の件数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub total: usize,
    pub done: usize,
}

/// 1回のリスト読み込みに対応するセッション
#[derive(Debug, Clone)]
pub struct Session {
    storage_key: String,
    list: ParsedList,
    progress: BTreeSet<String>,
    used: UsedImages,
    image_overrides: BTreeMap<String, String>,
}

impl Session {
    /// テキストからセッションを作成
    pub fn load(
        text: &str,
        catalog: &ImageCatalog,
        store: &mut dyn ProgressStore,
        mode: ProgressMode,
    ) -> Result<Self> {
        let key = storage_key(text);
        let mut used = UsedImages::new();

        let mut progress = match mode {
            ProgressMode::Merge => read_progress(store, &key)?,
            ProgressMode::Overwrite | ProgressMode::AllUnchecked => BTreeSet::new(),
        };

        let list = parse_auto(text, catalog, &mut used);

        let mut auto_checked = 0;
        if mode != ProgressMode::AllUnchecked {
            for item in list.items.iter().filter(|item| item.is_acquired()) {
                if progress.insert(item.id.clone()) {
                    auto_checked += 1;
                }
            }
        }

        let image_overrides = read_overrides(store, &key)?;

        let session = Self {
            storage_key: key,
            list,
            progress,
            used,
            image_overrides,
        };

        if mode != ProgressMode::Merge || auto_checked > 0 {
            session.save_progress(store)?;
        }

        info!(
            key = %session.storage_key,
            items = session.list.items.len(),
            collected = session.progress.len(),
            auto_checked,
            ?mode,
            "セッションを作成しました"
        );
        Ok(session)
    }

    /// バイト列をデコードしてからセッションを作成
    pub fn load_bytes(
        bytes: &[u8],
        weights: &ScoringWeights,
        catalog: &ImageCatalog,
        store: &mut dyn ProgressStore,
        mode: ProgressMode,
    ) -> Result<Self> {
        let decoded = decode_with(bytes, weights);
        debug!(encoding = %decoded.encoding, score = decoded.score, "デコード結果");
        Self::load(&decoded.text, catalog, store, mode)
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn list(&self) -> &ParsedList {
        &self.list
    }

    pub fn items(&self) -> &[Item] {
        &self.list.items
    }

    /// 入手済みID
    pub fn progress(&self) -> &BTreeSet<String> {
        &self.progress
    }

    pub fn used_images(&self) -> &UsedImages {
        &self.used
    }

    pub fn is_collected(&self, id: &str) -> bool {
        self.progress.contains(id)
    }

    /// 入手済み/未入手を設定して保存
    pub fn set_collected(
        &mut self,
        id: &str,
        collected: bool,
        store: &mut dyn ProgressStore,
    ) -> Result<()> {
        self.ensure_known(id)?;
        let changed = if collected {
            self.progress.insert(id.to_string())
        } else {
            self.progress.remove(id)
        };
        if changed {
            self.save_progress(store)?;
        }
        Ok(())
    }

    /// 入手状態を反転し、新しい状態を返す
    pub fn toggle(&mut self, id: &str, store: &mut dyn ProgressStore) -> Result<bool> {
        let collected = !self.is_collected(id);
        self.set_collected(id, collected, store)?;
        Ok(collected)
    }

    /// すべて未入手に戻す
    pub fn reset(&mut self, store: &mut dyn ProgressStore) -> Result<()> {
        self.progress.clear();
        self.save_progress(store)
    }

    pub fn summary(&self) -> ProgressSummary {
        let total = self.list.items.len();
        let done = self
            .list
            .items
            .iter()
            .filter(|item| self.progress.contains(&item.id))
            .count();
        ProgressSummary {
            total,
            done,
            todo: total - done,
        }
    }

    pub fn count_by_category(&self) -> BTreeMap<String, CategoryCount> {
        let mut counts: BTreeMap<String, CategoryCount> = BTreeMap::new();
        for item in &self.list.items {
            let entry = counts.entry(item.category.clone()).or_default();
            entry.total += 1;
            if self.progress.contains(&item.id) {
                entry.done += 1;
            }
        }
        counts
    }

    /// 項目の画像パスを解決
    ///
    /// 解析時に照合済みの画像 → 手動指定 → 照合（結果は項目に保持）の順。
    pub fn resolve_image_path(
        &mut self,
        id: &str,
        catalog: &ImageCatalog,
    ) -> Result<Option<String>> {
        let index = self.index_of(id)?;
        let item = &self.list.items[index];

        if let Some(path) = item.image.as_ref().map(|img| img.path.clone()) {
            if !path.is_empty() {
                return Ok(Some(path));
            }
        }
        if let Some(path) = self.image_overrides.get(id) {
            return Ok(Some(path.clone()));
        }
        if catalog.is_empty() {
            return Ok(None);
        }

        let query = MatchQuery::from_item(item);
        match find_image(&query, catalog, &mut self.used) {
            Some(record) => {
                let path = record.path.clone();
                self.list.items[index].image = Some(record);
                Ok(Some(path).filter(|p| !p.is_empty()))
            }
            None => Ok(None),
        }
    }

    /// 画像を手動で指定して保存
    pub fn set_image_override(
        &mut self,
        id: &str,
        path: &str,
        store: &mut dyn ProgressStore,
    ) -> Result<()> {
        self.ensure_known(id)?;
        self.image_overrides.insert(id.to_string(), path.to_string());
        let json = serde_json::to_string(&self.image_overrides)?;
        store.set(&overrides_key(&self.storage_key), &json)
    }

    /// 手動指定の候補を探す（[`ImageCatalog::override_candidates`]）
    pub fn override_candidates<'c>(
        &self,
        id: &str,
        keyword: &str,
        catalog: &'c ImageCatalog,
    ) -> Result<Vec<&'c ImageRecord>> {
        let index = self.index_of(id)?;
        Ok(catalog.override_candidates(&self.list.items[index], keyword))
    }

    /// 保存済みの手動指定
    pub fn image_override(&self, id: &str) -> Option<&str> {
        self.image_overrides.get(id).map(String::as_str)
    }

    fn index_of(&self, id: &str) -> Result<usize> {
        self.list
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| Error::UnknownItem(id.to_string()))
    }

    fn ensure_known(&self, id: &str) -> Result<()> {
        self.index_of(id).map(|_| ())
    }

    fn save_progress(&self, store: &mut dyn ProgressStore) -> Result<()> {
        let json = serde_json::to_string(&self.progress)?;
        store.set(&self.storage_key, &json)
    }
}

/// 保存済みの入手済みIDを読み込む（壊れたデータは空扱い）
fn read_progress(store: &dyn ProgressStore, key: &str) -> Result<BTreeSet<String>> {
    let Some(json) = store.get(key)? else {
        return Ok(BTreeSet::new());
    };
    match serde_json::from_str::<Vec<String>>(&json) {
        Ok(ids) => Ok(ids.into_iter().collect()),
        Err(e) => {
            warn!(key, error = %e, "保存済みの進捗を読み込めないため空として扱います");
            Ok(BTreeSet::new())
        }
    }
}

fn read_overrides(store: &dyn ProgressStore, key: &str) -> Result<BTreeMap<String, String>> {
    let Some(json) = store.get(&overrides_key(key))? else {
        return Ok(BTreeMap::new());
    };
    Ok(serde_json::from_str(&json).unwrap_or_else(|e| {
        warn!(error = %e, "画像の手動指定を読み込めないため空として扱います");
        BTreeMap::new()
    }))
}
