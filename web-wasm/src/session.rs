//! ブラウザ向けセッション
//!
//! JavaScript から使う [`TrackerSession`]。内部状態は `Rc<RefCell<_>>` で共有し、
//! 非同期の読み込みは Promise を返す。

use crate::dto::{JsCategory, JsItem};
use crate::fetch::{self, log, CATALOG_PATH, LIST_CANDIDATES};
use crate::storage::LocalStore;
use js_sys::Promise;
use mokeke_common::{decode_with, ImageCatalog, ProgressMode, ScoringWeights, Session};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

/// 既定リスト読み込み時のモード
const DEFAULT_LIST_MODE: ProgressMode = ProgressMode::Merge;
/// ユーザーが渡したファイル（選択・ドロップ・貼り付け）のモード
const USER_LIST_MODE: ProgressMode = ProgressMode::Overwrite;

#[derive(Default)]
struct Inner {
    catalog: ImageCatalog,
    session: Option<Session>,
    store: LocalStore,
    weights: ScoringWeights,
}

impl Inner {
    fn load_bytes(&mut self, bytes: &[u8], mode: ProgressMode) -> Result<usize, JsValue> {
        let decoded = decode_with(bytes, &self.weights);
        log(&format!("[mokeke] 文字コード: {}", decoded.encoding));
        self.load_text(&decoded.text, mode)
    }

    fn load_text(&mut self, text: &str, mode: ProgressMode) -> Result<usize, JsValue> {
        let session =
            Session::load(text, &self.catalog, &mut self.store, mode).map_err(to_js)?;
        let count = session.items().len();
        if count == 0 {
            log("[mokeke] 0 件を読み込みました (未認識)");
        } else {
            log(&format!("[mokeke] {} 件を読み込みました", count));
        }
        self.session = Some(session);
        Ok(count)
    }

    fn session(&self) -> Result<&Session, JsValue> {
        self.session
            .as_ref()
            .ok_or_else(|| JsValue::from_str("リストが読み込まれていません"))
    }
}

/// JavaScript から使うセッション
#[wasm_bindgen]
pub struct TrackerSession {
    inner: Rc<RefCell<Inner>>,
}

impl Default for TrackerSession {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl TrackerSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner::default())),
        }
    }

    /// 画像カタログを取得（省略時は `image_data.csv`）。Promise は件数を返す
    #[wasm_bindgen(js_name = loadCatalog)]
    pub fn load_catalog(&self, path: Option<String>) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let path = path.unwrap_or_else(|| CATALOG_PATH.to_string());
            let catalog = fetch::load_catalog(&path).await;
            let count = catalog.len();
            // 取得できなかった場合は読み込み済みのカタログを維持
            if count > 0 {
                inner.borrow_mut().catalog = catalog;
            }
            Ok(JsValue::from(count as u32))
        })
    }

    /// 既定の候補からリストを取得して読み込む
    ///
    /// Promise は項目数を返す。候補がすべて取得できなければ `null`（現在の状態を維持）。
    #[wasm_bindgen(js_name = loadDefaultList)]
    pub fn load_default_list(&self, mode: Option<String>) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let weights = inner.borrow().weights.clone();
            let Some((path, decoded)) = fetch::load_first_available(LIST_CANDIDATES, &weights).await
            else {
                log("[mokeke] 既定のリストが見つかりません");
                return Ok(JsValue::NULL);
            };
            log(&format!("[mokeke] 既定のリスト: {}", path));
            let count = inner
                .borrow_mut()
                .load_text(&decoded.text, parse_mode(mode.as_deref(), DEFAULT_LIST_MODE))?;
            Ok(JsValue::from(count as u32))
        })
    }

    /// ファイル選択・ドロップ・貼り付けで得たバイト列を読み込む
    ///
    /// モード省略時は overwrite（リストの入手日で保存済みの状態を置き換える）。
    #[wasm_bindgen(js_name = loadListBytes)]
    pub fn load_list_bytes(&self, bytes: &[u8], mode: Option<String>) -> Result<u32, JsValue> {
        let count = self
            .inner
            .borrow_mut()
            .load_bytes(bytes, parse_mode(mode.as_deref(), USER_LIST_MODE))?;
        Ok(count as u32)
    }

    /// 全項目（入手済みフラグ付き）
    pub fn items(&self) -> Result<JsValue, JsValue> {
        let inner = self.inner.borrow();
        let session = inner.session()?;
        let items: Vec<JsItem> = session
            .items()
            .iter()
            .map(|item| JsItem::from(item).with_collected(session.is_collected(&item.id)))
            .collect();
        serde_wasm_bindgen::to_value(&items).map_err(JsValue::from)
    }

    /// カテゴリ別の件数
    pub fn categories(&self) -> Result<JsValue, JsValue> {
        let inner = self.inner.borrow();
        let categories: Vec<JsCategory> = inner
            .session()?
            .count_by_category()
            .into_iter()
            .map(JsCategory::from)
            .collect();
        serde_wasm_bindgen::to_value(&categories).map_err(JsValue::from)
    }

    /// 合計・入手済み・未入手の件数
    pub fn summary(&self) -> Result<JsValue, JsValue> {
        let inner = self.inner.borrow();
        serde_wasm_bindgen::to_value(&inner.session()?.summary()).map_err(JsValue::from)
    }

    /// 入手状態を反転し、新しい状態を返す
    pub fn toggle(&self, id: &str) -> Result<bool, JsValue> {
        let mut inner = self.inner.borrow_mut();
        let Inner { session, store, .. } = &mut *inner;
        let session = session
            .as_mut()
            .ok_or_else(|| JsValue::from_str("リストが読み込まれていません"))?;
        session.toggle(id, store).map_err(to_js)
    }

    /// すべて未入手に戻す
    pub fn reset(&self) -> Result<(), JsValue> {
        let mut inner = self.inner.borrow_mut();
        let Inner { session, store, .. } = &mut *inner;
        if let Some(session) = session.as_mut() {
            session.reset(store).map_err(to_js)?;
        }
        Ok(())
    }

    /// 項目の画像パス（なければ `undefined`）
    #[wasm_bindgen(js_name = imagePath)]
    pub fn image_path(&self, id: &str) -> Result<Option<String>, JsValue> {
        let mut inner = self.inner.borrow_mut();
        let Inner { session, catalog, .. } = &mut *inner;
        let session = session
            .as_mut()
            .ok_or_else(|| JsValue::from_str("リストが読み込まれていません"))?;
        session.resolve_image_path(id, catalog).map_err(to_js)
    }

    /// 手動指定の候補画像（最大20件）
    #[wasm_bindgen(js_name = overrideCandidates)]
    pub fn override_candidates(&self, id: &str, keyword: &str) -> Result<JsValue, JsValue> {
        let inner = self.inner.borrow();
        if inner.catalog.is_empty() {
            return Err(JsValue::from_str("画像データが読み込まれていません"));
        }
        let candidates = inner
            .session()?
            .override_candidates(id, keyword, &inner.catalog)
            .map_err(to_js)?;
        serde_wasm_bindgen::to_value(&candidates).map_err(JsValue::from)
    }

    /// 画像を手動で指定
    #[wasm_bindgen(js_name = setImageOverride)]
    pub fn set_image_override(&self, id: &str, path: &str) -> Result<(), JsValue> {
        let mut inner = self.inner.borrow_mut();
        let Inner { session, store, .. } = &mut *inner;
        let session = session
            .as_mut()
            .ok_or_else(|| JsValue::from_str("リストが読み込まれていません"))?;
        session.set_image_override(id, path, store).map_err(to_js)
    }

    /// 現在のリストの保存キー
    #[wasm_bindgen(js_name = storageKey)]
    pub fn storage_key(&self) -> Option<String> {
        self.inner
            .borrow()
            .session
            .as_ref()
            .map(|s| s.storage_key().to_string())
    }
}

/// `merge` / `overwrite` / `unchecked`（省略時・それ以外は `default`）
fn parse_mode(mode: Option<&str>, default: ProgressMode) -> ProgressMode {
    match mode.map(str::to_lowercase).as_deref() {
        Some("merge") => ProgressMode::Merge,
        Some("overwrite") => ProgressMode::Overwrite,
        Some("unchecked") | Some("all-unchecked") => ProgressMode::AllUnchecked,
        _ => default,
    }
}

fn to_js(e: mokeke_common::Error) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mode() {
        assert_eq!(parse_mode(None, ProgressMode::Merge), ProgressMode::Merge);
        assert_eq!(parse_mode(Some("Overwrite"), ProgressMode::Merge), ProgressMode::Overwrite);
        assert_eq!(parse_mode(Some("unchecked"), ProgressMode::Merge), ProgressMode::AllUnchecked);
        assert_eq!(parse_mode(Some("other"), ProgressMode::Merge), ProgressMode::Merge);
    }

    #[test]
    fn test_parse_mode_user_file_defaults_to_overwrite() {
        assert_eq!(parse_mode(None, USER_LIST_MODE), ProgressMode::Overwrite);
        assert_eq!(parse_mode(None, DEFAULT_LIST_MODE), ProgressMode::Merge);
        assert_eq!(parse_mode(Some("merge"), USER_LIST_MODE), ProgressMode::Merge);
    }
}
