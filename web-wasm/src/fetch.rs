//! リスト・画像カタログの取得
//!
//! fetch に失敗しても例外にせず「なし」として扱う。
//! リストは候補ファイル名を先頭から順に試す。

use js_sys::Uint8Array;
use mokeke_common::{decode_with, Decoded, ImageCatalog, ScoringWeights};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestCache, RequestInit, Response};

/// 既定のリストファイル候補
pub const LIST_CANDIDATES: &[&str] = &[
    "mokekelist_latest.txt",
    "mokekelist_lastest.txt",
    "mokekelist_20250906.txt",
    "mokekelist.txt",
];

/// 既定の画像カタログ
pub const CATALOG_PATH: &str = "image_data.csv";

/// バイト列を取得（キャッシュなし）。失敗時は None
pub async fn fetch_bytes(path: &str) -> Option<Vec<u8>> {
    match try_fetch_bytes(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            log(&format!("[mokeke] 取得失敗: {} ({:?})", path, e));
            None
        }
    }
}

async fn try_fetch_bytes(path: &str) -> Result<Option<Vec<u8>>, JsValue> {
    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_cache(RequestCache::NoStore);

    let request = Request::new_with_str_and_init(path, &opts)?;
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("window がありません"))?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request)).await?;
    let resp: Response = resp_value.dyn_into()?;

    if !resp.ok() {
        log(&format!("[mokeke] {} -> HTTP {}", path, resp.status()));
        return Ok(None);
    }

    let buffer = JsFuture::from(resp.array_buffer()?).await?;
    Ok(Some(Uint8Array::new(&buffer).to_vec()))
}

/// 候補を順に取得し、空でない最初のリストを返す（パスとデコード結果）
pub async fn load_first_available(
    candidates: &[&str],
    weights: &ScoringWeights,
) -> Option<(String, Decoded)> {
    for path in candidates {
        let Some(bytes) = fetch_bytes(path).await else {
            continue;
        };
        let decoded = decode_with(&bytes, weights);
        if decoded.text.trim().is_empty() {
            log(&format!("[mokeke] {} は空のためスキップ", path));
            continue;
        }
        log(&format!(
            "[mokeke] リスト読み込み: {} ({})",
            path, decoded.encoding
        ));
        return Some((path.to_string(), decoded));
    }
    None
}

/// 画像カタログを取得（失敗時は空）
pub async fn load_catalog(path: &str) -> ImageCatalog {
    match fetch_bytes(path).await {
        Some(bytes) => {
            let text = String::from_utf8_lossy(&bytes);
            let catalog = ImageCatalog::from_csv_str(&text);
            log(&format!("[mokeke] 画像カタログ: {}件", catalog.len()));
            catalog
        }
        None => ImageCatalog::default(),
    }
}

pub(crate) fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}
