//! リスト・画像カタログの読み込み
//!
//! リストは指定パス、または候補ファイル名を先頭から順に探す。
//! 画像カタログは読み込めなくても空のカタログで続行する。

use crate::error::{Result, TrackerError};
use mokeke_common::{decode_with, Decoded, ImageCatalog, ScoringWeights};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// リストファイルを決定
///
/// `explicit` があればそれを使い、なければ `dir` 内の候補を順に探す。
pub fn resolve_list_path(
    explicit: Option<&Path>,
    candidates: &[String],
    dir: &Path,
) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(TrackerError::FileNotFound(path.display().to_string()));
        }
        return Ok(path.to_path_buf());
    }

    for name in candidates {
        let path = dir.join(name);
        match std::fs::read(&path) {
            Ok(bytes) if !bytes.iter().all(u8::is_ascii_whitespace) => {
                debug!(path = %path.display(), "リスト候補を採用");
                return Ok(path);
            }
            Ok(_) => debug!(path = %path.display(), "リスト候補が空のためスキップ"),
            Err(_) => debug!(path = %path.display(), "リスト候補なし"),
        }
    }

    Err(TrackerError::ListNotFound(candidates.join(", ")))
}

/// リストファイルを読み込み、文字コードを判定してデコード
pub fn read_list(path: &Path, weights: &ScoringWeights) -> Result<Decoded> {
    let bytes = std::fs::read(path)?;
    Ok(decode_with(&bytes, weights))
}

/// 画像カタログを読み込み（失敗時は空）
pub fn load_catalog(path: Option<&Path>) -> ImageCatalog {
    let Some(path) = path else {
        return ImageCatalog::default();
    };
    match ImageCatalog::from_csv(path) {
        Ok(catalog) => catalog,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "画像カタログを読み込めないため空で続行します");
            ImageCatalog::default()
        }
    }
}
