//! 画像照合モジュール
//!
//! リスト項目の表示名・地域・カラー区分から、画像カタログ内の画像を1件選ぶ。
//!
//! ## 処理フロー
//! 1. 表示名を空白で分割し、先頭を地域ヒント、残りを名前ヒントとする
//! 2. 未使用画像のうち都道府県/地域が地域ヒントと一致・包含するものを地域プールとする
//! 3. [`MatchTier::ALL`] の順に各段を試し、最初に見つかった画像を採用する
//! 4. 採用した画像のファイル名を [`UsedImages`] に登録する（同じ画像は1セッション1回まで）

use crate::catalog::{ImageCatalog, ImageRecord};
use crate::types::Item;
use std::collections::HashSet;
use tracing::debug;

/// シリーズ名の接尾辞（地域名の正規化で除去）
const SERIES_SUFFIX: &str = "モケケ";

/// 単語照合に使う検索語の最小文字数（この値より長い語のみ）
const MIN_WORD_CHARS: usize = 1;

/// 照合クエリ
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchQuery {
    /// 表示名（`地域 名前 カラー区分`）
    pub display_name: String,
    pub region: String,
    pub color: String,
    pub prefecture_no: String,
    /// 並び順（0 は指定なし）
    pub order: i64,
}

impl MatchQuery {
    pub fn from_item(item: &Item) -> Self {
        let display_name = if item.name.is_empty() {
            item.original_name.clone()
        } else {
            item.name.clone()
        };
        Self {
            display_name,
            region: item.region.clone(),
            color: item.color.clone(),
            prefecture_no: item.prefecture_no.clone(),
            order: item.order,
        }
    }
}

/// 使用済み画像（ファイル名）の集合
#[derive(Debug, Clone, Default)]
pub struct UsedImages {
    filenames: HashSet<String>,
}

impl UsedImages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.filenames.contains(filename)
    }

    /// 使用済みに登録（新規登録なら true）
    pub fn mark(&mut self, filename: &str) -> bool {
        self.filenames.insert(filename.to_string())
    }

    pub fn clear(&mut self) {
        self.filenames.clear();
    }

    pub fn len(&self) -> usize {
        self.filenames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filenames.is_empty()
    }
}

/// 照合の段（試行順）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchTier {
    /// 地域プール内で名前一致（完全・包含・単語）
    RegionName,
    /// 地域プール内でカラー区分一致
    RegionColor,
    /// 地域プールの先頭
    RegionFirst,
    /// 地域プールが空のとき、全未使用画像から名前一致（完全・包含のみ）
    GlobalName,
    /// 地域名も含めた広域プール内で名前一致
    WideRegionName,
    /// 全未使用画像から名前一致（単語照合あり）
    GlobalWordName,
    /// 広域プールの先頭
    WideRegionFirst,
}

impl MatchTier {
    pub const ALL: [MatchTier; 7] = [
        MatchTier::RegionName,
        MatchTier::RegionColor,
        MatchTier::RegionFirst,
        MatchTier::GlobalName,
        MatchTier::WideRegionName,
        MatchTier::GlobalWordName,
        MatchTier::WideRegionFirst,
    ];

    /// この段だけを試し、カタログ内のインデックスを返す
    pub fn attempt(&self, ctx: &MatchContext) -> Option<usize> {
        match self {
            MatchTier::RegionName => ctx.find_name(&ctx.region_pool, true),
            MatchTier::RegionColor => ctx.find_color(),
            MatchTier::RegionFirst => ctx.region_pool.first().copied(),
            MatchTier::GlobalName if ctx.region_pool.is_empty() => {
                ctx.find_name(&ctx.unused(), false)
            }
            MatchTier::WideRegionName if ctx.region_pool.is_empty() => {
                ctx.find_name(&ctx.wide_pool, true)
            }
            MatchTier::GlobalWordName if ctx.region_pool.is_empty() => {
                ctx.find_name(&ctx.unused(), true)
            }
            MatchTier::WideRegionFirst if ctx.region_pool.is_empty() => {
                ctx.wide_pool.first().copied()
            }
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MatchTier::RegionName => "地域+名前",
            MatchTier::RegionColor => "カラー",
            MatchTier::RegionFirst => "地域フォールバック",
            MatchTier::GlobalName => "全画像名前",
            MatchTier::WideRegionName => "広域地域+名前",
            MatchTier::GlobalWordName => "全画像単語",
            MatchTier::WideRegionFirst => "広域フォールバック",
        }
    }
}

/// 1回の照合で共有する前処理済みの状態
#[derive(Debug)]
pub struct MatchContext<'a> {
    catalog: &'a ImageCatalog,
    used: &'a UsedImages,
    /// 名前ヒント（小文字化済み）
    name_hint: String,
    /// カラー区分（小文字化済み）
    color: String,
    /// 都道府県/地域で絞り込んだ未使用画像
    region_pool: Vec<usize>,
    /// 地域名/都道府県/地域を正規化して絞り込んだ未使用画像
    wide_pool: Vec<usize>,
}

impl<'a> MatchContext<'a> {
    pub fn new(query: &MatchQuery, catalog: &'a ImageCatalog, used: &'a UsedImages) -> Self {
        let mut tokens = query.display_name.split(' ');
        let region_hint = tokens.next().unwrap_or_default().to_string();
        let name_hint = tokens.collect::<Vec<_>>().join(" ").to_lowercase();

        let unused = |img: &&ImageRecord| !used.contains(&img.filename);

        let mut region_pool: Vec<usize> = catalog
            .images()
            .iter()
            .enumerate()
            .filter(|(_, img)| unused(img))
            .filter(|(_, img)| {
                overlaps(&img.prefecture, &region_hint) || overlaps(&img.sub_region, &region_hint)
            })
            .map(|(i, _)| i)
            .collect();

        let mut candidates = Vec::new();
        let first = normalize_region(if region_hint.is_empty() {
            &query.region
        } else {
            &region_hint
        });
        for cand in [first, normalize_region(&query.region)] {
            if !cand.is_empty() && !candidates.contains(&cand) {
                candidates.push(cand);
            }
        }

        let mut wide_pool: Vec<usize> = catalog
            .images()
            .iter()
            .enumerate()
            .filter(|(_, img)| unused(img))
            .filter(|(_, img)| {
                let fields = [&img.region_name, &img.prefecture, &img.sub_region]
                    .map(|f| normalize_region(f));
                candidates
                    .iter()
                    .any(|rc| fields.iter().any(|f| overlaps(f, rc)))
            })
            .map(|(i, _)| i)
            .collect();

        if query.order != 0 {
            let pattern = format!("_{}_", query.order);
            prefer_order(catalog, &mut region_pool, &pattern);
            prefer_order(catalog, &mut wide_pool, &pattern);
        }

        Self {
            catalog,
            used,
            name_hint,
            color: query.color.to_lowercase(),
            region_pool,
            wide_pool,
        }
    }

    /// 地域プール（インデックス）
    pub fn region_pool(&self) -> &[usize] {
        &self.region_pool
    }

    /// 広域プール（インデックス）
    pub fn wide_pool(&self) -> &[usize] {
        &self.wide_pool
    }

    fn unused(&self) -> Vec<usize> {
        self.catalog
            .images()
            .iter()
            .enumerate()
            .filter(|(_, img)| !self.used.contains(&img.filename))
            .map(|(i, _)| i)
            .collect()
    }

    fn record(&self, index: usize) -> Option<&ImageRecord> {
        self.catalog.get(index)
    }

    fn find_name(&self, pool: &[usize], word_level: bool) -> Option<usize> {
        // 空の名前ヒントを包含一致させると、全画像段で先頭の未使用画像が常に選ばれる。
        // ここでは名前一致なしとして後続の段に回す
        if self.name_hint.is_empty() {
            return None;
        }
        pool.iter().copied().find(|&i| {
            self.record(i).is_some_and(|img| {
                let img_name = img.item_name.to_lowercase();
                name_matches(&img_name, &self.name_hint)
                    || (word_level && words_match(&img_name, &self.name_hint))
            })
        })
    }

    fn find_color(&self) -> Option<usize> {
        if self.color.is_empty() {
            return None;
        }
        self.region_pool.iter().copied().find(|&i| {
            self.record(i).is_some_and(|img| {
                !img.color.is_empty() && img.color.to_lowercase().contains(&self.color)
            })
        })
    }
}

/// 画像を1件照合し、使用済みに登録して返す
pub fn find_image(
    query: &MatchQuery,
    catalog: &ImageCatalog,
    used: &mut UsedImages,
) -> Option<ImageRecord> {
    find_image_with_tier(query, catalog, used).map(|(_, record)| record)
}

/// [`find_image`] と同じだが、採用した段も返す
pub fn find_image_with_tier(
    query: &MatchQuery,
    catalog: &ImageCatalog,
    used: &mut UsedImages,
) -> Option<(MatchTier, ImageRecord)> {
    if catalog.is_empty() {
        return None;
    }

    let winner = {
        let ctx = MatchContext::new(query, catalog, used);
        MatchTier::ALL
            .iter()
            .find_map(|tier| tier.attempt(&ctx).map(|index| (*tier, index)))
    };

    match winner.and_then(|(tier, index)| catalog.get(index).map(|img| (tier, img.clone()))) {
        Some((tier, record)) => {
            used.mark(&record.filename);
            debug!(
                name = %query.display_name,
                tier = tier.label(),
                filename = %record.filename,
                "画像マッチ"
            );
            Some((tier, record))
        }
        None => {
            debug!(name = %query.display_name, "画像マッチなし");
            None
        }
    }
}

/// 一致・包含（双方向）。空文字は一致しない
fn overlaps(field: &str, hint: &str) -> bool {
    !field.is_empty()
        && !hint.is_empty()
        && (field == hint || field.contains(hint) || hint.contains(field))
}

fn name_matches(img_name: &str, search: &str) -> bool {
    overlaps(img_name, search)
}

/// 画像名は `_`、検索名は空白で分割し、いずれかの語同士が包含関係にあれば一致
fn words_match(img_name: &str, search: &str) -> bool {
    search
        .split(' ')
        .filter(|sw| sw.chars().count() > MIN_WORD_CHARS)
        .any(|sw| {
            img_name
                .split('_')
                .filter(|iw| !iw.is_empty())
                .any(|iw| iw.contains(sw) || sw.contains(iw))
        })
}

/// 前後空白・内部空白を除去し、末尾の「モケケ」を外す
fn normalize_region(s: &str) -> String {
    let compact: String = s.trim().chars().filter(|c| !c.is_whitespace()).collect();
    match compact.strip_suffix(SERIES_SUFFIX) {
        Some(stripped) => stripped.to_string(),
        None => compact,
    }
}

/// ファイル名に `_{order}_` を含む画像を先頭へ（安定ソート）
fn prefer_order(catalog: &ImageCatalog, pool: &mut [usize], pattern: &str) {
    pool.sort_by_key(|&i| {
        !catalog
            .get(i)
            .is_some_and(|img| img.filename.contains(pattern))
    });
}
