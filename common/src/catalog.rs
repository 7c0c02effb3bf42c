//! 画像カタログモジュール
//!
//! 画像一覧CSV（image_data.csv）を読み込み、照合に使う画像レコードを保持する。
//! ファイル名 `01_北海道_01_北海道_01_牛.jpg` の各セグメントから
//! 都道府県・地域を補完する。

use crate::types::Item;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// CSVの必須列数
const CSV_COLUMNS: usize = 9;

/// ファイル名解析に必要なセグメント数
const FILENAME_SEGMENTS: usize = 6;

/// 手動指定の候補として返す最大件数
pub const OVERRIDE_CANDIDATE_LIMIT: usize = 20;

const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".JPG", ".JPEG", ".PNG"];

/// 地域名 → 画像フォルダ名
const REGION_FOLDERS: &[(&str, &str)] = &[
    ("北海道", "01hokkaido"),
    ("東北", "02tohoku"),
    ("関東", "03kanto"),
    ("中部", "04chubu"),
    ("近畿", "05kinki"),
    ("中国", "06chugoku"),
    ("四国", "07shikoku"),
    ("九州", "08kyushu"),
    ("沖縄", "09okinawa"),
    ("スポーツ", "10sports"),
    ("水族館", "11suizokukan"),
    ("季節", "12kisetsu"),
];

/// 画像レコード
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageRecord {
    pub area_no: String,
    pub area: String,
    pub region_no: String,
    pub region_name: String,
    pub item_no: String,
    /// アイテム名（`_` 区切りで複数語を含むことがある）
    pub item_name: String,
    pub color: String,
    pub filename: String,
    /// `images/{フォルダ}/{ファイル名}`
    pub path: String,
    /// ファイル名の2番目のセグメント
    pub prefecture: String,
    /// ファイル名の4番目のセグメント
    pub sub_region: String,
}

/// ファイル名から読み取れる情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameParts {
    pub area_no: String,
    pub prefecture: String,
    pub region_no: String,
    pub sub_region: String,
    pub item_no: String,
    pub item_name: String,
}

/// 画像カタログ（読み取り専用）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageCatalog {
    images: Vec<ImageRecord>,
    regions: Vec<String>,
}

impl ImageCatalog {
    /// 画像レコードからカタログを構築（ファイル名から地域情報を補完）
    pub fn from_records(records: Vec<ImageRecord>) -> Self {
        let images: Vec<ImageRecord> = records.into_iter().map(augment_record).collect();

        let regions: BTreeSet<String> = images
            .iter()
            .map(|img| {
                if img.region_name.is_empty() {
                    img.prefecture.clone()
                } else {
                    img.region_name.clone()
                }
            })
            .filter(|r| !r.is_empty())
            .collect();

        Self {
            images,
            regions: regions.into_iter().collect(),
        }
    }

    /// CSVファイルから読み込み
    #[cfg(not(feature = "wasm"))]
    pub fn from_csv(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_csv_str(&content))
    }

    /// CSV文字列から読み込み
    ///
    /// 列順: エリア番号, エリア, 地域番号, 地域, 番号, 名前, カラー区分, ファイル名, フォルダ名
    pub fn from_csv_str(content: &str) -> Self {
        let rows = parse_csv_records(content);
        if rows.len() <= 1 {
            info!("画像CSVが空またはヘッダーのみです");
            return Self::default();
        }

        let mut records = Vec::new();
        // ヘッダーをスキップ
        for row in rows.iter().skip(1) {
            if row.len() < CSV_COLUMNS {
                continue;
            }
            let filename = row[7].clone();
            let folder = row[8].clone();
            if filename.is_empty() || folder.is_empty() {
                continue;
            }

            records.push(ImageRecord {
                area_no: row[0].clone(),
                area: row[1].clone(),
                region_no: row[2].clone(),
                region_name: row[3].clone(),
                item_no: row[4].clone(),
                item_name: row[5].clone(),
                color: row[6].clone(),
                path: format!("images/{}/{}", folder, filename),
                filename,
                ..Default::default()
            });
        }

        let catalog = Self::from_records(records);
        info!(images = catalog.len(), "画像CSVを読み込みました");
        catalog
    }

    /// 全画像
    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    /// 地域名一覧（ソート済み）
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    /// 画像の手動指定に使う候補（カタログ順、最大 [`OVERRIDE_CANDIDATE_LIMIT`] 件）
    ///
    /// 項目に地域があれば地域名（なければ都道府県）がそれを含む画像に絞り、
    /// アイテム名またはファイル名にキーワードを含むものを返す。大文字小文字は区別しない。
    pub fn override_candidates(&self, item: &Item, keyword: &str) -> Vec<&ImageRecord> {
        let keyword = keyword.trim().to_lowercase();
        let region = item.region.to_lowercase();

        self.images
            .iter()
            .filter(|img| {
                let img_region = if img.region_name.is_empty() {
                    &img.prefecture
                } else {
                    &img.region_name
                };
                region.is_empty() || img_region.to_lowercase().contains(&region)
            })
            .filter(|img| {
                img.item_name.to_lowercase().contains(&keyword)
                    || img.filename.to_lowercase().contains(&keyword)
            })
            .take(OVERRIDE_CANDIDATE_LIMIT)
            .collect()
    }

    pub fn get(&self, index: usize) -> Option<&ImageRecord> {
        self.images.get(index)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// 画像ファイル名を解析
///
/// # Examples
/// ```
/// use mokeke_common::catalog::parse_image_filename;
///
/// let parts = parse_image_filename("01_北海道_01_札幌_03_時計台_赤.jpg").unwrap();
/// assert_eq!(parts.prefecture, "北海道");
/// assert_eq!(parts.sub_region, "札幌");
/// assert_eq!(parts.item_name, "時計台_赤");
/// ```
pub fn parse_image_filename(filename: &str) -> Option<FilenameParts> {
    let stem = IMAGE_EXTENSIONS
        .iter()
        .find_map(|ext| filename.strip_suffix(ext))
        .unwrap_or(filename);

    let parts: Vec<&str> = stem.split('_').collect();
    if parts.len() < FILENAME_SEGMENTS {
        return None;
    }

    Some(FilenameParts {
        area_no: parts[0].to_string(),
        prefecture: parts[1].to_string(),
        region_no: parts[2].to_string(),
        sub_region: parts[3].to_string(),
        item_no: parts[4].to_string(),
        item_name: parts[5..].join("_"),
    })
}

/// 地域名から画像フォルダ名を取得
pub fn region_folder(region_name: &str) -> Option<&'static str> {
    REGION_FOLDERS
        .iter()
        .find(|(name, _)| *name == region_name)
        .map(|(_, folder)| *folder)
}

fn augment_record(mut record: ImageRecord) -> ImageRecord {
    match parse_image_filename(&record.filename) {
        Some(parts) => {
            record.prefecture = parts.prefecture;
            record.sub_region = parts.sub_region;
            if record.item_name.is_empty() {
                record.item_name = parts.item_name;
            }
        }
        None => debug!(filename = %record.filename, "ファイル名から地域を補完できません"),
    }
    if record.path.is_empty() {
        if let Some(folder) = region_folder(&record.region_name) {
            record.path = format!("images/{}/{}", folder, record.filename);
        }
    }
    record
}

/// CSVをパース（ダブルクォート・`""` エスケープ・引用符内改行対応）
fn parse_csv_records(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    cur.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                cur.push(c);
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => row.push(std::mem::take(&mut cur)),
            '\n' => {
                row.push(std::mem::take(&mut cur));
                rows.push(std::mem::take(&mut row));
            }
            '\r' => {}
            _ => cur.push(c),
        }
    }

    if !cur.is_empty() || !row.is_empty() {
        row.push(cur);
        rows.push(row);
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_CSV: &str = r#""エリア番号","エリア","地域番号","地域","番号","名前","カラー区分","ファイル名","フォルダ名"
"01","北海道","01","北海道","01","牛","","01_北海道_01_北海道_01_牛.jpg","01hokkaido"
"08","九州","01","福岡","02","明太子","赤","08_九州_01_福岡_02_明太子_赤.jpg","08kyushu"
"08","九州","07","鹿児島","01","桜島","","08_九州_07_鹿児島_01_桜島.jpg",""
"short","row"
"#;

    #[test]
    fn test_load_csv() {
        let catalog = ImageCatalog::from_csv_str(TEST_CSV);
        // フォルダ名が空の行と列不足の行は除外
        assert_eq!(catalog.len(), 2);

        let cow = &catalog.images()[0];
        assert_eq!(cow.filename, "01_北海道_01_北海道_01_牛.jpg");
        assert_eq!(cow.path, "images/01hokkaido/01_北海道_01_北海道_01_牛.jpg");
        assert_eq!(cow.region_name, "北海道");
        assert_eq!(cow.prefecture, "北海道");
        assert_eq!(cow.sub_region, "北海道");
        assert_eq!(cow.item_name, "牛");
    }

    #[test]
    fn test_load_csv_keeps_color_and_item_name() {
        let catalog = ImageCatalog::from_csv_str(TEST_CSV);
        let mentaiko = &catalog.images()[1];
        assert_eq!(mentaiko.color, "赤");
        assert_eq!(mentaiko.item_name, "明太子");
        assert_eq!(mentaiko.prefecture, "九州");
        assert_eq!(mentaiko.sub_region, "福岡");
    }

    #[test]
    fn test_regions_sorted_distinct() {
        let catalog = ImageCatalog::from_csv_str(TEST_CSV);
        assert_eq!(catalog.regions(), &["九州".to_string(), "北海道".to_string()]);
    }

    #[test]
    fn test_header_only_csv() {
        let catalog = ImageCatalog::from_csv_str("a,b,c,d,e,f,g,h,i\n");
        assert!(catalog.is_empty());
        assert!(ImageCatalog::from_csv_str("").is_empty());
    }

    #[test]
    fn test_parse_csv_records_quotes() {
        let rows = parse_csv_records("a,\"b,c\",\"d\"\"e\"\r\n\"multi\nline\",x");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["a", "b,c", "d\"e"]);
        assert_eq!(rows[1], vec!["multi\nline", "x"]);
    }

    #[test]
    fn test_parse_csv_records_trailing_newline() {
        let rows = parse_csv_records("a,b\n");
        assert_eq!(rows, vec![vec!["a".to_string(), "b".to_string()]]);
    }

    #[test]
    fn test_parse_image_filename() {
        let parts = parse_image_filename("12_季節_01_春_05_さくら_ピンク.jpg").unwrap();
        assert_eq!(parts.area_no, "12");
        assert_eq!(parts.prefecture, "季節");
        assert_eq!(parts.region_no, "01");
        assert_eq!(parts.sub_region, "春");
        assert_eq!(parts.item_no, "05");
        assert_eq!(parts.item_name, "さくら_ピンク");
    }

    #[test]
    fn test_parse_image_filename_too_short() {
        assert!(parse_image_filename("01_北海道_牛.jpg").is_none());
        assert!(parse_image_filename("").is_none());
    }

    #[test]
    fn test_from_records_fills_missing_fields() {
        let catalog = ImageCatalog::from_records(vec![ImageRecord {
            filename: "09_沖縄_01_沖縄_02_シーサー.png".to_string(),
            region_name: "沖縄".to_string(),
            ..Default::default()
        }]);
        let img = &catalog.images()[0];
        assert_eq!(img.item_name, "シーサー");
        assert_eq!(img.prefecture, "沖縄");
        assert_eq!(img.path, "images/09okinawa/09_沖縄_01_沖縄_02_シーサー.png");
    }

    fn override_catalog() -> ImageCatalog {
        ImageCatalog::from_records(vec![
            ImageRecord {
                filename: "01_北海道_01_北海道_01_牛.jpg".to_string(),
                region_name: "北海道".to_string(),
                ..Default::default()
            },
            ImageRecord {
                filename: "08_九州_01_福岡_01_牛.jpg".to_string(),
                region_name: "九州".to_string(),
                ..Default::default()
            },
            ImageRecord {
                // 地域名が空なら都道府県で判定
                filename: "01_北海道_02_函館_01_IKA.png".to_string(),
                item_name: "いか".to_string(),
                ..Default::default()
            },
        ])
    }

    #[test]
    fn test_override_candidates_region_filter() {
        let catalog = override_catalog();
        let item = Item {
            region: "北海道".to_string(),
            ..Default::default()
        };

        let hits = catalog.override_candidates(&item, "牛");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].filename, "01_北海道_01_北海道_01_牛.jpg");

        // 地域なしの項目は全画像が対象
        let hits = catalog.override_candidates(&Item::default(), "牛");
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_override_candidates_filename_hit() {
        let catalog = override_catalog();
        let item = Item {
            region: "北海道".to_string(),
            ..Default::default()
        };

        // アイテム名には無いがファイル名に含まれる（大文字小文字を区別しない）
        let hits = catalog.override_candidates(&item, "  ika ");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].item_name, "いか");
        assert_eq!(hits[0].prefecture, "北海道");

        assert!(catalog.override_candidates(&item, "ラーメン").is_empty());
    }

    #[test]
    fn test_override_candidates_limit() {
        let records = (0..30)
            .map(|i| ImageRecord {
                filename: format!("12_季節_01_春_{:02}_さくら.jpg", i),
                region_name: "季節".to_string(),
                ..Default::default()
            })
            .collect();
        let catalog = ImageCatalog::from_records(records);

        let hits = catalog.override_candidates(&Item::default(), "さくら");
        assert_eq!(hits.len(), OVERRIDE_CANDIDATE_LIMIT);
        assert_eq!(hits[0].filename, "12_季節_01_春_00_さくら.jpg");
        assert_eq!(hits[19].filename, "12_季節_01_春_19_さくら.jpg");
    }

    #[test]
    fn test_region_folder() {
        assert_eq!(region_folder("九州"), Some("08kyushu"));
        assert_eq!(region_folder("季節"), Some("12kisetsu"));
        assert_eq!(region_folder("火星"), None);
    }
}
