//! TSV形式（7〜8列）
//!
//! 列構成:
//! - 7列: 大分類, 中分類, 県NO, 地域, カラー区分, 名前, 入手日
//! - 8列以上: 大分類, 中分類, 県NO, 地域, カラー区分, 並び順, 名前, 入手日
//!
//! 最初の行（コメント・空行を除く）はヘッダーとして読み捨てる。

use crate::catalog::ImageCatalog;
use crate::hash::djb2_base36;
use crate::matcher::{find_image, MatchQuery, UsedImages};
use crate::types::{Item, ListFormat, ParsedList, NAME_UNKNOWN};
use std::collections::BTreeSet;
use tracing::debug;

/// 必須列数
const MIN_COLUMNS: usize = 7;

/// 並び順列を持つ列数
const ORDERED_COLUMNS: usize = 8;

/// 表示名に付けるカラー区分の最大文字数
const MAX_COLOR_CHARS: usize = 10;

/// シリーズ・弾数を表す文字（カラー区分とみなさない）
const SERIES_MARKERS: &[char] = &['第', '弾'];

/// TSV形式を解析（行ごとに画像を照合）
pub fn parse(text: &str, catalog: &ImageCatalog, used: &mut UsedImages) -> ParsedList {
    let mut items = Vec::new();
    let mut majors = BTreeSet::new();
    let mut minors = BTreeSet::new();
    let mut header_skipped = false;

    for (line_no, raw) in text.lines().enumerate() {
        if raw.trim().is_empty() || raw.trim().starts_with('#') {
            continue;
        }
        if !header_skipped {
            header_skipped = true;
            continue;
        }

        let cols: Vec<&str> = raw.split('\t').map(str::trim).collect();
        if cols.len() < MIN_COLUMNS {
            debug!(line = line_no + 1, columns = cols.len(), "列不足の行をスキップ");
            continue;
        }

        let major = cols[0];
        let minor = cols[1];
        let prefecture_no = cols[2];
        let region = cols[3];
        let color = cols[4];
        let (order, name, acquired_date) = if cols.len() >= ORDERED_COLUMNS {
            (parse_order(cols[5]), cols[6], cols[7])
        } else {
            (0, cols[5], cols[6])
        };

        majors.insert(major.to_string());
        minors.insert(minor.to_string());

        let display_name = build_display_name(region, name, color);
        let id_seed = format!("{}::{}::{}::{}::{}", cols[0], major, minor, name, order);

        let query = MatchQuery {
            display_name: display_name.clone(),
            region: region.to_string(),
            color: color.to_string(),
            prefecture_no: prefecture_no.to_string(),
            order,
        };
        let image = find_image(&query, catalog, used);

        items.push(Item {
            id: djb2_base36(&id_seed),
            name: display_name,
            original_name: name.to_string(),
            region: region.to_string(),
            color: color.to_string(),
            major_category: major.to_string(),
            minor_category: minor.to_string(),
            category: format!("{} > {}", major, minor),
            prefecture_no: prefecture_no.to_string(),
            order,
            acquired_date: acquired_date.to_string(),
            image,
        });
    }

    let major_categories: Vec<String> = majors.into_iter().collect();
    ParsedList {
        format: ListFormat::Tabular,
        items,
        categories: major_categories.clone(),
        major_categories,
        minor_categories: minors.into_iter().collect(),
    }
}

/// 表示名を組み立て（地域 名前 カラー区分）
pub fn build_display_name(region: &str, name: &str, color: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if !region.is_empty() {
        parts.push(region);
    }
    if !name.is_empty() {
        parts.push(name);
    }
    if is_color_label(color) {
        parts.push(color);
    }

    if parts.is_empty() {
        NAME_UNKNOWN.to_string()
    } else {
        parts.join(" ")
    }
}

fn is_color_label(color: &str) -> bool {
    !color.is_empty()
        && color.chars().count() <= MAX_COLOR_CHARS
        && !color.contains(SERIES_MARKERS)
}

/// 先頭の整数部分を読む（符号・数字以外で打ち切り、数字がなければ 0）
pub fn parse_order(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    match digits[..end].parse::<i64>() {
        Ok(n) if negative => -n,
        Ok(n) => n,
        Err(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ImageRecord;

    const HEADER: &str = "大分類\t中分類\t県NO\t地域\tカラー区分\t並び順\t名前\t入手日";

    fn parse_plain(text: &str) -> ParsedList {
        let mut used = UsedImages::new();
        parse(text, &ImageCatalog::default(), &mut used)
    }

    #[test]
    fn test_eight_column_row() {
        let text = format!("{}\n01\t01_Region\t05\tHokkaido\tRed\t1\tCow\t2024-01-01", HEADER);
        let list = parse_plain(&text);

        assert_eq!(list.items.len(), 1);
        let item = &list.items[0];
        assert_eq!(item.order, 1);
        assert_eq!(item.original_name, "Cow");
        assert!(item.is_acquired());
        assert_eq!(item.category, "01 > 01_Region");
        assert_eq!(item.name, "Hokkaido Cow Red");
        assert_eq!(item.prefecture_no, "05");
    }

    #[test]
    fn test_column_count_boundaries() {
        let text = format!(
            "{}\n{}\n{}\n{}",
            HEADER,
            "01\tA\t05\t北海道\t赤\t牛",                 // 6列: 破棄
            "01\tA\t05\t北海道\t赤\t牛\t2024-02-02",     // 7列
            "01\tA\t05\t北海道\t赤\t3\t馬\t",            // 8列
        );
        let list = parse_plain(&text);

        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[0].original_name, "牛");
        assert_eq!(list.items[0].order, 0);
        assert_eq!(list.items[0].acquired_date, "2024-02-02");
        assert_eq!(list.items[1].original_name, "馬");
        assert_eq!(list.items[1].order, 3);
        assert!(!list.items[1].is_acquired());
    }

    #[test]
    fn test_header_is_skipped_unconditionally() {
        // 先頭のデータ行もヘッダーとして捨てられる
        let text = "# c\n\n01\tA\t05\t北海道\t赤\t牛\t\n01\tA\t05\t北海道\t青\t馬\t";
        let list = parse_plain(text);
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].original_name, "馬");
    }

    #[test]
    fn test_acquired_date_whitespace_is_not_acquired() {
        let text = format!("{}\n01\tA\t05\t北海道\t赤\t1\t牛\t   ", HEADER);
        let list = parse_plain(&text);
        assert!(!list.items[0].is_acquired());
    }

    #[test]
    fn test_categories_sorted() {
        let text = format!(
            "{}\n02\tB\t1\tR\t\t1\tx\t\n01\tC\t1\tR\t\t2\ty\t\n02\tA\t1\tR\t\t3\tz\t",
            HEADER
        );
        let list = parse_plain(&text);
        assert_eq!(list.major_categories, vec!["01", "02"]);
        assert_eq!(list.minor_categories, vec!["A", "B", "C"]);
        assert_eq!(list.categories, list.major_categories);
    }

    #[test]
    fn test_ids_differ_by_order_and_repeat_across_parses() {
        let text = format!(
            "{}\n01\tA\t05\t北海道\t赤\t1\t牛\t\n01\tA\t05\t北海道\t赤\t2\t牛\t",
            HEADER
        );
        let first = parse_plain(&text);
        let second = parse_plain(&text);

        assert_ne!(first.items[0].id, first.items[1].id);
        let ids = |l: &ParsedList| l.items.iter().map(|i| i.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
        assert_eq!(first.items[0].id, djb2_base36("01::01::A::牛::1"));
    }

    #[test]
    fn test_build_display_name() {
        assert_eq!(build_display_name("北海道", "牛", "赤"), "北海道 牛 赤");
        assert_eq!(build_display_name("", "牛", ""), "牛");
        // シリーズ表記はカラー区分として扱わない
        assert_eq!(build_display_name("北海道", "牛", "第2弾"), "北海道 牛");
        assert_eq!(build_display_name("北海道", "牛", "とてもとても長いカラー名"), "北海道 牛");
        assert_eq!(build_display_name("", "", ""), NAME_UNKNOWN);
    }

    #[test]
    fn test_parse_order() {
        assert_eq!(parse_order("12"), 12);
        assert_eq!(parse_order("12abc"), 12);
        assert_eq!(parse_order("-3"), -3);
        assert_eq!(parse_order("+4"), 4);
        assert_eq!(parse_order("abc"), 0);
        assert_eq!(parse_order(""), 0);
        assert_eq!(parse_order("-"), 0);
    }

    #[test]
    fn test_rows_receive_distinct_images() {
        let catalog = ImageCatalog::from_records(vec![
            ImageRecord {
                filename: "01_北海道_01_北海道_01_牛.jpg".to_string(),
                region_name: "北海道".to_string(),
                item_name: "牛".to_string(),
                ..Default::default()
            },
            ImageRecord {
                filename: "01_北海道_01_北海道_02_牛.jpg".to_string(),
                region_name: "北海道".to_string(),
                item_name: "牛".to_string(),
                ..Default::default()
            },
        ]);
        let text = format!(
            "{}\n01\tA\t01\t北海道\t\t1\t牛\t\n01\tA\t01\t北海道\t\t2\t牛\t\n01\tA\t01\t北海道\t\t3\t牛\t",
            HEADER
        );
        let mut used = UsedImages::new();
        let list = parse(&text, &catalog, &mut used);

        let filenames: Vec<Option<&str>> = list
            .items
            .iter()
            .map(|i| i.image.as_ref().map(|img| img.filename.as_str()))
            .collect();
        assert!(filenames[0].is_some());
        assert!(filenames[1].is_some());
        assert_ne!(filenames[0], filenames[1]);
        assert_eq!(filenames[2], None);
    }
}
