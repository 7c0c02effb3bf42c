//! リスト解析モジュール
//!
//! デコード済みテキストを項目一覧に変換する。形式はテキストから自動判定する。
//!
//! ## 形式判定
//! - タブ文字が5個以上、または最初の空でない行にタブを含む → [`tabular`]
//! - それ以外 → [`simple`]（`[カテゴリ]` 見出し + 1行1項目）

pub mod simple;
pub mod tabular;

use crate::catalog::ImageCatalog;
use crate::matcher::UsedImages;
use crate::types::{ListFormat, ParsedList};
use tracing::info;

/// TSV形式と判定するタブ文字数
const TAB_COUNT_THRESHOLD: usize = 5;

/// 形式を判定
pub fn detect_format(text: &str) -> ListFormat {
    let tab_count = text.matches('\t').count();
    let first_line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");

    if tab_count >= TAB_COUNT_THRESHOLD || first_line.contains('\t') {
        ListFormat::Tabular
    } else {
        ListFormat::Simple
    }
}

/// 形式を自動判定して解析
///
/// TSV形式では行ごとに画像照合を行い、`used` を更新する。
pub fn parse_auto(text: &str, catalog: &ImageCatalog, used: &mut UsedImages) -> ParsedList {
    let format = detect_format(text);
    let list = match format {
        ListFormat::Simple => simple::parse(text),
        ListFormat::Tabular => tabular::parse(text, catalog, used),
    };
    info!(?format, items = list.items.len(), "リストを解析しました");
    list
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_format_by_first_line() {
        assert_eq!(detect_format("\n\n大分類\t中分類\n"), ListFormat::Tabular);
        assert_eq!(detect_format("[Fruits]\nApple"), ListFormat::Simple);
    }

    #[test]
    fn test_detect_format_by_tab_count() {
        // 先頭行にタブがなくても、全体で5個以上なら TSV
        let text = "# header\na\tb\tc\nd\te\tf\tg";
        assert_eq!(detect_format(text), ListFormat::Tabular);

        let text = "# header\na\tb\nc\td";
        assert_eq!(detect_format(text), ListFormat::Simple);
    }

    #[test]
    fn test_detect_format_empty() {
        assert_eq!(detect_format(""), ListFormat::Simple);
    }

    #[test]
    fn test_parse_auto_dispatch() {
        let catalog = ImageCatalog::default();
        let mut used = UsedImages::new();

        let simple = parse_auto("[A]\nx", &catalog, &mut used);
        assert_eq!(simple.format, ListFormat::Simple);
        assert_eq!(simple.items.len(), 1);

        let tsv = "h\th\th\th\th\th\th\n01\tA\t1\t北海道\t赤\t牛\t";
        let tabular = parse_auto(tsv, &catalog, &mut used);
        assert_eq!(tabular.format, ListFormat::Tabular);
        assert_eq!(tabular.items.len(), 1);
    }

    #[test]
    fn test_unrecognized_list() {
        let catalog = ImageCatalog::default();
        let mut used = UsedImages::new();
        let list = parse_auto("# only comments\n\n", &catalog, &mut used);
        assert!(list.is_unrecognized());
    }
}
