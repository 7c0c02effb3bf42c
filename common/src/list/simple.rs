//! シンプル形式（`[カテゴリ]` 見出し + 1行1項目）

use crate::types::{Item, ListFormat, ParsedList, UNCATEGORIZED};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // [カテゴリ名]
    static ref BRACKET_RE: Regex = Regex::new(r"^\[(.+?)\]$").unwrap();
}

/// シンプル形式を解析
///
/// IDは `"{カテゴリ}::{名前}"`。カテゴリは出現順。
pub fn parse(text: &str) -> ParsedList {
    let mut items = Vec::new();
    let mut categories: Vec<String> = Vec::new();
    let mut current: Option<String> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(cap) = BRACKET_RE.captures(line) {
            let name = cap[1].trim().to_string();
            // 空白だけの見出しは未分類扱い
            if name.is_empty() {
                current = None;
            } else {
                register(&mut categories, &name);
                current = Some(name);
            }
            continue;
        }

        let category = current.as_deref().unwrap_or(UNCATEGORIZED).to_string();
        register(&mut categories, &category);
        items.push(Item {
            id: format!("{}::{}", category, line),
            name: line.to_string(),
            original_name: line.to_string(),
            category,
            ..Default::default()
        });
    }

    ParsedList {
        format: ListFormat::Simple,
        items,
        categories,
        major_categories: Vec::new(),
        minor_categories: Vec::new(),
    }
}

fn register(categories: &mut Vec<String>, name: &str) {
    if !categories.iter().any(|c| c == name) {
        categories.push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let list = parse("# comment\n[Fruits]\nApple\nBanana\n[Veg]\nCarrot");

        assert_eq!(list.items.len(), 3);
        assert_eq!(list.categories, vec!["Fruits", "Veg"]);

        let ids: Vec<&str> = list.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["Fruits::Apple", "Fruits::Banana", "Veg::Carrot"]);
        assert_eq!(list.items[2].category, "Veg");
    }

    #[test]
    fn test_items_before_first_heading_are_uncategorized() {
        let list = parse("Loose\n[A]\nx");
        assert_eq!(list.items[0].category, UNCATEGORIZED);
        assert_eq!(list.items[0].id, "未分類::Loose");
        assert_eq!(list.categories, vec![UNCATEGORIZED.to_string(), "A".to_string()]);
    }

    #[test]
    fn test_heading_is_trimmed_and_crlf_handled() {
        let list = parse("[  Sea  ]\r\n  Crab  \r\n\r\n");
        assert_eq!(list.categories, vec!["Sea"]);
        assert_eq!(list.items[0].id, "Sea::Crab");
        assert_eq!(list.items[0].name, "Crab");
    }

    #[test]
    fn test_empty_heading_is_an_item() {
        // `[]` は見出しにならない
        let list = parse("[]");
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].name, "[]");
    }

    #[test]
    fn test_blank_heading_falls_back_to_uncategorized() {
        let list = parse("[A]\nx\n[ ]\nApple");
        assert_eq!(list.items[1].category, UNCATEGORIZED);
        assert_eq!(list.items[1].id, "未分類::Apple");
        assert_eq!(list.categories, vec!["A".to_string(), UNCATEGORIZED.to_string()]);
    }

    #[test]
    fn test_every_item_under_heading_gets_category() {
        let list = parse("[X]\na\nb\n# skip\nc\n[Y]\nd");
        for item in &list.items[..3] {
            assert_eq!(item.category, "X");
        }
        assert_eq!(list.items[3].category, "Y");
    }

    #[test]
    fn test_simple_items_are_not_acquired() {
        let list = parse("[X]\na");
        assert!(!list.items[0].is_acquired());
        assert!(list.items[0].image.is_none());
    }
}
