//! リスト項目の型定義
//!
//! - Item: リストから解析した1件のモケケ
//! - ParsedList: 解析結果全体（項目とカテゴリ一覧）

use crate::catalog::ImageRecord;
use serde::{Deserialize, Serialize};

/// カテゴリ未設定時のラベル
pub const UNCATEGORIZED: &str = "未分類";

/// 表示名が組み立てられない場合のプレースホルダ
pub const NAME_UNKNOWN: &str = "(名称不明)";

/// リスト形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListFormat {
    /// `[カテゴリ]` 見出し + 1行1項目
    Simple,
    /// タブ区切り7〜8列
    Tabular,
}

/// リスト項目
///
/// 入手済みかどうかは `acquired_date` から導出する（[`Item::is_acquired`]）。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Item {
    pub id: String,
    /// 表示名（地域 + 名前 + カラー区分）
    pub name: String,
    pub original_name: String,
    pub region: String,
    pub color: String,
    pub major_category: String,
    pub minor_category: String,
    /// `"{大分類} > {中分類}"`（シンプル形式では見出し名）
    pub category: String,
    pub prefecture_no: String,
    pub order: i64,
    pub acquired_date: String,
    pub image: Option<ImageRecord>,
}

impl Item {
    /// 入手日が空でなければ入手済み
    pub fn is_acquired(&self) -> bool {
        !self.acquired_date.trim().is_empty()
    }
}

/// リスト解析結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedList {
    pub format: ListFormat,
    pub items: Vec<Item>,
    /// シンプル形式: 出現順の見出し / TSV形式: 大分類（ソート済み）
    pub categories: Vec<String>,
    #[serde(default)]
    pub major_categories: Vec<String>,
    #[serde(default)]
    pub minor_categories: Vec<String>,
}

impl ParsedList {
    /// 1件も認識できなかったか
    pub fn is_unrecognized(&self) -> bool {
        self.items.is_empty()
    }

    /// IDで項目を検索
    pub fn find(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_acquired_derived_from_date() {
        let mut item = Item::default();
        assert!(!item.is_acquired());

        item.acquired_date = "   ".to_string();
        assert!(!item.is_acquired());

        item.acquired_date = "2024-01-01".to_string();
        assert!(item.is_acquired());
    }

    #[test]
    fn test_item_serialize_camel_case() {
        let item = Item {
            id: "abc".to_string(),
            original_name: "牛".to_string(),
            major_category: "01".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_string(&item).expect("シリアライズ失敗");
        assert!(json.contains("\"originalName\":\"牛\""));
        assert!(json.contains("\"majorCategory\":\"01\""));
        assert!(json.contains("\"image\":null"));
    }

    #[test]
    fn test_parsed_list_find() {
        let list = ParsedList {
            format: ListFormat::Simple,
            items: vec![Item {
                id: "Fruits::Apple".to_string(),
                ..Default::default()
            }],
            categories: vec!["Fruits".to_string()],
            major_categories: Vec::new(),
            minor_categories: Vec::new(),
        };
        assert!(list.find("Fruits::Apple").is_some());
        assert!(list.find("Fruits::Banana").is_none());
        assert!(!list.is_unrecognized());
    }
}
