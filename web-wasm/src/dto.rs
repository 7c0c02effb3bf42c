//! JavaScript 側に渡すデータ型

use mokeke_common::session::CategoryCount;
use mokeke_common::{ImageRecord, Item};
use serde::Serialize;

/// JavaScript側に渡すリスト項目
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsItem {
    pub id: String,
    pub name: String,
    pub original_name: String,
    pub region: String,
    pub color: String,
    pub major_category: String,
    pub minor_category: String,
    pub category: String,
    pub prefecture_no: String,
    pub order: i64,
    pub acquired_date: String,
    pub is_acquired: bool,
    /// 入手済みにチェックされているか
    pub collected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRecord>,
}

impl From<&Item> for JsItem {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            original_name: item.original_name.clone(),
            region: item.region.clone(),
            color: item.color.clone(),
            major_category: item.major_category.clone(),
            minor_category: item.minor_category.clone(),
            category: item.category.clone(),
            prefecture_no: item.prefecture_no.clone(),
            order: item.order,
            acquired_date: item.acquired_date.clone(),
            is_acquired: item.is_acquired(),
            collected: false,
            image: item.image.clone(),
        }
    }
}

impl JsItem {
    pub fn with_collected(mut self, collected: bool) -> Self {
        self.collected = collected;
        self
    }
}

/// カテゴリ別の件数
#[derive(Debug, Clone, Serialize)]
pub struct JsCategory {
    pub name: String,
    pub total: usize,
    pub done: usize,
}

impl From<(String, CategoryCount)> for JsCategory {
    fn from((name, count): (String, CategoryCount)) -> Self {
        Self {
            name,
            total: count.total,
            done: count.done,
        }
    }
}
