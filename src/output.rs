//! JSON出力用のデータ型

use mokeke_common::Item;
use serde::Serialize;

/// `parse --json` で出力する項目（入手済みフラグ付き）
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemJson<'a> {
    #[serde(flatten)]
    pub item: &'a Item,
    pub is_acquired: bool,
}

impl<'a> From<&'a Item> for ItemJson<'a> {
    fn from(item: &'a Item) -> Self {
        Self {
            item,
            is_acquired: item.is_acquired(),
        }
    }
}

/// 項目一覧をJSON文字列に整形
pub fn items_to_json(items: &[Item]) -> serde_json::Result<String> {
    let items: Vec<ItemJson> = items.iter().map(ItemJson::from).collect();
    serde_json::to_string_pretty(&items)
}
