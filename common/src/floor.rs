//! フロア設定テーブル
//!
//! フロア → {部屋マッピング, 事務室CSV, 図面SVG, 位置データ} の対応表。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 事務室CSVの既定ファイル名
pub const DEFAULT_OFFICE_CSV: &str = "Copy of UNH QUERY 8-15-24 (No Names).csv";
/// 位置データの既定ファイル名（図面SVG名 → 位置リスト）
pub const DEFAULT_POSITIONS: &str = "merged_room_data.json";

/// 1フロア分の参照リソース名
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorResources {
    /// room-mapping-<N>.json
    pub mapping: String,
    /// 事務室CSV
    pub offices: String,
    /// 図面SVG（位置データのキーにもなる）
    pub svg: String,
    /// 位置データJSON
    #[serde(default = "default_positions")]
    pub positions: String,
}

fn default_positions() -> String {
    DEFAULT_POSITIONS.to_string()
}

impl FloorResources {
    /// 命名規則どおりのリソース
    pub fn conventional(floor: &str) -> Self {
        Self {
            mapping: format!("room-mapping-{}.json", floor),
            offices: DEFAULT_OFFICE_CSV.to_string(),
            svg: format!("UNH-{} 11x17.svg", floor),
            positions: default_positions(),
        }
    }
}

/// フロア → リソース
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FloorTable(BTreeMap<String, FloorResources>);

impl Default for FloorTable {
    fn default() -> Self {
        let mut table = BTreeMap::new();
        for floor in ["3", "4"] {
            table.insert(floor.to_string(), FloorResources::conventional(floor));
        }
        Self(table)
    }
}

impl FloorTable {
    pub fn get(&self, floor: &str) -> Result<&FloorResources> {
        self.0
            .get(floor)
            .ok_or_else(|| Error::UnknownFloor(floor.to_string()))
    }

    pub fn contains(&self, floor: &str) -> bool {
        self.0.contains_key(floor)
    }

    pub fn floors(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
