//! フロアデータ読み込みモジュール
//!
//! 部屋マッピングJSON・事務室CSV・位置データJSONを同じ取得元から読み込む。
//! 失敗したリソースは空のまま、表示用のエラー文字列を残す（再試行はしない）。

mod source;

pub use source::{AssetSource, FetchError};

use floor_assign_common::{
    FloorResources, OfficeDirectory, PositionEntry, RoomMappingEntry, TagOverlay,
};
use serde_json::Value;

/// 1フロア分の読み込み結果
#[derive(Debug, Clone, Default)]
pub struct FloorData {
    pub floor: String,
    pub room_mapping: Vec<RoomMappingEntry>,
    pub room_mapping_error: Option<String>,
    pub offices: OfficeDirectory,
    pub csv_error: Option<String>,
    pub positions: Vec<PositionEntry>,
    pub positions_error: Option<String>,
}

impl FloorData {
    /// 表示するエラー文字列
    pub fn errors(&self) -> Vec<&str> {
        [&self.room_mapping_error, &self.csv_error, &self.positions_error]
            .into_iter()
            .filter_map(|e| e.as_deref())
            .collect()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors().is_empty()
    }

    /// 部屋番号タグ
    pub fn overlay(&self) -> TagOverlay {
        TagOverlay::from_entries(&self.floor, &self.positions)
    }

    /// 部屋マッピングから検索
    pub fn room(&self, room_id: &str) -> Option<&RoomMappingEntry> {
        self.room_mapping.iter().find(|r| r.room_id == room_id)
    }
}

/// フロアのデータを読み込む
pub async fn load_floor(source: &AssetSource, floor: &str, resources: &FloorResources) -> FloorData {
    let (mapping, offices, positions) = tokio::join!(
        source.fetch_text(&resources.mapping),
        source.fetch_text(&resources.offices),
        source.fetch_text(&resources.positions),
    );

    let mut data = FloorData {
        floor: floor.to_string(),
        ..Default::default()
    };

    match mapping {
        Ok(text) => match parse_room_mapping(&text) {
            Ok(entries) => data.room_mapping = entries,
            Err(msg) => data.room_mapping_error = Some(msg),
        },
        Err(e) => data.room_mapping_error = Some(format!("部屋マッピングの読み込みに失敗: {}", e)),
    }

    match offices {
        Ok(text) => match OfficeDirectory::from_csv_str(&text) {
            Ok(dir) => data.offices = dir,
            Err(e) => data.csv_error = Some(format!("CSVの解析に失敗: {}", e)),
        },
        Err(e) => data.csv_error = Some(format!("CSVの読み込みに失敗: {}", e)),
    }

    match positions {
        Ok(text) => match parse_positions(&text, &resources.svg) {
            Ok(entries) => data.positions = entries,
            Err(msg) => data.positions_error = Some(msg),
        },
        Err(e) => {
            data.positions_error = Some(format!("{}の読み込みに失敗: {}", resources.positions, e))
        }
    }

    for error in data.errors() {
        log::warn!("フロア{}: {}", floor, error);
    }
    log::debug!(
        "フロア{}: 部屋{}件 / 事務室{}件 / 位置{}件",
        floor,
        data.room_mapping.len(),
        data.offices.len(),
        data.positions.len()
    );

    data
}

/// 部屋マッピングJSON（配列）
pub fn parse_room_mapping(text: &str) -> Result<Vec<RoomMappingEntry>, String> {
    serde_json::from_str(text).map_err(|e| format!("部屋マッピングの解析に失敗: {}", e))
}

/// 位置データJSON
///
/// 図面SVG名 → 位置リスト の形なら `svg` のリストを、配列ならそのまま使う。
/// 該当する図面が無い場合は空。
pub fn parse_positions(text: &str, svg: &str) -> Result<Vec<PositionEntry>, String> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| format!("位置データの解析に失敗: {}", e))?;

    let list = match value {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut map) => match map.remove(svg) {
            Some(list) => list,
            None => return Ok(Vec::new()),
        },
        _ => return Err("位置データの形式が不正です".to_string()),
    };

    serde_json::from_value(list).map_err(|e| format!("位置データの解析に失敗: {}", e))
}
