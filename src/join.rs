//! 部屋データ結合モジュール
//!
//! 図面から抽出した部屋番号の位置と事務室データ（CSV/Excel）をRoomIDで結合し、
//! 画面で使う room-mapping-<N>.json と merged_room_data.json を作る。
//! 位置の抽出そのもの（文字認識・SVG解析）は行わない。

use crate::error::{FloorAssignError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use floor_assign_common::{
    FloorResources, OfficeDirectory, OfficeRecord, PositionEntry, RoomMappingEntry, RoomMetadata,
};
use indicatif::{ProgressBar, ProgressStyle};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

lazy_static! {
    /// "UNH-4 11x17.svg" → 4
    static ref FLOOR_IN_NAME: Regex = Regex::new(r"-(\d+)").unwrap();
}

/// 図面ファイル名 → 位置リスト
pub type PositionSets = BTreeMap<String, Vec<PositionEntry>>;

/// 図面ファイル名からフロア番号を取り出す
pub fn floor_from_svg_name(name: &str) -> Option<String> {
    FLOOR_IN_NAME
        .captures(name)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// 事務室データを読み込む（拡張子で CSV / Excel を判定）
pub fn read_offices(path: &Path) -> Result<OfficeDirectory> {
    if !path.exists() {
        return Err(FloorAssignError::FileNotFound(path.display().to_string()));
    }

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "ods" => read_offices_workbook(path),
        _ => {
            let content = std::fs::read_to_string(path)?;
            Ok(OfficeDirectory::from_csv_str(&content)?)
        }
    }
}

/// Excelの先頭シートを読み込む（1行目が列名）
fn read_offices_workbook(path: &Path) -> Result<OfficeDirectory> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| FloorAssignError::ExcelRead(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| FloorAssignError::ExcelRead("シートがありません".into()))?
        .map_err(|e| FloorAssignError::ExcelRead(e.to_string()))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(row) => row.iter().map(cell_to_string).collect(),
        None => return Ok(OfficeDirectory::default()),
    };

    let records = rows
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>())
        .filter(|cells| cells.iter().any(|c| !c.trim().is_empty()))
        .map(|cells| OfficeRecord::from_fields(headers.iter().cloned().zip(cells)))
        .collect();

    Ok(OfficeDirectory::from_records(records))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        // 部屋番号は数値セルになりがちなので整数なら小数点を付けない
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

/// 位置データを読み込む（配列なら図面名 "" の1件として扱う）
pub fn read_position_sets(path: &Path) -> Result<PositionSets> {
    if !path.exists() {
        return Err(FloorAssignError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    parse_position_sets(&content)
}

pub fn parse_position_sets(content: &str) -> Result<PositionSets> {
    let value: Value = serde_json::from_str(content)?;
    match value {
        Value::Array(_) => {
            let list: Vec<PositionEntry> = serde_json::from_value(value)?;
            let mut sets = PositionSets::new();
            sets.insert(String::new(), list);
            Ok(sets)
        }
        Value::Object(_) => Ok(serde_json::from_value(value)?),
        _ => Err(FloorAssignError::InvalidInput(
            "位置データは配列またはオブジェクトである必要があります".into(),
        )),
    }
}

/// 認識テキストと事務室データを結合して部屋マッピングを作る
///
/// 事務室データに無いテキストは捨てる。
pub fn map_rooms(texts: &[PositionEntry], offices: &OfficeDirectory) -> Result<Vec<RoomMappingEntry>> {
    let mut mapped = Vec::new();

    for entry in texts {
        let Some(id) = entry.text.as_deref().or(entry.room_id.as_deref()) else {
            continue;
        };
        let Some(office) = offices.get(id) else {
            continue;
        };

        let extra = match serde_json::to_value(office)? {
            Value::Object(map) => map.into_iter().collect(),
            _ => BTreeMap::new(),
        };

        mapped.push(RoomMappingEntry {
            room_id: id.to_string(),
            x: entry.x,
            y: entry.y,
            metadata: Some(RoomMetadata { x: None, y: None, extra }),
        });
    }

    Ok(mapped)
}

/// 図面ごとの認識テキストと事務室データを結合する
///
/// 事務室データの行順に、同じ部屋番号のテキストをすべて拾う。
pub fn merge_positions(sets: &PositionSets, offices: &OfficeDirectory) -> PositionSets {
    sets.iter()
        .map(|(svg, texts)| (svg.clone(), merge_one(texts, offices)))
        .collect()
}

fn merge_one(texts: &[PositionEntry], offices: &OfficeDirectory) -> Vec<PositionEntry> {
    let mut merged = Vec::new();

    for office in offices.records() {
        if office.room_id.is_empty() {
            continue;
        }

        for text in texts.iter().filter(|t| t.text.as_deref() == Some(office.room_id.as_str())) {
            let mut extra = BTreeMap::new();
            extra.insert("RoomName".to_string(), Value::String(office.room_name.clone()));
            extra.insert("OrgTypeName".to_string(), Value::String(office.org_type_name.clone()));
            extra.insert(
                "RoomArea".to_string(),
                office
                    .room_area
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
            );

            merged.push(PositionEntry {
                room_id: Some(office.room_id.clone()),
                text: None,
                x: text.x,
                y: text.y,
                extra,
            });
        }
    }

    merged
}

/// 図面ごとに room-mapping-<N>.json を書き出す
///
/// フロア番号は図面名から取り、取れない場合は `fallback_floor` を使う。
/// どちらも無い図面は飛ばす。
pub fn write_room_mappings(
    sets: &PositionSets,
    offices: &OfficeDirectory,
    output_dir: &Path,
    fallback_floor: Option<&str>,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;

    let pb = ProgressBar::new(sets.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut written = Vec::new();
    for (svg, texts) in sets {
        pb.set_message(svg.clone());
        let floor = floor_from_svg_name(svg).or_else(|| fallback_floor.map(|f| f.to_string()));
        let Some(floor) = floor else {
            pb.println(format!("⚠ フロア番号が分かりません: {:?}（--floor で指定してください）", svg));
            pb.inc(1);
            continue;
        };

        let mapped = map_rooms(texts, offices)?;
        let path = output_dir.join(FloorResources::conventional(&floor).mapping);
        std::fs::write(&path, serde_json::to_string_pretty(&mapped)?)?;
        log::debug!("{}: {}件 → {}", svg, mapped.len(), path.display());
        written.push(path);
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(written)
}

/// 結合済み位置データを書き出す（入力が配列なら配列のまま）
pub fn write_merged(merged: &PositionSets, output: &Path) -> Result<()> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let content = match (merged.len(), merged.get("")) {
        (1, Some(list)) => serde_json::to_string_pretty(list)?,
        _ => serde_json::to_string_pretty(merged)?,
    };
    std::fs::write(output, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offices() -> OfficeDirectory {
        OfficeDirectory::from_csv_str(
            "RoomID,RoomName,OrgTypeName,RoomArea\n4101,Lab,Research,300\n4102,Office,Admin,\n",
        )
        .unwrap()
    }

    fn texts() -> Vec<PositionEntry> {
        serde_json::from_str(
            r#"[
                {"text": "4102", "x": 5, "y": 6},
                {"text": "4101", "x": 1, "y": 2},
                {"text": "STAIR", "x": 9, "y": 9},
                {"text": "4101", "x": 3, "y": 4}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_floor_from_svg_name() {
        assert_eq!(floor_from_svg_name("UNH-4 11x17.svg").as_deref(), Some("4"));
        assert_eq!(floor_from_svg_name("UNH-3 Thematic Plan (BCLA).svg").as_deref(), Some("3"));
        assert_eq!(floor_from_svg_name("plan.svg"), None);
    }

    #[test]
    fn test_map_rooms() {
        let mapped = map_rooms(&texts(), &offices()).unwrap();
        let ids: Vec<_> = mapped.iter().map(|m| m.room_id.as_str()).collect();
        assert_eq!(ids, vec!["4102", "4101", "4101"]);
        assert_eq!(mapped[1].anchor(), (1.0, 2.0));
        assert_eq!(mapped[1].metadata_str("RoomName"), Some("Lab"));
    }

    #[test]
    fn test_merge_positions_follows_office_order() {
        let mut sets = PositionSets::new();
        sets.insert("UNH-4 11x17.svg".into(), texts());

        let merged = merge_positions(&sets, &offices());
        let rooms = &merged["UNH-4 11x17.svg"];
        let ids: Vec<_> = rooms.iter().filter_map(|r| r.id()).collect();
        assert_eq!(ids, vec!["4101", "4101", "4102"]);
        assert_eq!(rooms[0].extra["RoomArea"], serde_json::json!(300.0));
        assert_eq!(rooms[2].extra["RoomArea"], Value::Null);
    }

    #[test]
    fn test_parse_position_sets_shapes() {
        let list = parse_position_sets(r#"[{"text": "1", "x": 0, "y": 0}]"#).unwrap();
        assert_eq!(list[""].len(), 1);

        let keyed = parse_position_sets(r#"{"a.svg": [], "b.svg": [{"text": "2", "x": 1, "y": 1}]}"#).unwrap();
        assert_eq!(keyed.len(), 2);
        assert_eq!(keyed["b.svg"][0].id(), Some("2"));

        assert!(parse_position_sets("true").is_err());
    }
}
