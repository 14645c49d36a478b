//! 部屋データの型定義
//!
//! 外部スクリプトが生成するJSON/CSVの形と、永続化する変更履歴の形:
//! - RoomMappingEntry: room-mapping-<N>.json の1要素
//! - PositionEntry: merged_room_data.json の1要素（文字認識で得た部屋番号の座標）
//! - OfficeRecord: 事務室CSVの1行
//! - ChangeLogEntry: 部屋の入れ替え履歴

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// 座標が無い部屋タグの表示位置
pub const DEFAULT_ANCHOR: f64 = 100.0;

/// 部屋マッピング
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomMappingEntry {
    #[serde(rename = "RoomID", deserialize_with = "de_room_id")]
    pub room_id: String,

    #[serde(default, deserialize_with = "de_opt_coord", skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,

    #[serde(default, deserialize_with = "de_opt_coord", skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RoomMetadata>,
}

impl RoomMappingEntry {
    /// タグの表示位置（metadata → トップレベル → 既定値の順）
    pub fn anchor(&self) -> (f64, f64) {
        let meta = self.metadata.as_ref();
        let x = meta.and_then(|m| m.x).or(self.x).unwrap_or(DEFAULT_ANCHOR);
        let y = meta.and_then(|m| m.y).or(self.y).unwrap_or(DEFAULT_ANCHOR);
        (x, y)
    }

    /// metadata 内の文字列項目
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.extra.get(key))
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
    }
}

/// 部屋マッピングの付随情報
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomMetadata {
    #[serde(default, deserialize_with = "de_opt_coord", skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,

    #[serde(default, deserialize_with = "de_opt_coord", skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// 図面上の部屋番号位置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionEntry {
    #[serde(
        rename = "RoomID",
        default,
        deserialize_with = "de_opt_room_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub room_id: Option<String>,

    #[serde(default, deserialize_with = "de_opt_room_id", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// キーがあれば null でも 0 として置く
    #[serde(default, deserialize_with = "de_present_coord", skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,

    #[serde(default, deserialize_with = "de_present_coord", skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl PositionEntry {
    /// 識別子（RoomID 優先、無ければ認識テキスト）
    pub fn id(&self) -> Option<&str> {
        self.room_id.as_deref().or(self.text.as_deref())
    }

    /// タグとして配置できるか
    pub fn is_placeable(&self) -> bool {
        self.id().is_some() && self.x.is_some() && self.y.is_some()
    }
}

/// 事務室レコード（CSV/Excelの1行）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfficeRecord {
    #[serde(rename = "RoomID")]
    pub room_id: String,

    #[serde(rename = "RoomName", default)]
    pub room_name: String,

    #[serde(rename = "OrgTypeName", default)]
    pub org_type_name: String,

    #[serde(rename = "RoomArea", default, skip_serializing_if = "Option::is_none")]
    pub room_area: Option<f64>,

    #[serde(rename = "ChargeBackAssignment", default)]
    pub charge_back_assignment: String,

    /// その他の列
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl OfficeRecord {
    /// 列名と値の組から構築（列名の表記ゆれを吸収）
    pub fn from_fields<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut record = Self::default();

        for (name, value) in fields {
            let value = value.trim().to_string();
            match canonical_header(&name) {
                Some(Column::RoomId) => record.room_id = value,
                Some(Column::RoomName) => record.room_name = value,
                Some(Column::OrgTypeName) => record.org_type_name = value,
                Some(Column::ChargeBack) => record.charge_back_assignment = value,
                Some(Column::RoomArea) => match parse_area(&value) {
                    Some(area) => record.room_area = Some(area),
                    // 数値でない面積はそのまま残す
                    None if !value.is_empty() => {
                        record.extra.insert("RoomArea".into(), Value::String(value));
                    }
                    None => {}
                },
                None => {
                    let key = name.trim_start_matches('\u{feff}').trim().to_string();
                    if !key.is_empty() {
                        record.extra.insert(key, Value::String(value));
                    }
                }
            }
        }

        record
    }

    /// 表示用の部屋名
    pub fn display_name(&self) -> &str {
        if self.room_name.is_empty() {
            "Unknown Room"
        } else {
            &self.room_name
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    RoomId,
    RoomName,
    OrgTypeName,
    RoomArea,
    ChargeBack,
}

fn canonical_header(name: &str) -> Option<Column> {
    match name.trim_start_matches('\u{feff}').trim() {
        "RoomID" | "Room ID" | "RoomId" | "Room Id" => Some(Column::RoomId),
        "RoomName" | "Room Name" => Some(Column::RoomName),
        "OrgTypeName" | "OrgType Name" => Some(Column::OrgTypeName),
        "RoomArea" | "Room Area" => Some(Column::RoomArea),
        "ChargeBackAssignment" | "ChargeBack Assignment" => Some(Column::ChargeBack),
        _ => None,
    }
}

/// 面積文字列を数値化（桁区切りのカンマを許容）
pub fn parse_area(value: &str) -> Option<f64> {
    let cleaned: String = value.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// フロアと部屋の組
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomRef {
    pub floor: String,
    pub room_id: String,
}

impl RoomRef {
    pub fn new(floor: impl Into<String>, room_id: impl Into<String>) -> Self {
        Self {
            floor: floor.into(),
            room_id: room_id.into(),
        }
    }
}

impl fmt::Display for RoomRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.floor, self.room_id)
    }
}

/// 変更履歴エントリ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeLogEntry {
    /// エポックミリ秒
    pub timestamp: i64,
    /// "<フロア> - <RoomID>"
    pub from: String,
    /// "<フロア> - <RoomID>"
    pub to: String,
}

impl ChangeLogEntry {
    pub fn new(timestamp: i64, from: &RoomRef, to: &RoomRef) -> Self {
        Self {
            timestamp,
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

fn de_room_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(de_opt_room_id(deserializer)?.unwrap_or_default())
}

/// RoomID は文字列・数値どちらでも受け付ける
fn de_opt_room_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => {
            let trimmed = s.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(de::Error::custom(format!("invalid room id: {}", other))),
    }
}

/// 座標は数値・数値文字列・null を受け付ける
fn de_opt_coord<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) => Ok(s.trim().parse::<f64>().ok().filter(|v| v.is_finite())),
        other => Err(de::Error::custom(format!("invalid coordinate: {}", other))),
    }
}

/// 位置データの座標。キーが無ければ None、null は 0
fn de_present_coord<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(de_opt_coord(deserializer)?.or(Some(0.0)))
}
