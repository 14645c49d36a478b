//! 事務室データモジュール
//!
//! 事務室CSV（1行目が列名）を読み込み、RoomIDで引けるようにする。
//! 部署（OrgTypeName）と用途（ChargeBackAssignment）の一覧と絞り込みも提供する。

use crate::error::Result;
use crate::types::OfficeRecord;
use std::collections::{HashMap, HashSet};
use std::io::Read;

/// 事務室レコードの集合
#[derive(Debug, Clone, Default)]
pub struct OfficeDirectory {
    records: Vec<OfficeRecord>,
    by_room: HashMap<String, usize>,
}

/// 絞り込み条件（None は「すべて」）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfficeFilter {
    pub department: Option<String>,
    pub usage: Option<String>,
}

impl OfficeFilter {
    fn matches(&self, record: &OfficeRecord) -> bool {
        let dept_ok = self
            .department
            .as_deref()
            .map_or(true, |d| record.org_type_name == d);
        let usage_ok = self
            .usage
            .as_deref()
            .map_or(true, |u| record.charge_back_assignment == u);
        dept_ok && usage_ok
    }
}

impl OfficeDirectory {
    /// レコード列から構築（同じRoomIDは先頭のレコードを採用）
    pub fn from_records(records: Vec<OfficeRecord>) -> Self {
        let mut by_room = HashMap::new();
        for (idx, record) in records.iter().enumerate() {
            if !record.room_id.is_empty() {
                by_room.entry(record.room_id.clone()).or_insert(idx);
            }
        }
        Self { records, by_room }
    }

    /// CSV文字列から読み込み
    pub fn from_csv_str(content: &str) -> Result<Self> {
        Self::from_csv_reader(content.as_bytes())
    }

    /// CSVリーダーから読み込み
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let mut records = Vec::new();

        for row in reader.records() {
            let row = row?;
            // 空行（末尾の改行など）は読み飛ばす
            if row.iter().all(|field| field.trim().is_empty()) {
                continue;
            }

            let fields = headers
                .iter()
                .zip(row.iter())
                .map(|(name, value)| (name.to_string(), value.to_string()));
            records.push(OfficeRecord::from_fields(fields));
        }

        log::debug!("事務室CSV: {}件", records.len());
        Ok(Self::from_records(records))
    }

    /// RoomIDで検索
    pub fn get(&self, room_id: &str) -> Option<&OfficeRecord> {
        self.by_room.get(room_id).map(|&idx| &self.records[idx])
    }

    pub fn records(&self) -> &[OfficeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 部署一覧（出現順、重複・空を除く）
    pub fn departments(&self) -> Vec<&str> {
        unique_values(self.records.iter().map(|r| r.org_type_name.as_str()))
    }

    /// 用途一覧（出現順、重複・空を除く）
    pub fn usage_types(&self) -> Vec<&str> {
        unique_values(self.records.iter().map(|r| r.charge_back_assignment.as_str()))
    }

    /// 条件に合うレコード
    pub fn filter(&self, filter: &OfficeFilter) -> Vec<&OfficeRecord> {
        self.records.iter().filter(|r| filter.matches(r)).collect()
    }
}

fn unique_values<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    values
        .filter(|v| !v.is_empty())
        .filter(|v| seen.insert(*v))
        .collect()
}
