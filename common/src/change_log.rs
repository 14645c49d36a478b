//! 変更履歴モジュール
//!
//! 入れ替えのたびに1件追加される監査用の履歴。追加のみで、変更・削除はしない。

use crate::types::ChangeLogEntry;
use serde::{Deserialize, Serialize};

/// 追加専用の変更履歴
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeLog(Vec<ChangeLogEntry>);

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 末尾に追加
    pub fn append(&mut self, entry: ChangeLogEntry) {
        self.0.push(entry);
    }

    pub fn entries(&self) -> &[ChangeLogEntry] {
        &self.0
    }

    pub fn last(&self) -> Option<&ChangeLogEntry> {
        self.0.last()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 新しい順に最大 `limit` 件
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &ChangeLogEntry> {
        self.0.iter().rev().take(limit)
    }
}
