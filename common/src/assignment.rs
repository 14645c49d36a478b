//! 部屋割り当てモジュール
//!
//! 「どの部屋の入居者がこの部屋（スロット）にいるか」をRoomID同士の対応で保持する。
//! キーがスロット、値が入居者のRoomID。エントリが無いスロットは元の入居者のまま。
//!
//! ## 入れ替え規則
//! - `Legacy`: ドロップ先に dragged を置き、ドロップ先の以前の値を dragged 側へ移す。
//!   以前の値が無ければ dragged 側のエントリを消す。同じ入居者を複数スロットが
//!   指す状態になり得る（`conflicts()` で検出できる）。
//! - `Exclusive`: 両スロットの実際の入居者を交換する。対応は常に置換のまま保たれる。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// 入れ替え方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapPolicy {
    #[default]
    Legacy,
    Exclusive,
}

impl FromStr for SwapPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "legacy" => Ok(SwapPolicy::Legacy),
            "exclusive" => Ok(SwapPolicy::Exclusive),
            _ => Err(format!("Unknown swap policy: {}. Use legacy or exclusive", s)),
        }
    }
}

impl fmt::Display for SwapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapPolicy::Legacy => write!(f, "legacy"),
            SwapPolicy::Exclusive => write!(f, "exclusive"),
        }
    }
}

/// 同じ入居者を複数のスロットが指している状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub occupant: String,
    pub slots: Vec<String>,
}

/// スロット → 入居者 の対応
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentMap(BTreeMap<String, String>);

impl AssignmentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 明示的な割り当て
    pub fn get(&self, slot: &str) -> Option<&str> {
        self.0.get(slot).map(|s| s.as_str())
    }

    /// 実際の入居者（割り当てが無ければスロット自身）
    pub fn occupant<'a>(&'a self, slot: &'a str) -> &'a str {
        self.get(slot).unwrap_or(slot)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// dragged をドロップ先 target に入れる
    ///
    /// 同じ部屋へのドロップや空のIDは何もせず `false` を返す。
    pub fn swap(&mut self, dragged: &str, target: &str, policy: SwapPolicy) -> bool {
        if dragged.is_empty() || target.is_empty() || dragged == target {
            return false;
        }

        match policy {
            SwapPolicy::Legacy => self.swap_legacy(dragged, target),
            SwapPolicy::Exclusive => self.swap_exclusive(dragged, target),
        }
        true
    }

    fn swap_legacy(&mut self, dragged: &str, target: &str) {
        let previous = self.0.insert(target.to_string(), dragged.to_string());
        // 空文字の割り当ては無いものとして扱う
        match previous {
            Some(prev) if !prev.is_empty() => {
                self.0.insert(dragged.to_string(), prev);
            }
            _ => {
                self.0.remove(dragged);
            }
        }
    }

    fn swap_exclusive(&mut self, dragged: &str, target: &str) {
        let dragged_occupant = self.occupant(dragged).to_string();
        let target_occupant = self.occupant(target).to_string();
        self.set_slot(target, dragged_occupant);
        self.set_slot(dragged, target_occupant);
    }

    fn set_slot(&mut self, slot: &str, occupant: String) {
        if slot == occupant {
            self.0.remove(slot);
        } else {
            self.0.insert(slot.to_string(), occupant);
        }
    }

    /// 同じ入居者を指す複数スロットを列挙
    ///
    /// 対応に現れる全スロット（キーと値）の実際の入居者で判定する。
    pub fn conflicts(&self) -> Vec<Conflict> {
        let mut claims: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        let slots: std::collections::BTreeSet<&str> = self
            .0
            .iter()
            .flat_map(|(k, v)| [k.as_str(), v.as_str()])
            .collect();

        for slot in slots {
            claims
                .entry(self.occupant(slot))
                .or_default()
                .push(slot.to_string());
        }

        claims
            .into_iter()
            .filter(|(_, slots)| slots.len() > 1)
            .map(|(occupant, slots)| Conflict {
                occupant: occupant.to_string(),
                slots,
            })
            .collect()
    }
}

impl FromIterator<(String, String)> for AssignmentMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> AssignmentMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_legacy_first_drop() {
        let mut a = AssignmentMap::new();
        assert!(a.swap("101", "102", SwapPolicy::Legacy));
        assert_eq!(a, map(&[("102", "101")]));
    }

    #[test]
    fn test_legacy_second_drop_moves_previous_occupant() {
        let mut a = map(&[("102", "101")]);
        assert!(a.swap("103", "102", SwapPolicy::Legacy));
        assert_eq!(a, map(&[("102", "103"), ("103", "101")]));
    }

    #[test]
    fn test_legacy_removes_stale_dragged_entry() {
        let mut a = map(&[("101", "105")]);
        a.swap("101", "102", SwapPolicy::Legacy);
        assert_eq!(a, map(&[("102", "101")]));
    }

    #[test]
    fn test_legacy_empty_previous_counts_as_absent() {
        let mut a = map(&[("102", ""), ("101", "105")]);
        a.swap("101", "102", SwapPolicy::Legacy);
        assert_eq!(a, map(&[("102", "101")]));
    }

    #[test]
    fn test_self_drop_is_noop() {
        for policy in [SwapPolicy::Legacy, SwapPolicy::Exclusive] {
            let mut a = map(&[("102", "101")]);
            assert!(!a.swap("102", "102", policy));
            assert_eq!(a, map(&[("102", "101")]));
        }
    }

    #[test]
    fn test_empty_dragged_is_noop() {
        let mut a = AssignmentMap::new();
        assert!(!a.swap("", "102", SwapPolicy::Legacy));
        assert!(a.is_empty());
    }

    #[test]
    fn test_legacy_round_trip_does_not_restore() {
        // 書かれた規則どおりだと元に戻らない
        let mut a = AssignmentMap::new();
        a.swap("A", "B", SwapPolicy::Legacy);
        a.swap("B", "A", SwapPolicy::Legacy);
        assert_eq!(a, map(&[("A", "B")]));
    }

    #[test]
    fn test_exclusive_round_trip_restores() {
        let mut a = AssignmentMap::new();
        a.swap("A", "B", SwapPolicy::Exclusive);
        assert_eq!(a, map(&[("A", "B"), ("B", "A")]));
        a.swap("B", "A", SwapPolicy::Exclusive);
        assert!(a.is_empty());
    }

    #[test]
    fn test_exclusive_keeps_permutation() {
        let mut a = AssignmentMap::new();
        a.swap("101", "102", SwapPolicy::Exclusive);
        a.swap("103", "102", SwapPolicy::Exclusive);
        a.swap("104", "101", SwapPolicy::Exclusive);
        assert!(a.conflicts().is_empty());
        assert_eq!(a.occupant("102"), "103");
        assert_eq!(a.occupant("103"), "101");
    }

    #[test]
    fn test_conflicts_detect_duplicate_occupant() {
        let a = map(&[("102", "101")]);
        let conflicts = a.conflicts();
        assert_eq!(
            conflicts,
            vec![Conflict {
                occupant: "101".into(),
                slots: vec!["101".into(), "102".into()],
            }]
        );
    }

    #[test]
    fn test_serde_is_plain_object() {
        let a = map(&[("102", "101")]);
        assert_eq!(serde_json::to_string(&a).unwrap(), r#"{"102":"101"}"#);
        let back: AssignmentMap = serde_json::from_str(r#"{"102":"101"}"#).unwrap();
        assert_eq!(back, a);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("Exclusive".parse::<SwapPolicy>().unwrap(), SwapPolicy::Exclusive);
        assert_eq!("legacy".parse::<SwapPolicy>().unwrap(), SwapPolicy::Legacy);
        assert!("other".parse::<SwapPolicy>().is_err());
    }
}
