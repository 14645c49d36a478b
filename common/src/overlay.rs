//! 部屋番号タグの配置
//!
//! 図面上の部屋番号位置からドラッグ可能なタグを作る。
//! 移動はメモリ上のみで、保存しない。

use crate::types::PositionEntry;

/// 部屋番号タグ
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

/// フロアごとのタグ一覧
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagOverlay {
    floor: String,
    tags: Vec<Tag>,
}

impl TagOverlay {
    /// 識別子と座標キーが揃ったエントリだけをタグにする（null 座標は 0）
    pub fn from_entries(floor: &str, entries: &[PositionEntry]) -> Self {
        let tags = entries
            .iter()
            .filter_map(|e| match (e.id(), e.x, e.y) {
                (Some(id), Some(x), Some(y)) => Some(Tag {
                    id: id.to_string(),
                    x,
                    y,
                }),
                _ => None,
            })
            .collect();

        Self {
            floor: floor.to_string(),
            tags,
        }
    }

    pub fn floor(&self) -> &str {
        &self.floor
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.id == id)
    }

    /// 同じ識別子のタグをすべて移動し、移動した数を返す
    pub fn move_to(&mut self, id: &str, x: f64, y: f64) -> usize {
        let mut moved = 0;
        for tag in self.tags.iter_mut().filter(|t| t.id == id) {
            tag.x = x;
            tag.y = y;
            moved += 1;
        }
        moved
    }

    /// ドラッグ開始位置 `origin` からの移動量 `delta` を適用（整数座標に丸める）
    pub fn drag_by(&mut self, id: &str, origin: (f64, f64), delta: (f64, f64)) -> Option<(f64, f64)> {
        let x = (origin.0 + delta.0).round();
        let y = (origin.1 + delta.1).round();
        (self.move_to(id, x, y) > 0).then_some((x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<PositionEntry> {
        serde_json::from_str(
            r#"[
                {"RoomID": "4101", "x": 10, "y": 20},
                {"text": "4102", "x": 30, "y": 40},
                {"RoomID": "4103", "x": 50},
                {"x": 1, "y": 1},
                {"RoomID": "4101", "x": 11, "y": 21}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_from_entries_filters_incomplete() {
        let overlay = TagOverlay::from_entries("4", &entries());
        assert_eq!(overlay.floor(), "4");
        assert_eq!(overlay.len(), 3);
        let ids: Vec<_> = overlay.tags().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["4101", "4102", "4101"]);
    }

    #[test]
    fn test_null_coordinate_placed_at_zero() {
        let entries: Vec<PositionEntry> =
            serde_json::from_str(r#"[{"RoomID": "4104", "x": null, "y": 12}]"#).unwrap();
        let overlay = TagOverlay::from_entries("4", &entries);
        assert_eq!(overlay.get("4104"), Some(&Tag { id: "4104".into(), x: 0.0, y: 12.0 }));
    }

    #[test]
    fn test_move_to_moves_all_matching() {
        let mut overlay = TagOverlay::from_entries("4", &entries());
        assert_eq!(overlay.move_to("4101", 99.0, 98.0), 2);
        assert!(overlay
            .tags()
            .iter()
            .filter(|t| t.id == "4101")
            .all(|t| t.x == 99.0 && t.y == 98.0));
        assert_eq!(overlay.move_to("missing", 0.0, 0.0), 0);
    }

    #[test]
    fn test_drag_by_rounds() {
        let mut overlay = TagOverlay::from_entries("4", &entries());
        let moved = overlay.drag_by("4102", (30.0, 40.0), (4.4, -2.6));
        assert_eq!(moved, Some((34.0, 37.0)));
        assert_eq!(overlay.get("4102").unwrap().x, 34.0);

        assert_eq!(overlay.drag_by("missing", (0.0, 0.0), (1.0, 1.0)), None);
    }
}
