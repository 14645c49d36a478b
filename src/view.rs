//! 端末表示

use crate::clock::format_timestamp;
use crate::loader::FloorData;
use floor_assign_common::{AssignmentMap, ChangeLog, OfficeFilter, RoomMappingEntry};

/// 部屋1件の表示文字列
///
/// 例: `3525  Dean Office / Administration / 220 sq ft  ← 3526`
pub fn room_label(room: &RoomMappingEntry, data: &FloorData, assignments: &AssignmentMap) -> String {
    let office = data.offices.get(&room.room_id);

    let name = office
        .map(|o| o.display_name().to_string())
        .or_else(|| room.metadata_str("RoomName").map(|s| s.to_string()))
        .unwrap_or_else(|| "Unknown Room".to_string());
    let dept = office
        .map(|o| o.org_type_name.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("No Department");
    let area = office
        .and_then(|o| o.room_area)
        .map(|a| format!("{} sq ft", a))
        .unwrap_or_else(|| "N/A".to_string());

    let mut label = format!("{}  {} / {} / {}", room.room_id, name, dept, area);
    if let Some(occupant) = assignments.get(&room.room_id) {
        label.push_str(&format!("  ← {}", occupant));
    }
    label
}

/// 選択肢にする部屋ID（部屋マッピング優先、無ければ位置データ）
pub fn room_ids(data: &FloorData) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let from_mapping: Vec<String> = data
        .room_mapping
        .iter()
        .map(|r| r.room_id.clone())
        .filter(|id| !id.is_empty() && seen.insert(id.clone()))
        .collect();
    if !from_mapping.is_empty() {
        return from_mapping;
    }

    data.positions
        .iter()
        .filter_map(|p| p.id())
        .map(|id| id.to_string())
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// フロアの概要を表示
pub fn print_floor(data: &FloorData, assignments: &AssignmentMap, filter: &OfficeFilter) {
    println!("🏢 フロア {}", data.floor);

    for error in data.errors() {
        println!("⚠ {}", error);
    }

    let departments = data.offices.departments();
    if !departments.is_empty() {
        println!("  部署: {}", departments.join(", "));
    }
    let usages = data.offices.usage_types();
    if !usages.is_empty() {
        println!("  用途: {}", usages.join(", "));
    }

    let filtering = filter.department.is_some() || filter.usage.is_some();
    let allowed: std::collections::HashSet<&str> = data
        .offices
        .filter(filter)
        .into_iter()
        .map(|o| o.room_id.as_str())
        .collect();

    println!("---");
    let mut shown = 0;
    for room in &data.room_mapping {
        if filtering && !allowed.contains(room.room_id.as_str()) {
            continue;
        }
        let (x, y) = room.anchor();
        println!("  {}  @({}, {})", room_label(room, data, assignments), x, y);
        shown += 1;
    }
    println!("---");
    println!(
        "部屋: {}件表示 / 事務室: {}件 / タグ: {}件",
        shown,
        data.offices.len(),
        data.overlay().len()
    );
}

/// 割り当て一覧を表示
pub fn print_assignments(assignments: &AssignmentMap) {
    if assignments.is_empty() {
        println!("割り当ての変更はありません");
        return;
    }

    println!("割り当て（部屋 ← 入居元）:");
    for (slot, occupant) in assignments.iter() {
        println!("  {} ← {}", slot, occupant);
    }

    let conflicts = assignments.conflicts();
    if !conflicts.is_empty() {
        println!("⚠ 同じ入居元を複数の部屋が指しています:");
        for conflict in conflicts {
            println!("  {}: {}", conflict.occupant, conflict.slots.join(", "));
        }
    }
}

/// 変更履歴を表示（新しい順）
pub fn print_change_log(change_log: &ChangeLog, limit: usize) {
    if change_log.is_empty() {
        println!("変更履歴はまだありません");
        return;
    }

    println!("変更履歴（{}件中、新しい順に最大{}件）:", change_log.len(), limit);
    println!("  {:<20} {:<14} {:<14}", "日時", "移動元", "移動先");
    for entry in change_log.recent(limit) {
        println!(
            "  {:<20} {:<14} {:<14}",
            format_timestamp(entry.timestamp),
            entry.from,
            entry.to
        );
    }
}
