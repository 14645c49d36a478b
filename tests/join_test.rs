//! 部屋データ結合の統合テスト

use floor_assign::join;
use floor_assign_common::{PositionEntry, RoomMappingEntry};
use rust_xlsxwriter::Workbook;
use tempfile::tempdir;

const OFFICES_CSV: &str = "\u{feff}Room ID,Room Name,OrgType Name,Room Area\n\
    3525,Dean Office,Administration,\"1,220\"\n\
    4101,Lab,Research,300\n";

const TEXTS: &str = r#"{
    "UNH-3 11x17.svg": [{"text": "3525", "x": 10, "y": 20}, {"text": "EXIT", "x": 0, "y": 0}],
    "UNH-4 11x17.svg": [{"text": "4101", "x": 1, "y": 2}]
}"#;

#[test]
fn test_read_offices_csv_with_header_aliases() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("offices.csv");
    std::fs::write(&path, OFFICES_CSV).unwrap();

    let offices = join::read_offices(&path).unwrap();
    assert_eq!(offices.len(), 2);
    let dean = offices.get("3525").unwrap();
    assert_eq!(dean.room_name, "Dean Office");
    assert_eq!(dean.room_area, Some(1220.0));
}

#[test]
fn test_read_offices_xlsx() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("offices.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, header) in ["RoomID", "RoomName", "OrgTypeName", "RoomArea"].iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    sheet.write_number(1, 0, 3525).unwrap();
    sheet.write_string(1, 1, "Dean Office").unwrap();
    sheet.write_string(1, 2, "Administration").unwrap();
    sheet.write_number(1, 3, 220.5).unwrap();
    workbook.save(&path).unwrap();

    let offices = join::read_offices(&path).unwrap();
    let dean = offices.get("3525").unwrap();
    assert_eq!(dean.org_type_name, "Administration");
    assert_eq!(dean.room_area, Some(220.5));
}

#[test]
fn test_read_offices_missing_file() {
    let err = join::read_offices(std::path::Path::new("/nonexistent/offices.csv")).unwrap_err();
    assert!(matches!(err, floor_assign::error::FloorAssignError::FileNotFound(_)));
}

#[test]
fn test_write_room_mappings_per_floor() {
    let dir = tempdir().expect("Failed to create temp dir");
    let offices_path = dir.path().join("offices.csv");
    std::fs::write(&offices_path, OFFICES_CSV).unwrap();
    let texts_path = dir.path().join("texts.json");
    std::fs::write(&texts_path, TEXTS).unwrap();

    let sets = join::read_position_sets(&texts_path).unwrap();
    let offices = join::read_offices(&offices_path).unwrap();
    let out = dir.path().join("public");

    let written = join::write_room_mappings(&sets, &offices, &out, None).unwrap();
    assert_eq!(written, vec![out.join("room-mapping-3.json"), out.join("room-mapping-4.json")]);

    let floor3: Vec<RoomMappingEntry> =
        serde_json::from_str(&std::fs::read_to_string(&written[0]).unwrap()).unwrap();
    assert_eq!(floor3.len(), 1);
    assert_eq!(floor3[0].room_id, "3525");
    assert_eq!(floor3[0].anchor(), (10.0, 20.0));
    assert_eq!(floor3[0].metadata_str("RoomName"), Some("Dean Office"));
}

#[test]
fn test_write_room_mappings_plain_list_needs_floor() {
    let dir = tempdir().expect("Failed to create temp dir");
    let offices_path = dir.path().join("offices.csv");
    std::fs::write(&offices_path, OFFICES_CSV).unwrap();
    let offices = join::read_offices(&offices_path).unwrap();
    let sets = join::parse_position_sets(r#"[{"text": "4101", "x": 1, "y": 2}]"#).unwrap();

    let skipped = join::write_room_mappings(&sets, &offices, dir.path(), None).unwrap();
    assert!(skipped.is_empty());

    let written = join::write_room_mappings(&sets, &offices, dir.path(), Some("4")).unwrap();
    assert_eq!(written, vec![dir.path().join("room-mapping-4.json")]);
}

#[test]
fn test_write_merged_keeps_shape() {
    let dir = tempdir().expect("Failed to create temp dir");
    let offices_path = dir.path().join("offices.csv");
    std::fs::write(&offices_path, OFFICES_CSV).unwrap();
    let offices = join::read_offices(&offices_path).unwrap();

    let keyed = join::merge_positions(&join::parse_position_sets(TEXTS).unwrap(), &offices);
    let keyed_path = dir.path().join("merged_room_data.json");
    join::write_merged(&keyed, &keyed_path).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&keyed_path).unwrap()).unwrap();
    assert_eq!(value["UNH-3 11x17.svg"][0]["RoomID"], "3525");
    assert_eq!(value["UNH-3 11x17.svg"][0]["OrgTypeName"], "Administration");

    let plain = join::merge_positions(
        &join::parse_position_sets(r#"[{"text": "4101", "x": 1, "y": 2}]"#).unwrap(),
        &offices,
    );
    let plain_path = dir.path().join("plain.json");
    join::write_merged(&plain, &plain_path).unwrap();
    let list: Vec<PositionEntry> =
        serde_json::from_str(&std::fs::read_to_string(&plain_path).unwrap()).unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].id(), Some("4101"));
}
