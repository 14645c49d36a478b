pub mod excel;

use crate::error::Result;
use floor_assign_common::{AssignmentMap, ChangeLog, ChangeLogEntry, OfficeDirectory};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Excel,
    #[default]
    Both,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "both" => Ok(ExportFormat::Both),
            _ => Err(format!("Unknown format: {}. Use json, excel, or both", s)),
        }
    }
}

/// 割り当て1行（スロットと入居者を事務室データで補完）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRow {
    pub slot: String,
    pub occupant: String,
    pub slot_name: String,
    pub occupant_name: String,
    /// 入居者の部署
    pub department: String,
    /// スロット（部屋）の面積
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_area: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConflictRow {
    pub occupant: String,
    pub slots: Vec<String>,
}

/// 出力レポート
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub title: String,
    pub floor: String,
    pub generated_at: i64,
    pub assignments: Vec<AssignmentRow>,
    pub conflicts: Vec<ConflictRow>,
    pub change_log: Vec<ChangeLogEntry>,
}

impl Report {
    pub fn build(
        title: &str,
        floor: &str,
        assignments: &AssignmentMap,
        change_log: &ChangeLog,
        offices: &OfficeDirectory,
        generated_at: i64,
    ) -> Self {
        let rows = assignments
            .iter()
            .map(|(slot, occupant)| {
                let slot_office = offices.get(slot);
                let occupant_office = offices.get(occupant);
                AssignmentRow {
                    slot: slot.to_string(),
                    occupant: occupant.to_string(),
                    slot_name: slot_office.map(|o| o.room_name.clone()).unwrap_or_default(),
                    occupant_name: occupant_office.map(|o| o.room_name.clone()).unwrap_or_default(),
                    department: occupant_office
                        .map(|o| o.org_type_name.clone())
                        .unwrap_or_default(),
                    room_area: slot_office.and_then(|o| o.room_area),
                }
            })
            .collect();

        let conflicts = assignments
            .conflicts()
            .into_iter()
            .map(|c| ConflictRow {
                occupant: c.occupant,
                slots: c.slots,
            })
            .collect();

        Self {
            title: title.to_string(),
            floor: floor.to_string(),
            generated_at,
            assignments: rows,
            conflicts,
            change_log: change_log.entries().to_vec(),
        }
    }
}

fn output_path_for_format(output: &Path, title: &str, extension: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(format!("{}.{}", title, extension))
    } else {
        output.with_extension(extension)
    }
}

pub fn write_json(report: &Report, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(output_path, json)?;
    Ok(())
}

/// レポートを出力し、書き出したファイルを返す
pub fn export_report(report: &Report, format: &ExportFormat, output: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    if matches!(format, ExportFormat::Json | ExportFormat::Both) {
        let path = output_path_for_format(output, &report.title, "json");
        println!("- JSONを生成中...");
        write_json(report, &path)?;
        println!("✔ JSON出力: {}", path.display());
        written.push(path);
    }

    if matches!(format, ExportFormat::Excel | ExportFormat::Both) {
        let path = output_path_for_format(output, &report.title, "xlsx");
        println!("- Excelを生成中...");
        excel::generate_excel(report, &path)?;
        println!("✔ Excel出力: {}", path.display());
        written.push(path);
    }

    Ok(written)
}
