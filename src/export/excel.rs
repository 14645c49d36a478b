//! Excel生成
//!
//! 「Assignments」「ChangeLog」の2シートを出力する。

use super::Report;
use crate::clock::format_timestamp;
use crate::error::{FloorAssignError, Result};
use rust_xlsxwriter::*;
use std::path::Path;

const ASSIGNMENT_HEADERS: [&str; 6] = ["Slot", "Occupant", "Slot Name", "Occupant Name", "Department", "Area"];
const CHANGE_LOG_HEADERS: [&str; 3] = ["Timestamp", "From Room", "To Room"];

fn xlsx_err(context: &str) -> impl Fn(XlsxError) -> FloorAssignError + '_ {
    move |e| FloorAssignError::ExcelGeneration(format!("{}: {}", context, e))
}

pub fn generate_excel(report: &Report, output_path: &Path) -> Result<()> {
    let buffer = generate_excel_buffer(report)?;
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(output_path, buffer)?;
    Ok(())
}

pub fn generate_excel_buffer(report: &Report) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA));

    let conflict_format = Format::new().set_font_color(Color::RGB(0xC00000));

    let conflicted: std::collections::HashSet<&str> = report
        .conflicts
        .iter()
        .flat_map(|c| c.slots.iter().map(|s| s.as_str()))
        .collect();

    // 割り当て
    let sheet = workbook.add_worksheet();
    sheet.set_name("Assignments").map_err(xlsx_err("シート名設定エラー"))?;
    for (col, header) in ASSIGNMENT_HEADERS.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(xlsx_err("見出し書き込みエラー"))?;
        sheet
            .set_column_width(col as u16, if col < 2 { 10 } else { 24 })
            .map_err(xlsx_err("列幅設定エラー"))?;
    }

    for (idx, row) in report.assignments.iter().enumerate() {
        let r = (idx + 1) as u32;
        let values = [
            &row.slot,
            &row.occupant,
            &row.slot_name,
            &row.occupant_name,
            &row.department,
        ];
        for (col, value) in values.iter().enumerate() {
            if conflicted.contains(row.slot.as_str()) {
                sheet
                    .write_string_with_format(r, col as u16, value.as_str(), &conflict_format)
                    .map_err(xlsx_err("セル書き込みエラー"))?;
            } else {
                sheet
                    .write_string(r, col as u16, value.as_str())
                    .map_err(xlsx_err("セル書き込みエラー"))?;
            }
        }
        if let Some(area) = row.room_area {
            sheet
                .write_number(r, 5, area)
                .map_err(xlsx_err("セル書き込みエラー"))?;
        }
    }

    // 変更履歴
    let sheet = workbook.add_worksheet();
    sheet.set_name("ChangeLog").map_err(xlsx_err("シート名設定エラー"))?;
    for (col, header) in CHANGE_LOG_HEADERS.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(xlsx_err("見出し書き込みエラー"))?;
        sheet
            .set_column_width(col as u16, 22)
            .map_err(xlsx_err("列幅設定エラー"))?;
    }

    for (idx, entry) in report.change_log.iter().enumerate() {
        let r = (idx + 1) as u32;
        sheet
            .write_string(r, 0, format_timestamp(entry.timestamp))
            .map_err(xlsx_err("セル書き込みエラー"))?;
        sheet
            .write_string(r, 1, entry.from.as_str())
            .map_err(xlsx_err("セル書き込みエラー"))?;
        sheet
            .write_string(r, 2, entry.to.as_str())
            .map_err(xlsx_err("セル書き込みエラー"))?;
    }

    workbook
        .save_to_buffer()
        .map_err(xlsx_err("Excel保存エラー"))
}
