// ==========================================
// FFCS 课表规划器 - CSV 导出
// ==========================================
// 格式: 两行表头（THEORY / LAB 时间标签）→ 每天理论行与实验行 → 课程图例
// 午休列以 LUNCH 占位;理论与实验列数不同,行宽可变
// ==========================================

use csv::{Writer, WriterBuilder};
use std::io::Write;
use std::path::Path;

use crate::exporter::error::{ExportError, ExportResult};
use crate::exporter::grid::{GridHeader, GridRow, TimetableGrid};

const LUNCH_MARKER: &str = "LUNCH";

fn with_lunch(values: Vec<String>, lunch_before_column: usize) -> Vec<String> {
    let mut out = Vec::with_capacity(values.len() + 1);
    for (i, v) in values.into_iter().enumerate() {
        if i == lunch_before_column {
            out.push(LUNCH_MARKER.to_string());
        }
        out.push(v);
    }
    out
}

fn header_record(header: &GridHeader) -> Vec<String> {
    let mut record = vec![String::new(), header.kind.as_str().to_uppercase()];
    record.extend(with_lunch(header.time_labels.clone(), header.lunch_before_column));
    record
}

fn row_record(row: &GridRow, header: &GridHeader) -> Vec<String> {
    let mut record = vec![row.day.to_string(), row.kind.as_str().to_uppercase()];
    let texts = row.cells.iter().map(|c| c.text()).collect();
    record.extend(with_lunch(texts, header.lunch_before_column));
    record
}

fn write_grid<W: Write>(writer: &mut Writer<W>, grid: &TimetableGrid) -> ExportResult<()> {
    writer.write_record(header_record(&grid.theory_header))?;
    writer.write_record(header_record(&grid.lab_header))?;
    for row in &grid.rows {
        writer.write_record(row_record(row, grid.header(row.kind)))?;
    }

    if !grid.legend.is_empty() {
        writer.write_record(["COURSE", "NAME", "PROFESSOR", "COLOR", "SLOTS"])?;
        for entry in &grid.legend {
            writer.write_record([
                entry.course_code.as_str(),
                entry.course_name.as_str(),
                entry.professor_name.as_str(),
                entry.color_tag.as_str(),
                entry.slots.join(" ").as_str(),
            ])?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// 网格转为 CSV 文本
pub fn grid_to_csv(grid: &TimetableGrid) -> ExportResult<String> {
    let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());
    write_grid(&mut writer, grid)?;
    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Encoding(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ExportError::Encoding(e.to_string()))
}

/// 网格写入 CSV 文件
pub fn write_grid_csv(grid: &TimetableGrid, path: &Path) -> ExportResult<()> {
    let mut writer = WriterBuilder::new().flexible(true).from_path(path)?;
    write_grid(&mut writer, grid)?;
    tracing::info!(path = %path.display(), rows = grid.rows.len(), "课表网格已导出");
    Ok(())
}
