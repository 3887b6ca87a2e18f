// ==========================================
// FFCS 课表规划器 - 纯文本导出
// ==========================================

use crate::domain::types::SlotKind;
use crate::exporter::grid::TimetableGrid;

const DAY_WIDTH: usize = 4;

/// 网格转为等宽纯文本（每列宽度取该列最长文本）
pub fn grid_to_text(grid: &TimetableGrid) -> String {
    let mut out = String::new();

    for kind in [SlotKind::Theory, SlotKind::Lab] {
        let header = grid.header(kind);
        let rows: Vec<_> = grid.rows.iter().filter(|r| r.kind == kind).collect();

        let widths: Vec<usize> = header
            .time_labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                rows.iter()
                    .filter_map(|r| r.cells.get(i))
                    .map(|c| c.text().chars().count())
                    .chain(std::iter::once(label.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        out.push_str(&format!("[{}]\n", kind.as_str().to_uppercase()));
        let mut line = format!("{:<w$}", "", w = DAY_WIDTH);
        for (i, label) in header.time_labels.iter().enumerate() {
            if i == header.lunch_before_column {
                line.push_str(" | LUNCH");
            }
            line.push_str(&format!(" | {:<w$}", label, w = widths[i]));
        }
        out.push_str(line.trim_end());
        out.push('\n');

        for row in rows {
            let mut line = format!("{:<w$}", row.day.as_str(), w = DAY_WIDTH);
            for (i, cell) in row.cells.iter().enumerate() {
                if i == header.lunch_before_column {
                    line.push_str(" |      ");
                }
                line.push_str(&format!(" | {:<w$}", cell.text(), w = widths[i]));
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out.push('\n');
    }

    for entry in &grid.legend {
        out.push_str(&format!(
            "{} {} ({}) {} [{}]\n",
            entry.course_code,
            entry.course_name,
            entry.professor_name,
            entry.color_tag,
            entry.slots.join(", ")
        ));
    }
    out
}
