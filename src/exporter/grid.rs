// ==========================================
// FFCS 课表规划器 - 网格模型
// ==========================================
// 结构: 理论/实验两行表头（含午休标记） + 每天一行理论、一行实验
// 单元: 时段代码、显示代码、时间标签、分配、置灰标记
// ==========================================

use serde::Serialize;
use std::collections::BTreeSet;

use crate::domain::timetable::SlotAssignment;
use crate::domain::types::{Day, SlotCode, SlotKind};
use crate::engine::assignment_store::AssignmentStore;
use crate::engine::error::CatalogResult;

/// 表头
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridHeader {
    pub kind: SlotKind,
    pub time_labels: Vec<String>,
    /// 午休位于该列之前
    pub lunch_before_column: usize,
}

/// 网格单元
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    pub column: usize,
    pub code: Option<SlotCode>,
    pub display_code: Option<String>,
    pub time_label: String,
    pub assignment: Option<SlotAssignment>,
    /// 未分配且与当前分配冲突
    pub disabled: bool,
}

impl GridCell {
    /// 单元格文本: "显示代码" 或 "显示代码 - 课程代码"
    pub fn text(&self) -> String {
        match (&self.display_code, &self.assignment) {
            (Some(code), Some(a)) => format!("{} - {}", code, a.course_code),
            (Some(code), None) => code.clone(),
            (None, _) => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRow {
    pub day: Day,
    pub kind: SlotKind,
    pub cells: Vec<GridCell>,
}

/// 图例（每门课程一条）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendEntry {
    pub course_code: String,
    pub course_name: String,
    pub professor_name: String,
    pub color_tag: String,
    pub slots: Vec<SlotCode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableGrid {
    pub theory_header: GridHeader,
    pub lab_header: GridHeader,
    pub rows: Vec<GridRow>,
    pub legend: Vec<LegendEntry>,
}

impl TimetableGrid {
    pub fn header(&self, kind: SlotKind) -> &GridHeader {
        match kind {
            SlotKind::Theory => &self.theory_header,
            SlotKind::Lab => &self.lab_header,
        }
    }

    pub fn assigned_cell_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|r| r.cells.iter())
            .filter(|c| c.assignment.is_some())
            .count()
    }
}

// ==========================================
// GridExporter - 网格构建器
// ==========================================
pub struct GridExporter<'s, 'a> {
    store: &'s AssignmentStore<'a>,
}

impl<'s, 'a> GridExporter<'s, 'a> {
    pub fn new(store: &'s AssignmentStore<'a>) -> Self {
        Self { store }
    }

    /// 构建网格
    ///
    /// # 参数
    /// - clashing: 需要置灰的时段代码（通常为冲突检测结果）
    pub fn build(&self, clashing: &BTreeSet<SlotCode>) -> CatalogResult<TimetableGrid> {
        let catalog = self.store.catalog();
        let theory_header = self.header(SlotKind::Theory)?;
        let lab_header = self.header(SlotKind::Lab)?;

        let mut rows = Vec::new();
        for day in catalog.days() {
            for kind in [SlotKind::Theory, SlotKind::Lab] {
                let mut cells = Vec::with_capacity(catalog.column_count(kind));
                for column in 0..catalog.column_count(kind) {
                    let code = catalog.lookup(day, kind, column)?;
                    let time_label = catalog.time_range_of(kind, column)?.label();
                    cells.push(self.cell(column, code, time_label, clashing));
                }
                rows.push(GridRow { day, kind, cells });
            }
        }

        let legend = self
            .store
            .courses()
            .iter()
            .map(|c| LegendEntry {
                course_code: c.code.clone(),
                course_name: c.name.clone(),
                professor_name: c.professor.clone(),
                color_tag: c.color.clone(),
                slots: c.slots.clone(),
            })
            .collect();

        Ok(TimetableGrid {
            theory_header,
            lab_header,
            rows,
            legend,
        })
    }

    fn header(&self, kind: SlotKind) -> CatalogResult<GridHeader> {
        let catalog = self.store.catalog();
        let time_labels = (0..catalog.column_count(kind))
            .map(|column| catalog.time_range_of(kind, column).map(|r| r.label()))
            .collect::<CatalogResult<Vec<_>>>()?;
        Ok(GridHeader {
            kind,
            time_labels,
            lunch_before_column: catalog.morning_columns(kind),
        })
    }

    fn cell(
        &self,
        column: usize,
        code: Option<&str>,
        time_label: String,
        clashing: &BTreeSet<SlotCode>,
    ) -> GridCell {
        let Some(code) = code else {
            return GridCell {
                column,
                code: None,
                display_code: None,
                time_label,
                assignment: None,
                disabled: false,
            };
        };

        let display_code = self.store.resolve_display(code);
        let assignment = self
            .store
            .get_assignment(code)
            .or_else(|| self.store.get_assignment(&display_code))
            .cloned();
        let disabled = assignment.is_none() && clashing.contains(code);

        GridCell {
            column,
            code: Some(code.to_string()),
            display_code: Some(display_code),
            time_label,
            assignment,
            disabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assignment_store::AssignRequest;
    use crate::engine::catalog::SlotCatalog;
    use crate::engine::equivalence::{EquivalenceResolver, EquivalenceTable};

    fn store() -> AssignmentStore<'static> {
        let resolver =
            EquivalenceResolver::new(SlotCatalog::standard(), EquivalenceTable::independent_v3()).unwrap();
        AssignmentStore::new(resolver, Vec::new())
    }

    #[test]
    fn test_grid_shape() {
        let store = store();
        let grid = GridExporter::new(&store).build(&BTreeSet::new()).unwrap();
        assert_eq!(grid.rows.len(), 12);
        assert_eq!(grid.theory_header.time_labels.len(), 10);
        assert_eq!(grid.lab_header.time_labels[0], "08:00-09:40");
        assert_eq!(grid.header(SlotKind::Theory).lunch_before_column, 5);
        assert_eq!(grid.rows[0].day, Day::Mon);
        assert_eq!(grid.rows[1].kind, SlotKind::Lab);
        assert!(grid.rows[0].cells[0].code.is_none());
        assert_eq!(grid.assigned_cell_count(), 0);
    }

    #[test]
    fn test_grid_cells_reflect_store() {
        let mut store = store();
        let request = AssignRequest {
            course_code: "CSE1001".to_string(),
            course_name: "Problem Solving".to_string(),
            professor_name: "Dr. Rao".to_string(),
            color: None,
        };
        store.assign("E1", &request).unwrap();
        store.set_slot_preference("A1/SE2", "SE2").unwrap();

        let clashing: BTreeSet<SlotCode> = ["TB1".to_string()].into_iter().collect();
        let grid = GridExporter::new(&store).build(&clashing).unwrap();

        // MON 理论 E1 出现两次,FRI 一次
        assert_eq!(grid.assigned_cell_count(), 3);
        let mon_theory = &grid.rows[0];
        assert_eq!(mon_theory.cells[3].text(), "E1 - CSE1001");
        assert!(mon_theory.cells[2].disabled);

        let tue_theory = &grid.rows[2];
        assert_eq!(tue_theory.cells[1].display_code.as_deref(), Some("SE2"));
        assert_eq!(grid.legend.len(), 1);
        assert_eq!(grid.legend[0].slots, vec!["E1"]);
    }
}
