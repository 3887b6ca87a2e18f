// ==========================================
// FFCS 课表规划器 - 时段目录
// ==========================================
// 数据: Freshers Winter Semester 2025-26 时段表
// 理论课: 上午 5 列 + 下午 5 列（第 4、5 列之间为午休）
// 实验课: 上午 3 列 + 下午 3 列（均为连排,如 L61+L62）
// ==========================================
// 红线: 目录为进程级静态数据,运行期不可变
// 红线: 列索引越界属于编程错误,返回 ColumnOutOfRange
// ==========================================

use std::collections::{BTreeSet, HashSet};
use std::sync::OnceLock;

use crate::domain::types::{alternative_parts, Day, SlotCode, SlotKind, SlotOccurrence, TimeRange};
use crate::engine::error::{CatalogError, CatalogResult};

// ==========================================
// 标准数据表
// ==========================================

const THEORY_TIME_RANGES: [TimeRange; 10] = [
    TimeRange::new(480, 530),   // 08:00-08:50
    TimeRange::new(540, 590),   // 09:00-09:50
    TimeRange::new(600, 650),   // 10:00-10:50
    TimeRange::new(660, 710),   // 11:00-11:50
    TimeRange::new(720, 770),   // 12:00-12:50
    TimeRange::new(840, 890),   // 14:00-14:50
    TimeRange::new(900, 950),   // 15:00-15:50
    TimeRange::new(960, 1010),  // 16:00-16:50
    TimeRange::new(1020, 1070), // 17:00-17:50
    TimeRange::new(1080, 1130), // 18:00-18:50
];

const LAB_TIME_RANGES: [TimeRange; 6] = [
    TimeRange::new(480, 580),   // 08:00-09:40
    TimeRange::new(590, 690),   // 09:50-11:30
    TimeRange::new(700, 790),   // 11:40-13:10
    TimeRange::new(840, 940),   // 14:00-15:40
    TimeRange::new(950, 1050),  // 15:50-17:30
    TimeRange::new(1060, 1150), // 17:40-19:10
];

const THEORY_MORNING_COLUMNS: usize = 5;
const LAB_MORNING_COLUMNS: usize = 3;

type StandardRow = (Day, [Option<&'static str>; 10], [&'static str; 6]);

// G1、G2 时段已取消
const STANDARD_LAYOUT: [StandardRow; 6] = [
    (
        Day::Mon,
        [None, Some("TA1"), Some("TB1"), Some("E1"), Some("E1"), Some("TA2"), Some("TB2"), Some("E2"), Some("E2"), None],
        ["L61+L62", "L63+L64", "L65+L66", "L67+L68", "L69+L70", "L71+L72"],
    ),
    (
        Day::Tue,
        [Some("TFF1"), Some("A1/SE2"), Some("B1/SD2"), Some("C1"), Some("D1"), Some("F2"), Some("A2/SF1"), Some("B2/SC1"), Some("C2"), Some("TDD2")],
        ["L1+L2", "L3+L4", "L5+L6", "L31+L32", "L33+L34", "L35+L36"],
    ),
    (
        Day::Wed,
        [Some("TEE1"), Some("D1"), Some("F1"), Some("TE1"), Some("B1/SC2"), Some("D2"), Some("F2"), Some("B2/SD1"), Some("TE2"), None],
        ["L7+L8", "L9+L10", "L11+L12", "L37+L38", "L39+L40", "L41+L42"],
    ),
    (
        Day::Thu,
        [None, Some("C1"), Some("D1"), Some("A1/SB2"), Some("F1"), Some("E2"), Some("C2"), Some("A2/SB1"), Some("D2"), Some("TFF2")],
        ["L13+L14", "L15+L16", "L17+L18", "L43+L44", "L45+L46", "L47+L48"],
    ),
    (
        Day::Fri,
        [Some("TDD1"), Some("B1/SA2"), Some("A1/SF2"), Some("TF1"), Some("E1"), Some("TC2"), Some("B2/SA1"), Some("A2/SE1"), Some("TF2"), Some("TEE2")],
        ["L19+L20", "L21+L22", "L23+L24", "L49+L50", "L51+L52", "L53+L54"],
    ),
    (
        Day::Sat,
        [None, Some("TC1"), Some("C1"), Some("F1"), Some("TD1"), Some("TD2"), Some("D2"), Some("F2"), Some("C2"), None],
        ["L25+L26", "L27+L28", "L29+L30", "L55+L56", "L57+L58", "L59+L60"],
    ),
];

/// 侧边栏理论课时段列表（顺序即显示顺序）
const ALL_THEORY_SLOTS: [&str; 39] = [
    "A1", "A2", "B1", "B2", "C1", "C2", "D1", "D2", "E1", "E2", "F1", "F2",
    "TA1", "TA2", "TB1", "TB2", "TC1", "TC2",
    "TD1", "TDD1", "TE1", "TE2", "TEE2", "TF1", "TF2", "TFF1", "TFF2",
    "SA1", "SA2", "SB1", "SB2", "SC1", "SC2", "SD1", "SD2", "SE1", "SE2", "SF1", "SF2",
];

/// 侧边栏实验课时段列表（L1+L2 .. L71+L72）
fn standard_lab_slots() -> Vec<SlotCode> {
    (0..36)
        .map(|i| format!("L{}+L{}", 2 * i + 1, 2 * i + 2))
        .collect()
}

// ==========================================
// DayLayout - 单日布局
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayLayout {
    pub day: Day,
    pub theory: Vec<Option<SlotCode>>,
    pub lab: Vec<Option<SlotCode>>,
}

impl DayLayout {
    fn row(&self, kind: SlotKind) -> &[Option<SlotCode>] {
        match kind {
            SlotKind::Theory => &self.theory,
            SlotKind::Lab => &self.lab,
        }
    }
}

/// 网格单元（带位置的时段代码）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogCell<'a> {
    pub occurrence: SlotOccurrence,
    pub code: &'a str,
}

// ==========================================
// SlotCatalog - 时段目录
// ==========================================
#[derive(Debug, Clone)]
pub struct SlotCatalog {
    days: Vec<DayLayout>,
    theory_ranges: Vec<TimeRange>,
    lab_ranges: Vec<TimeRange>,
    theory_morning_columns: usize,
    lab_morning_columns: usize,
    theory_codes: Vec<SlotCode>,
    lab_codes: Vec<SlotCode>,
    recognized: HashSet<SlotCode>,
}

impl SlotCatalog {
    /// 标准目录（进程级单例）
    pub fn standard() -> &'static SlotCatalog {
        static STANDARD: OnceLock<SlotCatalog> = OnceLock::new();
        STANDARD.get_or_init(build_standard)
    }

    /// 从自定义布局构建目录（构建时校验）
    ///
    /// # 参数
    /// - days: 每日布局
    /// - theory_ranges / lab_ranges: 每列时间区间
    /// - theory_codes / lab_codes: 侧边栏时段列表
    ///
    /// # 返回
    /// - Err(CatalogError::InvalidLayout): 行宽与时间区间数不一致、星期重复、区间非法等
    pub fn from_layout(
        days: Vec<DayLayout>,
        theory_ranges: Vec<TimeRange>,
        lab_ranges: Vec<TimeRange>,
        theory_codes: Vec<SlotCode>,
        lab_codes: Vec<SlotCode>,
    ) -> CatalogResult<Self> {
        let theory_morning_columns = THEORY_MORNING_COLUMNS.min(theory_ranges.len());
        let lab_morning_columns = LAB_MORNING_COLUMNS.min(lab_ranges.len());
        let catalog = Self::assemble(
            days,
            theory_ranges,
            lab_ranges,
            theory_morning_columns,
            lab_morning_columns,
            theory_codes,
            lab_codes,
        );
        catalog.validate()?;
        Ok(catalog)
    }

    fn assemble(
        days: Vec<DayLayout>,
        theory_ranges: Vec<TimeRange>,
        lab_ranges: Vec<TimeRange>,
        theory_morning_columns: usize,
        lab_morning_columns: usize,
        theory_codes: Vec<SlotCode>,
        lab_codes: Vec<SlotCode>,
    ) -> Self {
        let mut recognized: HashSet<SlotCode> = HashSet::new();
        recognized.extend(theory_codes.iter().cloned());
        recognized.extend(lab_codes.iter().cloned());
        for layout in &days {
            for code in layout.theory.iter().chain(layout.lab.iter()).flatten() {
                recognized.insert(code.clone());
                for part in alternative_parts(code) {
                    recognized.insert(part.to_string());
                }
            }
        }

        Self {
            days,
            theory_ranges,
            lab_ranges,
            theory_morning_columns,
            lab_morning_columns,
            theory_codes,
            lab_codes,
            recognized,
        }
    }

    /// 校验目录一致性
    pub fn validate(&self) -> CatalogResult<()> {
        let mut seen_days = HashSet::new();
        for layout in &self.days {
            if !seen_days.insert(layout.day) {
                return Err(CatalogError::InvalidLayout(format!(
                    "星期重复: {}",
                    layout.day
                )));
            }
            for kind in [SlotKind::Theory, SlotKind::Lab] {
                let expected = self.ranges(kind).len();
                let actual = layout.row(kind).len();
                if actual != expected {
                    return Err(CatalogError::InvalidLayout(format!(
                        "{} {} 行宽 {} 与时间区间数 {} 不一致",
                        layout.day, kind, actual, expected
                    )));
                }
                for code in layout.row(kind).iter().flatten() {
                    if code.trim().is_empty() || alternative_parts(code).is_empty() {
                        return Err(CatalogError::InvalidLayout(format!(
                            "{} {} 存在空白时段代码",
                            layout.day, kind
                        )));
                    }
                }
            }
        }

        for kind in [SlotKind::Theory, SlotKind::Lab] {
            for range in self.ranges(kind) {
                if range.start_min >= range.end_min {
                    return Err(CatalogError::InvalidLayout(format!(
                        "{} 时间区间非法: {}",
                        kind, range
                    )));
                }
            }
        }

        Ok(())
    }

    fn ranges(&self, kind: SlotKind) -> &[TimeRange] {
        match kind {
            SlotKind::Theory => &self.theory_ranges,
            SlotKind::Lab => &self.lab_ranges,
        }
    }

    fn check_column(&self, kind: SlotKind, column: usize) -> CatalogResult<()> {
        let columns = self.column_count(kind);
        if column >= columns {
            return Err(CatalogError::ColumnOutOfRange {
                kind,
                column,
                columns,
            });
        }
        Ok(())
    }

    /// 查询网格单元的时段代码
    pub fn lookup(&self, day: Day, kind: SlotKind, column: usize) -> CatalogResult<Option<&str>> {
        self.check_column(kind, column)?;
        Ok(self
            .days
            .iter()
            .find(|l| l.day == day)
            .and_then(|l| l.row(kind)[column].as_deref()))
    }

    /// 某类型的全部时段代码（侧边栏顺序）
    pub fn all_slots_of_kind(&self, kind: SlotKind) -> &[SlotCode] {
        match kind {
            SlotKind::Theory => &self.theory_codes,
            SlotKind::Lab => &self.lab_codes,
        }
    }

    /// 列的时间区间
    pub fn time_range_of(&self, kind: SlotKind, column: usize) -> CatalogResult<TimeRange> {
        self.check_column(kind, column)?;
        Ok(self.ranges(kind)[column])
    }

    pub fn column_count(&self, kind: SlotKind) -> usize {
        self.ranges(kind).len()
    }

    /// 午休前的列数
    pub fn morning_columns(&self, kind: SlotKind) -> usize {
        match kind {
            SlotKind::Theory => self.theory_morning_columns,
            SlotKind::Lab => self.lab_morning_columns,
        }
    }

    /// 布局中包含的星期
    pub fn days(&self) -> impl Iterator<Item = Day> + '_ {
        self.days.iter().map(|l| l.day)
    }

    /// 是否为目录认可的时段代码
    pub fn is_recognized(&self, code: &str) -> bool {
        self.recognized.contains(code)
    }

    /// 时段代码所属类别（侧边栏列表 + 单元格出现位置,含 "/" 分量）
    ///
    /// 未识别的代码返回空集合
    pub fn kinds_of(&self, code: &str) -> BTreeSet<SlotKind> {
        let mut kinds = BTreeSet::new();
        if self.theory_codes.iter().any(|c| c == code) {
            kinds.insert(SlotKind::Theory);
        }
        if self.lab_codes.iter().any(|c| c == code) {
            kinds.insert(SlotKind::Lab);
        }
        for cell in self.cells() {
            if cell.code == code || alternative_parts(cell.code).contains(&code) {
                kinds.insert(cell.occurrence.kind);
            }
        }
        kinds
    }

    /// 按 星期 → 理论/实验 → 列 顺序遍历全部非空单元
    pub fn cells(&self) -> impl Iterator<Item = CatalogCell<'_>> + '_ {
        self.days.iter().flat_map(|layout| {
            [SlotKind::Theory, SlotKind::Lab]
                .into_iter()
                .flat_map(move |kind| {
                    layout
                        .row(kind)
                        .iter()
                        .enumerate()
                        .filter_map(move |(column, code)| {
                            code.as_deref().map(|code| CatalogCell {
                                occurrence: SlotOccurrence {
                                    day: layout.day,
                                    kind,
                                    column,
                                },
                                code,
                            })
                        })
                })
        })
    }

    /// 单元格中出现过的全部时段代码（去重,保持发现顺序）
    pub fn distinct_cell_codes(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.cells()
            .filter(|cell| seen.insert(cell.code))
            .map(|cell| cell.code)
            .collect()
    }
}

fn build_standard() -> SlotCatalog {
    let days = STANDARD_LAYOUT
        .iter()
        .map(|(day, theory, lab)| DayLayout {
            day: *day,
            theory: theory.iter().map(|c| c.map(str::to_string)).collect(),
            lab: lab.iter().map(|c| Some(c.to_string())).collect(),
        })
        .collect();

    SlotCatalog::assemble(
        days,
        THEORY_TIME_RANGES.to_vec(),
        LAB_TIME_RANGES.to_vec(),
        THEORY_MORNING_COLUMNS,
        LAB_MORNING_COLUMNS,
        ALL_THEORY_SLOTS.iter().map(|s| s.to_string()).collect(),
        standard_lab_slots(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_is_valid() {
        let catalog = SlotCatalog::standard();
        assert!(catalog.validate().is_ok());
        assert_eq!(catalog.column_count(SlotKind::Theory), 10);
        assert_eq!(catalog.column_count(SlotKind::Lab), 6);
        assert_eq!(catalog.days().count(), 6);
    }

    #[test]
    fn test_lookup() {
        let catalog = SlotCatalog::standard();
        assert_eq!(catalog.lookup(Day::Mon, SlotKind::Theory, 0).unwrap(), None);
        assert_eq!(catalog.lookup(Day::Mon, SlotKind::Theory, 1).unwrap(), Some("TA1"));
        assert_eq!(catalog.lookup(Day::Tue, SlotKind::Theory, 1).unwrap(), Some("A1/SE2"));
        assert_eq!(catalog.lookup(Day::Sat, SlotKind::Lab, 5).unwrap(), Some("L59+L60"));
    }

    #[test]
    fn test_lookup_column_out_of_range() {
        let catalog = SlotCatalog::standard();
        let err = catalog.lookup(Day::Mon, SlotKind::Lab, 6).unwrap_err();
        assert_eq!(
            err,
            CatalogError::ColumnOutOfRange {
                kind: SlotKind::Lab,
                column: 6,
                columns: 6
            }
        );
        assert!(catalog.time_range_of(SlotKind::Theory, 10).is_err());
    }

    #[test]
    fn test_time_ranges() {
        let catalog = SlotCatalog::standard();
        assert_eq!(catalog.time_range_of(SlotKind::Theory, 0).unwrap(), TimeRange::new(480, 530));
        assert_eq!(catalog.time_range_of(SlotKind::Lab, 2).unwrap(), TimeRange::new(700, 790));
        assert_eq!(catalog.morning_columns(SlotKind::Theory), 5);
        assert_eq!(catalog.morning_columns(SlotKind::Lab), 3);
    }

    #[test]
    fn test_every_cell_is_recognized() {
        let catalog = SlotCatalog::standard();
        for cell in catalog.cells() {
            assert!(catalog.is_recognized(cell.code), "{} 未被识别", cell.code);
        }
        assert!(catalog.is_recognized("SA1"));
        assert!(catalog.is_recognized("L1+L2"));
        assert!(!catalog.is_recognized("G1"));
        assert!(!catalog.is_recognized("L1"));
    }

    #[test]
    fn test_kinds_of() {
        let catalog = SlotCatalog::standard();
        assert_eq!(catalog.kinds_of("L1+L2"), BTreeSet::from([SlotKind::Lab]));
        assert_eq!(catalog.kinds_of("TA1"), BTreeSet::from([SlotKind::Theory]));
        assert_eq!(catalog.kinds_of("A1/SE2"), BTreeSet::from([SlotKind::Theory]));
        assert_eq!(catalog.kinds_of("SE2"), BTreeSet::from([SlotKind::Theory]));
        assert!(catalog.kinds_of("G1").is_empty());
    }

    #[test]
    fn test_sidebar_lists() {
        let catalog = SlotCatalog::standard();
        let theory = catalog.all_slots_of_kind(SlotKind::Theory);
        let lab = catalog.all_slots_of_kind(SlotKind::Lab);
        assert_eq!(theory.len(), 39);
        assert_eq!(theory[0], "A1");
        assert_eq!(lab.len(), 36);
        assert_eq!(lab[0], "L1+L2");
        assert_eq!(lab[35], "L71+L72");
    }

    #[test]
    fn test_cells_order_day_kind_column() {
        let catalog = SlotCatalog::standard();
        let first: Vec<&str> = catalog.cells().take(10).map(|c| c.code).collect();
        // MON 理论列: TA1 TB1 E1 E1 TA2 TB2 E2 E2, 随后为实验列
        assert_eq!(first, vec!["TA1", "TB1", "E1", "E1", "TA2", "TB2", "E2", "E2", "L61+L62", "L63+L64"]);
    }

    #[test]
    fn test_from_layout_rejects_bad_row_width() {
        let days = vec![DayLayout {
            day: Day::Mon,
            theory: vec![Some("X1".to_string())],
            lab: vec![],
        }];
        let result = SlotCatalog::from_layout(
            days,
            vec![TimeRange::new(480, 530), TimeRange::new(540, 590)],
            vec![],
            vec![],
            vec![],
        );
        assert!(matches!(result, Err(CatalogError::InvalidLayout(_))));
    }

    #[test]
    fn test_from_layout_rejects_duplicate_day() {
        let row = DayLayout {
            day: Day::Mon,
            theory: vec![Some("X1".to_string())],
            lab: vec![],
        };
        let result = SlotCatalog::from_layout(
            vec![row.clone(), row],
            vec![TimeRange::new(480, 530)],
            vec![],
            vec![],
            vec![],
        );
        assert!(result.is_err());
    }
}
