// ==========================================
// FFCS 课表规划器 - 课表导出
// ==========================================
// 职责: 由当前分配与时段目录构建网格模型,输出 CSV / 纯文本
// 说明: 像素渲染由前端完成,这里只产出结构化网格
// ==========================================

pub mod csv_writer;
pub mod error;
pub mod grid;
pub mod text_writer;

/// 默认网格导出文件名
pub const DEFAULT_GRID_FILE_NAME: &str = "ffcs-timetable.csv";

/// 默认存档文件名
pub const DEFAULT_SAVE_FILE_NAME: &str = "ffcs-timetable.json";

pub use csv_writer::{grid_to_csv, write_grid_csv};
pub use error::{ExportError, ExportResult};
pub use grid::{GridCell, GridExporter, GridHeader, GridRow, LegendEntry, TimetableGrid};
pub use text_writer::grid_to_text;
