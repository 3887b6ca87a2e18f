// ==========================================
// FFCS 课表规划器 - 领域模型层
// ==========================================
// 职责: 定义领域实体、值类型、持久化数据块
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod timetable;
pub mod types;

// 重导出核心类型
pub use timetable::{Course, SlotAssignment, TimetableData};
pub use types::{Day, SlotCode, SlotKind, SlotOccurrence, TimeRange};
