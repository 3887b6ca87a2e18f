// ==========================================
// FFCS 课表规划器 - API 层
// ==========================================
// 职责: 表单校验、存储变更后持久化、错误转换
// ==========================================

pub mod error;
pub mod timetable_api;
pub mod validator;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use timetable_api::{ImportOutcome, SidebarSummary, SlotOperationResponse, TimetableApi};
pub use validator::{validate_assign_form, AssignForm};
