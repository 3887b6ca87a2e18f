// ==========================================
// FFCS 课表规划器 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 课表数据块的键值持久化,屏蔽数据库细节
// 约束: 所有查询使用参数化
// ==========================================

pub mod error;
pub mod timetable_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use timetable_repo::{StoredBlob, TimetableRepository};
