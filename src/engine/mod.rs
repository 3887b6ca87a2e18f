// ==========================================
// FFCS 课表规划器 - 引擎层
// ==========================================
// 职责: 时段目录、等价展开、冲突检测、分配存储、交互流程
// 红线: 引擎不访问数据库,不处理表单校验
// 红线: 数据流单向: 展开 → 冲突检测 → 提交
// ==========================================

pub mod assignment_store;
pub mod catalog;
pub mod clash;
pub mod combination;
pub mod equivalence;
pub mod error;
pub mod interaction;

// 重导出核心引擎
pub use assignment_store::{default_palette, AssignRequest, AssignmentStore, DEFAULT_PALETTE};
pub use catalog::{CatalogCell, DayLayout, SlotCatalog};
pub use clash::{overlaps, ClashDetector, ClashReport};
pub use combination::{combination_label, combinations_for, has_multiple_combinations};
pub use equivalence::{EquivalenceClass, EquivalenceResolver, EquivalenceRule, EquivalenceTable};
pub use error::{
    CatalogError, CatalogResult, InteractionError, InteractionResult, StoreError, StoreResult,
};
pub use interaction::{InteractionFlow, InteractionState};
