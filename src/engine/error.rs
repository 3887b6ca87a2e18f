// ==========================================
// FFCS 课表规划器 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 目录不一致属于数据表缺陷,必须显式上抛,不得静默吞掉
// ==========================================

use thiserror::Error;

use crate::domain::types::SlotKind;

/// 时段目录错误（LookupError）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("未知时段代码: {0}")]
    UnknownSlot(String),

    #[error("列索引越界: kind={kind}, column={column}, 列数={columns}")]
    ColumnOutOfRange {
        kind: SlotKind,
        column: usize,
        columns: usize,
    },

    #[error("课表结构无效: {0}")]
    InvalidLayout(String),

    #[error("等价规则表无效 (version={version}): {message}")]
    InvalidEquivalenceTable { version: String, message: String },
}

/// 分配存储错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("无效的备选时段选择: {code} 不包含 {choice}")]
    InvalidPreference { code: String, choice: String },

    #[error("保存数据无效: {0}")]
    InvalidData(String),
}

/// 交互流程错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InteractionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("当前状态 {state} 不允许操作 {action}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("无效的选择: {0}")]
    InvalidChoice(String),

    #[error("时段 {code} 不是 {kind} 时段")]
    KindMismatch { code: String, kind: SlotKind },
}

impl From<CatalogError> for InteractionError {
    fn from(err: CatalogError) -> Self {
        InteractionError::Store(StoreError::Catalog(err))
    }
}

/// Result 类型别名
pub type CatalogResult<T> = Result<T, CatalogError>;
pub type StoreResult<T> = Result<T, StoreError>;
pub type InteractionResult<T> = Result<T, InteractionError>;
