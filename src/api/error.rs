// ==========================================
// FFCS 课表规划器 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换仓储/引擎错误为用户可读的错误消息
// 红线: 目录不一致属于数据表缺陷,记录 error 日志并显式上抛
// ==========================================

use crate::engine::error::{CatalogError, InteractionError, StoreError};
use crate::exporter::error::ExportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 用户输入错误（变更前拦截,状态不变）
    // ==========================================
    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("无效的状态转换: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },

    // ==========================================
    // 导入错误（保持原状态,转换为状态结果）
    // ==========================================
    #[error("导入失败: {0}")]
    ImportError(String),

    // ==========================================
    // 目录不一致（LookupError）
    // ==========================================
    #[error("时段目录不一致: {0}")]
    CatalogInconsistency(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("文件读写失败: {0}")]
    IoError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, key } => {
                ApiError::NotFound(format!("{}(key={})不存在", entity, key))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::DatabaseError(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::SerializationError(msg) => {
                ApiError::ImportError(format!("已保存的课表数据无法解析: {}", msg))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从引擎错误转换
// ==========================================
impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        tracing::error!(error = %err, "时段目录查找失败");
        ApiError::CatalogInconsistency(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Catalog(e) => ApiError::from(e),
            e @ StoreError::InvalidPreference { .. } => ApiError::ValidationError(e.to_string()),
            StoreError::InvalidData(msg) => ApiError::ImportError(msg),
        }
    }
}

impl From<InteractionError> for ApiError {
    fn from(err: InteractionError) -> Self {
        match err {
            InteractionError::Store(e) => ApiError::from(e),
            InteractionError::InvalidTransition { action, state } => {
                ApiError::InvalidStateTransition {
                    from: state.to_string(),
                    to: action.to_string(),
                }
            }
            InteractionError::InvalidChoice(msg) => ApiError::InvalidInput(msg),
            e @ InteractionError::KindMismatch { .. } => ApiError::InvalidInput(e.to_string()),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Io(e) => ApiError::IoError(e.to_string()),
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::IoError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_mapping() {
        let err: ApiError = StoreError::InvalidData("bad".to_string()).into();
        assert!(matches!(err, ApiError::ImportError(msg) if msg == "bad"));

        let err: ApiError = StoreError::InvalidPreference {
            code: "A1/SE2".to_string(),
            choice: "B1".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::ValidationError(_)));

        let err: ApiError = StoreError::Catalog(CatalogError::UnknownSlot("G1".to_string())).into();
        match err {
            ApiError::CatalogInconsistency(msg) => assert!(msg.contains("G1")),
            other => panic!("Expected CatalogInconsistency, got {:?}", other),
        }
    }

    #[test]
    fn test_interaction_error_mapping() {
        let err: ApiError = InteractionError::InvalidTransition {
            action: "submit",
            state: "Idle",
        }
        .into();
        match err {
            ApiError::InvalidStateTransition { from, to } => {
                assert_eq!(from, "Idle");
                assert_eq!(to, "submit");
            }
            _ => panic!("Expected InvalidStateTransition"),
        }
    }

    #[test]
    fn test_repository_error_mapping() {
        let err: ApiError = RepositoryError::LockError("poisoned".to_string()).into();
        assert!(matches!(err, ApiError::DatabaseConnectionError(_)));
        let err: ApiError = RepositoryError::SerializationError("eof".to_string()).into();
        assert!(matches!(err, ApiError::ImportError(_)));
    }
}
