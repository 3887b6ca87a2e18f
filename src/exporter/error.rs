// ==========================================
// FFCS 课表规划器 - 导出错误类型
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV 写入失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("文件写入失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("导出内容编码失败: {0}")]
    Encoding(String),
}

pub type ExportResult<T> = Result<T, ExportError>;
