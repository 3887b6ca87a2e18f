// ==========================================
// FFCS 课表规划器 - 配置层
// ==========================================
// 职责: 等价规则、调色板、存储键、界面语言等配置
// 存储: config_kv 表 (scope_id='global')
// ==========================================

pub mod config_manager;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
