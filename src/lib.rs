// ==========================================
// FFCS 课表规划器 - 核心库
// ==========================================
// 技术栈: Tauri + Rust + SQLite
// 系统定位: 每周课表时段分配与冲突检测
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 时段与课表数据
pub mod domain;

// 数据仓储层 - 数据块持久化
pub mod repository;

// 引擎层 - 目录、等价、冲突、存储、交互
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 导出层 - 网格 / CSV / 文本
pub mod exporter;

// 应用层 - Tauri 集成
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{Course, Day, SlotAssignment, SlotCode, SlotKind, SlotOccurrence, TimeRange, TimetableData};

// 引擎
pub use engine::{
    AssignmentStore, ClashDetector, EquivalenceResolver, EquivalenceRule, EquivalenceTable,
    InteractionFlow, InteractionState, SlotCatalog,
};

// API
pub use api::{AssignForm, TimetableApi};

// ==========================================
// 版本信息
// ==========================================

/// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 系统名称
pub const APP_NAME: &str = "FFCS 课表规划器";

/// 数据库版本
pub const DB_VERSION: &str = "v0.1";
