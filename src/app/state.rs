// ==========================================
// FFCS 课表规划器 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::TimetableApi;
use crate::config::config_manager::ConfigManager;
use crate::db::open_sqlite_connection;
use crate::i18n;
use crate::repository::TimetableRepository;

/// 应用状态
///
/// 在Tauri应用中作为全局状态管理,课表存储由 TimetableApi 独占
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 课表API
    pub timetable_api: Arc<TimetableApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    ///
    /// # 说明
    /// 仓储与配置共享同一连接;界面语言取自配置 `locale`
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        let locale = config_manager
            .get_locale()
            .map_err(|e| format!("读取语言配置失败: {}", e))?;
        i18n::set_locale(&locale);

        let timetable_repo = Arc::new(
            TimetableRepository::from_connection(conn)
                .map_err(|e| format!("无法创建TimetableRepository: {}", e))?,
        );

        let timetable_api = Arc::new(
            TimetableApi::new(timetable_repo, &config_manager)
                .map_err(|e| format!("无法创建TimetableApi: {}", e))?,
        );

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            timetable_api,
            config_manager,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先使用环境变量 `FFCS_TIMETABLE_DB_PATH`,否则位于用户数据目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("FFCS_TIMETABLE_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./ffcs_timetable.db");

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("ffcs-timetable-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("ffcs-timetable");
        }

        // 确保目录存在
        std::fs::create_dir_all(&path).ok();
        path = path.join("ffcs_timetable.db");
    }

    path.to_string_lossy().to_string()
}
