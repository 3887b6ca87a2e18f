use crate::api::ApiError;
use crate::app::state::AppState;
use crate::config::config_keys;
use crate::i18n;

use super::common::map_api_error;

// ==========================================
// 配置管理相关命令
// ==========================================

/// 查询全局配置快照（JSON）
#[tauri::command(rename_all = "snake_case")]
pub async fn get_config_snapshot(state: tauri::State<'_, AppState>) -> Result<String, String> {
    state
        .config_manager
        .get_config_snapshot()
        .map_err(|e| map_api_error(ApiError::ConfigError(e.to_string())))
}

/// 更新全局配置（等价规则/调色板/存储键在下次启动时生效）
#[tauri::command(rename_all = "snake_case")]
pub async fn update_config(
    state: tauri::State<'_, AppState>,
    key: String,
    value: String,
) -> Result<(), String> {
    state
        .config_manager
        .set_global_config_value(&key, &value)
        .map_err(|e| map_api_error(ApiError::ConfigError(e.to_string())))?;

    tracing::info!("配置已更新: {}", key);
    Ok(())
}

/// 切换界面语言并保存
#[tauri::command(rename_all = "snake_case")]
pub async fn set_locale(state: tauri::State<'_, AppState>, locale: String) -> Result<(), String> {
    if !i18n::set_locale(&locale) {
        return Err(map_api_error(ApiError::InvalidInput(format!(
            "不支持的语言: {}",
            locale
        ))));
    }

    state
        .config_manager
        .set_global_config_value(config_keys::LOCALE, &locale)
        .map_err(|e| map_api_error(ApiError::ConfigError(e.to_string())))
}
