use std::path::PathBuf;

use crate::app::state::AppState;

use super::common::{map_api_error, to_json};

// ==========================================
// 网格导出相关命令
// ==========================================

/// 查询网格模型（前端渲染用）
#[tauri::command(rename_all = "snake_case")]
pub async fn get_timetable_grid(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let result = state.timetable_api.export_grid().map_err(map_api_error)?;

    to_json(&result)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn export_grid_text(state: tauri::State<'_, AppState>) -> Result<String, String> {
    state.timetable_api.export_grid_text().map_err(map_api_error)
}

/// 导出网格 CSV 到文件（目录路径使用默认文件名）
#[tauri::command(rename_all = "snake_case")]
pub async fn export_grid_csv(state: tauri::State<'_, AppState>, path: String) -> Result<String, String> {
    let saved = state
        .timetable_api
        .export_grid_to_file(&PathBuf::from(path))
        .map_err(map_api_error)?;

    tracing::info!("课表网格已导出: {}", saved.display());
    to_json(&saved.to_string_lossy())
}
