use std::path::PathBuf;

use crate::api::AssignForm;
use crate::app::state::AppState;

use super::common::{map_api_error, to_json};

// ==========================================
// 课表分配相关命令
// ==========================================

/// 为时段分配课程
#[tauri::command(rename_all = "snake_case")]
pub async fn assign_slot(
    state: tauri::State<'_, AppState>,
    slot: String,
    form: AssignForm,
) -> Result<String, String> {
    let result = state
        .timetable_api
        .assign_slot(&slot, &form)
        .map_err(map_api_error)?;

    to_json(&result)
}

/// 为一组时段（理论课组合）分配课程
#[tauri::command(rename_all = "snake_case")]
pub async fn assign_combination(
    state: tauri::State<'_, AppState>,
    slots: Vec<String>,
    form: AssignForm,
) -> Result<String, String> {
    let result = state
        .timetable_api
        .assign_combination(&slots, &form)
        .map_err(map_api_error)?;

    to_json(&result)
}

/// 清除时段（及其等价时段）
#[tauri::command(rename_all = "snake_case")]
pub async fn clear_slot(state: tauri::State<'_, AppState>, slot: String) -> Result<String, String> {
    let result = state
        .timetable_api
        .clear_slot(&slot)
        .map_err(map_api_error)?;

    to_json(&result)
}

/// 清空课表（保留时段偏好）
#[tauri::command(rename_all = "snake_case")]
pub async fn clear_all(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let result = state.timetable_api.clear_all().map_err(map_api_error)?;

    to_json(&result)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn get_assignment(state: tauri::State<'_, AppState>, code: String) -> Result<String, String> {
    let result = state
        .timetable_api
        .get_assignment(&code)
        .map_err(map_api_error)?;

    to_json(&result)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn list_courses(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let result = state.timetable_api.list_courses().map_err(map_api_error)?;

    to_json(&result)
}

/// 查询候选时段与已分配时段的冲突
#[tauri::command(rename_all = "snake_case")]
pub async fn get_slot_clashes(
    state: tauri::State<'_, AppState>,
    candidate: String,
) -> Result<String, String> {
    let result = state
        .timetable_api
        .classify_slot(&candidate)
        .map_err(map_api_error)?;

    to_json(&result)
}

/// 查询所有应置灰的时段
#[tauri::command(rename_all = "snake_case")]
pub async fn list_clashing_codes(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let result = state
        .timetable_api
        .list_clashing_codes()
        .map_err(map_api_error)?;

    to_json(&result)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn resolve_slot(state: tauri::State<'_, AppState>, code: String) -> Result<String, String> {
    let result = state
        .timetable_api
        .resolve_slot(&code)
        .map_err(map_api_error)?;

    to_json(&result)
}

/// 保存复合时段的偏好分量
#[tauri::command(rename_all = "snake_case")]
pub async fn set_slot_preference(
    state: tauri::State<'_, AppState>,
    compound: String,
    choice: String,
) -> Result<String, String> {
    let result = state
        .timetable_api
        .set_slot_preference(&compound, &choice)
        .map_err(map_api_error)?;

    to_json(&result)
}

/// 侧边栏汇总（未分配时段、课程图例、计数）
#[tauri::command(rename_all = "snake_case")]
pub async fn get_sidebar_summary(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let result = state
        .timetable_api
        .sidebar_summary()
        .map_err(map_api_error)?;

    to_json(&result)
}

// ==========================================
// 导入 / 导出数据块
// ==========================================

#[tauri::command(rename_all = "snake_case")]
pub async fn export_data(state: tauri::State<'_, AppState>) -> Result<String, String> {
    state.timetable_api.export_data().map_err(map_api_error)
}

/// 导入数据块（格式错误返回 success=false,状态不变）
#[tauri::command(rename_all = "snake_case")]
pub async fn import_data(state: tauri::State<'_, AppState>, raw: String) -> Result<String, String> {
    let result = state
        .timetable_api
        .import_data(&raw)
        .map_err(map_api_error)?;

    to_json(&result)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn save_to_file(state: tauri::State<'_, AppState>, path: String) -> Result<String, String> {
    let saved = state
        .timetable_api
        .save_to_file(&PathBuf::from(path))
        .map_err(map_api_error)?;

    to_json(&saved.to_string_lossy())
}

#[tauri::command(rename_all = "snake_case")]
pub async fn load_from_file(state: tauri::State<'_, AppState>, path: String) -> Result<String, String> {
    let result = state
        .timetable_api
        .load_from_file(&PathBuf::from(path))
        .map_err(map_api_error)?;

    to_json(&result)
}
