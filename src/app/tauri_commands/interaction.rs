use crate::api::AssignForm;
use crate::app::state::AppState;

use super::common::{map_api_error, parse_slot_kind, to_json};

// ==========================================
// 交互流程相关命令
// ==========================================

#[tauri::command(rename_all = "snake_case")]
pub async fn get_interaction_state(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let result = state
        .timetable_api
        .interaction_state()
        .map_err(map_api_error)?;

    to_json(&result)
}

/// 点击网格单元
///
/// # 参数
/// - code: 单元格时段代码
/// - kind: "theory" 或 "lab"
#[tauri::command(rename_all = "snake_case")]
pub async fn click_slot(
    state: tauri::State<'_, AppState>,
    code: String,
    kind: String,
) -> Result<String, String> {
    let kind = parse_slot_kind(&kind)?;
    let result = state
        .timetable_api
        .click_slot(&code, kind)
        .map_err(map_api_error)?;

    to_json(&result)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn choose_alternative(
    state: tauri::State<'_, AppState>,
    choice: String,
) -> Result<String, String> {
    let result = state
        .timetable_api
        .choose_alternative(&choice)
        .map_err(map_api_error)?;

    to_json(&result)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn choose_combination(
    state: tauri::State<'_, AppState>,
    index: usize,
) -> Result<String, String> {
    let result = state
        .timetable_api
        .choose_combination(index)
        .map_err(map_api_error)?;

    to_json(&result)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn submit_form(
    state: tauri::State<'_, AppState>,
    form: AssignForm,
) -> Result<String, String> {
    let result = state
        .timetable_api
        .submit_form(&form)
        .map_err(map_api_error)?;

    to_json(&result)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn clear_selected(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let result = state
        .timetable_api
        .clear_selected()
        .map_err(map_api_error)?;

    to_json(&result)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn cancel_interaction(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let result = state
        .timetable_api
        .cancel_interaction()
        .map_err(map_api_error)?;

    to_json(&result)
}
