// ==========================================
// FFCS 课表规划器 - Tauri 主入口
// ==========================================
// 技术栈: Tauri + Rust + SQLite
// ==========================================

// 禁止控制台窗口 (Windows)
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

#[cfg(feature = "tauri-app")]
fn main() -> anyhow::Result<()> {
    use anyhow::Context;
    use ffcs_timetable::app::tauri_commands::*;
    use ffcs_timetable::app::{get_default_db_path, AppState};

    // 初始化日志系统
    ffcs_timetable::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", ffcs_timetable::APP_NAME);
    tracing::info!("系统版本: {}", ffcs_timetable::VERSION);
    tracing::info!("==================================================");

    // 获取数据库路径
    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let app_state = AppState::new(db_path)
        .map_err(anyhow::Error::msg)
        .context("无法初始化AppState")?;

    tracing::info!("启动Tauri应用...");

    tauri::Builder::default()
        .manage(app_state)
        .invoke_handler(tauri::generate_handler![
            // ==========================================
            // 课表分配相关命令
            // ==========================================
            assign_slot,
            assign_combination,
            clear_slot,
            clear_all,
            get_assignment,
            list_courses,
            get_slot_clashes,
            list_clashing_codes,
            resolve_slot,
            set_slot_preference,
            get_sidebar_summary,

            // ==========================================
            // 数据块导入导出
            // ==========================================
            export_data,
            import_data,
            save_to_file,
            load_from_file,

            // ==========================================
            // 交互流程
            // ==========================================
            get_interaction_state,
            click_slot,
            choose_alternative,
            choose_combination,
            submit_form,
            clear_selected,
            cancel_interaction,

            // ==========================================
            // 网格导出
            // ==========================================
            get_timetable_grid,
            export_grid_text,
            export_grid_csv,

            // ==========================================
            // 配置
            // ==========================================
            get_config_snapshot,
            update_config,
            set_locale,
        ])
        .run(tauri::generate_context!())
        .context("启动Tauri应用失败")?;

    tracing::info!("Tauri应用已退出");
    Ok(())
}

#[cfg(not(feature = "tauri-app"))]
fn main() {
    println!("==================================================");
    println!("{}", ffcs_timetable::APP_NAME);
    println!("系统版本: {}", ffcs_timetable::VERSION);
    println!("==================================================");
    println!();
    println!("此可执行文件需要启用 tauri-app 特性");
    println!("使用: cargo run --features tauri-app");
    println!();
    println!("或者使用库模式:");
    println!("use ffcs_timetable::app::AppState;");
}
