// ==========================================
// FFCS 课表规划器 - Tauri 命令（按域拆分）
// ==========================================
// 职责: Tauri 命令定义,连接前端与后端 API
// ==========================================

#![cfg(feature = "tauri-app")]

mod common;
mod config;
mod export;
mod interaction;
mod timetable;

pub use config::*;
pub use export::*;
pub use interaction::*;
pub use timetable::*;
