// ==========================================
// FFCS 课表规划器 - 领域类型定义
// ==========================================
// 职责: 星期、时段类型、时间区间等基础值类型
// 红线: 时间区间为静态数据,同一列在所有星期共享同一时间
// ==========================================

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 时段代码（如 "A1"、"TDD2"、"L61+L62"、"A1/SE2"）
pub type SlotCode = String;

/// 备选时段分隔符（需要用户选择其一）
pub const ALTERNATIVE_SEPARATOR: char = '/';

/// 实验课连排分隔符（整体分配,不拆分）
pub const LAB_PAIR_SEPARATOR: char = '+';

/// 是否为 `/` 连接的备选时段代码
pub fn is_alternative_code(code: &str) -> bool {
    code.contains(ALTERNATIVE_SEPARATOR)
}

/// 拆分 `/` 备选时段;普通代码返回自身
pub fn alternative_parts(code: &str) -> Vec<&str> {
    code.split(ALTERNATIVE_SEPARATOR)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

// ==========================================
// 星期 (Day)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Day {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl Day {
    /// 网格中的全部星期（按显示顺序）
    pub const ALL: [Day; 6] = [Day::Mon, Day::Tue, Day::Wed, Day::Thu, Day::Fri, Day::Sat];

    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Mon => "MON",
            Day::Tue => "TUE",
            Day::Wed => "WED",
            Day::Thu => "THU",
            Day::Fri => "FRI",
            Day::Sat => "SAT",
        }
    }

    pub fn parse(s: &str) -> Option<Day> {
        match s.trim().to_uppercase().as_str() {
            "MON" => Some(Day::Mon),
            "TUE" => Some(Day::Tue),
            "WED" => Some(Day::Wed),
            "THU" => Some(Day::Thu),
            "FRI" => Some(Day::Fri),
            "SAT" => Some(Day::Sat),
            _ => None,
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 时段类型 (Slot Kind)
// ==========================================
// 理论课每天 10 列,实验课每天 6 列（连排）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    Theory,
    Lab,
}

impl SlotKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotKind::Theory => "theory",
            SlotKind::Lab => "lab",
        }
    }

    pub fn parse(s: &str) -> Option<SlotKind> {
        match s.trim().to_lowercase().as_str() {
            "theory" => Some(SlotKind::Theory),
            "lab" => Some(SlotKind::Lab),
            _ => None,
        }
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 时间区间 (Time Range)
// ==========================================
// 单位: 自午夜起的分钟数,半开区间 [start, end)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub start_min: u32,
    pub end_min: u32,
}

impl TimeRange {
    pub const fn new(start_min: u32, end_min: u32) -> Self {
        Self { start_min, end_min }
    }

    /// 时长（分钟）
    pub fn duration_min(&self) -> u32 {
        self.end_min.saturating_sub(self.start_min)
    }

    /// 显示标签,如 "08:00-08:50"
    pub fn label(&self) -> String {
        format!(
            "{}-{}",
            format_minutes(self.start_min),
            format_minutes(self.end_min)
        )
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 分钟数格式化为 HH:MM
fn format_minutes(minutes: u32) -> String {
    match NaiveTime::from_num_seconds_from_midnight_opt(minutes * 60, 0) {
        Some(t) => t.format("%H:%M").to_string(),
        None => format!("{:02}:{:02}", minutes / 60, minutes % 60),
    }
}

// ==========================================
// 网格位置 (Slot Occurrence)
// ==========================================
/// 时段代码在网格中的一次出现
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotOccurrence {
    pub day: Day,
    pub kind: SlotKind,
    pub column: usize,
}
