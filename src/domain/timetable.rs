// ==========================================
// FFCS 课表规划器 - 课表领域模型
// ==========================================
// 职责: 时段分配、课程、持久化数据块
// 序列化格式: camelCase（与前端保存文件一致）
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::types::SlotCode;

// ==========================================
// SlotAssignment - 时段分配
// ==========================================
// 以已解析的时段代码为键;同一课程的所有时段字段完全一致
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotAssignment {
    pub course_code: String,
    pub course_name: String,
    pub professor_name: String,
    pub color_tag: String,
}

// ==========================================
// Course - 课程
// ==========================================
// 红线: slots 恰好等于 assignments 中 courseCode == code 的键集合
// 红线: slots 为空时课程被删除
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub code: String,
    pub name: String,
    pub professor: String,
    pub color: String,
    pub slots: Vec<SlotCode>,
}

impl Course {
    /// 合并时段（保持插入顺序,去重）
    pub fn merge_slots<'a>(&mut self, codes: impl IntoIterator<Item = &'a SlotCode>) {
        for code in codes {
            if !self.slots.contains(code) {
                self.slots.push(code.clone());
            }
        }
    }

    /// 移除时段,返回是否有变更
    pub fn remove_slot(&mut self, code: &str) -> bool {
        let before = self.slots.len();
        self.slots.retain(|s| s != code);
        before != self.slots.len()
    }

    /// 转换为该课程的时段分配
    pub fn to_assignment(&self) -> SlotAssignment {
        SlotAssignment {
            course_code: self.code.clone(),
            course_name: self.name.clone(),
            professor_name: self.professor.clone(),
            color_tag: self.color.clone(),
        }
    }
}

// ==========================================
// TimetableData - 持久化数据块
// ==========================================
// slotPreferences / nextColorIndex 缺省时取默认值,兼容旧版保存文件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableData {
    pub assignments: BTreeMap<SlotCode, SlotAssignment>,
    pub courses: Vec<Course>,
    #[serde(default)]
    pub slot_preferences: BTreeMap<SlotCode, SlotCode>,
    #[serde(default)]
    pub next_color_index: usize,
}

impl TimetableData {
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty() && self.courses.is_empty()
    }

    pub fn find_course(&self, code: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.code == code)
    }

    /// 校验课程与分配的一致性
    ///
    /// # 返回
    /// - Ok(()): 一致
    /// - Err(String): 第一处不一致的描述
    pub fn check_consistency(&self) -> Result<(), String> {
        for course in &self.courses {
            if course.slots.is_empty() {
                return Err(format!("课程 {} 没有任何时段", course.code));
            }
            for slot in &course.slots {
                match self.assignments.get(slot) {
                    Some(a) if a.course_code == course.code => {}
                    Some(a) => {
                        return Err(format!(
                            "时段 {} 属于课程 {},但课程 {} 也声明了它",
                            slot, a.course_code, course.code
                        ))
                    }
                    None => {
                        return Err(format!("课程 {} 声明的时段 {} 没有分配记录", course.code, slot))
                    }
                }
            }
        }

        for (slot, assignment) in &self.assignments {
            let owned = self
                .courses
                .iter()
                .filter(|c| c.code == assignment.course_code)
                .any(|c| c.slots.iter().any(|s| s == slot));
            if !owned {
                return Err(format!(
                    "时段 {} 分配给了 {},但课程列表中没有对应记录",
                    slot, assignment.course_code
                ));
            }
        }

        let mut codes: Vec<&str> = self.courses.iter().map(|c| c.code.as_str()).collect();
        codes.sort_unstable();
        codes.dedup();
        if codes.len() != self.courses.len() {
            return Err("课程代码重复".to_string());
        }

        Ok(())
    }
}
