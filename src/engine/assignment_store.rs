// ==========================================
// FFCS 课表规划器 - 分配存储
// ==========================================
// 职责: 维护 时段 → 分配 与 课程 → 时段 两份映射
// 状态机: 每个时段 Empty → Assigned → Empty,无中间态
// ==========================================
// 红线: Course.slots 恰好等于 courseCode 相同的分配键集合
// 红线: 课程时段为空时删除课程
// 红线: 导入失败时保持原状态不变
// ==========================================

use std::collections::HashSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::timetable::{Course, SlotAssignment, TimetableData};
use crate::domain::types::{alternative_parts, is_alternative_code, SlotCode};
use crate::engine::catalog::SlotCatalog;
use crate::engine::equivalence::EquivalenceResolver;
use crate::engine::error::{CatalogError, StoreError, StoreResult};

/// 默认课程颜色（按轮转下标取色）
pub const DEFAULT_PALETTE: [&str; 10] = [
    "#3B82F6", // blue
    "#10B981", // green
    "#F59E0B", // amber
    "#EF4444", // red
    "#8B5CF6", // purple
    "#EC4899", // pink
    "#14B8A6", // teal
    "#F97316", // orange
    "#6366F1", // indigo
    "#84CC16", // lime
];

pub fn default_palette() -> Vec<String> {
    DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect()
}

/// 分配请求（已通过表单校验）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignRequest {
    pub course_code: String,
    pub course_name: String,
    pub professor_name: String,
    /// 未指定时: 已有课程沿用原色,新课程按调色板轮转
    pub color: Option<String>,
}

// ==========================================
// AssignmentStore - 分配存储
// ==========================================
pub struct AssignmentStore<'a> {
    resolver: EquivalenceResolver<'a>,
    palette: Vec<String>,
    data: TimetableData,
}

impl<'a> AssignmentStore<'a> {
    /// 创建空存储
    ///
    /// # 参数
    /// - resolver: 等价时段解析器
    /// - palette: 调色板（为空时使用默认调色板）
    pub fn new(resolver: EquivalenceResolver<'a>, palette: Vec<String>) -> Self {
        let palette = if palette.is_empty() {
            default_palette()
        } else {
            palette
        };
        Self {
            resolver,
            palette,
            data: TimetableData::default(),
        }
    }

    pub fn resolver(&self) -> &EquivalenceResolver<'a> {
        &self.resolver
    }

    pub fn catalog(&self) -> &'a SlotCatalog {
        self.resolver.catalog()
    }

    pub fn palette(&self) -> &[String] {
        &self.palette
    }

    pub fn data(&self) -> &TimetableData {
        &self.data
    }

    // ==========================================
    // 分配 / 清除
    // ==========================================

    /// 为时段分配课程（先按等价规则展开）
    ///
    /// # 返回
    /// 实际写入的时段代码
    pub fn assign(&mut self, slot: &str, request: &AssignRequest) -> StoreResult<Vec<SlotCode>> {
        let related = self.resolver.resolve(slot)?;
        self.commit(related, request)
    }

    /// 为一组时段（如理论课组合）分配同一课程
    pub fn assign_many(&mut self, slots: &[SlotCode], request: &AssignRequest) -> StoreResult<Vec<SlotCode>> {
        if slots.is_empty() {
            return Err(StoreError::InvalidData("时段列表为空".to_string()));
        }
        let related = self.resolver.resolve_many(slots)?;
        self.commit(related, request)
    }

    fn commit(&mut self, related: Vec<SlotCode>, request: &AssignRequest) -> StoreResult<Vec<SlotCode>> {
        let color = self.pick_color(request);

        // 被其他课程占用的时段从原课程移除
        for code in &related {
            let previous_owner = self
                .data
                .assignments
                .get(code)
                .filter(|a| a.course_code != request.course_code)
                .map(|a| a.course_code.clone());
            if let Some(owner) = previous_owner {
                debug!(slot = %code, from = %owner, to = %request.course_code, "时段改派");
                if let Some(course) = self.data.courses.iter_mut().find(|c| c.code == owner) {
                    course.remove_slot(code);
                }
            }
        }

        let index = match self
            .data
            .courses
            .iter()
            .position(|c| c.code == request.course_code)
        {
            Some(index) => index,
            None => {
                self.data.courses.push(Course {
                    id: Uuid::new_v4().to_string(),
                    code: request.course_code.clone(),
                    name: String::new(),
                    professor: String::new(),
                    color: String::new(),
                    slots: Vec::new(),
                });
                self.data.courses.len() - 1
            }
        };
        let course = &mut self.data.courses[index];
        course.name = request.course_name.clone();
        course.professor = request.professor_name.clone();
        course.color = color;
        course.merge_slots(&related);
        let assignment = course.to_assignment();

        for code in &related {
            self.data.assignments.insert(code.clone(), assignment.clone());
        }

        // 课程名/教师/颜色回填到该课程的全部分配
        for existing in self.data.assignments.values_mut() {
            if existing.course_code == assignment.course_code {
                *existing = assignment.clone();
            }
        }

        self.drop_empty_courses();

        info!(
            course_code = %assignment.course_code,
            color = %assignment.color_tag,
            slots = ?related,
            "时段分配完成"
        );
        Ok(related)
    }

    fn pick_color(&mut self, request: &AssignRequest) -> String {
        if let Some(color) = request.color.as_ref().filter(|c| !c.trim().is_empty()) {
            return color.clone();
        }
        if let Some(course) = self.data.find_course(&request.course_code) {
            return course.color.clone();
        }
        let color = self.palette[self.data.next_color_index % self.palette.len()].clone();
        self.data.next_color_index += 1;
        color
    }

    /// 清除时段（按等价规则展开）
    ///
    /// # 返回
    /// 实际清除的时段代码;主时段未分配时为空（不做任何修改）
    pub fn clear(&mut self, slot: &str) -> StoreResult<Vec<SlotCode>> {
        let related = self.resolver.resolve(slot)?;
        let primary_assigned = self
            .resolver
            .primary_code(slot, &related)
            .map(|code| self.data.assignments.contains_key(code))
            .unwrap_or(false);
        if !primary_assigned {
            debug!(slot = %slot, "主时段未分配,跳过清除");
            return Ok(Vec::new());
        }

        let mut cleared = Vec::new();
        for code in related {
            if let Some(assignment) = self.data.assignments.remove(&code) {
                if let Some(course) = self
                    .data
                    .courses
                    .iter_mut()
                    .find(|c| c.code == assignment.course_code)
                {
                    course.remove_slot(&code);
                }
                cleared.push(code);
            }
        }
        self.drop_empty_courses();

        info!(slot = %slot, cleared = ?cleared, "时段清除完成");
        Ok(cleared)
    }

    /// 清空全部分配与课程,调色板计数归零（时段偏好保留）
    pub fn clear_all(&mut self) {
        let slots = self.data.assignments.len();
        let courses = self.data.courses.len();
        self.data.assignments.clear();
        self.data.courses.clear();
        self.data.next_color_index = 0;
        info!(slots, courses, "课表已清空");
    }

    fn drop_empty_courses(&mut self) {
        self.data.courses.retain(|c| !c.slots.is_empty());
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn get_assignment(&self, code: &str) -> Option<&SlotAssignment> {
        self.data.assignments.get(code)
    }

    /// 已分配的时段代码（按键排序）
    pub fn assigned_codes(&self) -> Vec<SlotCode> {
        self.data.assignments.keys().cloned().collect()
    }

    pub fn courses(&self) -> &[Course] {
        &self.data.courses
    }

    pub fn find_course(&self, code: &str) -> Option<&Course> {
        self.data.find_course(code)
    }

    // ==========================================
    // 备选时段偏好
    // ==========================================

    /// 记录 "/" 备选时段的选择
    pub fn set_slot_preference(&mut self, compound: &str, choice: &str) -> StoreResult<()> {
        self.check_preference(compound, choice)?;
        self.data
            .slot_preferences
            .insert(compound.to_string(), choice.to_string());
        info!(compound = %compound, choice = %choice, "备选时段偏好已保存");
        Ok(())
    }

    fn check_preference(&self, compound: &str, choice: &str) -> StoreResult<()> {
        if !self.catalog().is_recognized(compound) {
            return Err(CatalogError::UnknownSlot(compound.to_string()).into());
        }
        let valid = is_alternative_code(compound) && alternative_parts(compound).contains(&choice);
        if !valid {
            return Err(StoreError::InvalidPreference {
                code: compound.to_string(),
                choice: choice.to_string(),
            });
        }
        Ok(())
    }

    pub fn slot_preference(&self, compound: &str) -> Option<&str> {
        self.data.slot_preferences.get(compound).map(String::as_str)
    }

    /// 单元格的显示代码: 有偏好时显示所选分量
    pub fn resolve_display(&self, cell_code: &str) -> String {
        self.slot_preference(cell_code)
            .unwrap_or(cell_code)
            .to_string()
    }

    // ==========================================
    // 快照 / 导入导出
    // ==========================================

    pub fn snapshot(&self) -> TimetableData {
        self.data.clone()
    }

    /// 校验数据块: 分配键均为目录时段、课程与分配一致、偏好合法
    pub fn validate_data(&self, data: &TimetableData) -> StoreResult<()> {
        let catalog = self.catalog();
        for code in data.assignments.keys() {
            if !catalog.is_recognized(code) {
                return Err(StoreError::InvalidData(format!("未知时段代码: {}", code)));
            }
        }
        data.check_consistency().map_err(StoreError::InvalidData)?;

        let mut ids = HashSet::new();
        for course in &data.courses {
            if !ids.insert(course.id.as_str()) {
                return Err(StoreError::InvalidData(format!("课程 id 重复: {}", course.id)));
            }
        }

        for (compound, choice) in &data.slot_preferences {
            self.check_preference(compound, choice)
                .map_err(|e| StoreError::InvalidData(e.to_string()))?;
        }
        Ok(())
    }

    /// 整体替换状态（先校验,失败时保持原状态）
    pub fn replace(&mut self, data: TimetableData) -> StoreResult<()> {
        self.validate_data(&data)?;
        self.data = data;
        Ok(())
    }

    /// 按当前等价规则补齐数据块
    ///
    /// 已分配的普通时段,其等价时段若未分配则写入同一课程;
    /// 已被其他课程占用的时段保持不变。"/" 备选单元不参与展开。
    ///
    /// # 返回
    /// 补齐的时段代码
    pub fn normalize_data(&self, data: &mut TimetableData) -> StoreResult<Vec<SlotCode>> {
        let plain: Vec<(SlotCode, SlotAssignment)> = data
            .assignments
            .iter()
            .filter(|(code, _)| !is_alternative_code(code))
            .map(|(code, a)| (code.clone(), a.clone()))
            .collect();

        let mut added = Vec::new();
        for (code, assignment) in plain {
            for related in self.resolver.resolve(&code)? {
                if data.assignments.contains_key(&related) {
                    continue;
                }
                data.assignments.insert(related.clone(), assignment.clone());
                if let Some(course) = data
                    .courses
                    .iter_mut()
                    .find(|c| c.code == assignment.course_code)
                {
                    course.merge_slots([&related]);
                }
                added.push(related);
            }
        }

        if !added.is_empty() {
            info!(
                rule = %self.resolver.table().version,
                added = ?added,
                "按当前等价规则补齐已保存的分配"
            );
        }
        Ok(added)
    }

    /// 恢复由 `snapshot` 取得的状态（快照来自本存储,不再校验）
    pub fn restore(&mut self, snapshot: TimetableData) {
        self.data = snapshot;
    }

    /// 导出为格式化 JSON
    pub fn export_data(&self) -> StoreResult<String> {
        serde_json::to_string_pretty(&self.data).map_err(|e| StoreError::InvalidData(e.to_string()))
    }

    /// 解析并校验数据块（不修改当前状态）
    pub fn parse_data(&self, raw: &str) -> StoreResult<TimetableData> {
        let data: TimetableData = serde_json::from_str(raw)
            .map_err(|e| StoreError::InvalidData(format!("JSON 解析失败: {}", e)))?;
        self.validate_data(&data)?;
        Ok(data)
    }

    /// 导入数据块
    pub fn import_data(&mut self, raw: &str) -> StoreResult<()> {
        match self.parse_data(raw) {
            Ok(data) => {
                info!(
                    slots = data.assignments.len(),
                    courses = data.courses.len(),
                    "课表数据已导入"
                );
                self.data = data;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "课表数据导入失败,保持原状态");
                Err(e)
            }
        }
    }
}
