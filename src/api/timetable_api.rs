// ==========================================
// FFCS 课表规划器 - 课表 API
// ==========================================
// 职责: 表单校验 → 等价展开 → 冲突检测 → 提交 → 持久化
// 红线: 每次成功变更后同步写入整块数据,写入失败时回滚内存状态
// 红线: 导入失败转换为状态结果,保持原状态
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{validate_assign_form, AssignForm};
use crate::config::ConfigManager;
use crate::domain::timetable::{Course, SlotAssignment, TimetableData};
use crate::domain::types::{SlotCode, SlotKind};
use crate::engine::assignment_store::AssignmentStore;
use crate::engine::catalog::SlotCatalog;
use crate::engine::clash::{ClashDetector, ClashReport};
use crate::engine::equivalence::{EquivalenceResolver, EquivalenceTable};
use crate::engine::interaction::{InteractionFlow, InteractionState};
use crate::exporter::{self, GridExporter, TimetableGrid};
use crate::i18n::{t, t_with_args};
use crate::repository::error::RepositoryError;
use crate::repository::timetable_repo::TimetableRepository;

// ==========================================
// 响应类型
// ==========================================

/// 变更操作结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotOperationResponse {
    pub slots: Vec<SlotCode>,
    pub message: String,
}

/// 导入结果（失败不抛错）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub success: bool,
    pub message: String,
}

/// 侧边栏摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarSummary {
    pub unassigned_theory: Vec<SlotCode>,
    pub unassigned_lab: Vec<SlotCode>,
    pub courses: Vec<Course>,
    pub assigned_slot_count: usize,
    pub course_count: usize,
}

// ==========================================
// TimetableApi - 课表 API
// ==========================================
pub struct TimetableApi {
    store: Mutex<AssignmentStore<'static>>,
    flow: Mutex<InteractionFlow>,
    repo: Arc<TimetableRepository>,
    storage_key: String,
}

impl TimetableApi {
    /// 按配置创建 API 并加载已保存的课表
    ///
    /// # 参数
    /// - repo: 课表数据块仓储
    /// - config: 配置管理器（等价规则、调色板、存储键）
    pub fn new(repo: Arc<TimetableRepository>, config: &ConfigManager) -> ApiResult<Self> {
        let table = config
            .get_equivalence_table()
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        let palette = config
            .get_color_palette()
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        let storage_key = config
            .get_storage_key()
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        Self::with_parts(repo, table, palette, &storage_key)
    }

    /// 由显式部件创建 API（测试与嵌入使用）
    pub fn with_parts(
        repo: Arc<TimetableRepository>,
        table: EquivalenceTable,
        palette: Vec<String>,
        storage_key: &str,
    ) -> ApiResult<Self> {
        let resolver = EquivalenceResolver::new(SlotCatalog::standard(), table)?;
        let mut store = AssignmentStore::new(resolver, palette);

        match repo.load(storage_key) {
            Ok(Some(mut data)) => match store.validate_data(&data) {
                Ok(()) => {
                    store.normalize_data(&mut data)?;
                    store.restore(data);
                }
                Err(e) => {
                    warn!(storage_key = %storage_key, error = %e, "已保存的课表数据无效,从空课表开始");
                }
            },
            Ok(None) => {}
            Err(RepositoryError::SerializationError(msg)) => {
                warn!(storage_key = %storage_key, error = %msg, "已保存的课表数据无法解析,从空课表开始");
            }
            Err(e) => return Err(e.into()),
        }

        info!(
            storage_key = %storage_key,
            rule = %store.resolver().table().version,
            slots = store.data().assignments.len(),
            "课表 API 初始化完成"
        );

        Ok(Self {
            store: Mutex::new(store),
            flow: Mutex::new(InteractionFlow::new()),
            repo,
            storage_key: storage_key.to_string(),
        })
    }

    fn lock_store(&self) -> ApiResult<MutexGuard<'_, AssignmentStore<'static>>> {
        self.store
            .lock()
            .map_err(|e| ApiError::InternalError(format!("课表存储锁获取失败: {}", e)))
    }

    fn lock_flow(&self) -> ApiResult<MutexGuard<'_, InteractionFlow>> {
        self.flow
            .lock()
            .map_err(|e| ApiError::InternalError(format!("交互状态锁获取失败: {}", e)))
    }

    fn persist(&self, store: &AssignmentStore<'_>) -> ApiResult<()> {
        self.repo.save(&self.storage_key, store.data())?;
        Ok(())
    }

    /// 持久化变更;写入失败时把内存状态回滚到变更前快照
    fn commit(&self, store: &mut AssignmentStore<'_>, before: TimetableData) -> ApiResult<()> {
        if let Err(e) = self.persist(store) {
            warn!(storage_key = %self.storage_key, error = %e, "课表持久化失败,内存状态已回滚");
            store.restore(before);
            return Err(e);
        }
        Ok(())
    }

    fn assigned_message(course_code: &str, slots: &[SlotCode]) -> String {
        let count = slots.len().to_string();
        t_with_args(
            "timetable.slots_assigned",
            &[("course", course_code), ("count", count.as_str())],
        )
    }

    fn cleared_message(slots: &[SlotCode]) -> String {
        if slots.is_empty() {
            return t("timetable.nothing_to_clear");
        }
        let count = slots.len().to_string();
        t_with_args("timetable.slots_cleared", &[("count", count.as_str())])
    }

    // ==========================================
    // 分配 / 清除
    // ==========================================

    /// 为时段分配课程
    ///
    /// # 返回
    /// - Ok(SlotOperationResponse): 写入的时段与提示消息
    /// - Err(ApiError::ValidationError): 表单无效（状态不变）
    pub fn assign_slot(&self, slot: &str, form: &AssignForm) -> ApiResult<SlotOperationResponse> {
        let request = validate_assign_form(form)?;
        let mut store = self.lock_store()?;
        let before = store.snapshot();
        let slots = store.assign(slot, &request)?;
        self.commit(&mut store, before)?;
        Ok(SlotOperationResponse {
            message: Self::assigned_message(&request.course_code, &slots),
            slots,
        })
    }

    /// 为一组时段（理论课组合）分配课程
    pub fn assign_combination(&self, slots: &[SlotCode], form: &AssignForm) -> ApiResult<SlotOperationResponse> {
        let request = validate_assign_form(form)?;
        if slots.is_empty() {
            return Err(ApiError::InvalidInput("时段列表不能为空".to_string()));
        }
        let mut store = self.lock_store()?;
        let before = store.snapshot();
        let assigned = store.assign_many(slots, &request)?;
        self.commit(&mut store, before)?;
        Ok(SlotOperationResponse {
            message: Self::assigned_message(&request.course_code, &assigned),
            slots: assigned,
        })
    }

    /// 清除时段（主时段未分配时不做修改）
    pub fn clear_slot(&self, slot: &str) -> ApiResult<SlotOperationResponse> {
        let mut store = self.lock_store()?;
        let before = store.snapshot();
        let cleared = store.clear(slot)?;
        if !cleared.is_empty() {
            self.commit(&mut store, before)?;
        }
        Ok(SlotOperationResponse {
            message: Self::cleared_message(&cleared),
            slots: cleared,
        })
    }

    /// 清空课表
    pub fn clear_all(&self) -> ApiResult<SlotOperationResponse> {
        let mut store = self.lock_store()?;
        let slots = store.assigned_codes();
        let before = store.snapshot();
        store.clear_all();
        self.commit(&mut store, before)?;
        Ok(SlotOperationResponse {
            slots,
            message: t("timetable.cleared_all"),
        })
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn get_assignment(&self, code: &str) -> ApiResult<Option<SlotAssignment>> {
        Ok(self.lock_store()?.get_assignment(code).cloned())
    }

    pub fn list_courses(&self) -> ApiResult<Vec<Course>> {
        Ok(self.lock_store()?.courses().to_vec())
    }

    pub fn list_assigned_codes(&self) -> ApiResult<Vec<SlotCode>> {
        Ok(self.lock_store()?.assigned_codes())
    }

    /// 展开时段代码（按当前等价规则）
    pub fn resolve_slot(&self, code: &str) -> ApiResult<Vec<SlotCode>> {
        Ok(self.lock_store()?.resolver().resolve(code)?)
    }

    /// 当前等价规则版本
    pub fn equivalence_version(&self) -> ApiResult<String> {
        Ok(self.lock_store()?.resolver().table().version.clone())
    }

    /// 候选时段的冲突（已分配时自身排在首位）
    pub fn get_slot_clashes(&self, candidate: &str) -> ApiResult<Vec<SlotCode>> {
        let store = self.lock_store()?;
        let detector = ClashDetector::new(store.catalog());
        Ok(detector.find_clashes(candidate, &store.assigned_codes())?)
    }

    /// 候选时段的冲突分类（已占用 / 时间冲突）
    pub fn classify_slot(&self, candidate: &str) -> ApiResult<ClashReport> {
        let store = self.lock_store()?;
        let detector = ClashDetector::new(store.catalog());
        Ok(detector.classify(candidate, &store.assigned_codes())?)
    }

    /// 与当前分配冲突的全部未分配时段（每次按当前分配重算）
    pub fn list_clashing_codes(&self) -> ApiResult<BTreeSet<SlotCode>> {
        let store = self.lock_store()?;
        let detector = ClashDetector::new(store.catalog());
        Ok(detector.find_all_clashing_codes(&store.assigned_codes())?)
    }

    /// 侧边栏摘要
    pub fn sidebar_summary(&self) -> ApiResult<SidebarSummary> {
        let store = self.lock_store()?;
        let catalog = store.catalog();
        let unassigned = |kind: SlotKind| -> Vec<SlotCode> {
            catalog
                .all_slots_of_kind(kind)
                .iter()
                .filter(|code| store.get_assignment(code).is_none())
                .cloned()
                .collect()
        };
        Ok(SidebarSummary {
            unassigned_theory: unassigned(SlotKind::Theory),
            unassigned_lab: unassigned(SlotKind::Lab),
            courses: store.courses().to_vec(),
            assigned_slot_count: store.data().assignments.len(),
            course_count: store.courses().len(),
        })
    }

    // ==========================================
    // 备选时段偏好
    // ==========================================

    pub fn set_slot_preference(&self, compound: &str, choice: &str) -> ApiResult<SlotOperationResponse> {
        let mut store = self.lock_store()?;
        let before = store.snapshot();
        store.set_slot_preference(compound, choice)?;
        self.commit(&mut store, before)?;
        Ok(SlotOperationResponse {
            slots: vec![compound.to_string()],
            message: t_with_args(
                "timetable.preference_saved",
                &[("slot", compound), ("choice", choice)],
            ),
        })
    }

    pub fn resolve_display(&self, cell_code: &str) -> ApiResult<String> {
        Ok(self.lock_store()?.resolve_display(cell_code))
    }

    // ==========================================
    // 导入 / 导出
    // ==========================================

    /// 导出课表数据块（格式化 JSON）
    pub fn export_data(&self) -> ApiResult<String> {
        Ok(self.lock_store()?.export_data()?)
    }

    /// 导入课表数据块
    ///
    /// # 返回
    /// - Ok(ImportOutcome { success: false }): 数据块无效,原状态保留
    /// - Err(ApiError): 持久化失败
    pub fn import_data(&self, raw: &str) -> ApiResult<ImportOutcome> {
        let mut store = self.lock_store()?;
        let mut data = match store.parse_data(raw) {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "课表数据导入失败,保持原状态");
                return Ok(ImportOutcome {
                    success: false,
                    message: t_with_args("timetable.import_failed", &[("reason", e.to_string().as_str())]),
                });
            }
        };

        store.normalize_data(&mut data)?;
        self.repo.save(&self.storage_key, &data)?;
        store.restore(data);
        info!(slots = store.data().assignments.len(), "课表数据已导入");
        Ok(ImportOutcome {
            success: true,
            message: t("timetable.import_success"),
        })
    }

    /// 保存课表到文件（目录路径时使用默认文件名）
    pub fn save_to_file(&self, path: &Path) -> ApiResult<PathBuf> {
        let target = if path.is_dir() {
            path.join(exporter::DEFAULT_SAVE_FILE_NAME)
        } else {
            path.to_path_buf()
        };
        let blob = self.export_data()?;
        std::fs::write(&target, blob)?;
        info!(path = %target.display(), "课表已保存到文件");
        Ok(target)
    }

    /// 从文件加载课表
    pub fn load_from_file(&self, path: &Path) -> ApiResult<ImportOutcome> {
        let raw = std::fs::read_to_string(path)?;
        self.import_data(&raw)
    }

    /// 构建网格模型（冲突单元置灰）
    pub fn export_grid(&self) -> ApiResult<TimetableGrid> {
        let store = self.lock_store()?;
        let clashing = ClashDetector::new(store.catalog()).find_all_clashing_codes(&store.assigned_codes())?;
        Ok(GridExporter::new(&store).build(&clashing)?)
    }

    pub fn export_grid_csv(&self) -> ApiResult<String> {
        let grid = self.export_grid()?;
        Ok(exporter::grid_to_csv(&grid)?)
    }

    pub fn export_grid_text(&self) -> ApiResult<String> {
        let grid = self.export_grid()?;
        Ok(exporter::grid_to_text(&grid))
    }

    /// 导出网格 CSV 文件（目录路径时使用默认文件名）
    pub fn export_grid_to_file(&self, path: &Path) -> ApiResult<PathBuf> {
        let target = if path.is_dir() {
            path.join(exporter::DEFAULT_GRID_FILE_NAME)
        } else {
            path.to_path_buf()
        };
        let grid = self.export_grid()?;
        exporter::write_grid_csv(&grid, &target)?;
        Ok(target)
    }

    // ==========================================
    // 交互流程
    // ==========================================

    pub fn interaction_state(&self) -> ApiResult<InteractionState> {
        Ok(self.lock_flow()?.state().clone())
    }

    pub fn click_slot(&self, code: &str, kind: SlotKind) -> ApiResult<InteractionState> {
        let store = self.lock_store()?;
        let mut flow = self.lock_flow()?;
        Ok(flow.click_slot(&store, code, kind)?.clone())
    }

    /// 选择备选分量（保存偏好并持久化）
    pub fn choose_alternative(&self, choice: &str) -> ApiResult<InteractionState> {
        let mut store = self.lock_store()?;
        let mut flow = self.lock_flow()?;
        let (before, flow_before) = (store.snapshot(), flow.clone());
        let state = flow.choose_alternative(&mut store, choice)?.clone();
        if let Err(e) = self.commit(&mut store, before) {
            *flow = flow_before;
            return Err(e);
        }
        Ok(state)
    }

    pub fn choose_combination(&self, index: usize) -> ApiResult<InteractionState> {
        let mut flow = self.lock_flow()?;
        Ok(flow.choose_combination(index)?.clone())
    }

    /// 提交表单（校验失败时保持当前待决状态）
    pub fn submit_form(&self, form: &AssignForm) -> ApiResult<SlotOperationResponse> {
        let request = validate_assign_form(form)?;
        let mut store = self.lock_store()?;
        let mut flow = self.lock_flow()?;
        let (before, flow_before) = (store.snapshot(), flow.clone());
        let slots = flow.submit(&mut store, &request)?;
        if let Err(e) = self.commit(&mut store, before) {
            *flow = flow_before;
            return Err(e);
        }
        Ok(SlotOperationResponse {
            message: Self::assigned_message(&request.course_code, &slots),
            slots,
        })
    }

    pub fn clear_selected(&self) -> ApiResult<SlotOperationResponse> {
        let mut store = self.lock_store()?;
        let mut flow = self.lock_flow()?;
        let (before, flow_before) = (store.snapshot(), flow.clone());
        let cleared = flow.clear_selected(&mut store)?;
        if !cleared.is_empty() {
            if let Err(e) = self.commit(&mut store, before) {
                *flow = flow_before;
                return Err(e);
            }
        }
        Ok(SlotOperationResponse {
            message: Self::cleared_message(&cleared),
            slots: cleared,
        })
    }

    pub fn cancel_interaction(&self) -> ApiResult<InteractionState> {
        let mut flow = self.lock_flow()?;
        Ok(flow.cancel().clone())
    }
}
