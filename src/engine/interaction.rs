// ==========================================
// FFCS 课表规划器 - 交互流程状态机
// ==========================================
// 流程: Idle → AwaitingAlternativeChoice → AwaitingCombinationChoice
//       → AwaitingFormSubmit → Idle
// 红线: 提交之前不产生任何副作用（保存备选偏好除外）
// 红线: cancel 在任意状态回到 Idle,不修改存储
// ==========================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::timetable::SlotAssignment;
use crate::domain::types::{alternative_parts, is_alternative_code, SlotCode, SlotKind};
use crate::engine::assignment_store::{AssignRequest, AssignmentStore};
use crate::engine::combination::combinations_for;
use crate::engine::error::{CatalogError, InteractionError, InteractionResult};

// ==========================================
// InteractionState - 待决状态
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state")]
pub enum InteractionState {
    Idle,
    /// 点击了 "/" 备选单元格且没有保存的偏好
    AwaitingAlternativeChoice {
        slot: SlotCode,
        kind: SlotKind,
        alternatives: Vec<SlotCode>,
    },
    /// 时段有多个可选组合
    AwaitingCombinationChoice {
        slot: SlotCode,
        kind: SlotKind,
        combinations: Vec<Vec<SlotCode>>,
    },
    /// 等待填写课程表单
    AwaitingFormSubmit {
        slot: SlotCode,
        kind: SlotKind,
        combination: Option<Vec<SlotCode>>,
        /// 时段已分配时用于表单回填
        existing: Option<SlotAssignment>,
    },
}

impl InteractionState {
    pub fn name(&self) -> &'static str {
        match self {
            InteractionState::Idle => "Idle",
            InteractionState::AwaitingAlternativeChoice { .. } => "AwaitingAlternativeChoice",
            InteractionState::AwaitingCombinationChoice { .. } => "AwaitingCombinationChoice",
            InteractionState::AwaitingFormSubmit { .. } => "AwaitingFormSubmit",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }
}

impl Default for InteractionState {
    fn default() -> Self {
        InteractionState::Idle
    }
}

// ==========================================
// InteractionFlow - 单次交互
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct InteractionFlow {
    state: InteractionState,
}

impl InteractionFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    fn invalid(&self, action: &'static str) -> InteractionError {
        InteractionError::InvalidTransition {
            action,
            state: self.state.name(),
        }
    }

    /// 点击网格单元或侧边栏时段
    ///
    /// # 规则
    /// - "/" 备选且已有偏好 → 按偏好分量继续
    /// - "/" 备选且无偏好 → AwaitingAlternativeChoice
    /// - 普通时段 → 见 `enter_plain`
    pub fn click_slot(
        &mut self,
        store: &AssignmentStore<'_>,
        code: &str,
        kind: SlotKind,
    ) -> InteractionResult<&InteractionState> {
        if !store.catalog().is_recognized(code) {
            return Err(CatalogError::UnknownSlot(code.to_string()).into());
        }
        if !store.catalog().kinds_of(code).contains(&kind) {
            return Err(InteractionError::KindMismatch {
                code: code.to_string(),
                kind,
            });
        }

        if is_alternative_code(code) {
            if let Some(preferred) = store.slot_preference(code) {
                let preferred = preferred.to_string();
                self.enter_plain(store, &preferred, kind);
            } else {
                self.state = InteractionState::AwaitingAlternativeChoice {
                    slot: code.to_string(),
                    kind,
                    alternatives: alternative_parts(code).into_iter().map(str::to_string).collect(),
                };
            }
        } else {
            self.enter_plain(store, code, kind);
        }

        debug!(slot = %code, state = self.state.name(), "点击时段");
        Ok(&self.state)
    }

    /// 普通时段:
    /// - 已分配 → 表单（回填现有分配）
    /// - 多个组合 → AwaitingCombinationChoice
    /// - 唯一组合 → 表单（带组合）
    /// - 无组合 → 表单
    fn enter_plain(&mut self, store: &AssignmentStore<'_>, code: &str, kind: SlotKind) {
        if let Some(existing) = store.get_assignment(code) {
            self.state = InteractionState::AwaitingFormSubmit {
                slot: code.to_string(),
                kind,
                combination: None,
                existing: Some(existing.clone()),
            };
            return;
        }

        let mut combinations = combinations_for(code);
        self.state = match combinations.len() {
            0 => InteractionState::AwaitingFormSubmit {
                slot: code.to_string(),
                kind,
                combination: None,
                existing: None,
            },
            1 => InteractionState::AwaitingFormSubmit {
                slot: code.to_string(),
                kind,
                combination: combinations.pop(),
                existing: None,
            },
            _ => InteractionState::AwaitingCombinationChoice {
                slot: code.to_string(),
                kind,
                combinations,
            },
        };
    }

    /// 选择备选分量（同时保存偏好）
    pub fn choose_alternative(
        &mut self,
        store: &mut AssignmentStore<'_>,
        choice: &str,
    ) -> InteractionResult<&InteractionState> {
        let (slot, kind) = match &self.state {
            InteractionState::AwaitingAlternativeChoice { slot, kind, .. } => (slot.clone(), *kind),
            _ => return Err(self.invalid("choose_alternative")),
        };

        store.set_slot_preference(&slot, choice)?;
        self.enter_plain(store, choice, kind);
        Ok(&self.state)
    }

    /// 选择组合（按下标）
    pub fn choose_combination(&mut self, index: usize) -> InteractionResult<&InteractionState> {
        let next = match &self.state {
            InteractionState::AwaitingCombinationChoice {
                slot,
                kind,
                combinations,
            } => {
                let combination = combinations.get(index).cloned().ok_or_else(|| {
                    InteractionError::InvalidChoice(format!(
                        "组合下标 {} 越界（共 {} 个）",
                        index,
                        combinations.len()
                    ))
                })?;
                InteractionState::AwaitingFormSubmit {
                    slot: slot.clone(),
                    kind: *kind,
                    combination: Some(combination),
                    existing: None,
                }
            }
            _ => return Err(self.invalid("choose_combination")),
        };
        self.state = next;
        Ok(&self.state)
    }

    /// 提交表单: 有组合时分配组合内全部时段,否则分配所选时段
    ///
    /// # 返回
    /// 实际写入的时段代码
    pub fn submit(
        &mut self,
        store: &mut AssignmentStore<'_>,
        request: &AssignRequest,
    ) -> InteractionResult<Vec<SlotCode>> {
        let assigned = match &self.state {
            InteractionState::AwaitingFormSubmit {
                combination: Some(combination),
                ..
            } => store.assign_many(combination, request)?,
            InteractionState::AwaitingFormSubmit { slot, .. } => store.assign(slot, request)?,
            _ => return Err(self.invalid("submit")),
        };
        self.state = InteractionState::Idle;
        Ok(assigned)
    }

    /// 清除当前选中的时段
    pub fn clear_selected(&mut self, store: &mut AssignmentStore<'_>) -> InteractionResult<Vec<SlotCode>> {
        let cleared = match &self.state {
            InteractionState::AwaitingFormSubmit { slot, .. } => store.clear(slot)?,
            _ => return Err(self.invalid("clear_selected")),
        };
        self.state = InteractionState::Idle;
        Ok(cleared)
    }

    /// 取消（无副作用）
    pub fn cancel(&mut self) -> &InteractionState {
        self.state = InteractionState::Idle;
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::catalog::SlotCatalog;
    use crate::engine::equivalence::{EquivalenceResolver, EquivalenceTable};

    fn store() -> AssignmentStore<'static> {
        let resolver =
            EquivalenceResolver::new(SlotCatalog::standard(), EquivalenceTable::independent_v3()).unwrap();
        AssignmentStore::new(resolver, Vec::new())
    }

    fn request() -> AssignRequest {
        AssignRequest {
            course_code: "CSE1001".to_string(),
            course_name: "Problem Solving".to_string(),
            professor_name: "Dr. Menon".to_string(),
            color: None,
        }
    }

    #[test]
    fn test_alternative_then_single_combination() {
        let mut store = store();
        let mut flow = InteractionFlow::new();

        let state = flow.click_slot(&store, "A1/SE2", SlotKind::Theory).unwrap();
        assert_eq!(state.name(), "AwaitingAlternativeChoice");

        let state = flow.choose_alternative(&mut store, "A1").unwrap().clone();
        assert_eq!(
            state,
            InteractionState::AwaitingFormSubmit {
                slot: "A1".to_string(),
                kind: SlotKind::Theory,
                combination: Some(vec!["A1".to_string(), "TA1".to_string()]),
                existing: None,
            }
        );
        assert_eq!(store.slot_preference("A1/SE2"), Some("A1"));

        let assigned = flow.submit(&mut store, &request()).unwrap();
        assert!(assigned.contains(&"A1".to_string()));
        assert!(assigned.contains(&"TA1".to_string()));
        assert!(flow.state().is_idle());
    }

    #[test]
    fn test_saved_preference_skips_alternative_choice() {
        let mut store = store();
        store.set_slot_preference("B1/SD2", "SD2").unwrap();
        let mut flow = InteractionFlow::new();
        let state = flow.click_slot(&store, "B1/SD2", SlotKind::Theory).unwrap();
        // SD2 不属于任何组合
        assert!(matches!(
            state,
            InteractionState::AwaitingFormSubmit { slot, combination: None, .. } if slot == "SD2"
        ));
    }

    #[test]
    fn test_multiple_combinations() {
        let mut store = store();
        let mut flow = InteractionFlow::new();
        let state = flow.click_slot(&store, "D1", SlotKind::Theory).unwrap();
        assert_eq!(state.name(), "AwaitingCombinationChoice");

        assert!(matches!(
            flow.choose_combination(5),
            Err(InteractionError::InvalidChoice(_))
        ));
        flow.choose_combination(1).unwrap();
        let assigned = flow.submit(&mut store, &request()).unwrap();
        assert_eq!(assigned, vec!["D1", "TDD1"]);
    }

    #[test]
    fn test_existing_assignment_prefills_form_and_clears() {
        let mut store = store();
        store.assign("L1+L2", &request()).unwrap();
        let mut flow = InteractionFlow::new();
        let state = flow.click_slot(&store, "L1+L2", SlotKind::Lab).unwrap();
        match state {
            InteractionState::AwaitingFormSubmit { existing, .. } => {
                assert_eq!(existing.as_ref().unwrap().course_code, "CSE1001");
            }
            other => panic!("unexpected state: {:?}", other),
        }

        let cleared = flow.clear_selected(&mut store).unwrap();
        assert_eq!(cleared, vec!["L1+L2"]);
        assert!(store.get_assignment("L1+L2").is_none());
    }

    #[test]
    fn test_cancel_has_no_side_effect() {
        let mut store = store();
        let mut flow = InteractionFlow::new();
        flow.click_slot(&store, "C1", SlotKind::Theory).unwrap();
        let before = store.snapshot();
        assert!(flow.cancel().is_idle());
        assert_eq!(store.snapshot(), before);
        assert!(matches!(
            flow.submit(&mut store, &request()),
            Err(InteractionError::InvalidTransition { action: "submit", .. })
        ));
    }

    #[test]
    fn test_invalid_transitions_and_unknown_slot() {
        let mut store = store();
        let mut flow = InteractionFlow::new();
        assert!(flow.choose_combination(0).is_err());
        assert!(flow.choose_alternative(&mut store, "A1").is_err());
        assert!(flow.clear_selected(&mut store).is_err());
        assert!(flow.click_slot(&store, "G1", SlotKind::Theory).is_err());
        assert!(flow.state().is_idle());
    }

    #[test]
    fn test_click_with_wrong_kind_is_rejected() {
        let store = store();
        let mut flow = InteractionFlow::new();
        assert_eq!(
            flow.click_slot(&store, "L1+L2", SlotKind::Theory).unwrap_err(),
            InteractionError::KindMismatch {
                code: "L1+L2".to_string(),
                kind: SlotKind::Theory,
            }
        );
        assert!(flow.click_slot(&store, "A1/SE2", SlotKind::Lab).is_err());
        assert!(flow.state().is_idle());

        assert!(flow.click_slot(&store, "L1+L2", SlotKind::Lab).is_ok());
    }
}
