// ==========================================
// FFCS 课表规划器 - 理论课时段组合
// ==========================================
// 职责: 选中一个时段时,组合内的全部时段需一起选中
// 说明: 部分时段存在多个可选组合（如 D1 可与 TD1 或 TDD1 组合）,
//       需由用户选择其一
// ==========================================

use crate::domain::types::SlotCode;

const THEORY_SLOT_COMBINATIONS: [&[&str]; 15] = [
    &["A1", "TA1"],
    &["A2", "TA2"],
    &["B1", "SB1", "TB1"],
    &["B2", "SB2", "TB2"],
    &["C1", "TC1"],
    &["C2", "TC2"],
    &["D1", "TD1"],
    &["D1", "TDD1"],
    &["E1", "SE1", "TE1"],
    &["E2", "TE2", "TEE2"],
    &["E2", "SE2", "TE2"],
    &["F1", "TF1", "TFF1"],
    &["F1", "SF1", "TF1"],
    &["F2", "TF2", "TFF2"],
    &["F2", "SF2", "TF2"],
];

/// 包含指定时段的全部组合（按定义顺序）
pub fn combinations_for(code: &str) -> Vec<Vec<SlotCode>> {
    THEORY_SLOT_COMBINATIONS
        .iter()
        .filter(|combo| combo.contains(&code))
        .map(|combo| combo.iter().map(|s| s.to_string()).collect())
        .collect()
}

/// 是否存在多个可选组合
pub fn has_multiple_combinations(code: &str) -> bool {
    THEORY_SLOT_COMBINATIONS
        .iter()
        .filter(|combo| combo.contains(&code))
        .count()
        > 1
}

/// 组合的显示标签,如 "A1 + TA1"
pub fn combination_label(combination: &[SlotCode]) -> String {
    combination.join(" + ")
}
