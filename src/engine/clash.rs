// ==========================================
// FFCS 课表规划器 - 时段冲突检测
// ==========================================
// 规则: 同一天内,候选时段与已分配时段的时间区间重叠即冲突
// 区间: 半开区间,端点相接不算冲突
// 自冲突: 候选时段已被分配时,报告其自身（表示"已占用"）
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

use crate::domain::types::{SlotCode, SlotOccurrence, TimeRange};
use crate::engine::catalog::SlotCatalog;
use crate::engine::error::{CatalogError, CatalogResult};

/// 区间重叠判断: a.start < b.end && b.start < a.end
pub fn overlaps(a: &TimeRange, b: &TimeRange) -> bool {
    a.start_min < b.end_min && b.start_min < a.end_min
}

/// 冲突分类结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClashReport {
    /// 候选时段本身已被分配
    pub occupied: bool,
    /// 与候选时段时间重叠的其他已分配时段
    pub time_conflicts: Vec<SlotCode>,
}

impl ClashReport {
    pub fn has_clash(&self) -> bool {
        self.occupied || !self.time_conflicts.is_empty()
    }
}

// ==========================================
// ClashDetector - 冲突检测器
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct ClashDetector<'a> {
    catalog: &'a SlotCatalog,
}

impl<'a> ClashDetector<'a> {
    pub fn new(catalog: &'a SlotCatalog) -> Self {
        Self { catalog }
    }

    /// 时段代码在目录中的全部出现位置（精确匹配单元格代码）
    pub fn occurrences_of(&self, code: &str) -> Vec<SlotOccurrence> {
        self.catalog
            .cells()
            .filter(|cell| cell.code == code)
            .map(|cell| cell.occurrence)
            .collect()
    }

    fn timed_occurrences(&self, code: &str) -> CatalogResult<Vec<(SlotOccurrence, TimeRange)>> {
        self.occurrences_of(code)
            .into_iter()
            .map(|occ| Ok((occ, self.catalog.time_range_of(occ.kind, occ.column)?)))
            .collect()
    }

    /// 候选时段与其他已分配时段是否存在同日时间重叠
    fn time_clash_with(
        &self,
        candidate: &[(SlotOccurrence, TimeRange)],
        other: &str,
    ) -> CatalogResult<bool> {
        let other = self.timed_occurrences(other)?;
        Ok(candidate.iter().any(|(occ_a, range_a)| {
            other
                .iter()
                .any(|(occ_b, range_b)| occ_a.day == occ_b.day && overlaps(range_a, range_b))
        }))
    }

    /// 分类冲突: 已占用 与 时间冲突 分开报告
    pub fn classify<S: AsRef<str>>(&self, candidate: &str, assigned: &[S]) -> CatalogResult<ClashReport> {
        if !self.catalog.is_recognized(candidate) {
            return Err(CatalogError::UnknownSlot(candidate.to_string()));
        }
        let candidate_occurrences = self.timed_occurrences(candidate)?;
        let mut report = ClashReport::default();
        let mut seen: HashSet<&str> = HashSet::new();

        for code in assigned {
            let code = code.as_ref();
            if code == candidate {
                report.occupied = true;
                continue;
            }
            if !seen.insert(code) {
                continue;
            }
            if self.time_clash_with(&candidate_occurrences, code)? {
                report.time_conflicts.push(code.to_string());
            }
        }

        Ok(report)
    }

    /// 查找候选时段的冲突
    ///
    /// # 返回
    /// 冲突时段列表;候选时段已分配时其自身排在首位
    pub fn find_clashes<S: AsRef<str>>(&self, candidate: &str, assigned: &[S]) -> CatalogResult<Vec<SlotCode>> {
        let report = self.classify(candidate, assigned)?;
        let mut clashes = Vec::with_capacity(report.time_conflicts.len() + 1);
        if report.occupied {
            clashes.push(candidate.to_string());
        }
        clashes.extend(report.time_conflicts);
        Ok(clashes)
    }

    /// 全部与当前分配冲突的未分配单元格代码（用于网格置灰）
    pub fn find_all_clashing_codes<S: AsRef<str>>(&self, assigned: &[S]) -> CatalogResult<BTreeSet<SlotCode>> {
        let assigned_set: HashSet<&str> = assigned.iter().map(|s| s.as_ref()).collect();
        let mut clashing = BTreeSet::new();

        for code in self.catalog.distinct_cell_codes() {
            if assigned_set.contains(code) {
                continue;
            }
            if !self.find_clashes(code, assigned)?.is_empty() {
                clashing.insert(code.to_string());
            }
        }

        debug!(assigned = assigned.len(), clashing = clashing.len(), "冲突时段重算完成");
        Ok(clashing)
    }
}
