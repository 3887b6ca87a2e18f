// ==========================================
// FFCS 课表规划器 - 等价时段解析
// ==========================================
// 职责: 将点击的时段代码展开为必须一起分配/清除的全部具体时段
// 输入: 时段代码（可能为 "A1/SE2" 形式的备选组合）
// 输出: 目录中存在的具体时段代码（按发现顺序,去重）
// ==========================================
// 红线: 等价规则是可配置、带版本的声明式数据表,不做字符串推断
// 红线: "+" 连排实验课为原子时段,不再拆分
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::debug;

use crate::domain::types::{alternative_parts, is_alternative_code, SlotCode};
use crate::engine::catalog::SlotCatalog;
use crate::engine::error::{CatalogError, CatalogResult};

// ==========================================
// 等价规则版本
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EquivalenceRule {
    /// 每个时段独立（A1 ≠ TA1 ≠ SA1）
    IndependentV3,
    /// 去掉单字母前缀后相同的时段等价（A1 = TA1 = SA1）
    PrefixV2,
    /// 由配置加载的自定义规则表
    Custom,
}

impl EquivalenceRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquivalenceRule::IndependentV3 => "independent-v3",
            EquivalenceRule::PrefixV2 => "prefix-v2",
            EquivalenceRule::Custom => "custom",
        }
    }

    pub fn parse(s: &str) -> Option<EquivalenceRule> {
        match s.trim().to_lowercase().as_str() {
            "independent-v3" | "independent" => Some(EquivalenceRule::IndependentV3),
            "prefix-v2" | "prefix" => Some(EquivalenceRule::PrefixV2),
            "custom" => Some(EquivalenceRule::Custom),
            _ => None,
        }
    }
}

impl fmt::Display for EquivalenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// prefix-v2: 双字母时段（TDD1、TEE2、TFF1 …）与实验课保持独立
const PREFIX_V2_CLASSES: [(&str, [&str; 3]); 12] = [
    ("A1", ["A1", "TA1", "SA1"]),
    ("A2", ["A2", "TA2", "SA2"]),
    ("B1", ["B1", "TB1", "SB1"]),
    ("B2", ["B2", "TB2", "SB2"]),
    ("C1", ["C1", "TC1", "SC1"]),
    ("C2", ["C2", "TC2", "SC2"]),
    ("D1", ["D1", "TD1", "SD1"]),
    ("D2", ["D2", "TD2", "SD2"]),
    ("E1", ["E1", "TE1", "SE1"]),
    ("E2", ["E2", "TE2", "SE2"]),
    ("F1", ["F1", "TF1", "SF1"]),
    ("F2", ["F2", "TF2", "SF2"]),
];

// ==========================================
// EquivalenceTable - 等价规则表
// ==========================================

/// 等价类
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquivalenceClass {
    pub id: String,
    pub members: Vec<SlotCode>,
}

/// 等价规则表（未列出的时段自成一类）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquivalenceTable {
    pub version: String,
    #[serde(default)]
    pub classes: Vec<EquivalenceClass>,
}

impl EquivalenceTable {
    /// 每个时段独立
    pub fn independent_v3() -> Self {
        Self {
            version: EquivalenceRule::IndependentV3.as_str().to_string(),
            classes: Vec::new(),
        }
    }

    /// 前缀等价
    pub fn prefix_v2() -> Self {
        Self {
            version: EquivalenceRule::PrefixV2.as_str().to_string(),
            classes: PREFIX_V2_CLASSES
                .iter()
                .map(|(id, members)| EquivalenceClass {
                    id: id.to_string(),
                    members: members.iter().map(|m| m.to_string()).collect(),
                })
                .collect(),
        }
    }

    /// 内置规则对应的规则表;Custom 无内置表
    pub fn builtin(rule: EquivalenceRule) -> Option<Self> {
        match rule {
            EquivalenceRule::IndependentV3 => Some(Self::independent_v3()),
            EquivalenceRule::PrefixV2 => Some(Self::prefix_v2()),
            EquivalenceRule::Custom => None,
        }
    }

    /// 从 JSON 加载规则表
    pub fn from_json(raw: &str) -> CatalogResult<Self> {
        serde_json::from_str(raw).map_err(|e| CatalogError::InvalidEquivalenceTable {
            version: "custom".to_string(),
            message: format!("JSON 解析失败: {}", e),
        })
    }

    /// 校验规则表
    ///
    /// # 验证规则
    /// 1. 等价类 id 唯一且非空
    /// 2. 等价类成员非空,且均为目录认可的时段
    /// 3. 同一时段不能属于两个等价类
    /// 4. 成员不能为 "/" 备选组合
    pub fn validate(&self, catalog: &SlotCatalog) -> CatalogResult<()> {
        let invalid = |message: String| CatalogError::InvalidEquivalenceTable {
            version: self.version.clone(),
            message,
        };

        let mut ids = HashSet::new();
        let mut owners: HashMap<&str, &str> = HashMap::new();
        for class in &self.classes {
            if class.id.trim().is_empty() {
                return Err(invalid("等价类 id 为空".to_string()));
            }
            if !ids.insert(class.id.as_str()) {
                return Err(invalid(format!("等价类 id 重复: {}", class.id)));
            }
            if class.members.is_empty() {
                return Err(invalid(format!("等价类 {} 没有成员", class.id)));
            }
            for member in &class.members {
                if is_alternative_code(member) {
                    return Err(invalid(format!("等价类 {} 含备选组合 {}", class.id, member)));
                }
                if !catalog.is_recognized(member) {
                    return Err(invalid(format!("等价类 {} 含未知时段 {}", class.id, member)));
                }
                if let Some(owner) = owners.insert(member.as_str(), class.id.as_str()) {
                    if owner != class.id {
                        return Err(invalid(format!(
                            "时段 {} 同时属于等价类 {} 与 {}",
                            member, owner, class.id
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

// ==========================================
// EquivalenceResolver - 等价时段解析器
// ==========================================
pub struct EquivalenceResolver<'a> {
    catalog: &'a SlotCatalog,
    table: EquivalenceTable,
    /// 时段代码 → 等价类下标
    index: HashMap<SlotCode, usize>,
}

impl<'a> EquivalenceResolver<'a> {
    /// 创建解析器（规则表先经校验）
    pub fn new(catalog: &'a SlotCatalog, table: EquivalenceTable) -> CatalogResult<Self> {
        table.validate(catalog)?;
        let mut index = HashMap::new();
        for (i, class) in table.classes.iter().enumerate() {
            for member in &class.members {
                index.insert(member.clone(), i);
            }
        }
        Ok(Self {
            catalog,
            table,
            index,
        })
    }

    pub fn catalog(&self) -> &'a SlotCatalog {
        self.catalog
    }

    pub fn table(&self) -> &EquivalenceTable {
        &self.table
    }

    /// 普通时段的等价类成员（输入时段在首位）
    pub fn class_of(&self, code: &str) -> Vec<SlotCode> {
        let mut members = vec![code.to_string()];
        if let Some(&i) = self.index.get(code) {
            for member in &self.table.classes[i].members {
                if member != code {
                    members.push(member.clone());
                }
            }
        }
        members
    }

    /// 展开时段代码
    ///
    /// # 算法
    /// 1. 对每个 "/" 分量计算等价类 E（分量未知 → UnknownSlot）
    /// 2. 先输出 E 中目录认可的成员（输入分量在前）
    /// 3. 扫描整个目录,收集 "/" 分量与 E 相交的单元格代码
    ///
    /// # 返回
    /// 按首次发现顺序去重的时段代码,至少包含输入的各分量
    pub fn resolve(&self, code: &str) -> CatalogResult<Vec<SlotCode>> {
        let parts = alternative_parts(code);
        if parts.is_empty() {
            return Err(CatalogError::UnknownSlot(code.to_string()));
        }

        let mut class_set: HashSet<SlotCode> = HashSet::new();
        let mut seen: HashSet<SlotCode> = HashSet::new();
        let mut related: Vec<SlotCode> = Vec::new();

        for part in parts {
            if !self.catalog.is_recognized(part) {
                return Err(CatalogError::UnknownSlot(part.to_string()));
            }
            for member in self.class_of(part) {
                class_set.insert(member.clone());
                if self.catalog.is_recognized(&member) && seen.insert(member.clone()) {
                    related.push(member);
                }
            }
        }

        for cell in self.catalog.cells() {
            if seen.contains(cell.code) {
                continue;
            }
            let intersects = alternative_parts(cell.code)
                .into_iter()
                .any(|p| class_set.contains(p));
            if intersects {
                seen.insert(cell.code.to_string());
                related.push(cell.code.to_string());
            }
        }

        debug!(code = %code, rule = %self.table.version, related = ?related, "时段展开完成");
        Ok(related)
    }

    /// 展开一组已解析的时段
    ///
    /// 普通时段再次展开;"/" 备选单元格已是具体单元,原样保留
    pub fn resolve_many(&self, codes: &[SlotCode]) -> CatalogResult<Vec<SlotCode>> {
        let mut seen: HashSet<SlotCode> = HashSet::new();
        let mut related = Vec::new();
        for code in codes {
            if is_alternative_code(code) {
                if !self.catalog.is_recognized(code) {
                    return Err(CatalogError::UnknownSlot(code.clone()));
                }
                if seen.insert(code.clone()) {
                    related.push(code.clone());
                }
                continue;
            }
            for resolved in self.resolve(code)? {
                if seen.insert(resolved.clone()) {
                    related.push(resolved);
                }
            }
        }
        Ok(related)
    }

    /// 展开结果中的主时段: 输入本身在结果中则为输入,否则为首个结果
    pub fn primary_code<'r>(&self, code: &str, related: &'r [SlotCode]) -> Option<&'r SlotCode> {
        related
            .iter()
            .find(|c| c.as_str() == code)
            .or_else(|| related.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn as_set(codes: &[SlotCode]) -> BTreeSet<String> {
        codes.iter().cloned().collect()
    }

    fn prefix_resolver() -> EquivalenceResolver<'static> {
        EquivalenceResolver::new(SlotCatalog::standard(), EquivalenceTable::prefix_v2()).unwrap()
    }

    fn independent_resolver() -> EquivalenceResolver<'static> {
        EquivalenceResolver::new(SlotCatalog::standard(), EquivalenceTable::independent_v3())
            .unwrap()
    }

    #[test]
    fn test_builtin_tables_are_valid() {
        let catalog = SlotCatalog::standard();
        assert!(EquivalenceTable::independent_v3().validate(catalog).is_ok());
        assert!(EquivalenceTable::prefix_v2().validate(catalog).is_ok());
        assert!(EquivalenceTable::builtin(EquivalenceRule::Custom).is_none());
    }

    #[test]
    fn test_rule_parse() {
        assert_eq!(EquivalenceRule::parse("prefix-v2"), Some(EquivalenceRule::PrefixV2));
        assert_eq!(EquivalenceRule::parse(" INDEPENDENT-V3 "), Some(EquivalenceRule::IndependentV3));
        assert_eq!(EquivalenceRule::parse("strip"), None);
    }

    #[test]
    fn test_independent_resolve_plain() {
        let resolver = independent_resolver();
        let related = resolver.resolve("A1").unwrap();
        assert_eq!(related, vec!["A1", "A1/SE2", "A1/SB2", "A1/SF2"]);
    }

    #[test]
    fn test_independent_resolve_repeated_cell() {
        let resolver = independent_resolver();
        // E1 在 MON 出现两次,FRI 一次,结果只保留一份
        assert_eq!(resolver.resolve("E1").unwrap(), vec!["E1"]);
        assert_eq!(resolver.resolve("TDD2").unwrap(), vec!["TDD2"]);
    }

    #[test]
    fn test_prefix_resolve_contains_class() {
        let resolver = prefix_resolver();
        let related = resolver.resolve("A1").unwrap();
        assert_eq!(&related[..3], &["A1", "TA1", "SA1"]);
        assert!(related.contains(&"A1/SE2".to_string()));
        assert!(related.contains(&"B2/SA1".to_string()));

        let from_ta1 = resolver.resolve("TA1").unwrap();
        assert_eq!(from_ta1[0], "TA1");
        assert_eq!(as_set(&from_ta1), as_set(&related));
    }

    #[test]
    fn test_resolve_compound_code() {
        let resolver = independent_resolver();
        let related = resolver.resolve("A1/SE2").unwrap();
        assert_eq!(&related[..2], &["A1", "SE2"]);
        assert!(related.contains(&"A1/SE2".to_string()));
        assert!(related.contains(&"A1/SB2".to_string()));
    }

    #[test]
    fn test_lab_pair_is_atomic() {
        let resolver = prefix_resolver();
        assert_eq!(resolver.resolve("L61+L62").unwrap(), vec!["L61+L62"]);
        assert!(matches!(
            resolver.resolve("L61"),
            Err(CatalogError::UnknownSlot(code)) if code == "L61"
        ));
    }

    #[test]
    fn test_unknown_slot() {
        let resolver = prefix_resolver();
        assert_eq!(
            resolver.resolve("G1").unwrap_err(),
            CatalogError::UnknownSlot("G1".to_string())
        );
        assert!(resolver.resolve("").is_err());
        assert!(resolver.resolve("A1/G2").is_err());
    }

    #[test]
    fn test_resolve_is_idempotent() {
        for resolver in [independent_resolver(), prefix_resolver()] {
            let catalog = resolver.catalog();
            let mut inputs: Vec<String> = catalog.distinct_cell_codes().iter().map(|s| s.to_string()).collect();
            inputs.extend(catalog.all_slots_of_kind(crate::domain::types::SlotKind::Theory).iter().cloned());
            for code in inputs {
                let once = resolver.resolve(&code).unwrap();
                let twice = resolver.resolve_many(&once).unwrap();
                assert_eq!(as_set(&once), as_set(&twice), "rule={} code={}", resolver.table().version, code);
            }
        }
    }

    #[test]
    fn test_primary_code() {
        let resolver = independent_resolver();
        let related = resolver.resolve("A1").unwrap();
        assert_eq!(resolver.primary_code("A1", &related).unwrap(), "A1");
        let compound = resolver.resolve("A1/SE2").unwrap();
        assert_eq!(resolver.primary_code("A1/SE2", &compound).unwrap(), "A1/SE2");
    }

    #[test]
    fn test_custom_table_validation() {
        let catalog = SlotCatalog::standard();
        let raw = r#"{"version": "custom-1", "classes": [{"id": "D1", "members": ["D1", "TD1", "TDD1"]}]}"#;
        let table = EquivalenceTable::from_json(raw).unwrap();
        let resolver = EquivalenceResolver::new(catalog, table).unwrap();
        let related = resolver.resolve("TDD1").unwrap();
        assert_eq!(&related[..3], &["TDD1", "D1", "TD1"]);

        let overlapping = r#"{"version": "bad", "classes": [
            {"id": "x", "members": ["A1", "TA1"]},
            {"id": "y", "members": ["TA1", "SA1"]}
        ]}"#;
        let table = EquivalenceTable::from_json(overlapping).unwrap();
        assert!(EquivalenceResolver::new(catalog, table).is_err());

        let unknown = r#"{"version": "bad", "classes": [{"id": "g", "members": ["G1"]}]}"#;
        let table = EquivalenceTable::from_json(unknown).unwrap();
        assert!(table.validate(catalog).is_err());

        assert!(EquivalenceTable::from_json("not json").is_err());
    }
}
