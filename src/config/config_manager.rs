// ==========================================
// FFCS 课表规划器 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (key-value + scope)
// 约定: 配置缺失或格式错误时回退默认值并告警,不中断启动
// ==========================================

use crate::db::open_sqlite_connection;
use crate::engine::assignment_store::default_palette;
use crate::engine::catalog::SlotCatalog;
use crate::engine::equivalence::{EquivalenceRule, EquivalenceTable};
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 默认等价规则
pub const DEFAULT_EQUIVALENCE_RULE: EquivalenceRule = EquivalenceRule::PrefixV2;

/// 默认存储键
pub const DEFAULT_STORAGE_KEY: &str = "ffcs-timetable-data";

/// 默认界面语言
pub const DEFAULT_LOCALE: &str = "zh-CN";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）,并确保 config_kv 表存在。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
            conn_guard.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS config_kv (
                  scope_id TEXT NOT NULL DEFAULT 'global',
                  key TEXT NOT NULL,
                  value TEXT NOT NULL,
                  PRIMARY KEY (scope_id, key)
                );
                "#,
            )?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global scope 的配置值（Upsert）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        tracing::info!(config_key = %key, "配置已更新");
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    // ===== 等价规则 =====

    /// 获取等价规则版本（默认 prefix-v2）
    pub fn get_equivalence_rule(&self) -> Result<EquivalenceRule, Box<dyn Error>> {
        let value = self.get_config_or_default(
            config_keys::EQUIVALENCE_RULE,
            DEFAULT_EQUIVALENCE_RULE.as_str(),
        )?;
        Ok(EquivalenceRule::parse(&value).unwrap_or_else(|| {
            tracing::warn!(
                config_key = config_keys::EQUIVALENCE_RULE,
                raw_value = %value,
                "等价规则配置无效，使用默认规则"
            );
            DEFAULT_EQUIVALENCE_RULE
        }))
    }

    /// 获取生效的等价规则表
    ///
    /// # 说明
    /// - custom 规则从 equivalence_table 读取 JSON 并按标准目录校验
    /// - 自定义表缺失或无效时回退默认规则
    pub fn get_equivalence_table(&self) -> Result<EquivalenceTable, Box<dyn Error>> {
        let rule = self.get_equivalence_rule()?;
        if let Some(table) = EquivalenceTable::builtin(rule) {
            return Ok(table);
        }

        let fallback = || {
            EquivalenceTable::builtin(DEFAULT_EQUIVALENCE_RULE)
                .unwrap_or_else(EquivalenceTable::prefix_v2)
        };

        let raw = match self.get_config_value(config_keys::EQUIVALENCE_TABLE)? {
            Some(raw) => raw,
            None => {
                tracing::warn!(
                    config_key = config_keys::EQUIVALENCE_TABLE,
                    "custom 规则缺少等价规则表，使用默认规则"
                );
                return Ok(fallback());
            }
        };

        let parsed = EquivalenceTable::from_json(&raw)
            .and_then(|table| table.validate(SlotCatalog::standard()).map(|_| table));
        match parsed {
            Ok(table) => Ok(table),
            Err(e) => {
                tracing::warn!(
                    config_key = config_keys::EQUIVALENCE_TABLE,
                    error = %e,
                    "等价规则表无效，使用默认规则"
                );
                Ok(fallback())
            }
        }
    }

    // ===== 调色板 =====

    /// 获取课程调色板
    ///
    /// # 说明
    /// 配置格式为 JSON 数组: ["#3B82F6", "#10B981", ...]
    /// 缺失、格式错误或为空时使用默认 10 色调色板
    pub fn get_color_palette(&self) -> Result<Vec<String>, Box<dyn Error>> {
        let value = match self.get_config_value(config_keys::COLOR_PALETTE)? {
            Some(v) => v,
            None => return Ok(default_palette()),
        };
        match serde_json::from_str::<Vec<String>>(&value) {
            Ok(colors) if !colors.is_empty() && colors.iter().all(|c| !c.trim().is_empty()) => Ok(colors),
            _ => {
                tracing::warn!(
                    config_key = config_keys::COLOR_PALETTE,
                    raw_value = %value,
                    "调色板配置格式错误，使用默认调色板"
                );
                Ok(default_palette())
            }
        }
    }

    // ===== 存储 / 界面 =====

    /// 获取课表数据块的存储键
    pub fn get_storage_key(&self) -> Result<String, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::STORAGE_KEY, DEFAULT_STORAGE_KEY)?;
        if value.trim().is_empty() {
            return Ok(DEFAULT_STORAGE_KEY.to_string());
        }
        Ok(value)
    }

    /// 获取界面语言
    pub fn get_locale(&self) -> Result<String, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::LOCALE, DEFAULT_LOCALE)?;
        if crate::i18n::SUPPORTED_LOCALES.contains(&value.as_str()) {
            Ok(value)
        } else {
            tracing::warn!(config_key = config_keys::LOCALE, raw_value = %value, "界面语言配置无效");
            Ok(DEFAULT_LOCALE.to_string())
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 等价规则
    pub const EQUIVALENCE_RULE: &str = "equivalence_rule";
    pub const EQUIVALENCE_TABLE: &str = "equivalence_table"; // custom 规则表 (JSON)

    // 课程颜色
    pub const COLOR_PALETTE: &str = "color_palette"; // JSON 数组

    // 存储
    pub const STORAGE_KEY: &str = "storage_key";

    // 界面
    pub const LOCALE: &str = "locale";
}
