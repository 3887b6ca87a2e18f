// ==========================================
// FFCS 课表规划器 - 课表数据块仓储
// ==========================================
// 职责: 管理 app_kv 表 (key → JSON 数据块)
// 说明: 每次变更后整块替换写入,单条 UPSERT 保证原子性
// ==========================================

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::db::open_sqlite_connection;
use crate::domain::timetable::TimetableData;
use crate::repository::error::{RepositoryError, RepositoryResult};

/// 存储的原始数据块
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

pub struct TimetableRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TimetableRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let repo = Self { conn };
        repo.ensure_table()?;
        Ok(repo)
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 确保表存在（如果不存在则创建）
    fn ensure_table(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS app_kv (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL,
              updated_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// 写入原始数据块（Upsert）
    pub fn save_raw(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            r#"
            INSERT INTO app_kv (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value, now],
        )?;
        debug!(key = %key, bytes = value.len(), "数据块已写入");
        Ok(())
    }

    /// 读取原始数据块
    pub fn load_raw(&self, key: &str) -> RepositoryResult<Option<StoredBlob>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                "SELECT key, value, updated_at FROM app_kv WHERE key = ?1",
                params![key],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((key, value, updated_at)) => {
                let updated_at = DateTime::parse_from_rfc3339(&updated_at)
                    .map(|t| t.with_timezone(&Utc))
                    .map_err(|e| {
                        RepositoryError::InternalError(format!("updated_at 解析失败: {}", e))
                    })?;
                Ok(Some(StoredBlob {
                    key,
                    value,
                    updated_at,
                }))
            }
            None => Ok(None),
        }
    }

    /// 保存课表数据
    pub fn save(&self, key: &str, data: &TimetableData) -> RepositoryResult<()> {
        let value = serde_json::to_string(data)?;
        self.save_raw(key, &value)
    }

    /// 读取课表数据（不存在返回 None）
    pub fn load(&self, key: &str) -> RepositoryResult<Option<TimetableData>> {
        match self.load_raw(key)? {
            Some(blob) => Ok(Some(serde_json::from_str(&blob.value)?)),
            None => Ok(None),
        }
    }

    /// 删除数据块,返回是否存在
    pub fn delete(&self, key: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM app_kv WHERE key = ?1", params![key])?;
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::timetable::{Course, SlotAssignment};
    use tempfile::NamedTempFile;

    fn repo() -> (NamedTempFile, TimetableRepository) {
        let tmp = NamedTempFile::new().unwrap();
        let repo = TimetableRepository::new(tmp.path().to_str().unwrap()).unwrap();
        (tmp, repo)
    }

    #[test]
    fn test_load_missing_key() {
        let (_tmp, repo) = repo();
        assert!(repo.load("ffcs-timetable-data").unwrap().is_none());
        assert!(!repo.delete("ffcs-timetable-data").unwrap());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let (_tmp, repo) = repo();
        let mut data = TimetableData::default();
        let assignment = SlotAssignment {
            course_code: "CSE1001".to_string(),
            course_name: "Problem Solving".to_string(),
            professor_name: "Dr. Rao".to_string(),
            color_tag: "#3B82F6".to_string(),
        };
        data.assignments.insert("L1+L2".to_string(), assignment);
        data.courses.push(Course {
            id: "c-1".to_string(),
            code: "CSE1001".to_string(),
            name: "Problem Solving".to_string(),
            professor: "Dr. Rao".to_string(),
            color: "#3B82F6".to_string(),
            slots: vec!["L1+L2".to_string()],
        });
        data.next_color_index = 1;

        repo.save("k", &data).unwrap();
        assert_eq!(repo.load("k").unwrap(), Some(data.clone()));

        // 第二次写入覆盖
        data.next_color_index = 2;
        repo.save("k", &data).unwrap();
        assert_eq!(repo.load("k").unwrap().unwrap().next_color_index, 2);
        assert!(repo.delete("k").unwrap());
    }

    #[test]
    fn test_corrupt_blob_is_serialization_error() {
        let (_tmp, repo) = repo();
        repo.save_raw("k", "{broken").unwrap();
        assert!(matches!(
            repo.load("k"),
            Err(RepositoryError::SerializationError(_))
        ));
        let raw = repo.load_raw("k").unwrap().unwrap();
        assert_eq!(raw.value, "{broken");
    }
}
