// ==========================================
// 推广员佣金结算引擎 - 佣金模板仓储
// ==========================================
// 红线: Repository 不含业务逻辑（校验在 API 层完成）
// 存储: config 以 JSON 文本保存，时间戳为 RFC 3339
// ==========================================

use crate::domain::commission::{CommissionConfig, CommissionTemplate};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const SELECT_COLUMNS: &str =
    "SELECT template_id, name, description, config_json, created_at, updated_at FROM commission_template";

// 行原始值，解析 JSON/时间戳在锁外完成
struct TemplateRow {
    template_id: String,
    name: String,
    description: Option<String>,
    config_json: String,
    created_at: String,
    updated_at: String,
}

impl TemplateRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            template_id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            config_json: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }

    fn into_template(self) -> RepositoryResult<CommissionTemplate> {
        let config: CommissionConfig = serde_json::from_str(&self.config_json)?;
        Ok(CommissionTemplate {
            created_at: parse_timestamp("created_at", &self.created_at)?,
            updated_at: parse_timestamp("updated_at", &self.updated_at)?,
            template_id: self.template_id,
            name: self.name,
            description: self.description,
            config,
        })
    }
}

fn parse_timestamp(field: &str, raw: &str) -> RepositoryResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::FieldValueError {
            field: field.to_string(),
            message: format!("{} ({})", e, raw),
        })
}

// ==========================================
// CommissionTemplateRepository - 佣金模板仓储
// ==========================================
pub struct CommissionTemplateRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CommissionTemplateRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增或更新模板（created_at 保留首次写入值）
    pub fn upsert(&self, template: &CommissionTemplate) -> RepositoryResult<()> {
        let config_json = serde_json::to_string(&template.config)?;
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO commission_template (
                template_id, name, description, config_json, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(template_id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                config_json = excluded.config_json,
                updated_at = excluded.updated_at
            "#,
            params![
                template.template_id,
                template.name,
                template.description,
                config_json,
                template.created_at.to_rfc3339(),
                template.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// 按模板 ID 查询
    ///
    /// # 返回
    /// - Ok(Some(template)): 找到
    /// - Ok(None): 未找到
    pub fn find_by_id(&self, template_id: &str) -> RepositoryResult<Option<CommissionTemplate>> {
        let raw = {
            let conn = self.get_conn()?;
            let raw = conn
                .query_row(
                    &format!("{} WHERE template_id = ?1", SELECT_COLUMNS),
                    params![template_id],
                    TemplateRow::from_row,
                )
                .optional()?;
            raw
        };

        raw.map(TemplateRow::into_template).transpose()
    }

    /// 全部模板（按 template_id 排序）
    pub fn list(&self) -> RepositoryResult<Vec<CommissionTemplate>> {
        let rows = {
            let conn = self.get_conn()?;
            let mut stmt = conn.prepare(&format!("{} ORDER BY template_id", SELECT_COLUMNS))?;
            let rows = stmt
                .query_map([], TemplateRow::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };

        rows.into_iter().map(TemplateRow::into_template).collect()
    }

    /// 删除模板
    ///
    /// # 返回
    /// - Ok(true): 已删除
    /// - Ok(false): 不存在
    /// - Err(ForeignKeyViolation): 仍被分配引用
    pub fn delete(&self, template_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM commission_template WHERE template_id = ?1",
            params![template_id],
        )?;
        Ok(affected > 0)
    }
}
