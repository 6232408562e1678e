// ==========================================
// 推广员佣金结算引擎 - 活动分配仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 存储: event_promoter_assignment（override 以 JSON 文本保存）
// ==========================================

use crate::domain::commission::{CommissionOverride, EventPromoterAssignment};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

type AssignmentRow = (String, String, Option<String>, Option<String>);

fn read_row(row: &Row<'_>) -> rusqlite::Result<AssignmentRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn into_assignment(raw: AssignmentRow) -> RepositoryResult<EventPromoterAssignment> {
    let (event_id, promoter_id, template_id, override_json) = raw;
    let override_config = override_json
        .map(|json| serde_json::from_str::<CommissionOverride>(&json))
        .transpose()?;

    Ok(EventPromoterAssignment {
        event_id,
        promoter_id,
        template_id,
        override_config,
    })
}

// ==========================================
// AssignmentRepository - 活动-推广员分配仓储
// ==========================================
pub struct AssignmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AssignmentRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增或替换分配（主键 event_id + promoter_id）
    ///
    /// 空覆写按无覆写保存
    pub fn upsert(&self, assignment: &EventPromoterAssignment) -> RepositoryResult<()> {
        let override_json = assignment
            .override_config
            .as_ref()
            .filter(|o| !o.is_empty())
            .map(serde_json::to_string)
            .transpose()?;

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO event_promoter_assignment (event_id, promoter_id, template_id, override_json)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(event_id, promoter_id) DO UPDATE SET
                template_id = excluded.template_id,
                override_json = excluded.override_json
            "#,
            params![
                assignment.event_id,
                assignment.promoter_id,
                assignment.template_id,
                override_json,
            ],
        )?;
        Ok(())
    }

    pub fn find(
        &self,
        event_id: &str,
        promoter_id: &str,
    ) -> RepositoryResult<Option<EventPromoterAssignment>> {
        let raw = {
            let conn = self.get_conn()?;
            let raw = conn
                .query_row(
                    r#"
                    SELECT event_id, promoter_id, template_id, override_json
                    FROM event_promoter_assignment
                    WHERE event_id = ?1 AND promoter_id = ?2
                    "#,
                    params![event_id, promoter_id],
                    read_row,
                )
                .optional()?;
            raw
        };

        raw.map(into_assignment).transpose()
    }

    /// 活动的全部分配（按 promoter_id 排序）
    pub fn list_by_event(&self, event_id: &str) -> RepositoryResult<Vec<EventPromoterAssignment>> {
        let rows = {
            let conn = self.get_conn()?;
            let mut stmt = conn.prepare(
                r#"
                SELECT event_id, promoter_id, template_id, override_json
                FROM event_promoter_assignment
                WHERE event_id = ?1
                ORDER BY promoter_id
                "#,
            )?;
            let rows = stmt
                .query_map(params![event_id], read_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };

        rows.into_iter().map(into_assignment).collect()
    }

    pub fn delete(&self, event_id: &str, promoter_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM event_promoter_assignment WHERE event_id = ?1 AND promoter_id = ?2",
            params![event_id, promoter_id],
        )?;
        Ok(affected > 0)
    }
}
