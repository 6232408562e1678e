// ==========================================
// 推广员佣金结算引擎 - 推广员仓储
// ==========================================

use crate::domain::promoter::{Promoter, PromoterDirectory};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

fn map_promoter(row: &Row<'_>) -> rusqlite::Result<Promoter> {
    Ok(Promoter {
        promoter_id: row.get(0)?,
        name: row.get(1)?,
        parent_id: row.get(2)?,
    })
}

pub struct PromoterRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PromoterRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn upsert(&self, promoter: &Promoter) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO promoter (promoter_id, name, parent_id) VALUES (?1, ?2, ?3)
            ON CONFLICT(promoter_id) DO UPDATE SET
                name = excluded.name,
                parent_id = excluded.parent_id
            "#,
            params![promoter.promoter_id, promoter.name, promoter.parent_id],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, promoter_id: &str) -> RepositoryResult<Option<Promoter>> {
        let conn = self.get_conn()?;
        let promoter = conn
            .query_row(
                "SELECT promoter_id, name, parent_id FROM promoter WHERE promoter_id = ?1",
                params![promoter_id],
                map_promoter,
            )
            .optional()?;
        Ok(promoter)
    }

    pub fn list(&self) -> RepositoryResult<Vec<Promoter>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT promoter_id, name, parent_id FROM promoter ORDER BY promoter_id")?;
        let promoters = stmt
            .query_map([], map_promoter)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(promoters)
    }

    /// 加载上下级查找表（用于层级汇总）
    pub fn load_directory(&self) -> RepositoryResult<PromoterDirectory> {
        let promoters = self.list()?;
        Ok(PromoterDirectory::from_promoters(&promoters))
    }
}
