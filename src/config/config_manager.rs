// ==========================================
// 推广员佣金结算引擎 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (scope_id + key + value)
// ==========================================

use crate::config::settings_reader::CommissionSettingsReader;
use crate::db::open_sqlite_connection;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const GLOBAL_SCOPE: &str = "global";

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
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        crate::db::ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let conn_guard = conn.lock()?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.conn.lock()?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![GLOBAL_SCOPE, key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global scope 配置（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.conn.lock()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = datetime('now')",
            params![GLOBAL_SCOPE, key, value],
        )?;
        Ok(())
    }

    /// 设置某币种的最小单位位数
    pub fn set_minor_units(&self, currency: &str, digits: u32) -> RepositoryResult<()> {
        let key = format!(
            "{}{}",
            config_keys::MINOR_UNITS_PREFIX,
            currency.trim().to_uppercase()
        );
        self.set_config_value(&key, &digits.to_string())
    }

    /// 获取所有 global 配置（按 key 排序）
    pub fn get_config_snapshot(&self) -> RepositoryResult<Vec<(String, String)>> {
        let conn = self.conn.lock()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;

        let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut snapshot = Vec::new();
        for row in rows {
            snapshot.push(row?);
        }
        Ok(snapshot)
    }
}

// ==========================================
// CommissionSettingsReader Trait 实现
// ==========================================
#[async_trait]
impl CommissionSettingsReader for ConfigManager {
    async fn get_minor_unit_overrides(&self) -> RepositoryResult<HashMap<String, u32>> {
        let mut overrides = HashMap::new();

        for (key, value) in self.get_config_snapshot()? {
            let Some(code) = key.strip_prefix(config_keys::MINOR_UNITS_PREFIX) else {
                continue;
            };
            match value.trim().parse::<u32>() {
                Ok(digits) if digits <= 28 => {
                    overrides.insert(code.to_uppercase(), digits);
                }
                _ => {
                    return Err(RepositoryError::FieldValueError {
                        field: key.clone(),
                        message: format!("无效的小数位数: {}", value),
                    })
                }
            }
        }

        Ok(overrides)
    }

    async fn get_fail_on_unassigned(&self) -> RepositoryResult<bool> {
        let value = self.get_config_or_default(config_keys::FAIL_ON_UNASSIGNED, "false")?;
        match value.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" | "" => Ok(false),
            _ => Err(RepositoryError::FieldValueError {
                field: config_keys::FAIL_ON_UNASSIGNED.to_string(),
                message: format!("无效的布尔值: {}", value),
            }),
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 币种最小单位覆写，完整 key 形如 currency.minor_units/IDR
    pub const MINOR_UNITS_PREFIX: &str = "currency.minor_units/";

    // 未分配推广员处理
    pub const FAIL_ON_UNASSIGNED: &str = "payout.fail_on_unassigned";
}
