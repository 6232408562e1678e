// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库、临时 CSV 文件、配置写入
// ==========================================

#![allow(dead_code)]

use promoter_commission::api::PayoutApi;
use promoter_commission::db::{ensure_schema, open_sqlite_connection};
use rusqlite::{params, Connection};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径不是有效 UTF-8")?
        .to_string();

    let conn = open_sqlite_connection(&db_path)?;
    ensure_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开共享连接
pub fn open_shared_connection(db_path: &str) -> Result<Arc<Mutex<Connection>>, Box<dyn Error>> {
    let conn = open_sqlite_connection(db_path)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// 创建基于临时数据库的 PayoutApi
pub fn create_test_api() -> Result<(NamedTempFile, PayoutApi), Box<dyn Error>> {
    let (temp_file, db_path) = create_test_db()?;
    let api = PayoutApi::open(&db_path)?;
    Ok((temp_file, api))
}

/// 写入 global 配置
pub fn insert_test_config(db_path: &str, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    let conn = open_sqlite_connection(db_path)?;
    conn.execute(
        "INSERT OR REPLACE INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)",
        params![key, value],
    )?;
    Ok(())
}

/// 在目录下写入 CSV 文件
pub fn write_csv(dir: &Path, name: &str, content: &str) -> Result<PathBuf, Box<dyn Error>> {
    let path = dir.join(name);
    std::fs::write(&path, content)?;
    Ok(path)
}
