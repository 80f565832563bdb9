//! Schema 初始化子模块
//!
//! ## 职责
//! - 创建 `qrcode` 表
//! - 文件数据库启用 WAL，读写互不阻塞
//! - 通过 `user_version` 记录 Schema 版本
//!
//! ## 错误语义
//! - DDL 失败统一映射为 `AppError::Database`

use rusqlite::Connection;

use crate::error::AppError;

const SCHEMA_VERSION: i64 = 1;

fn get_user_version(conn: &Connection) -> Result<i64, AppError> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| AppError::Database(format!("读取数据库版本失败: {}", e)))
}

fn set_user_version(conn: &Connection, version: i64) -> Result<(), AppError> {
    conn.execute_batch(&format!("PRAGMA user_version = {version};"))
        .map_err(|e| AppError::Database(format!("写入数据库版本失败: {}", e)))
}

fn create_base_tables(conn: &Connection) -> Result<(), AppError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS qrcode (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            image BLOB NOT NULL
        );"
    ).map_err(|e| AppError::Database(format!("创建基础表失败: {}", e)))
}

pub(super) fn initialize_schema(conn: &Connection, wal: bool) -> Result<(), AppError> {
    if wal {
        // journal_mode 会返回一行结果，不能走 execute
        conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get::<_, String>(0))
            .map_err(|e| AppError::Database(format!("启用 WAL 失败: {}", e)))?;
    }

    let version = get_user_version(conn)?;
    if version > SCHEMA_VERSION {
        return Err(AppError::Database(format!(
            "数据库版本 {} 高于当前程序支持的 {}",
            version, SCHEMA_VERSION
        )));
    }

    create_base_tables(conn)?;

    if version < SCHEMA_VERSION {
        set_user_version(conn, SCHEMA_VERSION)?;
    }

    Ok(())
}
