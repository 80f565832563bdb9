//! 数据库模块
//!
//! # 设计思路
//!
//! 存储只做一件事：按整数 id 保存 `{id, name, image}`，并按 id 读回名称或图片。
//! 使用 `rusqlite` 直接操作 SQLite，连接在进程启动时打开一次，
//! 以 `DbState` 显式传给需要持久化的组件，不使用全局可变状态。
//!
//! # 并发语义
//!
//! - 连接包在 `Mutex` 中，单条 upsert 在锁内完成，读者不会看到写了一半的记录。
//! - 记录只会被整体替换（`INSERT OR REPLACE`），从不部分更新。

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use crate::error::AppError;

mod records;
mod schema;

pub use records::*;

// ============================================================================
// 数据模型
// ============================================================================

/// 二维码记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrcodeRecord {
    pub id: i64,
    pub name: String,
    /// 规范化后的 PNG 字节
    pub image: Vec<u8>,
}

// ============================================================================
// 数据库状态
// ============================================================================

/// 数据库连接封装
pub struct DbState(pub Mutex<Connection>);

impl DbState {
    /// 打开（必要时创建）数据库文件并初始化 Schema。
    pub fn open(db_path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    AppError::Database(format!("创建数据库目录失败: {}", e))
                })?;
            }
        }
        log::info!("数据库路径: {}", db_path.display());

        let conn = Connection::open(db_path).map_err(|e| {
            AppError::Database(format!("打开数据库失败: {}", e))
        })?;
        schema::initialize_schema(&conn, true)?;

        Ok(Self(Mutex::new(conn)))
    }

    /// 内存数据库，供测试与一次性命令使用。
    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            AppError::Database(format!("打开内存数据库失败: {}", e))
        })?;
        schema::initialize_schema(&conn, false)?;

        Ok(Self(Mutex::new(conn)))
    }

    pub(crate) fn with_conn<T>(
        &self,
        op: impl FnOnce(&Connection) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let conn = self.0.lock().map_err(|e| {
            AppError::Database(format!("获取数据库锁失败: {}", e))
        })?;
        op(&conn)
    }
}
