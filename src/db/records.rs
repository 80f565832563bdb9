use rusqlite::{Connection, OptionalExtension, params};

use crate::error::AppError;

use super::{DbState, QrcodeRecord};

fn upsert(conn: &Connection, record: &QrcodeRecord) -> Result<(), AppError> {
    conn.execute(
        "INSERT OR REPLACE INTO qrcode (id, name, image) VALUES (?1, ?2, ?3)",
        params![record.id, record.name, record.image],
    )
    .map_err(|e| {
        AppError::Database(format!("写入二维码 '{}' (id={}) 失败: {}", record.name, record.id, e))
    })?;
    Ok(())
}

fn select_name(conn: &Connection, id: i64) -> Result<String, AppError> {
    conn.query_row("SELECT name FROM qrcode WHERE id = ?1", params![id], |row| row.get(0))
        .optional()
        .map_err(|e| AppError::Database(format!("按 id={} 查询名称失败: {}", id, e)))?
        .ok_or(AppError::NotFound(id))
}

fn select_image(conn: &Connection, id: i64) -> Result<Vec<u8>, AppError> {
    conn.query_row("SELECT image FROM qrcode WHERE id = ?1", params![id], |row| row.get(0))
        .optional()
        .map_err(|e| AppError::Database(format!("按 id={} 查询图片失败: {}", id, e)))?
        .ok_or(AppError::NotFound(id))
}

/// 插入或整体替换一条记录。
pub fn upsert_record(state: &DbState, record: &QrcodeRecord) -> Result<(), AppError> {
    state.with_conn(|conn| upsert(conn, record))
}

/// 按 id 读取显示名称。
pub fn get_title(state: &DbState, id: i64) -> Result<String, AppError> {
    state.with_conn(|conn| select_name(conn, id))
}

/// 按 id 读取规范化后的图片字节（原样返回，不解码）。
pub fn get_image(state: &DbState, id: i64) -> Result<Vec<u8>, AppError> {
    state.with_conn(|conn| select_image(conn, id))
}
