use std::sync::Arc;

use crate::auth::IMAGE_KEY_QUERY_PARAM;
use crate::db::{self, QrcodeRecord};
use crate::error::AppError;
use crate::normalize::NormalizedImage;

use super::query::query_value;
use super::types::{AddQrcodeRequest, ApiResponse, TitleResponse};
use super::AppState;

const MSG_SUCCESS: &str = "Success";
const MSG_BAD_JSON: &str = "Cannot parse JSON request body";
const MSG_BAD_ID: &str = "Invalid qrcode id";

/// 在阻塞线程池上执行 CPU 密集或同步 I/O 工作。
async fn run_blocking<T, F>(op: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| AppError::Internal(format!("阻塞任务执行失败: {}", e)))?
}

pub(super) fn parse_id(raw: Option<&str>) -> Result<i64, AppError> {
    raw.and_then(|value| value.parse::<i64>().ok())
        .ok_or_else(|| AppError::InvalidRequest(MSG_BAD_ID.to_string()))
}

/// `POST /add`：解析请求体 → 规范化 → 写入。
///
/// 规范化失败时直接返回，不会写入任何记录。
pub(super) async fn add_qrcode(
    state: Arc<AppState>,
    body: Vec<u8>,
) -> Result<ApiResponse, AppError> {
    let request: AddQrcodeRequest = serde_json::from_slice(&body).map_err(|e| {
        log::debug!("请求体解析失败: {}", e);
        AppError::InvalidRequest(MSG_BAD_JSON.to_string())
    })?;

    let AddQrcodeRequest { id, name, image } = request;
    log::info!("📥 收到二维码 id={} name='{}'", id, name);

    run_blocking(move || {
        let normalized: NormalizedImage = state.pipeline.normalize_base64(&image)?;
        let record = QrcodeRecord {
            id,
            name,
            image: normalized.bytes,
        };
        db::upsert_record(&state.db, &record)?;
        log::info!("✅ 二维码已保存 id={} ({} 字节)", record.id, record.image.len());
        Ok(())
    })
    .await?;

    Ok(ApiResponse::text(200, MSG_SUCCESS))
}

/// `GET /title/{id}`
pub(super) async fn get_title(state: Arc<AppState>, id: i64) -> Result<ApiResponse, AppError> {
    let name = run_blocking(move || db::get_title(&state.db, id)).await?;

    let body = serde_json::to_vec(&TitleResponse { name })
        .map_err(|e| AppError::Internal(format!("序列化响应失败: {}", e)))?;
    Ok(ApiResponse::json(200, body))
}

/// `GET /image/{id}`：先校验图片密钥，再查询。
pub(super) async fn get_image(
    state: Arc<AppState>,
    id: i64,
    query: &str,
) -> Result<ApiResponse, AppError> {
    let supplied = query_value(query, IMAGE_KEY_QUERY_PARAM);
    state.guard.authorize_image_read(supplied.as_deref())?;

    let image = run_blocking(move || db::get_image(&state.db, id)).await?;
    Ok(ApiResponse::bytes(NormalizedImage::CONTENT_TYPE, image))
}
