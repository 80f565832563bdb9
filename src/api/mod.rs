//! 请求分发模块
//!
//! # 设计思路
//!
//! 不绑定具体 HTTP 框架：外部传输层把请求整理成 `ApiRequest`，
//! 交给 `handle_request`，拿回 `ApiResponse` 再写回客户端。
//! CLI 与测试走同一条路径。
//!
//! # 处理顺序
//!
//! ```text
//! ApiRequest
//!   → AccessGuard::authorize（路径小写后匹配受保护集合）
//!   → matchit 路由（/add、/title/{id}、/image/{id}）
//!   → handler（流水线与 SQLite 调用放到 spawn_blocking）
//!   → ApiResponse（错误经 AppError::status_code / public_message 映射）
//! ```

use std::sync::Arc;

use crate::auth::AccessGuard;
use crate::config::AppConfig;
use crate::db::DbState;
use crate::error::AppError;
use crate::normalize::NormalizationPipeline;

mod handlers;
mod query;
mod types;

pub use types::{AddQrcodeRequest, ApiRequest, ApiResponse, TitleResponse};

/// 进程级共享状态，启动时构造一次并以 `Arc` 传递。
pub struct AppState {
    pub db: DbState,
    pub pipeline: NormalizationPipeline,
    pub guard: AccessGuard,
    router: matchit::Router<Route>,
}

impl AppState {
    pub fn new(db: DbState, pipeline: NormalizationPipeline, guard: AccessGuard) -> Self {
        Self {
            db,
            pipeline,
            guard,
            router: build_router(),
        }
    }

    /// 按配置打开数据库、构造流水线与鉴权器。
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let db = DbState::open(&config.db_path)?;
        let pipeline = NormalizationPipeline::new(config.pipeline.clone())?;
        let guard = AccessGuard::from_config(config);
        Ok(Self::new(db, pipeline, guard))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Add,
    Title,
    Image,
}

fn build_router() -> matchit::Router<Route> {
    let mut router = matchit::Router::new();
    router.insert("/add", Route::Add).ok();
    router.insert("/title/{id}", Route::Title).ok();
    router.insert("/image/{id}", Route::Image).ok();
    router
}

/// 处理一个请求，总是返回响应（错误已映射为状态码与文案）。
pub async fn handle_request(state: &Arc<AppState>, request: ApiRequest) -> ApiResponse {
    let method = request.method.to_ascii_uppercase();
    let path = request.path.to_lowercase();
    log::debug!("{} {}", method, path);

    match dispatch(state, &method, &path, request).await {
        Ok(response) => response,
        Err(err) => {
            let status = err.status_code();
            if status >= 500 {
                log::error!("❌ {} {} 处理失败: {}", method, path, err);
            } else {
                log::warn!("⚠️ {} {} -> {}: {}", method, path, status, err);
            }
            ApiResponse::text(status, err.public_message())
        }
    }
}

async fn dispatch(
    state: &Arc<AppState>,
    method: &str,
    path: &str,
    request: ApiRequest,
) -> Result<ApiResponse, AppError> {
    state.guard.authorize(path, request.api_key.as_deref())?;

    let Ok(matched) = state.router.at(path) else {
        return Ok(ApiResponse::text(404, "Not found"));
    };
    let route = *matched.value;
    let raw_id = matched.params.get("id");

    match (route, method) {
        (Route::Add, "POST") => handlers::add_qrcode(Arc::clone(state), request.body).await,
        (Route::Title, "GET") => {
            let id = handlers::parse_id(raw_id)?;
            handlers::get_title(Arc::clone(state), id).await
        }
        (Route::Image, "GET") => {
            let id = handlers::parse_id(raw_id)?;
            handlers::get_image(Arc::clone(state), id, &request.query).await
        }
        _ => Ok(ApiResponse::text(405, "Method not allowed")),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use base64::Engine;
    use image::{GenericImageView, ImageBuffer, ImageFormat, Rgb};

    use super::*;
    use crate::normalize::PipelineConfig;

    const KEY: &str = "primary-key";
    const IMAGE_KEY: &str = "watch-key";

    fn state_with(guard: AccessGuard) -> Arc<AppState> {
        let db = DbState::open_in_memory().expect("open db");
        let pipeline = NormalizationPipeline::new(PipelineConfig::default()).expect("pipeline");
        Arc::new(AppState::new(db, pipeline, guard))
    }

    fn state() -> Arc<AppState> {
        state_with(AccessGuard::new(Some(KEY), Some(IMAGE_KEY)))
    }

    fn framed_png_base64() -> String {
        let img = ImageBuffer::from_fn(120, 120, |x, y| {
            let inside = (20..100).contains(&x) && (20..100).contains(&y);
            if inside && ((x / 10) + (y / 10)) % 2 == 0 {
                Rgb([0u8, 0, 0])
            } else {
                Rgb([255u8, 255, 255])
            }
        });
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).expect("encode png");
        base64::engine::general_purpose::STANDARD.encode(buf.into_inner())
    }

    fn add_body(id: i64, name: &str, image: &str) -> Vec<u8> {
        serde_json::json!({ "id": id, "name": name, "image": image })
            .to_string()
            .into_bytes()
    }

    #[tokio::test]
    async fn add_then_read_back() {
        let state = state();
        let add = ApiRequest::post("/add", add_body(1, "wifi", &framed_png_base64()))
            .with_api_key(KEY);
        let response = handle_request(&state, add).await;
        assert_eq!(response.status, 200);
        assert_eq!(response.body_text(), "Success");

        let title = handle_request(&state, ApiRequest::get("/title/1").with_api_key(KEY)).await;
        assert_eq!(title.status, 200);
        let parsed: TitleResponse = serde_json::from_slice(&title.body).expect("json body");
        assert_eq!(parsed.name, "wifi");

        let image = handle_request(
            &state,
            ApiRequest::get("/image/1").with_query(format!("?apiKey={IMAGE_KEY}")),
        )
        .await;
        assert_eq!(image.status, 200);
        assert_eq!(image.content_type, "image/png");
        let decoded = image::load_from_memory(&image.body).expect("png body");
        assert_eq!(decoded.dimensions(), (90, 90));
        assert_eq!(decoded.color(), image::ColorType::L8);
    }

    #[tokio::test]
    async fn add_without_key_is_rejected_and_not_stored() {
        let state = state();
        let add = ApiRequest::post("/add", add_body(2, "menu", &framed_png_base64()));
        let response = handle_request(&state, add).await;
        assert_eq!(response.status, 401);

        let title = handle_request(&state, ApiRequest::get("/title/2").with_api_key(KEY)).await;
        assert_eq!(title.status, 404);
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let state = state();
        let response =
            handle_request(&state, ApiRequest::post("/add", "{not json").with_api_key(KEY)).await;
        assert_eq!(response.status, 400);
        assert_eq!(response.body_text(), "Cannot parse JSON request body");
    }

    #[tokio::test]
    async fn undecodable_image_is_bad_request_and_not_stored() {
        let state = state();
        let garbage = base64::engine::general_purpose::STANDARD.encode(b"definitely not an image");
        let response = handle_request(
            &state,
            ApiRequest::post("/add", add_body(3, "junk", &garbage)).with_api_key(KEY),
        )
        .await;
        assert_eq!(response.status, 400);

        let title = handle_request(&state, ApiRequest::get("/title/3").with_api_key(KEY)).await;
        assert_eq!(title.status, 404);
        assert_eq!(title.body_text(), "Error obtaining qrcode data");
    }

    #[tokio::test]
    async fn invalid_base64_is_bad_request() {
        let state = state();
        let response = handle_request(
            &state,
            ApiRequest::post("/add", add_body(4, "x", "@@@not-base64@@@")).with_api_key(KEY),
        )
        .await;
        assert_eq!(response.status, 400);
    }

    #[tokio::test]
    async fn image_read_requires_image_key() {
        let state = state();
        let add = ApiRequest::post("/add", add_body(5, "door", &framed_png_base64()))
            .with_api_key(KEY);
        assert_eq!(handle_request(&state, add).await.status, 200);

        let no_key = handle_request(&state, ApiRequest::get("/image/5")).await;
        assert_eq!(no_key.status, 401);

        let primary_key_in_query = handle_request(
            &state,
            ApiRequest::get("/image/5").with_query(format!("apiKey={KEY}")),
        )
        .await;
        assert_eq!(primary_key_in_query.status, 401);
    }

    #[tokio::test]
    async fn image_key_is_checked_before_lookup() {
        let state = state();
        let response = handle_request(&state, ApiRequest::get("/image/404")).await;
        assert_eq!(response.status, 401);

        let response = handle_request(
            &state,
            ApiRequest::get("/image/404").with_query(format!("apiKey={IMAGE_KEY}")),
        )
        .await;
        assert_eq!(response.status, 404);
    }

    #[test]
    fn router_resolves_every_route() {
        let state = state();

        let title = state.router.at("/title/5").expect("title route");
        assert_eq!(*title.value, Route::Title);
        assert_eq!(title.params.get("id"), Some("5"));

        let image = state.router.at("/image/abc").expect("image route");
        assert_eq!(*image.value, Route::Image);

        assert_eq!(*state.router.at("/add").expect("add route").value, Route::Add);
        assert!(state.router.at("/title").is_err());
        assert!(state.router.at("/nothing").is_err());
    }

    #[tokio::test]
    async fn image_key_with_reserved_characters_is_accepted() {
        let image_key = "ab+c/d=&x%";
        let state = state_with(AccessGuard::new(Some(KEY), Some(image_key)));
        let add = ApiRequest::post("/add", add_body(8, "gate", &framed_png_base64()))
            .with_api_key(KEY);
        assert_eq!(handle_request(&state, add).await.status, 200);

        let response = handle_request(
            &state,
            ApiRequest::get("/image/8").with_query_param("apiKey", image_key),
        )
        .await;
        assert_eq!(response.status, 200);
        assert_eq!(response.content_type, "image/png");
    }

    #[test]
    fn query_param_builder_appends_to_existing_query() {
        let request = ApiRequest::get("/image/1")
            .with_query("?x=1")
            .with_query_param("apiKey", "a b");
        assert_eq!(request.query, "x=1&apiKey=a%20b");
    }

    #[tokio::test]
    async fn unconfigured_image_key_rejects_every_read() {
        let state = state_with(AccessGuard::new(Some(KEY), None));
        let response = handle_request(
            &state,
            ApiRequest::get("/image/1").with_query("apiKey="),
        )
        .await;
        assert_eq!(response.status, 401);
    }

    #[tokio::test]
    async fn uppercase_paths_are_guarded_and_routed() {
        let state = state();
        let unauthorized = handle_request(&state, ApiRequest::get("/TITLE/1")).await;
        assert_eq!(unauthorized.status, 401);

        let routed = handle_request(&state, ApiRequest::get("/Title/1").with_api_key(KEY)).await;
        assert_eq!(routed.status, 404);
        assert_eq!(routed.body_text(), "Error obtaining qrcode data");
    }

    #[tokio::test]
    async fn non_integer_id_is_bad_request() {
        let state = state();
        let response =
            handle_request(&state, ApiRequest::get("/title/abc").with_api_key(KEY)).await;
        assert_eq!(response.status, 400);
    }

    #[tokio::test]
    async fn unknown_route_and_wrong_method() {
        let state = state();
        let missing = handle_request(&state, ApiRequest::get("/nothing")).await;
        assert_eq!(missing.status, 404);

        let wrong_method = handle_request(&state, ApiRequest::get("/add").with_api_key(KEY)).await;
        assert_eq!(wrong_method.status, 405);
    }
}
