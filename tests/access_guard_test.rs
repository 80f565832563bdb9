use std::sync::Arc;

use qrcode_store::api::{self, ApiRequest, AppState};
use qrcode_store::auth::AccessGuard;
use qrcode_store::config::AppConfig;
use qrcode_store::db::{self, DbState, QrcodeRecord};
use qrcode_store::normalize::{NormalizationPipeline, PipelineConfig};

fn config_with(pairs: &'static [(&'static str, &'static str)]) -> AppConfig {
    AppConfig::from_lookup(|key| {
        pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    })
}

fn state_for(config: &AppConfig) -> Arc<AppState> {
    let db = DbState::open_in_memory().expect("open db");
    db::upsert_record(
        &db,
        &QrcodeRecord {
            id: 1,
            name: "seed".to_string(),
            image: b"stored-png".to_vec(),
        },
    )
    .expect("seed record");

    let pipeline = NormalizationPipeline::new(PipelineConfig::default()).expect("pipeline");
    Arc::new(AppState::new(db, pipeline, AccessGuard::from_config(config)))
}

#[test]
fn guard_built_from_env_uses_both_secrets() {
    let config = config_with(&[
        ("QRCODE_API_KEY", "primary"),
        ("QRCODE_IMAGE_GET_API_KEY", "watch"),
    ]);
    let guard = AccessGuard::from_config(&config);

    assert!(guard.authorize("/add", Some("primary")).is_ok());
    assert!(guard.authorize("/add", Some("watch")).is_err());
    assert!(guard.authorize_image_read(Some("watch")).is_ok());
    assert!(guard.authorize_image_read(Some("primary")).is_err());
}

#[tokio::test]
async fn title_requires_primary_key() {
    let config = config_with(&[("QRCODE_API_KEY", "primary")]);
    let state = state_for(&config);

    let denied = api::handle_request(&state, ApiRequest::get("/title/1")).await;
    assert_eq!(denied.status, 401);
    assert_eq!(denied.body_text(), "Missing or invalid API key");

    let wrong = api::handle_request(&state, ApiRequest::get("/title/1").with_api_key("nope")).await;
    assert_eq!(wrong.status, 401);
    assert_eq!(wrong.body, denied.body);

    let allowed =
        api::handle_request(&state, ApiRequest::get("/title/1").with_api_key("primary")).await;
    assert_eq!(allowed.status, 200);
    assert_eq!(allowed.body_text(), r#"{"name":"seed"}"#);
}

#[tokio::test]
async fn unconfigured_primary_key_rejects_writes() {
    let config = config_with(&[]);
    let state = state_for(&config);

    let response = api::handle_request(
        &state,
        ApiRequest::post("/add", "{}").with_api_key("anything"),
    )
    .await;
    assert_eq!(response.status, 401);
}

#[tokio::test]
async fn image_bytes_are_returned_verbatim() {
    let config = config_with(&[
        ("QRCODE_API_KEY", "primary"),
        ("QRCODE_IMAGE_GET_API_KEY", "watch"),
    ]);
    let state = state_for(&config);

    let response = api::handle_request(
        &state,
        ApiRequest::get("/image/1").with_query("?apiKey=watch"),
    )
    .await;
    assert_eq!(response.status, 200);
    assert_eq!(response.content_type, "image/png");
    assert_eq!(response.body, b"stored-png".to_vec());
}

#[tokio::test]
async fn image_route_ignores_primary_header() {
    let config = config_with(&[
        ("QRCODE_API_KEY", "primary"),
        ("QRCODE_IMAGE_GET_API_KEY", "watch"),
    ]);
    let state = state_for(&config);

    let response =
        api::handle_request(&state, ApiRequest::get("/image/1").with_api_key("primary")).await;
    assert_eq!(response.status, 401);
}
