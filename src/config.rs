//! 进程配置模块
//!
//! # 设计思路
//!
//! 启动时一次性读取环境变量，得到不可变的 `AppConfig`，之后只读传递。
//! 两个密钥分别命名：`api_key` 守护写入与名称读取，`image_api_key`
//! 只守护图片读取（给无法携带请求头的手表客户端使用），二者不得合并。
//!
//! # 实现思路
//!
//! - `from_env` 读取 `QRCODE_API_KEY` / `QRCODE_IMAGE_GET_API_KEY` / `MODE` /
//!   `QRCODE_DB_PATH` / `LISTEN_ADDR`。
//! - `apply_overrides_from_path` 读取可选 JSON 文件覆盖流水线参数与数据库路径；
//!   文件不存在时保持默认。

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::AppError;
use crate::normalize::{PipelineConfig, ResampleFilter};

const DB_NAME: &str = "qrcode";
const DEVELOPMENT_MODE: &str = "DEVELOPMENT";

/// 进程级配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 主密钥（请求头 `X-API-Key`）
    pub api_key: Option<String>,
    /// 图片读取专用密钥（查询参数 `apiKey`）
    pub image_api_key: Option<String>,
    pub db_path: PathBuf,
    /// 交给外部传输层使用的监听地址
    pub listen_addr: Option<String>,
    pub pipeline: PipelineConfig,
}

/// JSON 覆盖文件结构，所有字段可选。
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigOverrides {
    #[serde(default)]
    db_path: Option<String>,
    #[serde(default)]
    target_width: Option<u32>,
    #[serde(default)]
    target_height: Option<u32>,
    #[serde(default)]
    border_tolerance: Option<u8>,
    #[serde(default)]
    resize_filter: Option<String>,
    #[serde(default)]
    max_input_bytes: Option<u64>,
    #[serde(default)]
    max_decoded_pixels: Option<u64>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn default_db_path(mode: Option<&str>) -> PathBuf {
    if mode == Some(DEVELOPMENT_MODE) {
        PathBuf::from(format!("./{DB_NAME}.sqlite"))
    } else {
        PathBuf::from(format!("/data/{DB_NAME}.sqlite"))
    }
}

impl AppConfig {
    /// 从进程环境读取配置。
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 以任意键值来源构造，便于测试注入。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mode = lookup("MODE");
        let db_path = non_empty(lookup("QRCODE_DB_PATH"))
            .map(PathBuf::from)
            .unwrap_or_else(|| default_db_path(mode.as_deref()));

        Self {
            api_key: non_empty(lookup("QRCODE_API_KEY")),
            image_api_key: non_empty(lookup("QRCODE_IMAGE_GET_API_KEY")),
            db_path,
            listen_addr: non_empty(lookup("LISTEN_ADDR")),
            pipeline: PipelineConfig::default(),
        }
    }

    /// 读取 JSON 覆盖文件；文件不存在时原样返回。
    pub fn apply_overrides_from_path(mut self, path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            log::debug!("配置文件不存在，使用默认值: {}", path.display());
            return Ok(self);
        }

        let content = fs::read_to_string(path)?;
        let overrides: ConfigOverrides = serde_json::from_str(&content)
            .map_err(|e| AppError::Config(format!("解析配置文件失败: {}", e)))?;

        if let Some(db_path) = non_empty(overrides.db_path) {
            self.db_path = PathBuf::from(db_path);
        }
        if let Some(width) = overrides.target_width {
            self.pipeline.target_width = width;
        }
        if let Some(height) = overrides.target_height {
            self.pipeline.target_height = height;
        }
        if let Some(tolerance) = overrides.border_tolerance {
            self.pipeline.border_tolerance = tolerance;
        }
        if let Some(filter) = overrides.resize_filter {
            self.pipeline.resize_filter = ResampleFilter::from_str(&filter)
                .map_err(|e| AppError::Config(e.to_string()))?;
        }
        if let Some(max_input_bytes) = overrides.max_input_bytes {
            self.pipeline.max_input_bytes = max_input_bytes;
        }
        if let Some(max_decoded_pixels) = overrides.max_decoded_pixels {
            self.pipeline.max_decoded_pixels = max_decoded_pixels;
        }

        self.pipeline
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))?;

        Ok(self)
    }

    /// 启动时输出监听地址（监听由外部传输层负责）。
    pub fn log_summary(&self) {
        match &self.listen_addr {
            Some(addr) => log::info!("🌐 监听地址: {}", addr),
            None => log::info!("🌐 未设置 LISTEN_ADDR，由外部传输层决定监听地址"),
        }
    }

    /// 启动时提示未配置的密钥（对应路由将全部拒绝）。
    pub fn warn_missing_secrets(&self) {
        if self.api_key.is_none() {
            log::warn!("QRCODE_API_KEY 未配置，/add 与 /title/* 将拒绝所有请求");
        }
        if self.image_api_key.is_none() {
            log::warn!("QRCODE_IMAGE_GET_API_KEY 未配置，/image/* 将拒绝所有请求");
        }
    }
}
