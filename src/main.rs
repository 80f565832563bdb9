//! # 二维码存储服务 — 命令行入口
//!
//! 本文件只负责参数解析、日志初始化与状态构造；
//! 每个子命令都整理成 `ApiRequest` 交给库内同一个分发器，
//! 因此鉴权与错误映射与外部 HTTP 层完全一致。

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::json;

use qrcode_store::api::{self, ApiRequest, ApiResponse, AppState};
use qrcode_store::auth::IMAGE_KEY_QUERY_PARAM;
use qrcode_store::config::AppConfig;
use qrcode_store::error::AppError;
use qrcode_store::normalize::NormalizationPipeline;

#[derive(Debug, Parser)]
#[command(name = "qrcode-store", version, about = "二维码图片规范化与存储")]
struct Cli {
    /// JSON 配置覆盖文件
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 数据库文件路径（优先于环境变量）
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 规范化图片文件并写入记录
    Add {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        image: PathBuf,
        /// 主密钥，缺省读取 QRCODE_API_KEY
        #[arg(long)]
        api_key: Option<String>,
    },
    /// 以 JSON 请求体写入记录（与 POST /add 相同）
    AddJson {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        api_key: Option<String>,
    },
    /// 按 id 读取名称
    Title {
        id: String,
        #[arg(long)]
        api_key: Option<String>,
    },
    /// 按 id 导出规范化后的 PNG
    Image {
        id: String,
        #[arg(long)]
        out: PathBuf,
        /// 图片读取密钥，缺省读取 QRCODE_IMAGE_GET_API_KEY
        #[arg(long)]
        image_key: Option<String>,
    },
    /// 只运行流水线，不访问数据库
    Normalize { input: PathBuf, output: PathBuf },
}

fn load_config(cli: &Cli) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::from_env();
    if let Some(path) = &cli.config {
        config = config.apply_overrides_from_path(path)?;
    }
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    Ok(config)
}

fn base64_file(path: &Path) -> Result<String, AppError> {
    use base64::Engine;
    let bytes = fs::read(path)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
}

fn build_request(
    command: Command,
    config: &AppConfig,
) -> Result<(ApiRequest, Option<PathBuf>), AppError> {
    let primary = |key: Option<String>| key.or_else(|| config.api_key.clone()).unwrap_or_default();

    let built = match command {
        Command::Add { id, name, image, api_key } => {
            let body = json!({ "id": id, "name": name, "image": base64_file(&image)? });
            let request = ApiRequest::post("/add", body.to_string()).with_api_key(primary(api_key));
            (request, None)
        }
        Command::AddJson { file, api_key } => {
            let body = fs::read(&file)?;
            (ApiRequest::post("/add", body).with_api_key(primary(api_key)), None)
        }
        Command::Title { id, api_key } => {
            let request = ApiRequest::get(format!("/title/{id}")).with_api_key(primary(api_key));
            (request, None)
        }
        Command::Image { id, out, image_key } => {
            let key = image_key.or_else(|| config.image_api_key.clone()).unwrap_or_default();
            let request = ApiRequest::get(format!("/image/{id}"))
                .with_query_param(IMAGE_KEY_QUERY_PARAM, &key);
            (request, Some(out))
        }
        Command::Normalize { .. } => {
            return Err(AppError::InvalidRequest("normalize 不经过请求分发".to_string()));
        }
    };
    Ok(built)
}

fn run_normalize(config: &AppConfig, input: &Path, output: &Path) -> Result<(), AppError> {
    let pipeline = NormalizationPipeline::new(config.pipeline.clone())?;
    let normalized = pipeline.normalize_file(input)?;
    fs::write(output, &normalized.bytes)?;
    log::info!(
        "✅ 已写出 {} ({}x{}, {} 字节)",
        output.display(),
        normalized.width,
        normalized.height,
        normalized.bytes.len()
    );
    Ok(())
}

fn report(response: &ApiResponse, out: Option<&Path>) -> Result<(), AppError> {
    match out {
        Some(path) if response.is_success() => {
            fs::write(path, &response.body)?;
            log::info!("✅ 图片已写出: {} ({} 字节)", path.display(), response.body.len());
        }
        _ => println!("{}", response.body_text()),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            log::error!("加载配置失败: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Command::Normalize { input, output } = &cli.command {
        return match run_normalize(&config, input, output) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                log::error!("规范化失败: {err}");
                ExitCode::FAILURE
            }
        };
    }

    config.log_summary();
    config.warn_missing_secrets();

    let state = match AppState::from_config(&config) {
        Ok(state) => Arc::new(state),
        Err(err) => {
            log::error!("初始化失败: {err}");
            return ExitCode::FAILURE;
        }
    };

    let (request, out) = match build_request(cli.command, &config) {
        Ok(built) => built,
        Err(err) => {
            log::error!("构造请求失败: {err}");
            return ExitCode::FAILURE;
        }
    };

    let response = api::handle_request(&state, request).await;
    if let Err(err) = report(&response, out.as_deref()) {
        log::error!("输出结果失败: {err}");
        return ExitCode::FAILURE;
    }

    if response.is_success() {
        ExitCode::SUCCESS
    } else {
        log::warn!("请求失败，状态码 {}", response.status);
        ExitCode::FAILURE
    }
}
