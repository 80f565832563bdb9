//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，替代各模块中分散的
//! `.map_err(|e| e.to_string())`、`format!(...)`、`expect()` 等不一致模式。
//!
//! 请求分发层统一返回 `Result<T, AppError>`，再由 `status_code()`
//! 映射为响应状态码。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `ImageError` 提供 `From` 转换，无需手动 map。
//! - `public_message()` 给出对外响应体，鉴权失败时不暴露任何细节。

use crate::normalize::ImageError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 规范化流水线错误（加载 / 解码 / 变换 / 编码）
    #[error("{0}")]
    Image(#[from] ImageError),

    /// 请求体或路径参数无法解析（内容即对外文案）
    #[error("请求无效: {0}")]
    InvalidRequest(String),

    /// 指定 id 没有记录
    #[error("记录不存在: {0}")]
    NotFound(i64),

    /// 密钥缺失或不匹配
    #[error("鉴权失败")]
    Unauthorized,

    /// 数据库操作失败
    #[error("数据库错误: {0}")]
    Database(String),

    /// 启动配置无效
    #[error("配置错误: {0}")]
    Config(String),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 后台任务异常或响应无法生成
    #[error("内部错误: {0}")]
    Internal(String),
}

impl AppError {
    /// 映射为 HTTP 语义的状态码。
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Image(err) if err.is_decode_failure() => 400,
            Self::Image(_) => 500,
            Self::InvalidRequest(_) => 400,
            Self::NotFound(_) => 404,
            Self::Unauthorized => 401,
            Self::Database(_) | Self::Config(_) | Self::Io(_) | Self::Internal(_) => 500,
        }
    }

    /// 对外响应体文案。
    pub fn public_message(&self) -> String {
        match self {
            Self::Image(err) if err.is_decode_failure() => {
                format!("Cannot decode image ({})", err.code())
            }
            Self::InvalidRequest(message) => message.clone(),
            Self::NotFound(_) => "Error obtaining qrcode data".to_string(),
            Self::Unauthorized => "Missing or invalid API key".to_string(),
            Self::Image(_)
            | Self::Database(_)
            | Self::Config(_)
            | Self::Io(_)
            | Self::Internal(_) => {
                "Internal server error".to_string()
            }
        }
    }
}
