//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载规范化流水线中的所有错误来源，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。
//!
//! 解码失败族（`InvalidFormat` / `Decode` / `ResourceLimit`）属于调用方输入问题；
//! `EmptyBitmap` / `Encode` 属于前置条件被破坏，必须立即上报，不得写入存储。

/// 规范化流水线统一错误类型。
///
/// 该类型会在 API 层被上转为 `AppError`，最终映射为响应状态码。
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("解码错误：{0}")]
    Decode(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("空位图：{0}")]
    EmptyBitmap(String),

    #[error("编码错误：{0}")]
    Encode(String),
}

impl ImageError {
    /// 稳定的错误码，供日志与响应体使用。
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidFormat(_) => "invalid_format",
            Self::Decode(_) => "decode_failed",
            Self::ResourceLimit(_) => "resource_limit",
            Self::EmptyBitmap(_) => "empty_bitmap",
            Self::Encode(_) => "encode_failed",
        }
    }

    /// 出错所在阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::InvalidFormat(_) | Self::ResourceLimit(_) => "load",
            Self::Decode(_) => "decode",
            Self::EmptyBitmap(_) => "transform",
            Self::Encode(_) => "encode",
        }
    }

    /// 是否属于“输入无法解码”一类（客户端错误）。
    pub fn is_decode_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidFormat(_) | Self::Decode(_) | Self::ResourceLimit(_)
        )
    }
}
