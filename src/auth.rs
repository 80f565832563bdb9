//! 访问控制模块
//!
//! # 设计思路
//!
//! 在请求进入路由前判断：该路径是否需要主密钥、调用方给出的主密钥是否正确。
//! 主密钥比较先对双方做 SHA-256，再对定长摘要做常量时间比较，
//! 长度不同与内容不同走同一路径、返回同一错误。
//!
//! 图片读取走另一把独立的密钥（查询参数），只做普通相等比较：
//! 手表端 SDK 无法为图片请求附带请求头，这是为它单独放宽的通道。
//!
//! # 受保护路径
//!
//! | 规则 | 类型 |
//! |------|------|
//! | `/add` | 精确匹配 |
//! | `/title/` | 前缀匹配 |
//!
//! 匹配前路径统一转小写；`/image/` 不在此表中。

use sha2::{Digest, Sha256};

use crate::config::AppConfig;
use crate::error::AppError;

/// 受保护路径规则。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtectedRoute {
    Exact(&'static str),
    Prefix(&'static str),
}

impl ProtectedRoute {
    fn matches(&self, lowered_path: &str) -> bool {
        match self {
            Self::Exact(pattern) => lowered_path == *pattern,
            Self::Prefix(pattern) => lowered_path.starts_with(pattern),
        }
    }
}

/// 默认受保护路径：写入端点与名称读取。
pub const DEFAULT_PROTECTED_ROUTES: [ProtectedRoute; 2] = [
    ProtectedRoute::Exact("/add"),
    ProtectedRoute::Prefix("/title/"),
];

/// 主密钥请求头名称。
pub const API_KEY_HEADER: &str = "X-API-Key";
/// 图片读取密钥的查询参数名。
pub const IMAGE_KEY_QUERY_PARAM: &str = "apiKey";

type KeyDigest = [u8; 32];

fn digest(value: &str) -> KeyDigest {
    Sha256::digest(value.as_bytes()).into()
}

/// 常量时间比较两个摘要。
fn ct_eq(a: &KeyDigest, b: &KeyDigest) -> bool {
    let mut diff: u8 = 0;
    for i in 0..a.len() {
        diff |= a[i] ^ b[i];
    }
    diff == 0
}

/// 请求鉴权器，启动时构造一次，之后只读共享。
#[derive(Clone)]
pub struct AccessGuard {
    /// 只保存主密钥摘要，不保留明文
    api_key_digest: Option<KeyDigest>,
    image_api_key: Option<String>,
    protected: Vec<ProtectedRoute>,
}

impl std::fmt::Debug for AccessGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGuard")
            .field("api_key_configured", &self.api_key_digest.is_some())
            .field("image_api_key_configured", &self.image_api_key.is_some())
            .field("protected", &self.protected)
            .finish()
    }
}

impl AccessGuard {
    pub fn new(api_key: Option<&str>, image_api_key: Option<&str>) -> Self {
        Self {
            api_key_digest: api_key.filter(|k| !k.is_empty()).map(digest),
            image_api_key: image_api_key.filter(|k| !k.is_empty()).map(str::to_string),
            protected: DEFAULT_PROTECTED_ROUTES.to_vec(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.api_key.as_deref(), config.image_api_key.as_deref())
    }

    /// 路径是否需要主密钥（大小写不敏感）。
    pub fn is_protected(&self, path: &str) -> bool {
        let lowered = path.to_lowercase();
        self.protected.iter().any(|route| route.matches(&lowered))
    }

    /// 主密钥校验。
    ///
    /// 未配置主密钥时所有受保护路径一律拒绝。
    pub fn validate_api_key(&self, supplied: &str) -> bool {
        match &self.api_key_digest {
            Some(expected) => ct_eq(expected, &digest(supplied)),
            None => false,
        }
    }

    /// 请求级鉴权：非受保护路径直接放行。
    pub fn authorize(&self, path: &str, header_key: Option<&str>) -> Result<(), AppError> {
        if !self.is_protected(path) {
            return Ok(());
        }

        match header_key {
            Some(key) if !key.is_empty() && self.validate_api_key(key) => Ok(()),
            _ => {
                log::warn!("鉴权失败 - 路径: {}", path);
                Err(AppError::Unauthorized)
            }
        }
    }

    /// 图片读取专用密钥校验（普通相等比较）。
    ///
    /// 未配置时一律拒绝。
    pub fn authorize_image_read(&self, query_key: Option<&str>) -> Result<(), AppError> {
        match (&self.image_api_key, query_key) {
            (Some(expected), Some(supplied)) if expected == supplied => Ok(()),
            _ => {
                log::warn!("图片读取密钥校验失败");
                Err(AppError::Unauthorized)
            }
        }
    }
}
