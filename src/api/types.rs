use serde::{Deserialize, Serialize};

use super::query::percent_encode;

pub const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// 与传输层无关的请求描述。
#[derive(Debug, Clone, Default)]
pub struct ApiRequest {
    pub method: String,
    pub path: String,
    /// 原始查询串，可带或不带前导 `?`
    pub query: String,
    /// `X-API-Key` 请求头
    pub api_key: Option<String>,
    pub body: Vec<u8>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn post(path: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            method: "POST".to_string(),
            path: path.into(),
            body: body.into(),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// 追加一个查询参数，键和值都会做百分号编码。
    pub fn with_query_param(mut self, key: &str, value: &str) -> Self {
        let query = self.query.strip_prefix('?').unwrap_or(&self.query);
        let pair = format!("{}={}", percent_encode(key), percent_encode(value));
        self.query = if query.is_empty() {
            pair
        } else {
            format!("{}&{}", query, pair)
        };
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn text(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            content_type: CONTENT_TYPE_TEXT,
            body: message.into().into_bytes(),
        }
    }

    pub fn json(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type: CONTENT_TYPE_JSON,
            body,
        }
    }

    pub fn bytes(content_type: &'static str, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type,
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 文本形式的响应体，便于日志与 CLI 输出。
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// `POST /add` 请求体
#[derive(Debug, Clone, Deserialize)]
pub struct AddQrcodeRequest {
    pub id: i64,
    pub name: String,
    /// base64 或 data URL
    pub image: String,
}

/// `GET /title/{id}` 响应体
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TitleResponse {
    pub name: String,
}
