//! # 二维码存储服务 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │          外部传输层（HTTP 服务器 / CLI / 测试）           │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕ ApiRequest / ApiResponse
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕                                                  │
//! │  ┌─ api ──────── 路由分发 + spawn_blocking                │
//! │  │   └─ auth       AccessGuard（主密钥 + 图片密钥）       │
//! │  │                                                       │
//! │  ├─ normalize ── 解码 → 灰度 → 去边 → 缩放 → PNG          │
//! │  │                                                       │
//! │  ├─ db ───────── SQLite (rusqlite) upsert / 按 id 读取    │
//! │  │                                                       │
//! │  ├─ config ───── 环境变量 + 可选 JSON 覆盖                │
//! │  └─ error ────── AppError (统一错误类型)                  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError` 及状态码映射 |
//! | [`config`] | 进程配置：两把独立密钥、数据库路径、流水线参数 |
//! | [`normalize`] | 二维码图片规范化流水线 |
//! | [`auth`] | 受保护路径判定与常量时间密钥比较 |
//! | [`db`] | 二维码记录的持久化 |
//! | [`api`] | 与框架无关的请求分发 |

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod normalize;
