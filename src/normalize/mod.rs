//! # 图片规范化模块（normalize）
//!
//! ## 设计思路
//!
//! 该模块将“加载校验 → 解码 → 灰度 → 裁边 → 缩放 → 编码”按职责拆分为多个子模块，
//! 避免单文件膨胀与耦合。整个模块不接触存储与鉴权，是纯 CPU 计算。
//!
//! - `pipeline`：编排整条处理流水线（阶段耗时日志 + 失败即中止）
//! - `loader`：负责 Base64/字节/文件加载与签名、体积校验
//! - `decode`：负责 header 探测、像素上限、完整解码
//! - `grayscale` / `crop` / `resize`：三个无错误的纯变换阶段
//! - `encode`：负责 PNG 编码
//! - `config/error/source`：配置、错误、中间数据模型
//!
//! ## 新同事快速上手
//!
//! ```text
//! api::handlers（Base64 信封）
//!    ↓
//! pipeline.rs（统一编排 + 阶段耗时日志）
//!    ├─ loader.rs（签名 + 体积校验）
//!    ├─ decode.rs（header 尺寸 + 像素限制 + 解码）
//!    ├─ grayscale.rs（BT.601 亮度）
//!    ├─ crop.rs（四边独立扫描裁边）
//!    ├─ resize.rs（固定尺寸卷积重采样）
//!    └─ encode.rs（PNG）
//!    ↓
//! NormalizedImage → db::upsert_record
//! ```

mod config;
mod crop;
mod decode;
mod encode;
mod error;
mod grayscale;
mod loader;
mod pipeline;
mod resize;
mod source;

pub use config::{
    BORDER_TOLERANCE, DEFAULT_TARGET_HEIGHT, DEFAULT_TARGET_WIDTH, PipelineConfig, ResampleFilter,
};
pub use crop::BorderCropper;
pub use error::ImageError;
pub use grayscale::GrayscaleConverter;
pub use pipeline::NormalizationPipeline;
pub use resize::Resizer;
pub use source::{CropBox, DecodedBitmap, NormalizedImage};
