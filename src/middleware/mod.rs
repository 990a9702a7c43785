//! 请求提取器
//!
//! n8n 目标覆盖与统一错误信封的 JSON / Query / Bytes 解析

pub mod extract;
pub mod overrides;

pub use extract::{ApiBytes, ApiJson, ApiQuery};
pub use overrides::N8nOverrides;
