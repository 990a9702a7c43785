//! 基础设施模块
//!
//! 封装外部依赖（n8n HTTP client）

pub mod n8n_client;

pub use n8n_client::{ForwardRequest, N8nClient, ProbeResult, UpstreamError, UpstreamResponse};
