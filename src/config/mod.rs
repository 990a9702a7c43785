//! 配置模块
//!
//! 环境变量解析与 n8n 目标地址解析

pub mod env;
pub mod target;

pub use env::EnvConfig;
pub use target::{N8nTarget, TargetOverrides};
