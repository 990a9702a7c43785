//! 环境变量配置加载

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use tracing::warn;

use crate::domain::workflow::WorkflowKind;

/// 默认 n8n 地址
pub const DEFAULT_N8N_BASE_URL: &str = "http://localhost:5678";

/// 环境配置
#[derive(Clone, Debug)]
pub struct EnvConfig {
    /// 服务监听端口
    pub port: u16,
    /// n8n 实例地址 (不含 /webhook)
    pub n8n_base_url: String,
    /// n8n REST API Key
    pub n8n_api_key: Option<String>,
    /// 单个 workflow 的 webhook 覆盖 (绝对 URL 或相对路径)
    pub webhook_overrides: HashMap<WorkflowKind, String>,
    /// Drive 文件列表 webhook (绝对 URL)
    pub drive_list_url: Option<String>,
    /// 上游请求超时（秒）
    pub timeout_secs: u64,
    /// 数据目录（settings / products / schedule 文件）
    pub data_dir: PathBuf,
    /// 上传请求体上限（字节）
    pub upload_max_bytes: usize,
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        let n8n_base_url = load_with_fallback("N8N_BASE_URL", "N8N_URL")
            .map(|v| trim_base_url(&v))
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_N8N_BASE_URL.to_string());
        if load_non_empty("N8N_BASE_URL").is_none() && load_non_empty("N8N_URL").is_some() {
            warn!("N8N_URL is deprecated, please use N8N_BASE_URL");
        }

        let n8n_api_key = env::var("N8N_API_KEY").ok().filter(|s| !s.is_empty());

        let webhook_overrides = WorkflowKind::ALL
            .iter()
            .filter_map(|kind| {
                env::var(kind.env_var())
                    .ok()
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .map(|v| (*kind, v))
            })
            .collect();

        let drive_list_url = env::var("DRIVE_LIST_WEBHOOK_URL")
            .ok()
            .filter(|s| !s.is_empty());

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(constants::DEFAULT_PORT);

        let timeout_secs = env::var("N8N_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(constants::DEFAULT_TIMEOUT_SECS);

        let data_dir = env::var("COMMAND_CENTER_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let upload_max_bytes = env::var("UPLOAD_MAX_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(constants::DEFAULT_UPLOAD_MAX_BYTES);

        Self {
            port,
            n8n_base_url,
            n8n_api_key,
            webhook_overrides,
            drive_list_url,
            timeout_secs,
            data_dir,
            upload_max_bytes,
        }
    }

    /// 测试和嵌入场景使用：指定 n8n 地址与数据目录，其余取默认值
    pub fn new(n8n_base_url: impl Into<String>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            port: constants::DEFAULT_PORT,
            n8n_base_url: trim_base_url(&n8n_base_url.into()),
            n8n_api_key: None,
            webhook_overrides: HashMap::new(),
            drive_list_url: None,
            timeout_secs: constants::DEFAULT_TIMEOUT_SECS,
            data_dir: data_dir.into(),
            upload_max_bytes: constants::DEFAULT_UPLOAD_MAX_BYTES,
        }
    }
}

/// 去除尾部斜杠
pub fn trim_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// 加载环境变量，支持 fallback；空值视为未设置
fn load_with_fallback(primary: &str, fallback: &str) -> Option<String> {
    load_non_empty(primary).or_else(|| load_non_empty(fallback))
}

fn load_non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 常量
pub mod constants {
    /// 默认监听端口
    pub const DEFAULT_PORT: u16 = 3001;

    /// 上游请求默认超时（秒），图片生成类 workflow 较慢
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// 上传默认上限 50 MiB
    pub const DEFAULT_UPLOAD_MAX_BYTES: usize = 50 * 1024 * 1024;

    /// 连接探测超时（秒）
    pub const PROBE_TIMEOUT_SECS: u64 = 5;

    /// Dashboard 展示的即将发布条数
    pub const UPCOMING_POSTS_LIMIT: usize = 5;

    /// 版本号
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_with_fallback() {
        env::set_var("CC_TEST_PRIMARY", "primary_value");
        env::set_var("CC_TEST_FALLBACK", "fallback_value");

        assert_eq!(
            load_with_fallback("CC_TEST_PRIMARY", "CC_TEST_FALLBACK"),
            Some("primary_value".to_string())
        );

        env::remove_var("CC_TEST_PRIMARY");
        assert_eq!(
            load_with_fallback("CC_TEST_PRIMARY", "CC_TEST_FALLBACK"),
            Some("fallback_value".to_string())
        );

        // 空的主变量不应遮住 fallback
        env::set_var("CC_TEST_PRIMARY", "  ");
        assert_eq!(
            load_with_fallback("CC_TEST_PRIMARY", "CC_TEST_FALLBACK"),
            Some("fallback_value".to_string())
        );

        env::remove_var("CC_TEST_PRIMARY");
        env::remove_var("CC_TEST_FALLBACK");
        assert_eq!(load_with_fallback("CC_TEST_PRIMARY", "CC_TEST_FALLBACK"), None);
    }

    #[test]
    fn test_trim_base_url() {
        assert_eq!(trim_base_url("http://n8n.local:5678/"), "http://n8n.local:5678");
        assert_eq!(trim_base_url(" https://n8n.example.com// "), "https://n8n.example.com");
    }

    #[test]
    fn test_new_defaults() {
        let config = EnvConfig::new("http://127.0.0.1:5678/", "/tmp/cc");
        assert_eq!(config.n8n_base_url, "http://127.0.0.1:5678");
        assert_eq!(config.port, constants::DEFAULT_PORT);
        assert!(config.webhook_overrides.is_empty());
        assert!(config.n8n_api_key.is_none());
    }
}
