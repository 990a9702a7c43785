//! n8n 目标地址解析
//!
//! 优先级：请求头覆盖 > 持久化设置 > 环境变量 > 默认值

use axum::http::HeaderMap;

use super::env::{trim_base_url, EnvConfig};
use crate::domain::settings::{ensure_http_url, parse_http_url, N8NSettings};
use crate::domain::workflow::WorkflowKind;

/// 覆盖 n8n 地址的请求头
pub const HEADER_N8N_URL: &str = "x-n8n-url";
/// 覆盖 n8n API key 的请求头（也是转发给 n8n 的头）
pub const HEADER_N8N_API_KEY: &str = "x-n8n-api-key";

/// 请求级覆盖（来自请求头）
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TargetOverrides {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

impl TargetOverrides {
    /// 读取 `X-N8N-URL` / `X-N8N-API-KEY`，空值视为未提供
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, String> {
        let read = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let base_url = read(HEADER_N8N_URL).map(|v| trim_base_url(&v));
        if let Some(url) = &base_url {
            ensure_http_url("X-N8N-URL", url)?;
        }

        Ok(Self {
            base_url,
            api_key: read(HEADER_N8N_API_KEY),
        })
    }
}

/// 解析后的 n8n 目标
#[derive(Clone, Debug, PartialEq)]
pub struct N8nTarget {
    pub base_url: String,
    pub api_key: Option<String>,
    /// base_url 是否来自请求头
    pub base_overridden: bool,
}

impl N8nTarget {
    pub fn resolve(config: &EnvConfig, settings: &N8NSettings, overrides: &TargetOverrides) -> Self {
        let (base_url, base_overridden) = match &overrides.base_url {
            Some(url) => (url.clone(), true),
            None => (
                settings
                    .n8n_url
                    .clone()
                    .unwrap_or_else(|| config.n8n_base_url.clone()),
                false,
            ),
        };

        let api_key = overrides
            .api_key
            .clone()
            .or_else(|| settings.api_key.clone())
            .or_else(|| config.n8n_api_key.clone());

        Self {
            base_url: trim_base_url(&base_url),
            api_key,
            base_overridden,
        }
    }

    /// `{base}/webhook/{path}`；path 已带 `webhook/` 或 `webhook-test/` 前缀时直接拼接
    pub fn webhook_url(&self, path: &str) -> String {
        let path = path.trim().trim_start_matches('/');
        if path.starts_with("webhook/") || path.starts_with("webhook-test/") {
            format!("{}/{}", self.base_url, path)
        } else {
            format!("{}/webhook/{}", self.base_url, path)
        }
    }

    /// n8n REST API：`{base}/api/v1/{path}`
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// 健康检查地址
    pub fn health_url(&self) -> String {
        format!("{}/healthz", self.base_url)
    }

    /// 解析指定 workflow 的 webhook URL
    pub fn workflow_url(&self, kind: WorkflowKind, config: &EnvConfig, settings: &N8NSettings) -> String {
        let env_override = config.webhook_overrides.get(&kind).map(String::as_str);

        // 请求头指定了实例时，只沿用相对路径
        if self.base_overridden {
            let path = env_override
                .filter(|v| !is_absolute(v))
                .unwrap_or_else(|| kind.default_path());
            return self.webhook_url(path);
        }

        if let Some(url) = settings.webhooks.get(&kind) {
            return url.clone();
        }

        if kind == WorkflowKind::LibraryList {
            if let Some(url) = settings.drive_list_url.as_ref().or(config.drive_list_url.as_ref()) {
                return url.clone();
            }
        }

        match env_override {
            Some(v) if is_absolute(v) => v.to_string(),
            Some(path) => self.webhook_url(path),
            None => self.webhook_url(kind.default_path()),
        }
    }
}

fn is_absolute(url: &str) -> bool {
    parse_http_url(url).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn config() -> EnvConfig {
        let mut config = EnvConfig::new("http://env-n8n:5678", "/tmp/cc-test");
        config.n8n_api_key = Some("env-key".to_string());
        config
    }

    #[test]
    fn test_overrides_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_N8N_URL, HeaderValue::from_static("https://header-n8n/"));
        headers.insert(HEADER_N8N_API_KEY, HeaderValue::from_static("  "));

        let overrides = TargetOverrides::from_headers(&headers).unwrap();
        assert_eq!(overrides.base_url.as_deref(), Some("https://header-n8n"));
        assert!(overrides.api_key.is_none());
    }

    #[test]
    fn test_overrides_reject_relative_url() {
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_N8N_URL, HeaderValue::from_static("n8n.local"));
        assert!(TargetOverrides::from_headers(&headers).is_err());

        headers.insert(HEADER_N8N_URL, HeaderValue::from_static("http://bad host/"));
        assert!(TargetOverrides::from_headers(&headers).is_err());
    }

    #[test]
    fn test_resolve_precedence() {
        let config = config();
        let settings = N8NSettings {
            n8n_url: Some("http://settings-n8n".to_string()),
            ..Default::default()
        };

        let target = N8nTarget::resolve(&config, &N8NSettings::default(), &TargetOverrides::default());
        assert_eq!(target.base_url, "http://env-n8n:5678");
        assert_eq!(target.api_key.as_deref(), Some("env-key"));

        let target = N8nTarget::resolve(&config, &settings, &TargetOverrides::default());
        assert_eq!(target.base_url, "http://settings-n8n");
        assert!(!target.base_overridden);

        let overrides = TargetOverrides {
            base_url: Some("http://header-n8n".to_string()),
            api_key: Some("header-key".to_string()),
        };
        let target = N8nTarget::resolve(&config, &settings, &overrides);
        assert_eq!(target.base_url, "http://header-n8n");
        assert_eq!(target.api_key.as_deref(), Some("header-key"));
        assert!(target.base_overridden);
    }

    #[test]
    fn test_webhook_url_join() {
        let target = N8nTarget::resolve(&config(), &N8NSettings::default(), &TargetOverrides::default());
        assert_eq!(target.webhook_url("/social-post"), "http://env-n8n:5678/webhook/social-post");
        assert_eq!(target.webhook_url("webhook-test/abc"), "http://env-n8n:5678/webhook-test/abc");
        assert_eq!(target.api_url("workflows"), "http://env-n8n:5678/api/v1/workflows");
    }

    #[test]
    fn test_workflow_url_precedence() {
        let mut config = config();
        config
            .webhook_overrides
            .insert(WorkflowKind::SocialPost, "custom/post".to_string());
        config.webhook_overrides.insert(
            WorkflowKind::ImageEnhance,
            "https://other-host/webhook/enhance".to_string(),
        );
        config.drive_list_url = Some("https://drive-hook/list".to_string());

        let mut settings = N8NSettings::default();
        let target = N8nTarget::resolve(&config, &settings, &TargetOverrides::default());

        assert_eq!(
            target.workflow_url(WorkflowKind::SocialPost, &config, &settings),
            "http://env-n8n:5678/webhook/custom/post"
        );
        assert_eq!(
            target.workflow_url(WorkflowKind::ImageEnhance, &config, &settings),
            "https://other-host/webhook/enhance"
        );
        assert_eq!(
            target.workflow_url(WorkflowKind::ContentGenerate, &config, &settings),
            "http://env-n8n:5678/webhook/content-generate"
        );
        assert_eq!(
            target.workflow_url(WorkflowKind::LibraryList, &config, &settings),
            "https://drive-hook/list"
        );

        settings.webhooks.insert(
            WorkflowKind::SocialPost,
            "https://settings-host/webhook/p".to_string(),
        );
        assert_eq!(
            target.workflow_url(WorkflowKind::SocialPost, &config, &settings),
            "https://settings-host/webhook/p"
        );

        // 请求头覆盖实例：绝对地址覆盖失效，相对路径保留
        let overrides = TargetOverrides {
            base_url: Some("http://header-n8n".to_string()),
            api_key: None,
        };
        let target = N8nTarget::resolve(&config, &settings, &overrides);
        assert_eq!(
            target.workflow_url(WorkflowKind::SocialPost, &config, &settings),
            "http://header-n8n/webhook/custom/post"
        );
        assert_eq!(
            target.workflow_url(WorkflowKind::ImageEnhance, &config, &settings),
            "http://header-n8n/webhook/image-enhance"
        );
        assert_eq!(
            target.workflow_url(WorkflowKind::LibraryList, &config, &settings),
            "http://header-n8n/webhook/drive-list"
        );
    }
}
