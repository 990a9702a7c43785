//! n8n 连接设置

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

use super::workflow::WorkflowKind;

/// 持久化的连接设置，所有字段可选，缺省时回退到环境变量
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct N8NSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n8n_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// workflow → 完整 webhook URL
    #[serde(default)]
    pub webhooks: BTreeMap<WorkflowKind, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drive_list_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl N8NSettings {
    /// 清理空白值并校验 URL
    pub fn normalized(mut self) -> Result<Self, String> {
        self.n8n_url = clean(self.n8n_url).map(|u| u.trim_end_matches('/').to_string());
        self.api_key = clean(self.api_key);
        self.drive_list_url = clean(self.drive_list_url);
        self.webhooks = self
            .webhooks
            .into_iter()
            .filter_map(|(kind, url)| clean(Some(url)).map(|u| (kind, u)))
            .collect();

        if let Some(url) = &self.n8n_url {
            ensure_http_url("n8nUrl", url)?;
        }
        if let Some(url) = &self.drive_list_url {
            ensure_http_url("driveListUrl", url)?;
        }
        for (kind, url) in &self.webhooks {
            ensure_http_url(&format!("webhooks.{}", kind), url)?;
        }
        Ok(self)
    }

    /// 对外展示用：API key 只保留末 4 位
    pub fn masked(&self) -> Self {
        Self {
            api_key: self.api_key.as_deref().map(mask_secret),
            ..self.clone()
        }
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// 解析绝对 http(s) URL（必须带 host）
pub fn parse_http_url(url: &str) -> Option<Url> {
    Url::parse(url)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .filter(|u| u.host_str().map_or(false, |h| !h.is_empty()))
}

/// 校验绝对 http(s) URL
pub fn ensure_http_url(field: &str, url: &str) -> Result<(), String> {
    match parse_http_url(url) {
        Some(_) => Ok(()),
        None => Err(format!("{} must be an absolute http(s) URL, got '{}'", field, url)),
    }
}

/// `abcdef123456` → `****3456`
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("n8n_api_1234abcd"), "****abcd");
        assert_eq!(mask_secret("abc"), "****");
    }

    #[test]
    fn test_normalized_trims_and_validates() {
        let mut settings = N8NSettings {
            n8n_url: Some(" https://n8n.example.com/ ".to_string()),
            api_key: Some("   ".to_string()),
            ..Default::default()
        };
        settings
            .webhooks
            .insert(WorkflowKind::SocialPost, " ".to_string());

        let settings = settings.normalized().unwrap();
        assert_eq!(settings.n8n_url.as_deref(), Some("https://n8n.example.com"));
        assert!(settings.api_key.is_none());
        assert!(settings.webhooks.is_empty());
    }

    #[test]
    fn test_normalized_rejects_relative_url() {
        let settings = N8NSettings {
            n8n_url: Some("n8n.local".to_string()),
            ..Default::default()
        };
        assert!(settings.normalized().is_err());
        assert!(ensure_http_url("x", "http://").is_err());
        assert!(ensure_http_url("x", "ftp://n8n.local").is_err());
        assert!(ensure_http_url("x", "HTTPS://n8n.local").is_ok());
    }

    #[test]
    fn test_normalized_rejects_malformed_host() {
        let settings = N8NSettings {
            n8n_url: Some("http://exa mple.com".to_string()),
            ..Default::default()
        };
        assert!(settings.normalized().is_err());
        assert!(ensure_http_url("x", "http://bad host/").is_err());
        assert!(ensure_http_url("x", "http://n8n.local:5678/base").is_ok());
    }

    #[test]
    fn test_webhooks_serialize_with_kind_keys() {
        let mut settings = N8NSettings::default();
        settings.webhooks.insert(
            WorkflowKind::ImageEnhance,
            "https://n8n.example.com/webhook/enhance".to_string(),
        );
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(
            json["webhooks"]["image-enhance"],
            "https://n8n.example.com/webhook/enhance"
        );
    }
}
