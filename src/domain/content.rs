//! 内容工作室 / 图片实验室请求与结果

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::n8n::{normalize_object, string_field};
use super::post::Platform;

/// 文案生成请求
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRequest {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

impl ContentRequest {
    pub fn validate(&self) -> Result<(), String> {
        let has_topic = self.topic.as_deref().map_or(false, |t| !t.trim().is_empty());
        let has_product = self.product_id.as_deref().map_or(false, |p| !p.trim().is_empty());
        if !has_topic && !has_product {
            return Err("Either topic or productId is required".to_string());
        }
        if self.platforms.is_empty() {
            return Err("At least one platform is required".to_string());
        }
        Ok(())
    }
}

/// 生成的文案
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedContent {
    pub caption: String,
    pub hashtags: Vec<String>,
    pub raw: Value,
}

impl GeneratedContent {
    /// 从 workflow 输出解析；AI 节点的输出字段名不固定
    pub fn from_value(value: Value) -> Option<Self> {
        let normalized = normalize_object(value);
        let caption = string_field(
            &normalized,
            &["caption", "output", "text", "content", "message"],
        )
        .or_else(|| {
            // OpenAI 节点: {"choices": [{"message": {"content": "..."}}]}
            normalized
                .pointer("/choices/0/message/content")
                .and_then(Value::as_str)
                .map(str::to_string)
        })?;

        let mut hashtags: Vec<String> = match normalized.get("hashtags") {
            Some(Value::Array(tags)) => tags
                .iter()
                .filter_map(Value::as_str)
                .map(normalize_hashtag)
                .filter(|t| t.len() > 1)
                .collect(),
            Some(Value::String(s)) => extract_hashtags(s),
            _ => Vec::new(),
        };
        if hashtags.is_empty() {
            hashtags = extract_hashtags(&caption);
        }

        Some(Self {
            caption: caption.trim().to_string(),
            hashtags,
            raw: normalized,
        })
    }
}

fn normalize_hashtag(tag: &str) -> String {
    format!("#{}", tag.trim().trim_start_matches('#'))
}

/// 提取文本中的 `#tag`，保持出现顺序并去重
pub fn extract_hashtags(text: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for word in text.split_whitespace() {
        if !word.starts_with('#') {
            continue;
        }
        let body: String = word[1..]
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        if body.is_empty() {
            continue;
        }
        let tag = format!("#{}", body);
        if !tags.iter().any(|t| t.eq_ignore_ascii_case(&tag)) {
            tags.push(tag);
        }
    }
    tags
}

/// 图片增强请求
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageEnhanceRequest {
    pub image_url: String,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
}

impl ImageEnhanceRequest {
    pub fn validate(&self) -> Result<(), String> {
        let url = self.image_url.trim();
        if url.is_empty() {
            return Err("imageUrl is required".to_string());
        }
        if !(url.starts_with("http://") || url.starts_with("https://") || url.starts_with("data:image/")) {
            return Err("imageUrl must be an http(s) URL or an image data URI".to_string());
        }
        Ok(())
    }
}

/// 增强后的图片
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedImage {
    pub image_url: String,
    pub raw: Value,
}

impl EnhancedImage {
    pub fn from_value(value: Value) -> Option<Self> {
        let normalized = normalize_object(value);
        let image_url = string_field(
            &normalized,
            &["imageUrl", "image_url", "enhancedUrl", "url", "output"],
        )
        .or_else(|| {
            normalized
                .pointer("/data/0/url")
                .and_then(Value::as_str)
                .map(str::to_string)
        })?;
        Some(Self {
            image_url,
            raw: normalized,
        })
    }
}

/// 发布请求
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialPostRequest {
    #[serde(default)]
    pub title: Option<String>,
    pub caption: String,
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_request_validate() {
        let req: ContentRequest =
            serde_json::from_value(json!({ "topic": "Autumn chili", "platforms": ["instagram"] })).unwrap();
        assert!(req.validate().is_ok());

        let req: ContentRequest = serde_json::from_value(json!({ "platforms": ["instagram"] })).unwrap();
        assert!(req.validate().is_err());

        let req: ContentRequest =
            serde_json::from_value(json!({ "productId": "p1", "platforms": [] })).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_extract_hashtags() {
        let tags = extract_hashtags("Heat up dinner #Spicy #bbq, #spicy and # alone #chili_oil!");
        assert_eq!(tags, vec!["#Spicy", "#bbq", "#chili_oil"]);
    }

    #[test]
    fn test_generated_content_shapes() {
        let content = GeneratedContent::from_value(json!([
            { "json": { "output": "Smoky goodness #paprika #smoked" } }
        ]))
        .unwrap();
        assert_eq!(content.caption, "Smoky goodness #paprika #smoked");
        assert_eq!(content.hashtags, vec!["#paprika", "#smoked"]);

        let content = GeneratedContent::from_value(json!({
            "caption": "Try it",
            "hashtags": ["spice", "#heat"]
        }))
        .unwrap();
        assert_eq!(content.hashtags, vec!["#spice", "#heat"]);

        let content = GeneratedContent::from_value(json!({
            "choices": [{ "message": { "content": "From the model" } }]
        }))
        .unwrap();
        assert_eq!(content.caption, "From the model");

        assert!(GeneratedContent::from_value(json!({ "status": "ok" })).is_none());
    }

    #[test]
    fn test_enhanced_image_shapes() {
        let img = EnhancedImage::from_value(json!({ "image_url": "https://cdn/x.png" })).unwrap();
        assert_eq!(img.image_url, "https://cdn/x.png");

        let img = EnhancedImage::from_value(json!({ "data": [{ "url": "https://cdn/y.png" }] })).unwrap();
        assert_eq!(img.image_url, "https://cdn/y.png");

        assert!(EnhancedImage::from_value(json!({ "success": true })).is_none());
    }

    #[test]
    fn test_image_request_validate() {
        let ok = ImageEnhanceRequest {
            image_url: "https://drive.example/a.jpg".to_string(),
            style: None,
            prompt: None,
            product_id: None,
        };
        assert!(ok.validate().is_ok());

        let bad = ImageEnhanceRequest {
            image_url: "ftp://x".to_string(),
            ..ok
        };
        assert!(bad.validate().is_err());
    }
}
