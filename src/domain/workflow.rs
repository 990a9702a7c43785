//! n8n workflow 相关领域模型

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::n8n::{extract_list, string_field};

/// 由本服务直接调用的 workflow
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowKind {
    ContentGenerate,
    ImageEnhance,
    SocialPost,
    LibraryList,
    LibraryUpload,
}

impl WorkflowKind {
    pub const ALL: [WorkflowKind; 5] = [
        WorkflowKind::ContentGenerate,
        WorkflowKind::ImageEnhance,
        WorkflowKind::SocialPost,
        WorkflowKind::LibraryList,
        WorkflowKind::LibraryUpload,
    ];

    /// 默认 webhook 路径（相对于 `{base}/webhook/`）
    pub fn default_path(&self) -> &'static str {
        match self {
            WorkflowKind::ContentGenerate => "content-generate",
            WorkflowKind::ImageEnhance => "image-enhance",
            WorkflowKind::SocialPost => "social-post",
            WorkflowKind::LibraryList => "drive-list",
            WorkflowKind::LibraryUpload => "drive-upload",
        }
    }

    /// 覆盖该 workflow webhook 的环境变量名
    pub fn env_var(&self) -> &'static str {
        match self {
            WorkflowKind::ContentGenerate => "N8N_WEBHOOK_CONTENT_GENERATE",
            WorkflowKind::ImageEnhance => "N8N_WEBHOOK_IMAGE_ENHANCE",
            WorkflowKind::SocialPost => "N8N_WEBHOOK_SOCIAL_POST",
            WorkflowKind::LibraryList => "N8N_WEBHOOK_LIBRARY_LIST",
            WorkflowKind::LibraryUpload => "N8N_WEBHOOK_LIBRARY_UPLOAD",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowKind::ContentGenerate => "content-generate",
            WorkflowKind::ImageEnhance => "image-enhance",
            WorkflowKind::SocialPost => "social-post",
            WorkflowKind::LibraryList => "library-list",
            WorkflowKind::LibraryUpload => "library-upload",
        }
    }
}

impl std::fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// n8n REST API 返回的 workflow 摘要
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSummary {
    pub id: String,
    pub name: String,
    pub active: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl WorkflowSummary {
    /// 从 n8n 原始对象解析；缺少 id 的条目被丢弃
    pub fn from_value(value: &Value) -> Option<Self> {
        let id = match value.get("id")? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };

        // tags 可能是字符串数组，也可能是 {id, name} 对象数组
        let tags = value
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(|t| match t {
                        Value::String(s) => Some(s.clone()),
                        Value::Object(_) => string_field(t, &["name"]),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            id,
            name: string_field(value, &["name"]).unwrap_or_else(|| "Untitled workflow".to_string()),
            active: value.get("active").and_then(Value::as_bool).unwrap_or(false),
            tags,
            created_at: string_field(value, &["createdAt", "created_at"]),
            updated_at: string_field(value, &["updatedAt", "updated_at"]),
        })
    }

    /// 解析列表响应：`{data: [...]}`、裸数组等形式
    pub fn list_from_value(value: &Value) -> Vec<Self> {
        extract_list(value)
            .iter()
            .filter_map(Self::from_value)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_serde_is_kebab_case() {
        let json = serde_json::to_string(&WorkflowKind::ContentGenerate).unwrap();
        assert_eq!(json, "\"content-generate\"");
        let kind: WorkflowKind = serde_json::from_str("\"library-upload\"").unwrap();
        assert_eq!(kind, WorkflowKind::LibraryUpload);
    }

    #[test]
    fn test_env_vars_unique() {
        let mut vars: Vec<_> = WorkflowKind::ALL.iter().map(|k| k.env_var()).collect();
        vars.sort();
        vars.dedup();
        assert_eq!(vars.len(), WorkflowKind::ALL.len());
    }

    #[test]
    fn test_workflow_list_from_rest_response() {
        let value = json!({
            "data": [
                {"id": "1", "name": "Caption writer", "active": true,
                 "tags": [{"id": "t1", "name": "content"}], "createdAt": "2026-01-02T00:00:00.000Z"},
                {"id": 7, "name": "Poster", "active": false, "tags": ["social"]},
                {"name": "broken"}
            ],
            "nextCursor": null
        });

        let list = WorkflowSummary::list_from_value(&value);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].tags, vec!["content".to_string()]);
        assert!(list[0].active);
        assert_eq!(list[1].id, "7");
        assert_eq!(list[1].tags, vec!["social".to_string()]);
    }
}
