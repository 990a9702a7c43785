//! 媒体库（Google Drive）文件模型

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::n8n::{extract_list, normalize_object, string_field};

/// 文件大类，由 MIME type 推断
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Image,
    Video,
    Document,
    Other,
}

impl FileKind {
    pub fn from_mime(mime: &str) -> Self {
        let mime = mime.to_ascii_lowercase();
        if mime.starts_with("image/") {
            FileKind::Image
        } else if mime.starts_with("video/") {
            FileKind::Video
        } else if mime.starts_with("text/")
            || mime == "application/pdf"
            || mime.starts_with("application/vnd.google-apps.document")
            || mime.starts_with("application/vnd.google-apps.spreadsheet")
            || mime.starts_with("application/vnd.google-apps.presentation")
            || mime.contains("officedocument")
        {
            FileKind::Document
        } else {
            FileKind::Other
        }
    }
}

/// 媒体库文件
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub kind: FileKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_view_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
}

impl DriveFile {
    /// 从 Drive API / n8n 节点输出解析，字段名兼容 camelCase 与 snake_case
    pub fn from_value(value: &Value) -> Option<Self> {
        let id = string_field(value, &["id", "fileId", "file_id"])?;
        let mime_type = string_field(value, &["mimeType", "mime_type"])
            .unwrap_or_else(|| "application/octet-stream".to_string());

        // Drive API 以字符串返回 size
        let size = match value.get("size") {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.parse().ok(),
            _ => None,
        };

        Some(Self {
            name: string_field(value, &["name", "title", "fileName"]).unwrap_or_else(|| id.clone()),
            kind: FileKind::from_mime(&mime_type),
            mime_type,
            size,
            thumbnail_url: string_field(value, &["thumbnailLink", "thumbnailUrl", "thumbnail"]),
            web_view_url: string_field(value, &["webViewLink", "webViewUrl", "url"]),
            download_url: string_field(value, &["webContentLink", "downloadUrl"]),
            created_at: string_field(value, &["createdTime", "createdAt"]),
            modified_at: string_field(value, &["modifiedTime", "modifiedAt", "updatedAt"]),
            id,
        })
    }
}

/// 媒体库列表结果
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DriveListing {
    pub files: Vec<DriveFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

impl DriveListing {
    pub fn from_value(value: &Value) -> Self {
        let files = extract_list(value)
            .iter()
            .filter_map(DriveFile::from_value)
            .collect();

        let next_page_token = match normalize_object(value.clone()) {
            obj @ Value::Object(_) => string_field(&obj, &["nextPageToken", "next_page_token"]),
            _ => None,
        };

        Self {
            files,
            next_page_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_file_kind_from_mime() {
        assert_eq!(FileKind::from_mime("image/png"), FileKind::Image);
        assert_eq!(FileKind::from_mime("VIDEO/mp4"), FileKind::Video);
        assert_eq!(FileKind::from_mime("application/pdf"), FileKind::Document);
        assert_eq!(
            FileKind::from_mime("application/vnd.google-apps.document"),
            FileKind::Document
        );
        assert_eq!(FileKind::from_mime("application/zip"), FileKind::Other);
    }

    #[test]
    fn test_drive_file_from_api_fields() {
        let file = DriveFile::from_value(&json!({
            "id": "1AbC",
            "name": "paprika.jpg",
            "mimeType": "image/jpeg",
            "size": "20480",
            "thumbnailLink": "https://drive.example/thumb/1AbC",
            "webViewLink": "https://drive.example/view/1AbC",
            "createdTime": "2026-09-01T10:00:00.000Z"
        }))
        .unwrap();

        assert_eq!(file.kind, FileKind::Image);
        assert_eq!(file.size, Some(20480));
        assert_eq!(file.thumbnail_url.as_deref(), Some("https://drive.example/thumb/1AbC"));
        assert!(file.download_url.is_none());
    }

    #[test]
    fn test_listing_from_item_array() {
        let listing = DriveListing::from_value(&json!([
            { "json": { "id": "a", "name": "a.png", "mimeType": "image/png" } },
            { "json": { "id": "b", "name": "b.mp4", "mimeType": "video/mp4" } },
            { "json": { "name": "no id" } }
        ]));
        assert_eq!(listing.files.len(), 2);
        assert!(listing.next_page_token.is_none());
    }

    #[test]
    fn test_listing_with_page_token() {
        let listing = DriveListing::from_value(&json!({
            "files": [{ "id": "a", "name": "a.png", "mimeType": "image/png" }],
            "nextPageToken": "tok-2"
        }));
        assert_eq!(listing.files.len(), 1);
        assert_eq!(listing.next_page_token.as_deref(), Some("tok-2"));
    }
}
