//! 排期帖子模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 社交平台
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Instagram,
    Facebook,
    Twitter,
    Linkedin,
    Tiktok,
    Pinterest,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
            Platform::Twitter => "twitter",
            Platform::Linkedin => "linkedin",
            Platform::Tiktok => "tiktok",
            Platform::Pinterest => "pinterest",
        }
    }

    /// 单条帖子字符数上限
    pub fn caption_limit(&self) -> usize {
        match self {
            Platform::Twitter => 280,
            Platform::Linkedin => 3000,
            Platform::Instagram | Platform::Tiktok => 2200,
            Platform::Pinterest => 500,
            Platform::Facebook => 63206,
        }
    }
}

/// 帖子状态
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Draft,
    Scheduled,
    Published,
    Failed,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Scheduled => "scheduled",
            PostStatus::Published => "published",
            PostStatus::Failed => "failed",
        }
    }
}

/// 排期帖子
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledPost {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub caption: String,
    pub platforms: Vec<Platform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 创建 / 更新帖子的请求体
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostInput {
    #[serde(default)]
    pub title: String,
    pub caption: String,
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub status: Option<PostStatus>,
}

/// 校验文案与平台组合
pub fn validate_caption(caption: &str, platforms: &[Platform]) -> Result<(), String> {
    if caption.trim().is_empty() {
        return Err("Caption is required".to_string());
    }
    if platforms.is_empty() {
        return Err("At least one platform is required".to_string());
    }
    let len = caption.chars().count();
    if let Some(p) = platforms.iter().find(|p| len > p.caption_limit()) {
        return Err(format!(
            "Caption is {} characters, {} allows at most {}",
            len,
            p.as_str(),
            p.caption_limit()
        ));
    }
    Ok(())
}

fn dedup_platforms(platforms: &[Platform]) -> Vec<Platform> {
    let mut out = Vec::with_capacity(platforms.len());
    for p in platforms {
        if !out.contains(p) {
            out.push(*p);
        }
    }
    out
}

impl PostInput {
    pub fn validate(&self) -> Result<(), String> {
        validate_caption(&self.caption, &self.platforms)
    }
}

impl ScheduledPost {
    /// 由输入创建；未指定状态时，未来时间为 scheduled，否则为 draft
    pub fn create(input: &PostInput) -> Self {
        let now = Utc::now();
        let status = input.status.unwrap_or(if input.scheduled_at > now {
            PostStatus::Scheduled
        } else {
            PostStatus::Draft
        });

        Self {
            id: Uuid::new_v4().to_string(),
            title: input.title.trim().to_string(),
            caption: input.caption.clone(),
            platforms: dedup_platforms(&input.platforms),
            image_url: input.image_url.clone().filter(|u| !u.trim().is_empty()),
            product_id: input.product_id.clone().filter(|id| !id.trim().is_empty()),
            scheduled_at: input.scheduled_at,
            status,
            created_at: now,
            updated_at: now,
            error: None,
        }
    }

    /// 整体替换可编辑字段；未指定状态时保留原状态
    pub fn apply(&mut self, input: &PostInput) {
        self.title = input.title.trim().to_string();
        self.caption = input.caption.clone();
        self.platforms = dedup_platforms(&input.platforms);
        self.image_url = input.image_url.clone().filter(|u| !u.trim().is_empty());
        self.product_id = input.product_id.clone().filter(|id| !id.trim().is_empty());
        self.scheduled_at = input.scheduled_at;
        if let Some(status) = input.status {
            self.status = status;
            if status != PostStatus::Failed {
                self.error = None;
            }
        }
        self.updated_at = Utc::now();
    }

    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.status = PostStatus::Failed;
        self.error = Some(error.into());
        self.updated_at = Utc::now();
    }

    /// 发布时间在 `now` 之后且尚未发布
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_at > now
            && matches!(self.status, PostStatus::Scheduled | PostStatus::Draft)
    }
}
