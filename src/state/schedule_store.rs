//! 排期帖子存储

use chrono::{DateTime, Utc};
use std::path::Path;
use tokio::sync::RwLock;
use tracing::info;

use super::persist::JsonFile;
use crate::domain::post::{Platform, PostInput, PostStatus, ScheduledPost};

const SCHEDULE_FILE_NAME: &str = "schedule.json";

/// 列表过滤条件，`[from, to)` 为发布时间范围
#[derive(Clone, Debug, Default)]
pub struct PostFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub platform: Option<Platform>,
    pub status: Option<PostStatus>,
}

impl PostFilter {
    fn matches(&self, post: &ScheduledPost) -> bool {
        self.from.map_or(true, |from| post.scheduled_at >= from)
            && self.to.map_or(true, |to| post.scheduled_at < to)
            && self.platform.map_or(true, |p| post.platforms.contains(&p))
            && self.status.map_or(true, |s| post.status == s)
    }
}

/// 各状态数量
#[derive(Clone, Debug, Default, serde::Serialize, PartialEq)]
pub struct StatusCounts {
    pub draft: usize,
    pub scheduled: usize,
    pub published: usize,
    pub failed: usize,
}

/// 排期存储
pub struct ScheduleStore {
    file: JsonFile,
    posts: RwLock<Vec<ScheduledPost>>,
}

impl ScheduleStore {
    pub async fn open(data_dir: &Path) -> Self {
        let file = JsonFile::new(data_dir, SCHEDULE_FILE_NAME);
        let posts = file.load::<Vec<ScheduledPost>>().await.unwrap_or_default();
        Self {
            file,
            posts: RwLock::new(posts),
        }
    }

    /// 按发布时间升序列出
    pub async fn list(&self, filter: &PostFilter) -> Vec<ScheduledPost> {
        let posts = self.posts.read().await;
        let mut out: Vec<ScheduledPost> = posts.iter().filter(|p| filter.matches(p)).cloned().collect();
        out.sort_by_key(|p| p.scheduled_at);
        out
    }

    pub async fn get(&self, id: &str) -> Option<ScheduledPost> {
        let posts = self.posts.read().await;
        posts.iter().find(|p| p.id == id).cloned()
    }

    pub async fn create(&self, input: &PostInput) -> anyhow::Result<ScheduledPost> {
        self.insert(ScheduledPost::create(input)).await
    }

    /// 插入已构建好的帖子（发布流程使用）
    pub async fn insert(&self, post: ScheduledPost) -> anyhow::Result<ScheduledPost> {
        let mut posts = self.posts.write().await;
        let mut next = posts.clone();
        next.push(post.clone());
        self.file.save(&next).await?;
        *posts = next;

        info!(
            post_id = %post.id,
            status = post.status.as_str(),
            scheduled_at = %post.scheduled_at,
            "Recorded post"
        );
        Ok(post)
    }

    pub async fn update(&self, id: &str, input: &PostInput) -> anyhow::Result<Option<ScheduledPost>> {
        let mut posts = self.posts.write().await;
        let Some(index) = posts.iter().position(|p| p.id == id) else {
            return Ok(None);
        };

        let mut next = posts.clone();
        next[index].apply(input);
        let updated = next[index].clone();
        self.file.save(&next).await?;
        *posts = next;

        info!(post_id = %id, status = updated.status.as_str(), "Updated post");
        Ok(Some(updated))
    }

    pub async fn delete(&self, id: &str) -> anyhow::Result<bool> {
        let mut posts = self.posts.write().await;
        if !posts.iter().any(|p| p.id == id) {
            return Ok(false);
        }

        let next: Vec<ScheduledPost> = posts.iter().filter(|p| p.id != id).cloned().collect();
        self.file.save(&next).await?;
        *posts = next;

        info!(post_id = %id, "Deleted post");
        Ok(true)
    }

    pub async fn status_counts(&self) -> StatusCounts {
        let posts = self.posts.read().await;
        let mut counts = StatusCounts::default();
        for post in posts.iter() {
            match post.status {
                PostStatus::Draft => counts.draft += 1,
                PostStatus::Scheduled => counts.scheduled += 1,
                PostStatus::Published => counts.published += 1,
                PostStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }

    /// 即将发布的帖子，按时间升序取前 `limit` 条
    pub async fn upcoming(&self, now: DateTime<Utc>, limit: usize) -> Vec<ScheduledPost> {
        let posts = self.posts.read().await;
        let mut upcoming: Vec<ScheduledPost> = posts.iter().filter(|p| p.is_upcoming(now)).cloned().collect();
        upcoming.sort_by_key(|p| p.scheduled_at);
        upcoming.truncate(limit);
        upcoming
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn input(caption: &str, platforms: Vec<Platform>, at: DateTime<Utc>) -> PostInput {
        PostInput {
            title: String::new(),
            caption: caption.to_string(),
            platforms,
            image_url: None,
            product_id: None,
            scheduled_at: at,
            status: None,
        }
    }

    #[tokio::test]
    async fn test_filter_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScheduleStore::open(dir.path()).await;
        let now = Utc::now();

        store.create(&input("later", vec![Platform::Instagram], now + Duration::days(3))).await.unwrap();
        store.create(&input("sooner", vec![Platform::Twitter], now + Duration::days(1))).await.unwrap();
        store.create(&input("past", vec![Platform::Instagram], now - Duration::days(1))).await.unwrap();

        let all = store.list(&PostFilter::default()).await;
        assert_eq!(all.iter().map(|p| p.caption.as_str()).collect::<Vec<_>>(), vec!["past", "sooner", "later"]);

        let instagram = store
            .list(&PostFilter {
                platform: Some(Platform::Instagram),
                ..Default::default()
            })
            .await;
        assert_eq!(instagram.len(), 2);

        let window = store
            .list(&PostFilter {
                from: Some(now),
                to: Some(now + Duration::days(2)),
                ..Default::default()
            })
            .await;
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].caption, "sooner");

        let drafts = store
            .list(&PostFilter {
                status: Some(PostStatus::Draft),
                ..Default::default()
            })
            .await;
        assert_eq!(drafts.len(), 1);
    }

    #[tokio::test]
    async fn test_counts_and_upcoming() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScheduleStore::open(dir.path()).await;
        let now = Utc::now();

        for day in 1..=7 {
            store
                .create(&input("post", vec![Platform::Facebook], now + Duration::days(day)))
                .await
                .unwrap();
        }
        let mut failed = ScheduledPost::create(&input("x", vec![Platform::Facebook], now));
        failed.mark_failed("boom");
        store.insert(failed).await.unwrap();

        let counts = store.status_counts().await;
        assert_eq!(counts.scheduled, 7);
        assert_eq!(counts.failed, 1);

        let upcoming = store.upcoming(now, 5).await;
        assert_eq!(upcoming.len(), 5);
        assert!(upcoming.windows(2).all(|w| w[0].scheduled_at <= w[1].scheduled_at));
    }

    #[tokio::test]
    async fn test_update_delete_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScheduleStore::open(dir.path()).await;
        let post = store
            .create(&input("hello", vec![Platform::Linkedin], Utc::now() + Duration::hours(5)))
            .await
            .unwrap();

        let mut edit = input("hello world", vec![Platform::Linkedin], post.scheduled_at);
        edit.status = Some(PostStatus::Published);
        let updated = store.update(&post.id, &edit).await.unwrap().unwrap();
        assert_eq!(updated.status, PostStatus::Published);

        let reopened = ScheduleStore::open(dir.path()).await;
        assert_eq!(reopened.get(&post.id).await.unwrap().caption, "hello world");

        assert!(reopened.delete(&post.id).await.unwrap());
        assert!(reopened.get(&post.id).await.is_none());
    }
}
