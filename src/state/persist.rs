//! JSON 文件持久化
//!
//! settings / products / schedule 各自保存在数据目录下的一个 JSON 文件中，
//! 写入采用临时文件 + 原子重命名

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

/// 当前文件格式版本
const FORMAT_VERSION: u32 = 1;

/// 文件内容包装
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersistedDocument<T> {
    /// 版本号（用于未来格式升级）
    pub version: u32,
    /// 保存时间
    pub saved_at: DateTime<Utc>,
    pub data: T,
}

/// 单个 JSON 文件
#[derive(Clone, Debug)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(dir: &Path, file_name: &str) -> Self {
        Self {
            path: dir.join(file_name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 从文件加载；文件不存在或内容损坏时返回 None
    pub async fn load<T: DeserializeOwned>(&self) -> Option<T> {
        if !self.path.exists() {
            return None;
        }

        match fs::read_to_string(&self.path).await {
            Ok(content) => match serde_json::from_str::<PersistedDocument<T>>(&content) {
                Ok(doc) => {
                    info!(
                        path = %self.path.display(),
                        version = doc.version,
                        saved_at = %doc.saved_at,
                        "Loaded persisted document"
                    );
                    Some(doc.data)
                }
                Err(e) => {
                    warn!(
                        path = %self.path.display(),
                        error = %e,
                        "Failed to parse persisted document, ignoring"
                    );
                    None
                }
            },
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to read persisted document"
                );
                None
            }
        }
    }

    /// 保存到文件（原子写入）
    pub async fn save<T: Serialize>(&self, data: &T) -> anyhow::Result<()> {
        let temp_path = self.path.with_extension("json.tmp");

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let doc = PersistedDocument {
            version: FORMAT_VERSION,
            saved_at: Utc::now(),
            data,
        };
        let content = serde_json::to_string_pretty(&doc)?;

        fs::write(&temp_path, &content).await?;
        fs::rename(&temp_path, &self.path).await?;

        info!(path = %self.path.display(), "Saved persisted document");
        Ok(())
    }

    /// 删除文件
    pub async fn remove(&self) -> anyhow::Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).await?;
            info!(path = %self.path.display(), "Removed persisted document");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonFile::new(dir.path(), "numbers.json");

        assert!(file.load::<Vec<u32>>().await.is_none());

        file.save(&vec![1u32, 2, 3]).await.unwrap();
        assert_eq!(file.load::<Vec<u32>>().await, Some(vec![1, 2, 3]));
        assert!(!file.path().with_extension("json.tmp").exists());

        file.remove().await.unwrap();
        assert!(!file.path().exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonFile::new(dir.path(), "broken.json");
        std::fs::write(file.path(), "{ not json").unwrap();

        assert!(file.load::<Vec<u32>>().await.is_none());
    }

    #[tokio::test]
    async fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let file = JsonFile::new(&nested, "x.json");

        file.save(&"hello").await.unwrap();
        assert_eq!(file.load::<String>().await.as_deref(), Some("hello"));
    }
}
