//! 连接设置存储

use chrono::Utc;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::info;

use super::persist::JsonFile;
use crate::domain::settings::N8NSettings;

const SETTINGS_FILE_NAME: &str = "settings.json";

/// 连接设置存储
pub struct SettingsStore {
    file: JsonFile,
    settings: RwLock<N8NSettings>,
}

impl SettingsStore {
    /// 打开数据目录下的设置文件，不存在时为空设置
    pub async fn open(data_dir: &Path) -> Self {
        let file = JsonFile::new(data_dir, SETTINGS_FILE_NAME);
        let settings = file.load::<N8NSettings>().await.unwrap_or_default();
        Self {
            file,
            settings: RwLock::new(settings),
        }
    }

    /// 当前设置快照（未脱敏）
    pub async fn get(&self) -> N8NSettings {
        self.settings.read().await.clone()
    }

    /// 整体替换设置，写盘成功后才更新内存
    pub async fn replace(&self, settings: N8NSettings) -> Result<N8NSettings, SettingsError> {
        let mut settings = settings.normalized().map_err(SettingsError::Invalid)?;
        settings.updated_at = Some(Utc::now());

        let mut current = self.settings.write().await;
        self.file.save(&settings).await.map_err(SettingsError::Persist)?;
        *current = settings.clone();

        info!(
            n8n_url = ?settings.n8n_url,
            has_api_key = settings.api_key.is_some(),
            webhook_overrides = settings.webhooks.len(),
            "Updated connection settings"
        );
        Ok(settings)
    }

    /// 恢复为空设置并删除文件
    pub async fn reset(&self) -> anyhow::Result<()> {
        let mut current = self.settings.write().await;
        self.file.remove().await?;
        *current = N8NSettings::default();
        info!("Reset connection settings");
        Ok(())
    }
}

/// 设置更新错误
#[derive(Debug)]
pub enum SettingsError {
    /// 输入非法
    Invalid(String),
    /// 持久化失败
    Persist(anyhow::Error),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Invalid(m) => write!(f, "Invalid settings: {}", m),
            SettingsError::Persist(e) => write!(f, "Failed to save settings: {:#}", e),
        }
    }
}

impl std::error::Error for SettingsError {}
