//! 应用状态

use chrono::{DateTime, Utc};

use crate::config::{EnvConfig, N8nTarget, TargetOverrides};
use crate::domain::workflow::WorkflowKind;
use crate::infra::N8nClient;

use super::product_store::ProductCatalog;
use super::schedule_store::ScheduleStore;
use super::settings_store::SettingsStore;

/// 应用状态
pub struct AppState {
    // ========== 核心配置 ==========
    /// 环境配置
    pub config: EnvConfig,
    /// 服务启动时间
    pub started_at: DateTime<Utc>,

    // ========== 外部服务 ==========
    /// n8n 客户端
    pub n8n: N8nClient,

    // ========== 本地存储 ==========
    /// 连接设置
    pub settings: SettingsStore,
    /// 产品目录
    pub products: ProductCatalog,
    /// 排期帖子
    pub schedule: ScheduleStore,
}

impl AppState {
    /// 创建新的应用状态，加载数据目录中的持久化文件
    pub async fn new(config: EnvConfig) -> anyhow::Result<Self> {
        tracing::info!(
            port = config.port,
            n8n_base_url = %config.n8n_base_url,
            has_api_key = config.n8n_api_key.is_some(),
            webhook_overrides = config.webhook_overrides.len(),
            drive_list_url = ?config.drive_list_url,
            data_dir = %config.data_dir.display(),
            timeout_secs = config.timeout_secs,
            "Loaded configuration"
        );

        for (kind, value) in &config.webhook_overrides {
            tracing::info!(workflow = %kind, target = %value, "Registered webhook override");
        }

        let n8n = N8nClient::new(config.timeout_secs)?;
        let settings = SettingsStore::open(&config.data_dir).await;
        let products = ProductCatalog::open(&config.data_dir).await;
        let schedule = ScheduleStore::open(&config.data_dir).await;

        Ok(Self {
            started_at: Utc::now(),
            n8n,
            settings,
            products,
            schedule,
            config,
        })
    }

    /// 解析本次请求的 n8n 目标
    pub async fn target(&self, overrides: &TargetOverrides) -> N8nTarget {
        let settings = self.settings.get().await;
        N8nTarget::resolve(&self.config, &settings, overrides)
    }

    /// 解析 workflow webhook，返回目标与完整 URL
    pub async fn workflow_target(
        &self,
        kind: WorkflowKind,
        overrides: &TargetOverrides,
    ) -> (N8nTarget, String) {
        let settings = self.settings.get().await;
        let target = N8nTarget::resolve(&self.config, &settings, overrides);
        let url = target.workflow_url(kind, &self.config, &settings);
        (target, url)
    }

    /// 运行时长（秒）
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::settings::N8NSettings;

    #[tokio::test]
    async fn test_settings_feed_target_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(EnvConfig::new("http://env-n8n:5678", dir.path()))
            .await
            .unwrap();

        let target = state.target(&TargetOverrides::default()).await;
        assert_eq!(target.base_url, "http://env-n8n:5678");

        state
            .settings
            .replace(N8NSettings {
                n8n_url: Some("http://saved-n8n".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let (target, url) = state
            .workflow_target(WorkflowKind::ContentGenerate, &TargetOverrides::default())
            .await;
        assert_eq!(target.base_url, "http://saved-n8n");
        assert_eq!(url, "http://saved-n8n/webhook/content-generate");
        assert!(state.uptime_secs() >= 0);
    }
}
