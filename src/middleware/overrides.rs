//! n8n 目标覆盖 Extractor
//!
//! 提供 `N8nOverrides` extractor，替代每个 handler 中重复读取 `X-N8N-URL` / `X-N8N-API-KEY` 的逻辑

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::config::TargetOverrides;
use crate::error::ApiError;

/// 请求级 n8n 目标覆盖
///
/// # Example
///
/// ```ignore
/// async fn handler(
///     N8nOverrides(overrides): N8nOverrides,
///     State(state): State<Arc<AppState>>,
/// ) -> impl IntoResponse {
///     let target = state.target(&overrides).await;
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct N8nOverrides(pub TargetOverrides);

#[async_trait]
impl<S> FromRequestParts<S> for N8nOverrides
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match TargetOverrides::from_headers(&parts.headers) {
            Ok(overrides) => {
                if overrides.base_url.is_some() {
                    tracing::debug!(base_url = ?overrides.base_url, "Using n8n URL from request header");
                }
                Ok(N8nOverrides(overrides))
            }
            Err(msg) => {
                tracing::warn!(error = %msg, "Rejected invalid n8n override header");
                Err(ApiError::bad_request(msg))
            }
        }
    }
}
