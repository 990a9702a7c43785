//! API 模块
//!
//! HTTP handlers 和路由组装

pub mod content;
pub mod health;
pub mod library;
pub mod products;
pub mod proxy;
pub mod schedule;
pub mod settings;
pub mod social;

use axum::Router;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// 构建完整的 API 路由
pub fn router(state: Arc<AppState>) -> Router {
    let upload_max_bytes = state.config.upload_max_bytes;

    Router::new()
        // Health, status & dashboard
        .merge(health::router())
        // Generic webhook proxy & workflow management
        .merge(proxy::router(upload_max_bytes))
        // Content studio & image lab
        .merge(content::router())
        // Media library
        .merge(library::router(upload_max_bytes))
        // Social publishing
        .merge(social::router())
        // Settings
        .merge(settings::router())
        // Product catalog
        .merge(products::router())
        // Schedule & calendar
        .merge(schedule::router())
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
