//! 产品目录 API
//!
//! 包含 /api/products 端点

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::domain::product::ProductInput;
use crate::error::{ApiError, ApiResult};
use crate::middleware::{ApiJson, ApiQuery};
use crate::state::AppState;

/// 列表查询参数
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    /// 只返回上架产品
    #[serde(default)]
    pub active_only: bool,
}

/// 创建产品路由
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/products", get(list_products).post(create_product))
        .route("/api/products/reset", post(reset_products))
        .route(
            "/api/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

/// GET /api/products
async fn list_products(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> impl IntoResponse {
    let products = state.products.list(!query.active_only).await;
    Json(json!({ "success": true, "total": products.len(), "products": products }))
}

/// GET /api/products/:id
async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let product = state
        .products
        .get(&id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("Product {}", id)))?;
    Ok(Json(json!({ "success": true, "product": product })))
}

/// POST /api/products
async fn create_product(
    State(state): State<Arc<AppState>>,
    ApiJson(input): ApiJson<ProductInput>,
) -> ApiResult<impl IntoResponse> {
    input.validate().map_err(ApiError::bad_request)?;
    let product = state.products.create(&input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "product": product })),
    ))
}

/// PUT /api/products/:id
async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<ProductInput>,
) -> ApiResult<impl IntoResponse> {
    input.validate().map_err(ApiError::bad_request)?;
    let product = state
        .products
        .update(&id, &input)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Product {}", id)))?;
    Ok(Json(json!({ "success": true, "product": product })))
}

/// DELETE /api/products/:id
async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    if !state.products.delete(&id).await? {
        return Err(ApiError::not_found(format!("Product {}", id)));
    }
    Ok(Json(json!({ "success": true, "id": id })))
}

/// 恢复初始目录
///
/// POST /api/products/reset
async fn reset_products(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let products = state.products.reset().await?;
    Ok(Json(json!({ "success": true, "total": products.len(), "products": products })))
}
