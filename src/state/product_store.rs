//! 产品目录存储

use std::path::Path;
use tokio::sync::RwLock;
use tracing::info;

use super::persist::JsonFile;
use crate::domain::product::{default_catalog, ProductInput, SpiceProduct};

const PRODUCTS_FILE_NAME: &str = "products.json";

/// 产品目录
pub struct ProductCatalog {
    file: JsonFile,
    products: RwLock<Vec<SpiceProduct>>,
}

impl ProductCatalog {
    /// 打开数据目录下的产品文件，不存在时使用初始目录
    pub async fn open(data_dir: &Path) -> Self {
        let file = JsonFile::new(data_dir, PRODUCTS_FILE_NAME);
        let products = match file.load::<Vec<SpiceProduct>>().await {
            Some(products) => products,
            None => {
                info!("No product catalog found, using default catalog");
                default_catalog()
            }
        };
        Self {
            file,
            products: RwLock::new(products),
        }
    }

    /// 列出产品；`include_inactive` 为 false 时过滤下架产品
    pub async fn list(&self, include_inactive: bool) -> Vec<SpiceProduct> {
        let products = self.products.read().await;
        products
            .iter()
            .filter(|p| include_inactive || p.active)
            .cloned()
            .collect()
    }

    pub async fn get(&self, id: &str) -> Option<SpiceProduct> {
        let products = self.products.read().await;
        products.iter().find(|p| p.id == id).cloned()
    }

    pub async fn count(&self) -> (usize, usize) {
        let products = self.products.read().await;
        let active = products.iter().filter(|p| p.active).count();
        (products.len(), active)
    }

    /// 新增产品（调用方负责校验）
    pub async fn create(&self, input: &ProductInput) -> anyhow::Result<SpiceProduct> {
        let product = SpiceProduct::create(input);
        let mut products = self.products.write().await;

        let mut next = products.clone();
        next.push(product.clone());
        self.file.save(&next).await?;
        *products = next;

        info!(product_id = %product.id, name = %product.name, "Created product");
        Ok(product)
    }

    /// 更新产品，不存在返回 None
    pub async fn update(&self, id: &str, input: &ProductInput) -> anyhow::Result<Option<SpiceProduct>> {
        let mut products = self.products.write().await;
        let Some(index) = products.iter().position(|p| p.id == id) else {
            return Ok(None);
        };

        let mut next = products.clone();
        next[index].apply(input);
        let updated = next[index].clone();
        self.file.save(&next).await?;
        *products = next;

        info!(product_id = %id, name = %updated.name, "Updated product");
        Ok(Some(updated))
    }

    /// 删除产品，返回是否存在
    pub async fn delete(&self, id: &str) -> anyhow::Result<bool> {
        let mut products = self.products.write().await;
        if !products.iter().any(|p| p.id == id) {
            return Ok(false);
        }

        let next: Vec<SpiceProduct> = products.iter().filter(|p| p.id != id).cloned().collect();
        self.file.save(&next).await?;
        *products = next;

        info!(product_id = %id, "Deleted product");
        Ok(true)
    }

    /// 恢复初始目录
    pub async fn reset(&self) -> anyhow::Result<Vec<SpiceProduct>> {
        let mut products = self.products.write().await;
        let next = default_catalog();
        self.file.save(&next).await?;
        *products = next.clone();

        info!(count = next.len(), "Reset product catalog to defaults");
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            description: "Fresh".to_string(),
            category: "Blend".to_string(),
            price: 7.25,
            heat_level: 2,
            image_url: None,
            tags: vec![],
            active: true,
        }
    }

    #[tokio::test]
    async fn test_open_seeds_default_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = ProductCatalog::open(dir.path()).await;
        assert_eq!(catalog.list(true).await.len(), 5);
    }

    #[tokio::test]
    async fn test_crud_roundtrip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = ProductCatalog::open(dir.path()).await;

        let created = catalog.create(&input("Sumac")).await.unwrap();
        assert_eq!(catalog.get(&created.id).await.unwrap().name, "Sumac");

        let mut hidden = input("Sumac Reserve");
        hidden.active = false;
        let updated = catalog.update(&created.id, &hidden).await.unwrap().unwrap();
        assert_eq!(updated.name, "Sumac Reserve");
        assert_eq!(catalog.list(false).await.len(), 5);
        assert_eq!(catalog.list(true).await.len(), 6);

        // 重新打开后数据一致
        let reopened = ProductCatalog::open(dir.path()).await;
        assert_eq!(reopened.get(&created.id).await, Some(updated));

        assert!(reopened.delete(&created.id).await.unwrap());
        assert!(!reopened.delete(&created.id).await.unwrap());
        assert!(reopened.update("missing", &input("x")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reset_restores_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = ProductCatalog::open(dir.path()).await;
        for product in catalog.list(true).await {
            catalog.delete(&product.id).await.unwrap();
        }
        assert_eq!(catalog.count().await, (0, 0));

        let restored = catalog.reset().await.unwrap();
        assert_eq!(restored.len(), 5);
        assert_eq!(catalog.count().await, (5, 5));
    }
}
