//! 产品目录模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// 最高辣度
pub const MAX_HEAT_LEVEL: u8 = 5;

/// 香料产品
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpiceProduct {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub price: f64,
    #[serde(default)]
    pub heat_level: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

/// 创建 / 更新产品的请求体
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub price: f64,
    #[serde(default)]
    pub heat_level: u8,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl ProductInput {
    /// 校验输入，返回第一条错误信息
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Product name is required".to_string());
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err("Product price must be a non-negative number".to_string());
        }
        if self.heat_level > MAX_HEAT_LEVEL {
            return Err(format!("Heat level must be between 0 and {}", MAX_HEAT_LEVEL));
        }
        Ok(())
    }

    /// 去掉 `#`、转小写并去重，保留首次出现的顺序
    fn clean_tags(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.tags
            .iter()
            .map(|t| t.trim().trim_start_matches('#').to_lowercase())
            .filter(|t| !t.is_empty())
            .filter(|t| seen.insert(t.clone()))
            .collect()
    }
}

impl SpiceProduct {
    /// 由输入创建新产品（分配 id 与时间戳）
    pub fn create(input: &ProductInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            description: input.description.trim().to_string(),
            category: input.category.trim().to_string(),
            price: input.price,
            heat_level: input.heat_level,
            image_url: input.image_url.clone().filter(|u| !u.trim().is_empty()),
            tags: input.clean_tags(),
            active: input.active,
            created_at: now,
            updated_at: now,
        }
    }

    /// 用输入整体替换可编辑字段，保留 id 与创建时间
    pub fn apply(&mut self, input: &ProductInput) {
        self.name = input.name.trim().to_string();
        self.description = input.description.trim().to_string();
        self.category = input.category.trim().to_string();
        self.price = input.price;
        self.heat_level = input.heat_level;
        self.image_url = input.image_url.clone().filter(|u| !u.trim().is_empty());
        self.tags = input.clean_tags();
        self.active = input.active;
        self.updated_at = Utc::now();
    }
}

/// 初始产品目录
pub fn default_catalog() -> Vec<SpiceProduct> {
    let seed = [
        ("Smoked Paprika", "Cold-smoked over oak, sweet and deep.", "Paprika", 8.99, 1, &["smoky", "bbq"][..]),
        ("Ghost Pepper Flakes", "Bhut jolokia flakes for the brave.", "Chili", 12.49, 5, &["hot", "chili"][..]),
        ("Za'atar Blend", "Thyme, sumac and toasted sesame.", "Blend", 9.49, 0, &["herbal", "middle-eastern"][..]),
        ("Garam Masala", "Warm house blend, roasted in small batches.", "Blend", 10.99, 2, &["indian", "warm"][..]),
        ("Chipotle Powder", "Smoke-dried jalapeño, earthy heat.", "Chili", 9.99, 3, &["smoky", "mexican"][..]),
    ];

    seed.iter()
        .map(|(name, description, category, price, heat_level, tags)| {
            SpiceProduct::create(&ProductInput {
                name: name.to_string(),
                description: description.to_string(),
                category: category.to_string(),
                price: *price,
                heat_level: *heat_level,
                image_url: None,
                tags: tags.iter().map(|t| t.to_string()).collect(),
                active: true,
            })
        })
        .collect()
}
