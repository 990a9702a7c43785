//! 运行时状态模块
//!
//! 管理应用状态与本地持久化存储

pub mod app_state;
pub mod persist;
pub mod product_store;
pub mod schedule_store;
pub mod settings_store;

pub use app_state::AppState;
pub use product_store::ProductCatalog;
pub use schedule_store::{PostFilter, ScheduleStore, StatusCounts};
pub use settings_store::{SettingsError, SettingsStore};
