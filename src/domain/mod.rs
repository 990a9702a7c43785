//! 领域模型模块
//!
//! 纯数据结构与 n8n 响应整形，不依赖 axum/tokio

pub mod calendar;
pub mod content;
pub mod drive;
pub mod n8n;
pub mod post;
pub mod product;
pub mod settings;
pub mod workflow;

// Re-exports for convenience
pub use calendar::{CalendarDay, CalendarMonth};
pub use content::{ContentRequest, EnhancedImage, GeneratedContent, ImageEnhanceRequest, SocialPostRequest};
pub use drive::{DriveFile, DriveListing, FileKind};
pub use post::{Platform, PostInput, PostStatus, ScheduledPost};
pub use product::{ProductInput, SpiceProduct};
pub use settings::N8NSettings;
pub use workflow::{WorkflowKind, WorkflowSummary};
