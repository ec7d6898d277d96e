pub mod actors;
pub mod assignments;
pub mod auth;
pub mod common;
pub mod dashboard;
pub mod groups;
pub mod reports;
pub mod students;
pub mod submissions;
pub mod system;

pub use common::{ApiResponse, ErrorCode};

/// 程序启动时间（用于健康检查中的运行时长）
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}
