use serde::Deserialize;
use ts_rs::TS;

use crate::models::actors::entities::ActorStatus;

/// 学生列表查询参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "student.ts")]
pub struct StudentListParams {
    pub search: Option<String>,
    pub group: Option<String>,
    pub status: Option<ActorStatus>,
}
