use serde::Deserialize;
use ts_rs::TS;

// 创建小组请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "group.ts")]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub teacher_id: Option<i64>,
}
