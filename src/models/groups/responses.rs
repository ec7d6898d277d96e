use super::entities::Group;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "group.ts")]
pub struct GroupView {
    pub group: Group,
    pub teacher_name: Option<String>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "group.ts")]
pub struct GroupListResponse {
    pub items: Vec<GroupView>,
}
