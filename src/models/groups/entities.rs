use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 小组实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "group.ts")]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub teacher_id: i64,
    /// 由所属学生数量推导
    pub student_count: u32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

// 新建小组（已校验，用于存储层）
#[derive(Debug, Clone)]
pub struct NewGroup {
    pub name: String,
    pub description: String,
    pub teacher_id: i64,
}
