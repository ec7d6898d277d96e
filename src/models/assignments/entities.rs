use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 作业实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct Assignment {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// 截止时间（UTC）
    pub deadline: chrono::DateTime<chrono::Utc>,
    pub max_grade: u32,
    pub materials_reference: Option<String>,
    pub created_by: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 学生视角下的作业进度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "assignment.ts")]
pub enum AssignmentProgress {
    NotStarted,
    Submitted,
    Graded,
    Overdue,
}

// 新建作业（已校验，用于存储层）
#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub title: String,
    pub description: String,
    pub deadline: chrono::DateTime<chrono::Utc>,
    pub max_grade: u32,
    pub materials_reference: Option<String>,
    pub created_by: i64,
}

// 作业修改（已校验，用于存储层）
#[derive(Debug, Clone)]
pub struct AssignmentChanges {
    pub title: String,
    pub description: String,
    pub deadline: chrono::DateTime<chrono::Utc>,
    pub max_grade: u32,
    pub materials_reference: Option<String>,
}
