use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::actors::entities::ActorStatus;

/// 学生学习进度（由作业与提交推导，报表与学生列表共用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "student.ts")]
pub struct StudentProgress {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub group: Option<String>,
    pub status: ActorStatus,
    pub total_assignments: u32,
    pub completed_assignments: u32,
    /// 已评分作业百分制成绩的平均值
    pub average_grade: f64,
}
