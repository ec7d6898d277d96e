use super::entities::{Assignment, AssignmentProgress};
use crate::models::submissions::responses::SubmissionView;
use serde::Serialize;
use ts_rs::TS;

/// 作业列表项
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct AssignmentListItem {
    pub assignment: Assignment,
    pub days_until_deadline: i64,
    pub deadline_soon: bool,
    /// 学生本人的进度（教师/管理员为空）
    pub progress: Option<AssignmentProgress>,
    /// 学生本人的成绩
    pub grade: Option<u32>,
    /// 提交数量（仅教师/管理员）
    pub submission_count: Option<i64>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct AssignmentListResponse {
    pub items: Vec<AssignmentListItem>,
}

/// 作业详情
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct AssignmentDetailResponse {
    pub assignment: Assignment,
    pub days_until_deadline: i64,
    pub deadline_passed: bool,
    /// 教师/管理员可见全部提交，学生仅可见自己的提交
    pub submissions: Vec<SubmissionView>,
    pub graded_count: i64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct AssignmentResponse {
    pub assignment: Assignment,
}
