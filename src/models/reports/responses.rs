use serde::Serialize;
use ts_rs::TS;

use crate::metrics::{GradeDistribution, GroupStats};
use crate::models::students::entities::StudentProgress;

/// 小组汇总
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct GroupReport {
    pub name: String,
    pub student_count: u32,
    pub stats: GroupStats,
}

/// 单个作业汇总
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct AssignmentReport {
    pub assignment_id: i64,
    pub title: String,
    pub submitted: u32,
    pub graded: u32,
    /// 提交人数占学生总数的百分比
    pub submission_rate: u32,
    /// 已评分提交的平均百分制成绩
    pub average_grade: u32,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct ReportResponse {
    pub overall: GroupStats,
    pub total_students: u32,
    pub total_assignments: u32,
    pub distribution: GradeDistribution,
    pub groups: Vec<GroupReport>,
    pub students: Vec<StudentProgress>,
    pub assignments: Vec<AssignmentReport>,
}
