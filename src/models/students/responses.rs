use serde::Serialize;
use ts_rs::TS;

use super::entities::StudentProgress;
use crate::metrics::{GradeDistribution, LetterGrade};
use crate::models::actors::entities::Actor;
use crate::models::assignments::entities::{Assignment, AssignmentProgress};
use crate::models::submissions::entities::Submission;

/// 学生列表项
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "student.ts")]
pub struct StudentSummary {
    #[serde(flatten)]
    pub progress: StudentProgress,
    pub completion_rate: u32,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "student.ts")]
pub struct StudentListResponse {
    pub items: Vec<StudentSummary>,
}

/// 学生个人作业记录
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "student.ts")]
pub struct StudentAssignmentRecord {
    pub assignment: Assignment,
    pub progress: AssignmentProgress,
    pub submission: Option<Submission>,
    pub letter_grade: Option<LetterGrade>,
}

/// 学生详情
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "student.ts")]
pub struct StudentProfileResponse {
    pub student: Actor,
    pub total_assignments: u32,
    pub completed_assignments: u32,
    pub completion_rate: u32,
    pub average_grade: u32,
    pub average_letter: LetterGrade,
    pub distribution: GradeDistribution,
    pub assignments: Vec<StudentAssignmentRecord>,
}
