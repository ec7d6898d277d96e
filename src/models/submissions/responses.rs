use super::entities::Submission;
use crate::metrics::LetterGrade;
use serde::Serialize;
use ts_rs::TS;

/// 附带学生信息的提交
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "submission.ts")]
pub struct SubmissionView {
    pub submission: Submission,
    pub student_name: String,
    pub student_email: String,
    pub letter_grade: Option<LetterGrade>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "submission.ts")]
pub struct SubmissionResponse {
    pub submission: Submission,
    pub letter_grade: Option<LetterGrade>,
}
