use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 提交状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "submission.ts")]
pub enum SubmissionStatus {
    Submitted,
    Graded,
}

// 提交实体
//
// 不变量：status == Graded 当且仅当 grade 有值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "submission.ts")]
pub struct Submission {
    pub id: i64,
    pub assignment_id: i64,
    pub student_id: i64,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    pub file_reference: String,
    pub status: SubmissionStatus,
    pub grade: Option<u32>,
    pub comment: Option<String>,
    pub graded_at: Option<chrono::DateTime<chrono::Utc>>,
    pub graded_by: Option<i64>,
}

impl Submission {
    /// 新建的提交处于 submitted 状态，尚无成绩
    pub fn new_submitted(
        id: i64,
        assignment_id: i64,
        student_id: i64,
        file_reference: String,
        submitted_at: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        Self {
            id,
            assignment_id,
            student_id,
            submitted_at,
            file_reference,
            status: SubmissionStatus::Submitted,
            grade: None,
            comment: None,
            graded_at: None,
            graded_by: None,
        }
    }

    pub fn is_graded(&self) -> bool {
        self.status == SubmissionStatus::Graded && self.grade.is_some()
    }

    /// submitted -> graded，或重新评分（graded -> graded）
    ///
    /// 调用方必须先通过 `validate_grade` 校验成绩范围。
    pub fn apply_grade(
        &mut self,
        grade: u32,
        comment: Option<String>,
        graded_by: i64,
        graded_at: chrono::DateTime<chrono::Utc>,
    ) {
        self.grade = Some(grade);
        self.comment = comment;
        self.status = SubmissionStatus::Graded;
        self.graded_by = Some(graded_by);
        self.graded_at = Some(graded_at);
    }
}

// 评分（已校验，用于存储层）
#[derive(Debug, Clone)]
pub struct GradeUpdate {
    pub grade: u32,
    pub comment: Option<String>,
    pub graded_by: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grading_transition() {
        let now = chrono::Utc::now();
        let mut submission = Submission::new_submitted(1, 1, 3, "schema.sql".into(), now);
        assert_eq!(submission.status, SubmissionStatus::Submitted);
        assert!(submission.grade.is_none());
        assert!(!submission.is_graded());

        submission.apply_grade(85, Some("Good work".into()), 2, now);
        assert_eq!(submission.status, SubmissionStatus::Graded);
        assert_eq!(submission.grade, Some(85));
        assert!(submission.is_graded());

        // 重新评分仍为 graded
        submission.apply_grade(90, None, 2, now);
        assert_eq!(submission.status, SubmissionStatus::Graded);
        assert_eq!(submission.grade, Some(90));
        assert!(submission.comment.is_none());
    }
}
