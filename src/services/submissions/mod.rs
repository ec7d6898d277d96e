pub mod detail;
pub mod grade;
pub mod submit;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::metrics::{LetterGrade, letter_grade};
use crate::models::submissions::entities::Submission;
use crate::models::submissions::requests::{GradeSubmissionRequest, SubmitAssignmentRequest};
use crate::runtime::pending::PendingOperations;
use crate::storage::Storage;

/// 已评分提交的字母等级
pub(crate) fn letter_for(submission: &Submission, max_grade: u32) -> Option<LetterGrade> {
    submission
        .grade
        .filter(|_| submission.is_graded())
        .map(|grade| letter_grade(f64::from(grade), f64::from(max_grade)))
}

pub struct SubmissionService {
    storage: Option<Arc<dyn Storage>>,
}

impl SubmissionService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from(request),
        }
    }

    pub(crate) fn get_pending(&self, request: &HttpRequest) -> ActixResult<PendingOperations> {
        super::pending_from(request)
    }

    /// 学生提交作业
    pub async fn submit(
        &self,
        assignment_id: i64,
        req: SubmitAssignmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        submit::submit_assignment(self, assignment_id, req, request).await
    }

    /// 评分
    pub async fn grade(
        &self,
        submission_id: i64,
        req: GradeSubmissionRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        grade::grade_submission(self, submission_id, req, request).await
    }

    /// 提交详情
    pub async fn get_submission(
        &self,
        submission_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        detail::get_submission(self, submission_id, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_only_for_graded() {
        let now = chrono::Utc::now();
        let mut submission = Submission::new_submitted(1, 1, 3, "schema.sql".into(), now);
        assert_eq!(letter_for(&submission, 100), None);

        submission.apply_grade(85, None, 2, now);
        assert_eq!(letter_for(&submission, 100), Some(LetterGrade::B));
        assert_eq!(letter_for(&submission, 90), Some(LetterGrade::A));
    }
}
