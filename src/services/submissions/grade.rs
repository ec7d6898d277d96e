use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{SubmissionService, letter_for};
use crate::i18n::{self, Locale};
use crate::models::{
    ApiResponse, ErrorCode,
    submissions::{
        entities::GradeUpdate, requests::GradeSubmissionRequest, responses::SubmissionResponse,
    },
};
use crate::runtime::pending::entity_key;
use crate::services::{current_actor, error_response, not_found_response};
use crate::utils::validate::validate_grade;

/// 评分或重新评分，成绩范围在这里统一校验
pub async fn grade_submission(
    service: &SubmissionService,
    submission_id: i64,
    req: GradeSubmissionRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let locale = Locale::from_request(request);
    let grader = current_actor(request)?;
    let storage = service.get_storage(request)?;
    let pending = service.get_pending(request)?;

    let not_found = || {
        not_found_response(
            ErrorCode::SubmissionNotFound,
            i18n::t_with(
                locale,
                "submission.not_found",
                &[("id", submission_id.to_string().as_str())],
            ),
        )
    };

    let submission = match storage.get_submission_by_id(submission_id).await {
        Ok(Some(submission)) => submission,
        Ok(None) => return Ok(not_found()),
        Err(e) => return Ok(error_response(&e, locale)),
    };

    let assignment = match storage.get_assignment_by_id(submission.assignment_id).await {
        Ok(Some(assignment)) => assignment,
        Ok(None) => {
            return Ok(not_found_response(
                ErrorCode::AssignmentNotFound,
                i18n::t_with(
                    locale,
                    "assignment.not_found",
                    &[("id", submission.assignment_id.to_string().as_str())],
                ),
            ));
        }
        Err(e) => return Ok(error_response(&e, locale)),
    };

    // 先按读取到的满分快速拒绝，写入时存储层会按最新满分再校验一次
    let grade = match validate_grade(req.grade, assignment.max_grade) {
        Ok(grade) => grade,
        Err(e) => return Ok(error_response(&e, locale)),
    };

    let update = GradeUpdate {
        grade,
        comment: req
            .comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()),
        graded_by: grader.id,
    };

    match pending
        .run(
            entity_key("submission", submission_id),
            storage.grade_submission(submission_id, update),
        )
        .await
    {
        Ok(Some(submission)) => {
            // 等待期间满分可能已被修改，按写入后的作业计算等级
            let max_grade = match storage.get_assignment_by_id(submission.assignment_id).await {
                Ok(Some(current)) => current.max_grade,
                _ => assignment.max_grade,
            };
            info!(
                "Submission {} graded {}/{} by {}",
                submission.id, grade, max_grade, grader.id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                SubmissionResponse {
                    letter_grade: letter_for(&submission, max_grade),
                    submission,
                },
                i18n::t(locale, "submission.graded"),
            )))
        }
        Ok(None) => Ok(not_found()),
        Err(e) => Ok(error_response(&e, locale)),
    }
}
