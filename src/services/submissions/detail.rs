use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{SubmissionService, letter_for};
use crate::i18n::{self, Locale};
use crate::models::{ApiResponse, ErrorCode, submissions::responses::SubmissionResponse};
use crate::services::{current_actor, error_response, forbidden_response, not_found_response};

/// 提交详情：本人或教师/管理员可见
pub async fn get_submission(
    service: &SubmissionService,
    submission_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let locale = Locale::from_request(request);
    let actor = current_actor(request)?;
    let storage = service.get_storage(request)?;

    let submission = match storage.get_submission_by_id(submission_id).await {
        Ok(Some(submission)) => submission,
        Ok(None) => {
            return Ok(not_found_response(
                ErrorCode::SubmissionNotFound,
                i18n::t_with(
                    locale,
                    "submission.not_found",
                    &[("id", submission_id.to_string().as_str())],
                ),
            ));
        }
        Err(e) => return Ok(error_response(&e, locale)),
    };

    if !actor.role.is_staff() && submission.student_id != actor.id {
        return Ok(forbidden_response(locale));
    }

    let letter_grade = match storage.get_assignment_by_id(submission.assignment_id).await {
        Ok(assignment) => assignment.and_then(|a| letter_for(&submission, a.max_grade)),
        Err(e) => return Ok(error_response(&e, locale)),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        SubmissionResponse {
            submission,
            letter_grade,
        },
        i18n::t(locale, "submission.detail_success"),
    )))
}
