use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{DateTime, Utc};
use tracing::info;

use super::SubmissionService;
use crate::errors::{LabDeskError, Result};
use crate::i18n::{self, Locale};
use crate::models::{
    ApiResponse, ErrorCode,
    assignments::entities::Assignment,
    submissions::{requests::SubmitAssignmentRequest, responses::SubmissionResponse},
};
use crate::runtime::pending::entity_key;
use crate::services::{current_actor, error_response, error_response_as, not_found_response};
use crate::utils::validate::require_text;

// 截止后不再接受提交
fn check_deadline(assignment: &Assignment, now: DateTime<Utc>) -> Result<()> {
    if now > assignment.deadline {
        return Err(LabDeskError::deadline_passed(format!(
            "assignment {} closed at {}",
            assignment.id,
            assignment.deadline.to_rfc3339()
        )));
    }
    Ok(())
}

pub async fn submit_assignment(
    service: &SubmissionService,
    assignment_id: i64,
    req: SubmitAssignmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let locale = Locale::from_request(request);
    let student = current_actor(request)?;

    let file_reference = match require_text("file_reference", &req.file_reference) {
        Ok(file_reference) => file_reference,
        Err(e) => return Ok(error_response(&e, locale)),
    };

    let storage = service.get_storage(request)?;
    let pending = service.get_pending(request)?;

    let not_found = || {
        not_found_response(
            ErrorCode::AssignmentNotFound,
            i18n::t_with(
                locale,
                "assignment.not_found",
                &[("id", assignment_id.to_string().as_str())],
            ),
        )
    };

    let assignment = match storage.get_assignment_by_id(assignment_id).await {
        Ok(Some(assignment)) => assignment,
        Ok(None) => return Ok(not_found()),
        Err(e) => return Ok(error_response(&e, locale)),
    };

    // 快速拒绝；写入时存储层按写入时刻再检查作业是否存在以及截止时间
    if let Err(e) = check_deadline(&assignment, Utc::now()) {
        info!("Rejected late submission by {}: {}", student.id, e);
        return Ok(error_response(&e, locale));
    }

    let key = entity_key("submission", format!("{}-{}", assignment.id, student.id));
    match pending
        .run(
            key,
            storage.create_submission(assignment.id, student.id, file_reference),
        )
        .await
    {
        Ok(submission) => {
            info!(
                "Student {} submitted assignment {}",
                student.id, assignment.id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                SubmissionResponse {
                    submission,
                    letter_grade: None,
                },
                i18n::t(locale, "submission.created"),
            )))
        }
        Err(e @ LabDeskError::Conflict(_)) => Ok(error_response_as(
            &e,
            ErrorCode::SubmissionAlreadyExists,
            i18n::t(locale, "submission.already_exists"),
        )),
        // 等待期间作业被删除
        Err(LabDeskError::NotFound(_)) => Ok(not_found()),
        Err(e) => Ok(error_response(&e, locale)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn assignment(deadline: DateTime<Utc>) -> Assignment {
        Assignment {
            id: 2,
            title: "SQL SELECT".into(),
            description: "Queries".into(),
            deadline,
            max_grade: 100,
            materials_reference: None,
            created_by: 2,
            created_at: deadline - Duration::days(7),
            updated_at: deadline - Duration::days(7),
        }
    }

    #[test]
    fn test_check_deadline() {
        let now = Utc::now();
        assert!(check_deadline(&assignment(now + Duration::hours(1)), now).is_ok());
        // 恰好在截止时刻仍可提交
        assert!(check_deadline(&assignment(now), now).is_ok());
        assert!(matches!(
            check_deadline(&assignment(now - Duration::seconds(1)), now),
            Err(LabDeskError::DeadlinePassed(_))
        ));
    }
}
