use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AssignmentService;
use crate::errors::{LabDeskError, Result};
use crate::i18n::{self, Locale};
use crate::models::{
    ApiResponse, ErrorCode,
    assignments::{
        entities::{Assignment, AssignmentChanges},
        requests::UpdateAssignmentRequest,
        responses::AssignmentResponse,
    },
    submissions::{entities::Submission, requests::SubmissionQuery},
};
use crate::runtime::pending::entity_key;
use crate::services::{current_actor, error_response, error_response_as, not_found_response};
use crate::utils::validate::{require_text, validate_max_grade};

// 未提供的截止时间与满分沿用原值；新满分不能低于已给出的最高成绩
fn validate_changes(
    existing: &Assignment,
    req: UpdateAssignmentRequest,
    submissions: &[Submission],
) -> Result<AssignmentChanges> {
    let title = require_text("title", &req.title)?;
    let description = require_text("description", &req.description)?;
    let max_grade = match req.max_grade {
        Some(max_grade) => validate_max_grade(max_grade)?,
        None => existing.max_grade,
    };

    if let Some(highest) = submissions.iter().filter_map(|s| s.grade).max()
        && highest > max_grade
    {
        return Err(LabDeskError::invalid_grade(format!(
            "max_grade {max_grade} is below awarded grade {highest}"
        )));
    }

    Ok(AssignmentChanges {
        title,
        description,
        deadline: req.deadline.unwrap_or(existing.deadline),
        max_grade,
        materials_reference: req
            .materials_reference
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty()),
    })
}

pub async fn update_assignment(
    service: &AssignmentService,
    assignment_id: i64,
    update_data: UpdateAssignmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let locale = Locale::from_request(request);
    let actor = current_actor(request)?;
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

    let existing = match storage.get_assignment_by_id(assignment_id).await {
        Ok(Some(assignment)) => assignment,
        Ok(None) => return Ok(not_found()),
        Err(e) => return Ok(error_response(&e, locale)),
    };

    let submissions = match storage
        .list_submissions(SubmissionQuery {
            assignment_id: Some(assignment_id),
            ..Default::default()
        })
        .await
    {
        Ok(submissions) => submissions,
        Err(e) => return Ok(error_response(&e, locale)),
    };

    let below_awarded = |e: &LabDeskError| {
        error_response_as(
            e,
            ErrorCode::MaxGradeBelowAwarded,
            i18n::t(locale, "assignment.max_grade_below_awarded"),
        )
    };

    let changes = match validate_changes(&existing, update_data, &submissions) {
        Ok(changes) => changes,
        Err(e @ LabDeskError::InvalidGrade(_)) => return Ok(below_awarded(&e)),
        Err(e) => return Ok(error_response(&e, locale)),
    };

    // 存储层在写锁内按当时的成绩再检查一次满分
    match pending
        .run(
            entity_key("assignment", assignment_id),
            storage.update_assignment(assignment_id, changes),
        )
        .await
    {
        Ok(Some(assignment)) => {
            info!("Assignment {} updated by {}", assignment.id, actor.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                AssignmentResponse { assignment },
                i18n::t(locale, "assignment.updated"),
            )))
        }
        Ok(None) => Ok(not_found()),
        Err(e @ LabDeskError::InvalidGrade(_)) => Ok(below_awarded(&e)),
        Err(e) => Ok(error_response(&e, locale)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn existing() -> Assignment {
        let now = Utc::now();
        Assignment {
            id: 1,
            title: "Tables".into(),
            description: "Design tables".into(),
            deadline: now + Duration::days(5),
            max_grade: 100,
            materials_reference: Some("lab1.pdf".into()),
            created_by: 2,
            created_at: now,
            updated_at: now,
        }
    }

    fn request(max_grade: Option<i64>) -> UpdateAssignmentRequest {
        UpdateAssignmentRequest {
            title: "Tables v2".into(),
            description: "Design normalized tables".into(),
            deadline: None,
            max_grade,
            materials_reference: None,
        }
    }

    fn graded(grade: u32) -> Submission {
        let mut s = Submission::new_submitted(1, 1, 3, "schema.sql".into(), Utc::now());
        s.apply_grade(grade, None, 2, Utc::now());
        s
    }

    #[test]
    fn test_keeps_deadline_and_max_grade_when_omitted() {
        let existing = existing();
        let changes = validate_changes(&existing, request(None), &[]).unwrap();
        assert_eq!(changes.deadline, existing.deadline);
        assert_eq!(changes.max_grade, 100);
        assert_eq!(changes.title, "Tables v2");
    }

    #[test]
    fn test_rejects_max_grade_below_awarded() {
        let existing = existing();
        let result = validate_changes(&existing, request(Some(50)), &[graded(85)]);
        assert!(matches!(result, Err(LabDeskError::InvalidGrade(_))));

        let ok = validate_changes(&existing, request(Some(85)), &[graded(85)]).unwrap();
        assert_eq!(ok.max_grade, 85);
    }
}
