use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashMap;

use super::AssignmentService;
use crate::i18n::{self, Locale};
use crate::metrics::days_until_deadline;
use crate::models::{
    ApiResponse, ErrorCode,
    actors::requests::ActorListQuery,
    assignments::responses::AssignmentDetailResponse,
    submissions::{requests::SubmissionQuery, responses::SubmissionView},
};
use crate::services::submissions::letter_for;
use crate::services::{current_actor, error_response, not_found_response};

pub async fn get_assignment(
    service: &AssignmentService,
    assignment_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let locale = Locale::from_request(request);
    let storage = service.get_storage(request)?;
    let actor = current_actor(request)?;
    let now = chrono::Utc::now();

    let assignment = match storage.get_assignment_by_id(assignment_id).await {
        Ok(Some(assignment)) => assignment,
        Ok(None) => {
            return Ok(not_found_response(
                ErrorCode::AssignmentNotFound,
                i18n::t_with(
                    locale,
                    "assignment.not_found",
                    &[("id", assignment_id.to_string().as_str())],
                ),
            ));
        }
        Err(e) => return Ok(error_response(&e, locale)),
    };

    // 学生只能看到自己的提交
    let query = SubmissionQuery {
        assignment_id: Some(assignment.id),
        student_id: actor.is_student().then_some(actor.id),
    };
    let submissions = match storage.list_submissions(query).await {
        Ok(submissions) => submissions,
        Err(e) => return Ok(error_response(&e, locale)),
    };

    let actors: HashMap<i64, (String, String)> =
        match storage.list_actors(ActorListQuery::default()).await {
            Ok(actors) => actors
                .into_iter()
                .map(|a| (a.id, (a.name, a.email)))
                .collect(),
            Err(e) => return Ok(error_response(&e, locale)),
        };

    let graded_count = submissions.iter().filter(|s| s.is_graded()).count() as i64;
    let submissions = submissions
        .into_iter()
        .map(|submission| {
            let (student_name, student_email) = actors
                .get(&submission.student_id)
                .cloned()
                .unwrap_or_default();
            SubmissionView {
                letter_grade: letter_for(&submission, assignment.max_grade),
                submission,
                student_name,
                student_email,
            }
        })
        .collect();

    let response = AssignmentDetailResponse {
        days_until_deadline: days_until_deadline(assignment.deadline, now),
        deadline_passed: assignment.deadline < now,
        assignment,
        submissions,
        graded_count,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        response,
        i18n::t(locale, "assignment.detail_success"),
    )))
}
