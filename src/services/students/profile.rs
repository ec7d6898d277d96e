use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use super::StudentService;
use crate::i18n::{self, Locale};
use crate::metrics::{
    assignment_progress, completion_rate, grade_distribution, letter_grade, round_half_up,
    student_progress,
};
use crate::models::{
    ApiResponse, ErrorCode,
    actors::entities::Actor,
    assignments::entities::Assignment,
    students::responses::{StudentAssignmentRecord, StudentProfileResponse},
    submissions::{entities::Submission, requests::SubmissionQuery},
};
use crate::services::submissions::letter_for;
use crate::services::{error_response, not_found_response};

// 由学生本人的提交构建详情
fn build_profile(
    student: Actor,
    assignments: Vec<Assignment>,
    submissions: Vec<Submission>,
    now: DateTime<Utc>,
) -> StudentProfileResponse {
    let progress = student_progress(&student, &assignments, &submissions);
    let distribution = grade_distribution(&submissions, &assignments);

    let mut by_assignment: HashMap<i64, Submission> = submissions
        .into_iter()
        .map(|s| (s.assignment_id, s))
        .collect();

    let records = assignments
        .into_iter()
        .map(|assignment| {
            let submission = by_assignment.remove(&assignment.id);
            StudentAssignmentRecord {
                progress: assignment_progress(assignment.deadline, submission.as_ref(), now),
                letter_grade: submission
                    .as_ref()
                    .and_then(|s| letter_for(s, assignment.max_grade)),
                submission,
                assignment,
            }
        })
        .collect();

    StudentProfileResponse {
        student,
        total_assignments: progress.total_assignments,
        completed_assignments: progress.completed_assignments,
        completion_rate: completion_rate(
            progress.completed_assignments,
            progress.total_assignments,
        ),
        average_grade: round_half_up(progress.average_grade) as u32,
        average_letter: letter_grade(progress.average_grade, 100.0),
        distribution,
        assignments: records,
    }
}

pub async fn get_student_profile(
    service: &StudentService,
    student_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let locale = Locale::from_request(request);
    let storage = service.get_storage(request)?;

    let student = match storage.get_actor_by_id(student_id).await {
        Ok(Some(actor)) if actor.is_student() => actor,
        Ok(_) => {
            return Ok(not_found_response(
                ErrorCode::ActorNotFound,
                i18n::t_with(
                    locale,
                    "student.not_found",
                    &[("id", student_id.to_string().as_str())],
                ),
            ));
        }
        Err(e) => return Ok(error_response(&e, locale)),
    };

    let assignments = match storage.list_assignments().await {
        Ok(assignments) => assignments,
        Err(e) => return Ok(error_response(&e, locale)),
    };
    let submissions = match storage
        .list_submissions(SubmissionQuery {
            student_id: Some(student.id),
            ..Default::default()
        })
        .await
    {
        Ok(submissions) => submissions,
        Err(e) => return Ok(error_response(&e, locale)),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        build_profile(student, assignments, submissions, Utc::now()),
        i18n::t(locale, "student.detail_success"),
    )))
}
