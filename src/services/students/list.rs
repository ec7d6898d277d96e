use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::StudentService;
use crate::i18n::{self, Locale};
use crate::metrics::{completion_rate, student_progress};
use crate::models::{
    ApiResponse,
    actors::{entities::Role, requests::ActorListQuery},
    students::{
        requests::StudentListParams,
        responses::{StudentListResponse, StudentSummary},
    },
    submissions::requests::SubmissionQuery,
};
use crate::services::error_response;

pub async fn list_students(
    service: &StudentService,
    query: StudentListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let locale = Locale::from_request(request);
    let storage = service.get_storage(request)?;

    let actor_query = ActorListQuery {
        search: query.search,
        role: Some(Role::Student),
        status: query.status,
        group: query.group,
    };
    let students = match storage.list_actors(actor_query).await {
        Ok(students) => students,
        Err(e) => return Ok(error_response(&e, locale)),
    };
    let assignments = match storage.list_assignments().await {
        Ok(assignments) => assignments,
        Err(e) => return Ok(error_response(&e, locale)),
    };
    let submissions = match storage.list_submissions(SubmissionQuery::default()).await {
        Ok(submissions) => submissions,
        Err(e) => return Ok(error_response(&e, locale)),
    };

    let items = students
        .iter()
        .map(|student| {
            let progress = student_progress(student, &assignments, &submissions);
            StudentSummary {
                completion_rate: completion_rate(
                    progress.completed_assignments,
                    progress.total_assignments,
                ),
                progress,
            }
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        StudentListResponse { items },
        i18n::t(locale, "student.list_success"),
    )))
}
