use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashMap;

use super::AssignmentService;
use crate::i18n::{self, Locale};
use crate::metrics::{assignment_progress, days_until_deadline, is_deadline_soon};
use crate::models::{
    ApiResponse,
    assignments::{
        entities::Assignment,
        requests::AssignmentListParams,
        responses::{AssignmentListItem, AssignmentListResponse},
    },
    submissions::{entities::Submission, requests::SubmissionQuery},
};
use crate::services::{current_actor, error_response};

fn matches_search(assignment: &Assignment, search: Option<&str>) -> bool {
    match search.map(str::trim).filter(|s| !s.is_empty()) {
        Some(term) => {
            let term = term.to_lowercase();
            assignment.title.to_lowercase().contains(&term)
                || assignment.description.to_lowercase().contains(&term)
        }
        None => true,
    }
}

pub async fn list_assignments(
    service: &AssignmentService,
    query: AssignmentListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let locale = Locale::from_request(request);
    let storage = service.get_storage(request)?;
    let actor = current_actor(request)?;
    let now = chrono::Utc::now();

    let assignments = match storage.list_assignments().await {
        Ok(assignments) => assignments,
        Err(e) => return Ok(error_response(&e, locale)),
    };

    // 学生只取自己的提交，教师/管理员统计全部提交数量
    let submission_query = if actor.is_student() {
        SubmissionQuery {
            student_id: Some(actor.id),
            ..Default::default()
        }
    } else {
        SubmissionQuery::default()
    };
    let submissions = match storage.list_submissions(submission_query).await {
        Ok(submissions) => submissions,
        Err(e) => return Ok(error_response(&e, locale)),
    };

    let mut counts: HashMap<i64, i64> = HashMap::new();
    let mut own: HashMap<i64, &Submission> = HashMap::new();
    for submission in &submissions {
        *counts.entry(submission.assignment_id).or_default() += 1;
        own.insert(submission.assignment_id, submission);
    }

    let items: Vec<AssignmentListItem> = assignments
        .into_iter()
        .filter(|a| matches_search(a, query.search.as_deref()))
        .map(|assignment| {
            let days = days_until_deadline(assignment.deadline, now);
            let (progress, grade, submission_count) = if actor.is_student() {
                let submission = own.get(&assignment.id).copied();
                (
                    Some(assignment_progress(assignment.deadline, submission, now)),
                    submission.and_then(|s| s.grade),
                    None,
                )
            } else {
                (
                    None,
                    None,
                    Some(counts.get(&assignment.id).copied().unwrap_or(0)),
                )
            };
            AssignmentListItem {
                assignment,
                days_until_deadline: days,
                deadline_soon: is_deadline_soon(days),
                progress,
                grade,
                submission_count,
            }
        })
        // 状态过滤只对学生有意义
        .filter(|item| match (query.status, item.progress) {
            (Some(wanted), Some(progress)) => wanted == progress,
            _ => true,
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        AssignmentListResponse { items },
        i18n::t(locale, "assignment.list_success"),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(title: &str, description: &str) -> Assignment {
        let now = chrono::Utc::now();
        Assignment {
            id: 1,
            title: title.into(),
            description: description.into(),
            deadline: now,
            max_grade: 100,
            materials_reference: None,
            created_by: 2,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_matches_search() {
        let a = assignment("SQL SELECT Queries", "Filtering and joins");
        assert!(matches_search(&a, None));
        assert!(matches_search(&a, Some("  ")));
        assert!(matches_search(&a, Some("select")));
        assert!(matches_search(&a, Some("JOINS")));
        assert!(!matches_search(&a, Some("indexing")));
    }
}
