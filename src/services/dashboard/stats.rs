use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

use super::{DashboardService, UPCOMING_LIMIT};
use crate::i18n::{self, Locale};
use crate::metrics::{completion_rate, days_until_deadline, is_deadline_soon};
use crate::models::{
    ApiResponse,
    actors::{
        entities::{Actor, Role},
        requests::ActorListQuery,
    },
    assignments::entities::Assignment,
    dashboard::responses::{DashboardResponse, DashboardStats},
    submissions::{entities::Submission, requests::SubmissionQuery},
};
use crate::services::{current_actor, error_response};

/// 仪表盘所需的原始集合
pub(crate) struct DashboardInput {
    pub actors: Vec<Actor>,
    pub group_count: usize,
    pub assignments: Vec<Assignment>,
    pub submissions: Vec<Submission>,
}

// 截止时间未过的作业，按截止时间升序，最多 UPCOMING_LIMIT 条
fn upcoming<'a>(
    assignments: impl Iterator<Item = &'a Assignment>,
    now: DateTime<Utc>,
) -> Vec<Assignment> {
    let mut open: Vec<Assignment> = assignments.filter(|a| a.deadline >= now).cloned().collect();
    open.sort_by_key(|a| (a.deadline, a.id));
    open.truncate(UPCOMING_LIMIT);
    open
}

pub(crate) fn build_dashboard(
    actor: &Actor,
    input: &DashboardInput,
    now: DateTime<Utc>,
) -> DashboardResponse {
    match actor.role {
        Role::Admin => DashboardResponse {
            stats: DashboardStats::Admin {
                total_users: input.actors.len() as u32,
                total_assignments: input.assignments.len() as u32,
                total_groups: input.group_count as u32,
                active_submissions: input
                    .submissions
                    .iter()
                    .filter(|s| !s.is_graded())
                    .count() as u32,
            },
            upcoming: upcoming(input.assignments.iter(), now),
        },
        Role::Teacher => {
            let own: Vec<&Assignment> = input
                .assignments
                .iter()
                .filter(|a| a.created_by == actor.id)
                .collect();
            let own_ids: HashSet<i64> = own.iter().map(|a| a.id).collect();
            let (graded, pending): (Vec<&Submission>, Vec<&Submission>) = input
                .submissions
                .iter()
                .filter(|s| own_ids.contains(&s.assignment_id))
                .partition(|s| s.is_graded());

            DashboardResponse {
                stats: DashboardStats::Teacher {
                    total_assignments: own.len() as u32,
                    total_students: input.actors.iter().filter(|a| a.is_student()).count()
                        as u32,
                    pending_grades: pending.len() as u32,
                    completed_submissions: graded.len() as u32,
                },
                upcoming: upcoming(own.into_iter(), now),
            }
        }
        Role::Student => {
            let submitted: HashSet<i64> = input
                .submissions
                .iter()
                .filter(|s| s.student_id == actor.id)
                .map(|s| s.assignment_id)
                .collect();
            let known: HashSet<i64> = input.assignments.iter().map(|a| a.id).collect();
            let completed = submitted.intersection(&known).count() as u32;

            // 尚未提交且仍可提交的作业
            let open: Vec<&Assignment> = input
                .assignments
                .iter()
                .filter(|a| !submitted.contains(&a.id) && a.deadline >= now)
                .collect();
            let upcoming_deadlines = open
                .iter()
                .filter(|a| is_deadline_soon(days_until_deadline(a.deadline, now)))
                .count() as u32;
            let total = input.assignments.len() as u32;

            DashboardResponse {
                stats: DashboardStats::Student {
                    total_assignments: total,
                    completed_assignments: completed,
                    pending_assignments: open.len() as u32,
                    upcoming_deadlines,
                    completion_rate: completion_rate(completed, total),
                },
                upcoming: upcoming(open.into_iter(), now),
            }
        }
    }
}

pub async fn get_dashboard(
    service: &DashboardService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let locale = Locale::from_request(request);
    let storage = service.get_storage(request)?;
    let actor = current_actor(request)?;

    let actors = match storage.list_actors(ActorListQuery::default()).await {
        Ok(actors) => actors,
        Err(e) => return Ok(error_response(&e, locale)),
    };
    let group_count = match storage.list_groups().await {
        Ok(groups) => groups.len(),
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

    let input = DashboardInput {
        actors,
        group_count,
        assignments,
        submissions,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        build_dashboard(&actor, &input, chrono::Utc::now()),
        i18n::t(locale, "dashboard.success"),
    )))
}
