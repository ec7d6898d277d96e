use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashSet;

use super::ReportService;
use crate::i18n::{self, Locale};
use crate::metrics::{
    aggregate_group_stats, average_grade, completion_rate, grade_distribution, percentage,
    round_half_up, student_progress,
};
use crate::models::{
    ApiResponse, ErrorCode,
    actors::{
        entities::{Actor, Role},
        requests::ActorListQuery,
    },
    assignments::entities::Assignment,
    groups::entities::Group,
    reports::{
        requests::ReportParams,
        responses::{AssignmentReport, GroupReport, ReportResponse},
    },
    students::entities::StudentProgress,
    submissions::{entities::Submission, requests::SubmissionQuery},
};
use crate::services::{error_response, not_found_response};

fn assignment_report(
    assignment: &Assignment,
    submissions: &[&Submission],
    total_students: u32,
) -> AssignmentReport {
    let own: Vec<&&Submission> = submissions
        .iter()
        .filter(|s| s.assignment_id == assignment.id)
        .collect();
    let graded: Vec<f64> = own
        .iter()
        .filter_map(|s| {
            let grade = s.grade.filter(|_| s.is_graded())?;
            Some(percentage(f64::from(grade), f64::from(assignment.max_grade)))
        })
        .collect();

    AssignmentReport {
        assignment_id: assignment.id,
        title: assignment.title.clone(),
        submitted: own.len() as u32,
        graded: graded.len() as u32,
        submission_rate: completion_rate(own.len() as u32, total_students),
        average_grade: round_half_up(average_grade(&graded)) as u32,
    }
}

/// 由原始集合构建报表，学生集合已按小组过滤
fn build_report(
    students: &[Actor],
    groups: &[Group],
    assignments: &[Assignment],
    submissions: &[Submission],
) -> ReportResponse {
    let progress: Vec<StudentProgress> = students
        .iter()
        .map(|student| student_progress(student, assignments, submissions))
        .collect();

    // 只统计报表范围内学生的提交
    let ids: HashSet<i64> = students.iter().map(|s| s.id).collect();
    let scoped: Vec<&Submission> = submissions
        .iter()
        .filter(|s| ids.contains(&s.student_id))
        .collect();
    let scoped_owned: Vec<Submission> = scoped.iter().map(|s| (*s).clone()).collect();

    let total_students = progress.len() as u32;

    let group_reports = groups
        .iter()
        .map(|group| {
            let members: Vec<StudentProgress> = progress
                .iter()
                .filter(|p| p.group.as_deref() == Some(group.name.as_str()))
                .cloned()
                .collect();
            GroupReport {
                name: group.name.clone(),
                student_count: members.len() as u32,
                stats: aggregate_group_stats(&members),
            }
        })
        .collect();

    let assignment_reports = assignments
        .iter()
        .map(|assignment| assignment_report(assignment, &scoped, total_students))
        .collect();

    ReportResponse {
        overall: aggregate_group_stats(&progress),
        total_students,
        total_assignments: assignments.len() as u32,
        distribution: grade_distribution(&scoped_owned, assignments),
        groups: group_reports,
        students: progress,
        assignments: assignment_reports,
    }
}

pub async fn get_report(
    service: &ReportService,
    query: ReportParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let locale = Locale::from_request(request);
    let storage = service.get_storage(request)?;

    let group_filter = query
        .group
        .map(|g| g.trim().to_string())
        .filter(|g| !g.is_empty());

    let mut groups = match storage.list_groups().await {
        Ok(groups) => groups,
        Err(e) => return Ok(error_response(&e, locale)),
    };
    if let Some(name) = &group_filter {
        groups.retain(|g| &g.name == name);
        if groups.is_empty() {
            return Ok(not_found_response(
                ErrorCode::GroupNotFound,
                i18n::t_with(locale, "group.not_found", &[("name", name.as_str())]),
            ));
        }
    }

    let students = match storage
        .list_actors(ActorListQuery {
            role: Some(Role::Student),
            group: group_filter,
            ..Default::default()
        })
        .await
    {
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

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        build_report(&students, &groups, &assignments, &submissions),
        i18n::t(locale, "report.success"),
    )))
}
