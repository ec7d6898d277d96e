//! 演示数据
//!
//! 截止时间与提交时间以相对 `now` 的天数偏移给出，演示数据的状态分布因此
//! 不随日期漂移。

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use super::MemoryStorage;
use crate::errors::{LabDeskError, Result};
use crate::models::{
    actors::{
        entities::{ActorStatus, Role},
        requests::{CreateActorRequest, UpdateActorRequest},
    },
    assignments::entities::NewAssignment,
    groups::entities::NewGroup,
    submissions::entities::GradeUpdate,
};
use crate::utils::assets;

const DEMO_SEED_PATH: &str = "seed/demo.json";

#[derive(Debug, Deserialize)]
struct SeedFile {
    actors: Vec<SeedActor>,
    groups: Vec<SeedGroup>,
    assignments: Vec<SeedAssignment>,
    submissions: Vec<SeedSubmission>,
}

#[derive(Debug, Deserialize)]
struct SeedActor {
    name: String,
    email: String,
    role: Role,
    group: Option<String>,
    #[serde(default)]
    status: ActorStatus,
}

#[derive(Debug, Deserialize)]
struct SeedGroup {
    name: String,
    description: String,
    teacher_email: String,
}

#[derive(Debug, Deserialize)]
struct SeedAssignment {
    title: String,
    description: String,
    deadline_offset_days: i64,
    max_grade: u32,
    materials_reference: Option<String>,
    created_by_email: String,
}

#[derive(Debug, Deserialize)]
struct SeedSubmission {
    assignment_title: String,
    student_email: String,
    submitted_offset_days: i64,
    file_reference: String,
    grade: Option<u32>,
    comment: Option<String>,
    graded_by_email: Option<String>,
}

/// 载入数量统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub actors: usize,
    pub groups: usize,
    pub assignments: usize,
    pub submissions: usize,
}

impl MemoryStorage {
    /// 载入嵌入的演示数据
    pub async fn seed_demo_data(&self, now: DateTime<Utc>) -> Result<SeedSummary> {
        let raw = assets::load_text(DEMO_SEED_PATH)?;
        let seed: SeedFile = serde_json::from_str(&raw)?;
        self.apply_seed(seed, now)
    }

    fn apply_seed(&self, seed: SeedFile, now: DateTime<Utc>) -> Result<SeedSummary> {
        let mut summary = SeedSummary::default();

        for entry in seed.actors {
            let actor = self.create_actor_impl(CreateActorRequest {
                name: entry.name,
                email: entry.email,
                role: entry.role,
                group: entry.group,
            })?;
            if entry.status != ActorStatus::Active {
                self.update_actor_impl(
                    actor.id,
                    UpdateActorRequest {
                        status: Some(entry.status),
                        ..Default::default()
                    },
                )?;
            }
            summary.actors += 1;
        }

        for entry in seed.groups {
            let teacher_id = self.seed_actor_id(&entry.teacher_email)?;
            self.create_group_impl(NewGroup {
                name: entry.name,
                description: entry.description,
                teacher_id,
            })?;
            summary.groups += 1;
        }

        let mut titles = std::collections::HashMap::new();
        for entry in seed.assignments {
            let created_by = self.seed_actor_id(&entry.created_by_email)?;
            let created_at = now - Duration::days(14);
            let assignment = self.create_assignment_impl(
                NewAssignment {
                    title: entry.title,
                    description: entry.description,
                    deadline: now + Duration::days(entry.deadline_offset_days),
                    max_grade: entry.max_grade,
                    materials_reference: entry.materials_reference,
                    created_by,
                },
                created_at,
            );
            titles.insert(assignment.title.clone(), (assignment.id, assignment.created_by));
            summary.assignments += 1;
        }

        for entry in seed.submissions {
            let (assignment_id, creator) = *titles.get(&entry.assignment_title).ok_or_else(|| {
                LabDeskError::validation(format!(
                    "Seed submission references unknown assignment: {}",
                    entry.assignment_title
                ))
            })?;
            let student_id = self.seed_actor_id(&entry.student_email)?;
            let submitted_at = now + Duration::days(entry.submitted_offset_days);
            let submission = self.create_submission_impl(
                assignment_id,
                student_id,
                entry.file_reference,
                submitted_at,
            )?;

            if let Some(grade) = entry.grade {
                let graded_by = match &entry.graded_by_email {
                    Some(email) => self.seed_actor_id(email)?,
                    // 默认由作业发布者评分
                    None => creator,
                };
                self.grade_submission_impl(
                    submission.id,
                    GradeUpdate {
                        grade,
                        comment: entry.comment,
                        graded_by,
                    },
                    submitted_at + Duration::days(1),
                )?;
            }
            summary.submissions += 1;
        }

        Ok(summary)
    }

    fn seed_actor_id(&self, email: &str) -> Result<i64> {
        self.get_actor_by_email_impl(email)
            .map(|a| a.id)
            .ok_or_else(|| LabDeskError::validation(format!("Seed references unknown actor: {email}")))
    }
}
