//! 内存存储实现
//!
//! 所有实体保存在 DashMap 中，进程退出即丢失。唯一性约束（邮箱、小组名称、
//! 学生与作业的提交对）由独立的索引表保证。

mod actors;
mod assignments;
mod groups;
mod seed;
mod submissions;

use std::sync::atomic::{AtomicI64, Ordering};

use dashmap::DashMap;
use tracing::info;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::{
    actors::entities::Actor, assignments::entities::Assignment, groups::entities::Group,
    submissions::entities::Submission,
};

pub use seed::SeedSummary;

/// 内存存储实现
#[derive(Default)]
pub struct MemoryStorage {
    pub(crate) actors: DashMap<i64, Actor>,
    // 小写邮箱 -> 用户ID
    pub(crate) actor_emails: DashMap<String, i64>,
    pub(crate) groups: DashMap<i64, Group>,
    // 小组名称 -> 小组ID
    pub(crate) group_names: DashMap<String, i64>,
    pub(crate) assignments: DashMap<i64, Assignment>,
    pub(crate) submissions: DashMap<i64, Submission>,
    // (作业ID, 学生ID) -> 提交ID
    pub(crate) submission_pairs: DashMap<(i64, i64), i64>,
    next_actor_id: AtomicI64,
    next_group_id: AtomicI64,
    next_assignment_id: AtomicI64,
    next_submission_id: AtomicI64,
}

impl MemoryStorage {
    /// 创建空的存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建存储并按配置载入演示数据
    pub async fn new_async() -> Result<Self> {
        let storage = Self::new();
        if AppConfig::get().mock.seed_demo_data {
            let summary = storage.seed_demo_data(chrono::Utc::now()).await?;
            info!(
                "Memory storage seeded: {} actors, {} groups, {} assignments, {} submissions",
                summary.actors, summary.groups, summary.assignments, summary.submissions
            );
        } else {
            info!("Memory storage initialized without demo data");
        }
        Ok(storage)
    }

    fn next_id(counter: &AtomicI64) -> i64 {
        counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn next_actor_id(&self) -> i64 {
        Self::next_id(&self.next_actor_id)
    }

    pub(crate) fn next_group_id(&self) -> i64 {
        Self::next_id(&self.next_group_id)
    }

    pub(crate) fn next_assignment_id(&self) -> i64 {
        Self::next_id(&self.next_assignment_id)
    }

    pub(crate) fn next_submission_id(&self) -> i64 {
        Self::next_id(&self.next_submission_id)
    }
}

/// 邮箱统一按去空白、小写比较
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// Storage trait 实现
use crate::models::{
    actors::requests::{ActorListQuery, CreateActorRequest, UpdateActorRequest},
    assignments::entities::{AssignmentChanges, NewAssignment},
    groups::entities::NewGroup,
    submissions::{entities::GradeUpdate, requests::SubmissionQuery},
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for MemoryStorage {
    // 用户模块
    async fn create_actor(&self, actor: CreateActorRequest) -> Result<Actor> {
        self.create_actor_impl(actor)
    }

    async fn get_actor_by_id(&self, id: i64) -> Result<Option<Actor>> {
        Ok(self.get_actor_by_id_impl(id))
    }

    async fn get_actor_by_email(&self, email: &str) -> Result<Option<Actor>> {
        Ok(self.get_actor_by_email_impl(email))
    }

    async fn list_actors(&self, query: ActorListQuery) -> Result<Vec<Actor>> {
        Ok(self.list_actors_impl(&query))
    }

    async fn update_actor(&self, id: i64, update: UpdateActorRequest) -> Result<Option<Actor>> {
        self.update_actor_impl(id, update)
    }

    async fn delete_actor(&self, id: i64) -> Result<bool> {
        Ok(self.delete_actor_impl(id))
    }

    // 小组模块
    async fn create_group(&self, group: NewGroup) -> Result<Group> {
        self.create_group_impl(group)
    }

    async fn get_group_by_name(&self, name: &str) -> Result<Option<Group>> {
        Ok(self.get_group_by_name_impl(name))
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        Ok(self.list_groups_impl())
    }

    // 作业模块
    async fn create_assignment(&self, assignment: NewAssignment) -> Result<Assignment> {
        Ok(self.create_assignment_impl(assignment, chrono::Utc::now()))
    }

    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>> {
        Ok(self.get_assignment_by_id_impl(id))
    }

    async fn list_assignments(&self) -> Result<Vec<Assignment>> {
        Ok(self.list_assignments_impl())
    }

    async fn update_assignment(
        &self,
        id: i64,
        changes: AssignmentChanges,
    ) -> Result<Option<Assignment>> {
        self.update_assignment_impl(id, changes)
    }

    async fn delete_assignment(&self, id: i64) -> Result<bool> {
        Ok(self.delete_assignment_impl(id))
    }

    // 提交模块
    async fn create_submission(
        &self,
        assignment_id: i64,
        student_id: i64,
        file_reference: String,
    ) -> Result<Submission> {
        self.create_submission_impl(
            assignment_id,
            student_id,
            file_reference,
            chrono::Utc::now(),
        )
    }

    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>> {
        Ok(self.get_submission_by_id_impl(id))
    }

    async fn get_submission_by_pair(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<Submission>> {
        Ok(self.get_submission_by_pair_impl(assignment_id, student_id))
    }

    async fn list_submissions(&self, query: SubmissionQuery) -> Result<Vec<Submission>> {
        Ok(self.list_submissions_impl(&query))
    }

    async fn grade_submission(&self, id: i64, grade: GradeUpdate) -> Result<Option<Submission>> {
        self.grade_submission_impl(id, grade, chrono::Utc::now())
    }
}
