use std::sync::Arc;

use crate::models::{
    actors::{
        entities::Actor,
        requests::{ActorListQuery, CreateActorRequest, UpdateActorRequest},
    },
    assignments::entities::{Assignment, AssignmentChanges, NewAssignment},
    groups::entities::{Group, NewGroup},
    submissions::{
        entities::{GradeUpdate, Submission},
        requests::SubmissionQuery,
    },
};

use crate::errors::Result;

pub mod memory_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户（邮箱唯一）
    async fn create_actor(&self, actor: CreateActorRequest) -> Result<Actor>;
    // 通过ID获取用户信息
    async fn get_actor_by_id(&self, id: i64) -> Result<Option<Actor>>;
    // 通过邮箱获取用户信息（不区分大小写）
    async fn get_actor_by_email(&self, email: &str) -> Result<Option<Actor>>;
    // 列出用户
    async fn list_actors(&self, query: ActorListQuery) -> Result<Vec<Actor>>;
    // 更新用户信息
    async fn update_actor(&self, id: i64, update: UpdateActorRequest) -> Result<Option<Actor>>;
    // 删除用户及其提交
    async fn delete_actor(&self, id: i64) -> Result<bool>;

    /// 小组管理方法
    // 创建小组（名称唯一）
    async fn create_group(&self, group: NewGroup) -> Result<Group>;
    // 通过名称获取小组
    async fn get_group_by_name(&self, name: &str) -> Result<Option<Group>>;
    // 列出小组
    async fn list_groups(&self) -> Result<Vec<Group>>;

    /// 作业管理方法
    async fn create_assignment(&self, assignment: NewAssignment) -> Result<Assignment>;
    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>>;
    // 按截止时间升序列出
    async fn list_assignments(&self) -> Result<Vec<Assignment>>;
    async fn update_assignment(
        &self,
        id: i64,
        changes: AssignmentChanges,
    ) -> Result<Option<Assignment>>;
    // 删除作业及其全部提交
    async fn delete_assignment(&self, id: i64) -> Result<bool>;

    /// 提交管理方法
    // 创建提交（每个学生每个作业至多一份）
    async fn create_submission(
        &self,
        assignment_id: i64,
        student_id: i64,
        file_reference: String,
    ) -> Result<Submission>;
    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>>;
    async fn get_submission_by_pair(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<Submission>>;
    async fn list_submissions(&self, query: SubmissionQuery) -> Result<Vec<Submission>>;
    // 评分或重新评分
    async fn grade_submission(&self, id: i64, grade: GradeUpdate) -> Result<Option<Submission>>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = memory_storage::MemoryStorage::new_async().await?;
    Ok(Arc::new(storage))
}
