use chrono::{DateTime, Utc};

use super::MemoryStorage;
use crate::errors::{LabDeskError, Result};
use crate::models::assignments::entities::{Assignment, AssignmentChanges, NewAssignment};

impl MemoryStorage {
    /// 创建作业
    pub(crate) fn create_assignment_impl(
        &self,
        req: NewAssignment,
        now: DateTime<Utc>,
    ) -> Assignment {
        let id = self.next_assignment_id();
        let assignment = Assignment {
            id,
            title: req.title,
            description: req.description,
            deadline: req.deadline,
            max_grade: req.max_grade,
            materials_reference: req.materials_reference,
            created_by: req.created_by,
            created_at: now,
            updated_at: now,
        };
        self.assignments.insert(id, assignment.clone());
        assignment
    }

    pub(crate) fn get_assignment_by_id_impl(&self, id: i64) -> Option<Assignment> {
        self.assignments.get(&id).map(|a| a.clone())
    }

    /// 按截止时间升序列出作业
    pub(crate) fn list_assignments_impl(&self) -> Vec<Assignment> {
        let mut assignments: Vec<Assignment> =
            self.assignments.iter().map(|a| a.value().clone()).collect();
        assignments.sort_by(|a, b| a.deadline.cmp(&b.deadline).then(a.id.cmp(&b.id)));
        assignments
    }

    /// 整体替换可编辑字段
    ///
    /// 新满分低于已给出的最高成绩时拒绝。检查与写入都在作业写锁内完成，
    /// 评分与提交需要同一作业的读锁，因此不会与本次修改交错。
    pub(crate) fn update_assignment_impl(
        &self,
        id: i64,
        changes: AssignmentChanges,
    ) -> Result<Option<Assignment>> {
        let Some(mut assignment) = self.assignments.get_mut(&id) else {
            return Ok(None);
        };

        let highest = self
            .submissions
            .iter()
            .filter(|s| s.assignment_id == id)
            .filter_map(|s| s.grade)
            .max();
        if let Some(highest) = highest
            && highest > changes.max_grade
        {
            return Err(LabDeskError::invalid_grade(format!(
                "max_grade {} is below awarded grade {highest}",
                changes.max_grade
            )));
        }

        assignment.title = changes.title;
        assignment.description = changes.description;
        assignment.deadline = changes.deadline;
        assignment.max_grade = changes.max_grade;
        assignment.materials_reference = changes.materials_reference;
        assignment.updated_at = Utc::now();
        Ok(Some(assignment.clone()))
    }

    /// 删除作业及其全部提交
    pub(crate) fn delete_assignment_impl(&self, id: i64) -> bool {
        if self.assignments.remove(&id).is_none() {
            return false;
        }

        let owned: Vec<(i64, i64)> = self
            .submissions
            .iter()
            .filter(|s| s.assignment_id == id)
            .map(|s| (s.id, s.student_id))
            .collect();
        for (submission_id, student_id) in owned {
            self.submissions.remove(&submission_id);
            self.submission_pairs.remove(&(id, student_id));
        }
        true
    }
}
