use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;

use super::MemoryStorage;
use crate::errors::{LabDeskError, Result};
use crate::models::submissions::{
    entities::{GradeUpdate, Submission},
    requests::SubmissionQuery,
};
use crate::utils::validate::validate_grade;

impl MemoryStorage {
    /// 创建提交，同一学生同一作业至多一份
    ///
    /// 作业与学生记录的读锁一直持有到写入完成：并发的删除会等待本次写入，
    /// 随后连同新提交一起级联删除；截止时间按写入时刻 `submitted_at` 判断。
    pub(crate) fn create_submission_impl(
        &self,
        assignment_id: i64,
        student_id: i64,
        file_reference: String,
        submitted_at: DateTime<Utc>,
    ) -> Result<Submission> {
        let assignment = self.assignments.get(&assignment_id).ok_or_else(|| {
            LabDeskError::not_found(format!("Assignment {assignment_id} not found"))
        })?;
        if submitted_at > assignment.deadline {
            return Err(LabDeskError::deadline_passed(format!(
                "assignment {} closed at {}",
                assignment_id,
                assignment.deadline.to_rfc3339()
            )));
        }
        let _student = self
            .actors
            .get(&student_id)
            .ok_or_else(|| LabDeskError::not_found(format!("Actor {student_id} not found")))?;

        match self.submission_pairs.entry((assignment_id, student_id)) {
            Entry::Occupied(_) => Err(LabDeskError::conflict(format!(
                "Student {student_id} already submitted assignment {assignment_id}"
            ))),
            Entry::Vacant(slot) => {
                let id = self.next_submission_id();
                let submission = Submission::new_submitted(
                    id,
                    assignment_id,
                    student_id,
                    file_reference,
                    submitted_at,
                );
                self.submissions.insert(id, submission.clone());
                slot.insert(id);
                Ok(submission)
            }
        }
    }

    pub(crate) fn get_submission_by_id_impl(&self, id: i64) -> Option<Submission> {
        self.submissions.get(&id).map(|s| s.clone())
    }

    pub(crate) fn get_submission_by_pair_impl(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Option<Submission> {
        let id = *self.submission_pairs.get(&(assignment_id, student_id))?;
        self.get_submission_by_id_impl(id)
    }

    /// 按提交时间升序列出
    pub(crate) fn list_submissions_impl(&self, query: &SubmissionQuery) -> Vec<Submission> {
        let mut submissions: Vec<Submission> = self
            .submissions
            .iter()
            .filter(|s| query.assignment_id.is_none_or(|id| s.assignment_id == id))
            .filter(|s| query.student_id.is_none_or(|id| s.student_id == id))
            .map(|s| s.value().clone())
            .collect();
        submissions.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at).then(a.id.cmp(&b.id)));
        submissions
    }

    /// 评分；重新评分会覆盖成绩与评语
    ///
    /// 成绩按写入时作业的满分校验，校验期间持有作业读锁，
    /// 与修改满分的 `update_assignment_impl` 互斥。
    pub(crate) fn grade_submission_impl(
        &self,
        id: i64,
        update: GradeUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Submission>> {
        let Some(assignment_id) = self.submissions.get(&id).map(|s| s.assignment_id) else {
            return Ok(None);
        };
        // 锁顺序：先作业，后提交
        let Some(assignment) = self.assignments.get(&assignment_id) else {
            return Ok(None);
        };
        let grade = validate_grade(i64::from(update.grade), assignment.max_grade)?;

        let Some(mut submission) = self.submissions.get_mut(&id) else {
            return Ok(None);
        };
        submission.apply_grade(grade, update.comment, update.graded_by, now);
        Ok(Some(submission.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::models::actors::entities::Role;
    use crate::models::actors::requests::CreateActorRequest;
    use crate::models::assignments::entities::{AssignmentChanges, NewAssignment};
    use crate::models::submissions::entities::SubmissionStatus;

    // 两个学生（id 1, 2）与两份作业（id 1, 2）
    fn storage_with_lab(max_grade: u32, deadline: DateTime<Utc>) -> MemoryStorage {
        let storage = MemoryStorage::new();
        for (name, email) in [("Aida", "aida@gmail.edu"), ("Timur", "timur@gmail.edu")] {
            storage
                .create_actor_impl(CreateActorRequest {
                    name: name.into(),
                    email: email.into(),
                    role: Role::Student,
                    group: None,
                })
                .unwrap();
        }
        for title in ["Tables", "Joins"] {
            storage.create_assignment_impl(
                NewAssignment {
                    title: title.into(),
                    description: "lab".into(),
                    deadline,
                    max_grade,
                    materials_reference: None,
                    created_by: 9,
                },
                deadline - Duration::days(7),
            );
        }
        storage
    }

    fn grade(value: u32) -> GradeUpdate {
        GradeUpdate {
            grade: value,
            comment: None,
            graded_by: 9,
        }
    }

    #[test]
    fn test_one_submission_per_student_and_assignment() {
        let now = Utc::now();
        let storage = storage_with_lab(100, now + Duration::days(1));
        let first = storage
            .create_submission_impl(1, 1, "a.zip".into(), now)
            .unwrap();
        assert_eq!(first.status, SubmissionStatus::Submitted);
        assert!(first.grade.is_none());

        let err = storage
            .create_submission_impl(1, 1, "b.zip".into(), now)
            .unwrap_err();
        assert!(matches!(err, LabDeskError::Conflict(_)));

        // 其他学生或其他作业不受影响
        assert!(storage.create_submission_impl(1, 2, "c.zip".into(), now).is_ok());
        assert!(storage.create_submission_impl(2, 1, "d.zip".into(), now).is_ok());
        assert_eq!(
            storage
                .list_submissions_impl(&SubmissionQuery {
                    student_id: Some(1),
                    ..Default::default()
                })
                .len(),
            2
        );
    }

    #[test]
    fn test_create_checks_assignment_and_deadline_at_write_time() {
        let now = Utc::now();
        let storage = storage_with_lab(100, now);

        // 恰好在截止时刻仍可写入
        assert!(storage.create_submission_impl(1, 1, "a.zip".into(), now).is_ok());
        let late = storage
            .create_submission_impl(2, 1, "b.zip".into(), now + Duration::seconds(1))
            .unwrap_err();
        assert!(matches!(late, LabDeskError::DeadlinePassed(_)));

        assert!(storage.delete_assignment_impl(2));
        let gone = storage
            .create_submission_impl(2, 2, "c.zip".into(), now)
            .unwrap_err();
        assert!(matches!(gone, LabDeskError::NotFound(_)));

        let unknown_student = storage
            .create_submission_impl(1, 404, "d.zip".into(), now)
            .unwrap_err();
        assert!(matches!(unknown_student, LabDeskError::NotFound(_)));
        assert_eq!(storage.submissions.len(), 1);
    }

    #[test]
    fn test_grade_and_regrade() {
        let now = Utc::now();
        let storage = storage_with_lab(100, now + Duration::days(1));
        let s = storage
            .create_submission_impl(1, 1, "a.zip".into(), now)
            .unwrap();

        let graded = storage
            .grade_submission_impl(
                s.id,
                GradeUpdate {
                    grade: 85,
                    comment: Some("ok".into()),
                    graded_by: 2,
                },
                now,
            )
            .unwrap()
            .unwrap();
        assert_eq!(graded.status, SubmissionStatus::Graded);
        assert_eq!(graded.grade, Some(85));

        let regraded = storage
            .grade_submission_impl(
                s.id,
                GradeUpdate {
                    grade: 90,
                    comment: None,
                    graded_by: 5,
                },
                now,
            )
            .unwrap()
            .unwrap();
        assert_eq!(regraded.grade, Some(90));
        assert_eq!(regraded.graded_by, Some(5));
        assert!(storage.grade_submission_impl(404, grade(1), now).unwrap().is_none());
    }

    #[test]
    fn test_grade_uses_current_max_grade() {
        let now = Utc::now();
        let storage = storage_with_lab(100, now + Duration::days(1));
        let s = storage
            .create_submission_impl(1, 1, "a.zip".into(), now)
            .unwrap();

        let lowered = storage
            .update_assignment_impl(
                1,
                AssignmentChanges {
                    title: "Tables".into(),
                    description: "lab".into(),
                    deadline: now + Duration::days(1),
                    max_grade: 50,
                    materials_reference: None,
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(lowered.max_grade, 50);

        let err = storage.grade_submission_impl(s.id, grade(80), now).unwrap_err();
        assert!(matches!(err, LabDeskError::InvalidGrade(_)));
        let stored = storage.get_submission_by_id_impl(s.id).unwrap();
        assert_eq!(stored.status, SubmissionStatus::Submitted);
        assert!(stored.grade.is_none());

        assert!(storage.grade_submission_impl(s.id, grade(50), now).unwrap().is_some());
    }
}
