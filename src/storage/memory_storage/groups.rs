use std::collections::HashMap;

use dashmap::mapref::entry::Entry;

use super::MemoryStorage;
use crate::errors::{LabDeskError, Result};
use crate::models::actors::entities::Role;
use crate::models::groups::entities::{Group, NewGroup};

impl MemoryStorage {
    /// 创建小组
    pub(crate) fn create_group_impl(&self, req: NewGroup) -> Result<Group> {
        let name = req.name.trim().to_string();

        match self.group_names.entry(name.clone()) {
            Entry::Occupied(_) => Err(LabDeskError::conflict(format!(
                "Group already exists: {name}"
            ))),
            Entry::Vacant(slot) => {
                let id = self.next_group_id();
                let group = Group {
                    id,
                    name,
                    description: req.description.trim().to_string(),
                    teacher_id: req.teacher_id,
                    student_count: 0,
                    created_at: chrono::Utc::now(),
                };
                self.groups.insert(id, group.clone());
                slot.insert(id);
                Ok(self.with_student_count(group))
            }
        }
    }

    pub(crate) fn get_group_by_name_impl(&self, name: &str) -> Option<Group> {
        let id = *self.group_names.get(name.trim())?;
        let group = self.groups.get(&id).map(|g| g.clone())?;
        Some(self.with_student_count(group))
    }

    /// 列出小组，学生人数由用户表推导
    pub(crate) fn list_groups_impl(&self) -> Vec<Group> {
        let counts = self.student_counts();
        let mut groups: Vec<Group> = self
            .groups
            .iter()
            .map(|entry| {
                let mut group = entry.value().clone();
                group.student_count = counts.get(&group.name).copied().unwrap_or(0);
                group
            })
            .collect();
        groups.sort_by_key(|g| g.id);
        groups
    }

    fn with_student_count(&self, mut group: Group) -> Group {
        group.student_count = self.student_counts().get(&group.name).copied().unwrap_or(0);
        group
    }

    fn student_counts(&self) -> HashMap<String, u32> {
        let mut counts = HashMap::new();
        for entry in self.actors.iter() {
            let actor = entry.value();
            if actor.role == Role::Student
                && let Some(group) = &actor.group
            {
                *counts.entry(group.clone()).or_insert(0) += 1;
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::actors::requests::CreateActorRequest;

    #[test]
    fn test_group_name_unique_and_counts_students() {
        let storage = MemoryStorage::new();
        let teacher = storage
            .create_actor_impl(CreateActorRequest {
                name: "Teacher".into(),
                email: "t@example.edu".into(),
                role: Role::Teacher,
                group: None,
            })
            .unwrap();
        for i in 0..3 {
            storage
                .create_actor_impl(CreateActorRequest {
                    name: format!("Student {i}"),
                    email: format!("s{i}@example.edu"),
                    role: Role::Student,
                    group: Some("bis-1-23".into()),
                })
                .unwrap();
        }

        let group = storage
            .create_group_impl(NewGroup {
                name: "bis-1-23".into(),
                description: "Databases".into(),
                teacher_id: teacher.id,
            })
            .unwrap();
        assert_eq!(group.student_count, 3);

        let err = storage
            .create_group_impl(NewGroup {
                name: " bis-1-23 ".into(),
                description: String::new(),
                teacher_id: teacher.id,
            })
            .unwrap_err();
        assert!(matches!(err, LabDeskError::Conflict(_)));

        let groups = storage.list_groups_impl();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].student_count, 3);
        assert!(storage.get_group_by_name_impl("bis-1-23").is_some());
    }
}
