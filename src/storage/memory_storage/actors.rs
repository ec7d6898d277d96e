use dashmap::mapref::entry::Entry;

use super::{MemoryStorage, normalize_email};
use crate::errors::{LabDeskError, Result};
use crate::models::actors::{
    entities::{Actor, ActorStatus, Role},
    requests::{ActorListQuery, CreateActorRequest, UpdateActorRequest},
};

impl MemoryStorage {
    /// 创建用户
    pub(crate) fn create_actor_impl(&self, req: CreateActorRequest) -> Result<Actor> {
        let email = normalize_email(&req.email);

        match self.actor_emails.entry(email.clone()) {
            Entry::Occupied(_) => Err(LabDeskError::conflict(format!(
                "Email already registered: {email}"
            ))),
            Entry::Vacant(slot) => {
                let id = self.next_actor_id();
                let actor = Actor {
                    id,
                    name: req.name.trim().to_string(),
                    email,
                    role: req.role,
                    // 只有学生归属小组
                    group: req
                        .group
                        .filter(|g| req.role == Role::Student && !g.trim().is_empty()),
                    status: ActorStatus::Active,
                    created_at: chrono::Utc::now(),
                    last_activity: None,
                };
                self.actors.insert(id, actor.clone());
                slot.insert(id);
                Ok(actor)
            }
        }
    }

    pub(crate) fn get_actor_by_id_impl(&self, id: i64) -> Option<Actor> {
        self.actors.get(&id).map(|a| a.clone())
    }

    pub(crate) fn get_actor_by_email_impl(&self, email: &str) -> Option<Actor> {
        let id = *self.actor_emails.get(&normalize_email(email))?;
        self.get_actor_by_id_impl(id)
    }

    /// 列出用户，按ID升序
    pub(crate) fn list_actors_impl(&self, query: &ActorListQuery) -> Vec<Actor> {
        let search = query
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let mut actors: Vec<Actor> = self
            .actors
            .iter()
            .filter(|entry| {
                let actor = entry.value();
                if let Some(role) = query.role
                    && actor.role != role
                {
                    return false;
                }
                if let Some(status) = query.status
                    && actor.status != status
                {
                    return false;
                }
                if let Some(group) = query.group.as_deref()
                    && actor.group.as_deref() != Some(group)
                {
                    return false;
                }
                match &search {
                    Some(term) => {
                        actor.name.to_lowercase().contains(term)
                            || actor.email.contains(term)
                    }
                    None => true,
                }
            })
            .map(|entry| entry.value().clone())
            .collect();

        actors.sort_by_key(|a| a.id);
        actors
    }

    /// 更新用户
    pub(crate) fn update_actor_impl(
        &self,
        id: i64,
        update: UpdateActorRequest,
    ) -> Result<Option<Actor>> {
        let Some(current) = self.get_actor_by_id_impl(id) else {
            return Ok(None);
        };

        // 邮箱变更时先占用新索引
        let new_email = update
            .email
            .as_deref()
            .map(normalize_email)
            .filter(|e| *e != current.email);
        if let Some(email) = &new_email {
            match self.actor_emails.entry(email.clone()) {
                Entry::Occupied(_) => {
                    return Err(LabDeskError::conflict(format!(
                        "Email already registered: {email}"
                    )));
                }
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
        }

        let Some(mut actor) = self.actors.get_mut(&id) else {
            // 并发删除，回滚索引
            if let Some(email) = &new_email {
                self.actor_emails.remove(email);
            }
            return Ok(None);
        };

        if let Some(name) = update.name {
            actor.name = name.trim().to_string();
        }
        let previous_email = match new_email {
            Some(email) => Some(std::mem::replace(&mut actor.email, email)),
            None => None,
        };
        if let Some(status) = update.status {
            actor.status = status;
        }
        if let Some(last_activity) = update.last_activity {
            actor.last_activity = Some(last_activity);
        }
        let updated = actor.clone();
        drop(actor);

        // 释放用户表的锁之后再清理旧索引
        if let Some(email) = previous_email {
            self.actor_emails.remove(&email);
        }
        Ok(Some(updated))
    }

    /// 删除用户及其全部提交
    pub(crate) fn delete_actor_impl(&self, id: i64) -> bool {
        let Some((_, actor)) = self.actors.remove(&id) else {
            return false;
        };
        self.actor_emails.remove(&actor.email);

        let owned: Vec<(i64, i64)> = self
            .submissions
            .iter()
            .filter(|s| s.student_id == id)
            .map(|s| (s.id, s.assignment_id))
            .collect();
        for (submission_id, assignment_id) in owned {
            self.submissions.remove(&submission_id);
            self.submission_pairs.remove(&(assignment_id, id));
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str, role: Role) -> CreateActorRequest {
        CreateActorRequest {
            name: name.to_string(),
            email: email.to_string(),
            role,
            group: Some("bis-1-23".to_string()),
        }
    }

    #[test]
    fn test_email_is_unique_case_insensitive() {
        let storage = MemoryStorage::new();
        let first = storage
            .create_actor_impl(request("Teacher", "Teacher@Example.edu", Role::Teacher))
            .unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(first.email, "teacher@example.edu");
        // 教师不归属小组
        assert!(first.group.is_none());

        let err = storage
            .create_actor_impl(request("Other", "teacher@example.edu ", Role::Student))
            .unwrap_err();
        assert!(matches!(err, LabDeskError::Conflict(_)));
        assert_eq!(storage.actors.len(), 1);
    }

    #[test]
    fn test_list_filters() {
        let storage = MemoryStorage::new();
        storage
            .create_actor_impl(request("Alice", "alice@example.edu", Role::Student))
            .unwrap();
        storage
            .create_actor_impl(request("Bob", "bob@example.edu", Role::Teacher))
            .unwrap();

        let students = storage.list_actors_impl(&ActorListQuery {
            role: Some(Role::Student),
            ..Default::default()
        });
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].name, "Alice");

        let search = storage.list_actors_impl(&ActorListQuery {
            search: Some("BOB".into()),
            ..Default::default()
        });
        assert_eq!(search.len(), 1);

        let grouped = storage.list_actors_impl(&ActorListQuery {
            group: Some("bis-1-23".into()),
            ..Default::default()
        });
        assert_eq!(grouped.len(), 1);
    }

    #[test]
    fn test_update_email_moves_index() {
        let storage = MemoryStorage::new();
        let a = storage
            .create_actor_impl(request("Alice", "alice@example.edu", Role::Student))
            .unwrap();
        storage
            .create_actor_impl(request("Bob", "bob@example.edu", Role::Student))
            .unwrap();

        let conflict = storage.update_actor_impl(
            a.id,
            UpdateActorRequest {
                email: Some("bob@example.edu".into()),
                ..Default::default()
            },
        );
        assert!(matches!(conflict, Err(LabDeskError::Conflict(_))));

        let updated = storage
            .update_actor_impl(
                a.id,
                UpdateActorRequest {
                    name: Some("Alice Smith".into()),
                    email: Some("alice.smith@example.edu".into()),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Alice Smith");
        assert!(storage.get_actor_by_email_impl("alice@example.edu").is_none());
        assert_eq!(
            storage
                .get_actor_by_email_impl("ALICE.SMITH@example.edu")
                .map(|a| a.id),
            Some(a.id)
        );
    }

    #[test]
    fn test_delete_actor_frees_email() {
        let storage = MemoryStorage::new();
        let a = storage
            .create_actor_impl(request("Alice", "alice@example.edu", Role::Student))
            .unwrap();
        assert!(storage.delete_actor_impl(a.id));
        assert!(!storage.delete_actor_impl(a.id));
        assert!(
            storage
                .create_actor_impl(request("Alice", "alice@example.edu", Role::Student))
                .is_ok()
        );
    }
}
