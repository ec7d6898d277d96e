//! 会话与权限
//!
//! `SessionService` 在启动时创建，通过 `web::Data` 注入，不存在隐藏的全局会话。
//! 会话记录（当前用户）以 JSON 形式保存在 `ObjectCache` 中，键由 [`SessionKey`] 决定：
//! 嵌入式场景只有一个进程级会话，HTTP 场景下每个浏览器会话各占一个键。
//!
//! 登录口令是所有演示账号共享的同一个配置值，仅作占位，不构成安全边界。

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::{CacheResult, ObjectCache};
use crate::errors::{LabDeskError, Result};
use crate::models::actors::entities::{Actor, ActorStatus, Role};
use crate::models::actors::requests::UpdateActorRequest;
use crate::storage::Storage;
use crate::utils::password::{hash_password, verify_password};

const SESSION_KEY_PREFIX: &str = "session:";
const CURRENT_SESSION: &str = "current";

/// 会话存储中的键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey(String);

impl SessionKey {
    /// 进程级唯一会话
    pub fn current() -> Self {
        Self(format!("{SESSION_KEY_PREFIX}{CURRENT_SESSION}"))
    }

    /// 指定会话ID
    pub fn for_session(session_id: &str) -> Self {
        Self(format!("{SESSION_KEY_PREFIX}{session_id}"))
    }

    /// 生成新的会话ID及对应的键
    pub fn generate() -> (String, Self) {
        let session_id = uuid::Uuid::new_v4().to_string();
        let key = Self::for_session(&session_id);
        (session_id, key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 角色检查：actor 的角色在允许集合内，或集合为空（任意已登录用户）
pub fn is_authorized(actor: &Actor, allowed_roles: &[Role]) -> bool {
    allowed_roles.is_empty() || allowed_roles.contains(&actor.role)
}

pub struct SessionService {
    store: Arc<dyn ObjectCache>,
    directory: Arc<dyn Storage>,
    // 演示口令的 argon2 哈希
    credential_hash: String,
    ttl: u64,
}

impl SessionService {
    pub fn new(
        store: Arc<dyn ObjectCache>,
        directory: Arc<dyn Storage>,
        demo_password: &str,
        ttl: u64,
    ) -> Result<Self> {
        if demo_password.is_empty() {
            return Err(LabDeskError::configuration(
                "auth.demo_password must not be empty",
            ));
        }
        Ok(Self {
            store,
            directory,
            credential_hash: hash_password(demo_password)?,
            ttl,
        })
    }

    /// 登录：邮箱对应已知用户且口令匹配时写入会话
    pub async fn authenticate(&self, key: &SessionKey, email: &str, password: &str) -> Result<Actor> {
        let actor = self.directory.get_actor_by_email(email).await?;

        let Some(actor) = actor else {
            info!("Login rejected: unknown email {}", email.trim());
            return Err(LabDeskError::invalid_credentials("Unknown email or wrong password"));
        };
        if !verify_password(password, &self.credential_hash) {
            info!("Login rejected: wrong password for actor {}", actor.id);
            return Err(LabDeskError::invalid_credentials("Unknown email or wrong password"));
        }
        if actor.status != ActorStatus::Active {
            info!("Login rejected: actor {} is inactive", actor.id);
            return Err(LabDeskError::invalid_credentials("Account is inactive"));
        }

        let actor = self
            .directory
            .update_actor(
                actor.id,
                UpdateActorRequest {
                    last_activity: Some(chrono::Utc::now()),
                    ..Default::default()
                },
            )
            .await?
            .unwrap_or(actor);

        self.store_actor(key, &actor).await?;
        info!("Actor {} ({}) logged in", actor.id, actor.role);
        Ok(actor)
    }

    /// 读取会话中的当前用户
    ///
    /// 会话记录只用来确定登录身份，角色与状态以用户目录中的最新记录为准；
    /// 用户已被删除或停用时清除会话。
    pub async fn current_actor(&self, key: &SessionKey) -> Option<Actor> {
        let cached = self.cached_actor(key).await?;
        match self.directory.get_actor_by_id(cached.id).await {
            Ok(Some(actor)) if actor.status == ActorStatus::Active => Some(actor),
            Ok(_) => {
                info!(
                    "Session {} ended: actor {} was removed or deactivated",
                    key.as_str(),
                    cached.id
                );
                self.store.remove(key.as_str()).await;
                None
            }
            Err(e) => {
                warn!("Failed to resolve actor {} for session: {}", cached.id, e);
                None
            }
        }
    }

    async fn cached_actor(&self, key: &SessionKey) -> Option<Actor> {
        match self.store.get_raw(key.as_str()).await {
            CacheResult::Found(json) => match serde_json::from_str::<Actor>(&json) {
                Ok(actor) => Some(actor),
                Err(e) => {
                    warn!("Dropping unreadable session record {}: {}", key.as_str(), e);
                    self.store.remove(key.as_str()).await;
                    None
                }
            },
            CacheResult::NotFound => {
                debug!("No session record for {}", key.as_str());
                None
            }
            CacheResult::ExistsButNoValue => None,
        }
    }

    /// 用户资料变更后刷新会话记录
    pub async fn refresh(&self, key: &SessionKey, actor: &Actor) -> Result<()> {
        self.store_actor(key, actor).await
    }

    /// 登出：删除会话记录
    pub async fn logout(&self, key: &SessionKey) {
        self.store.remove(key.as_str()).await;
        info!("Session {} cleared", key.as_str());
    }

    async fn store_actor(&self, key: &SessionKey, actor: &Actor) -> Result<()> {
        let json = serde_json::to_string(actor)?;
        self.store
            .insert_raw(key.as_str().to_string(), json, self.ttl)
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::object_cache::MokaCacheWrapper;
    use crate::storage::memory_storage::MemoryStorage;

    async fn service() -> (SessionService, Arc<dyn ObjectCache>, Arc<dyn Storage>) {
        let storage = MemoryStorage::new();
        storage.seed_demo_data(chrono::Utc::now()).await.unwrap();
        let storage: Arc<dyn Storage> = Arc::new(storage);
        let store: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_settings(64, 0));
        let service =
            SessionService::new(store.clone(), storage.clone(), "password", 0).unwrap();
        (service, store, storage)
    }

    fn actor_with_role(role: Role) -> Actor {
        Actor {
            id: 9,
            name: "Someone".into(),
            email: "someone@example.edu".into(),
            role,
            group: None,
            status: ActorStatus::Active,
            created_at: chrono::Utc::now(),
            last_activity: None,
        }
    }

    #[test]
    fn test_is_authorized() {
        let student = actor_with_role(Role::Student);
        assert!(!is_authorized(&student, Role::staff_roles()));
        assert!(is_authorized(&student, Role::student_roles()));
        assert!(is_authorized(&student, Role::any_authenticated()));

        for role in [Role::Admin, Role::Teacher, Role::Student] {
            assert!(is_authorized(&actor_with_role(role), &[]));
        }
        assert!(is_authorized(&actor_with_role(Role::Admin), Role::admin_roles()));
        assert!(!is_authorized(&actor_with_role(Role::Teacher), Role::admin_roles()));
    }

    #[test]
    fn test_session_keys() {
        assert_eq!(SessionKey::current().as_str(), "session:current");
        assert_eq!(SessionKey::for_session("abc").as_str(), "session:abc");
        let (sid, key) = SessionKey::generate();
        assert_eq!(key, SessionKey::for_session(&sid));
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let (service, _, _) = service().await;
        let key = SessionKey::current();

        assert!(service.current_actor(&key).await.is_none());

        let actor = service
            .authenticate(&key, "teacher1@gmail.edu", "password")
            .await
            .unwrap();
        assert_eq!(actor.role, Role::Teacher);
        assert!(actor.last_activity.is_some());

        let current = service.current_actor(&key).await.unwrap();
        assert_eq!(current.id, actor.id);

        service.logout(&key).await;
        assert!(service.current_actor(&key).await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_credentials() {
        let (service, _, _) = service().await;
        let key = SessionKey::current();

        let wrong_password = service
            .authenticate(&key, "teacher1@gmail.edu", "hunter2")
            .await
            .unwrap_err();
        assert!(matches!(wrong_password, LabDeskError::InvalidCredentials(_)));

        let unknown = service
            .authenticate(&key, "nobody@gmail.edu", "password")
            .await
            .unwrap_err();
        assert!(matches!(unknown, LabDeskError::InvalidCredentials(_)));

        // 停用账号不能登录
        let inactive = service
            .authenticate(&key, "emma.wilson@gmail.edu", "password")
            .await
            .unwrap_err();
        assert!(matches!(inactive, LabDeskError::InvalidCredentials(_)));

        assert!(service.current_actor(&key).await.is_none());
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let (service, _, _) = service().await;
        let student = SessionKey::for_session("a");
        let admin = SessionKey::for_session("b");

        service
            .authenticate(&student, "baitur.ibrakhimov@gmail.edu", "password")
            .await
            .unwrap();
        service
            .authenticate(&admin, "admin.university@gmail.edu", "password")
            .await
            .unwrap();

        service.logout(&admin).await;
        assert!(service.current_actor(&admin).await.is_none());
        assert_eq!(
            service.current_actor(&student).await.map(|a| a.role),
            Some(Role::Student)
        );
    }

    #[tokio::test]
    async fn test_corrupt_record_is_dropped() {
        let (service, store, _) = service().await;
        let key = SessionKey::current();
        store
            .insert_raw(key.as_str().to_string(), "{not json".into(), 0)
            .await;

        assert!(service.current_actor(&key).await.is_none());
        assert_eq!(store.get_raw(key.as_str()).await, CacheResult::NotFound);
    }

    #[tokio::test]
    async fn test_session_follows_directory() {
        let (service, store, storage) = service().await;
        let student = SessionKey::for_session("student");
        let teacher = SessionKey::for_session("teacher");

        let baitur = service
            .authenticate(&student, "baitur.ibrakhimov@gmail.edu", "password")
            .await
            .unwrap();
        let teacher1 = service
            .authenticate(&teacher, "teacher1@gmail.edu", "password")
            .await
            .unwrap();

        // 资料变更立即可见
        storage
            .update_actor(
                baitur.id,
                UpdateActorRequest {
                    name: Some("Baitur I.".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(
            service.current_actor(&student).await.map(|a| a.name),
            Some("Baitur I.".to_string())
        );

        // 删除用户后会话失效，记录被清除
        assert!(storage.delete_actor(baitur.id).await.unwrap());
        assert!(service.current_actor(&student).await.is_none());
        assert_eq!(store.get_raw(student.as_str()).await, CacheResult::NotFound);

        // 停用同样结束会话
        storage
            .update_actor(
                teacher1.id,
                UpdateActorRequest {
                    status: Some(ActorStatus::Inactive),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(service.current_actor(&teacher).await.is_none());
    }

    #[test]
    fn test_empty_credential_rejected() {
        let store: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_settings(4, 0));
        let result = SessionService::new(store, Arc::new(MemoryStorage::new()), "", 0);
        assert!(matches!(result, Err(LabDeskError::Configuration(_))));
    }
}
