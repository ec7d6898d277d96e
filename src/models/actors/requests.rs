use super::entities::{ActorStatus, Role};
use serde::Deserialize;
use ts_rs::TS;

// 用户列表查询参数（来自HTTP请求）
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "actor.ts")]
pub struct ActorListQuery {
    pub search: Option<String>,
    pub role: Option<Role>,
    pub status: Option<ActorStatus>,
    /// 按小组名称过滤
    pub group: Option<String>,
}

// 管理员创建用户请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "actor.ts")]
pub struct CreateActorRequest {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub group: Option<String>,
}

// 用户更新（用于存储层）
#[derive(Debug, Clone, Default)]
pub struct UpdateActorRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<ActorStatus>,
    pub last_activity: Option<chrono::DateTime<chrono::Utc>>,
}
