use super::entities::Actor;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "actor.ts")]
pub struct ActorResponse {
    pub actor: Actor,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "actor.ts")]
pub struct ActorListResponse {
    pub items: Vec<Actor>,
    pub total: i64,
    pub active: i64,
}
