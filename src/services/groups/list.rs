use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashMap;

use super::GroupService;
use crate::i18n::{self, Locale};
use crate::models::{
    ApiResponse,
    actors::{entities::Role, requests::ActorListQuery},
    groups::responses::{GroupListResponse, GroupView},
};
use crate::services::error_response;

pub async fn list_groups(
    service: &GroupService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let locale = Locale::from_request(request);
    let storage = service.get_storage(request)?;

    let groups = match storage.list_groups().await {
        Ok(groups) => groups,
        Err(e) => return Ok(error_response(&e, locale)),
    };

    // 负责教师的姓名
    let teachers: HashMap<i64, String> = match storage
        .list_actors(ActorListQuery {
            role: Some(Role::Teacher),
            ..Default::default()
        })
        .await
    {
        Ok(teachers) => teachers.into_iter().map(|t| (t.id, t.name)).collect(),
        Err(e) => return Ok(error_response(&e, locale)),
    };

    let items = groups
        .into_iter()
        .map(|group| GroupView {
            teacher_name: teachers.get(&group.teacher_id).cloned(),
            group,
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        GroupListResponse { items },
        i18n::t(locale, "group.list_success"),
    )))
}
