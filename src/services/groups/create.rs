use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::GroupService;
use crate::errors::LabDeskError;
use crate::i18n::{self, Locale};
use crate::models::{
    ApiResponse, ErrorCode,
    actors::entities::Role,
    groups::{entities::NewGroup, requests::CreateGroupRequest},
};
use crate::runtime::pending::entity_key;
use crate::services::{error_response, error_response_as};
use crate::utils::validate::require_text;

pub async fn create_group(
    service: &GroupService,
    group_data: CreateGroupRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let locale = Locale::from_request(request);

    let name = match require_text("name", &group_data.name) {
        Ok(name) => name,
        Err(e) => return Ok(error_response(&e, locale)),
    };
    let Some(teacher_id) = group_data.teacher_id else {
        return Ok(error_response(
            &LabDeskError::validation("teacher_id is required"),
            locale,
        ));
    };

    let storage = service.get_storage(request)?;
    let pending = service.get_pending(request)?;

    // 负责人必须是教师
    match storage.get_actor_by_id(teacher_id).await {
        Ok(Some(actor)) if actor.role == Role::Teacher => {}
        Ok(_) => {
            return Ok(error_response(
                &LabDeskError::validation(format!("actor {teacher_id} is not a teacher")),
                locale,
            ));
        }
        Err(e) => return Ok(error_response(&e, locale)),
    }

    let new_group = NewGroup {
        name: name.clone(),
        description: group_data.description.trim().to_string(),
        teacher_id,
    };

    match pending
        .run(entity_key("group", &name), storage.create_group(new_group))
        .await
    {
        Ok(group) => {
            info!("Group {} created", group.name);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                group,
                i18n::t(locale, "group.created"),
            )))
        }
        Err(e @ LabDeskError::Conflict(_)) => Ok(error_response_as(
            &e,
            ErrorCode::GroupAlreadyExists,
            i18n::t_with(locale, "group.already_exists", &[("name", name.as_str())]),
        )),
        Err(e) => Ok(error_response(&e, locale)),
    }
}
