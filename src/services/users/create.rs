use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::UserService;
use crate::errors::LabDeskError;
use crate::i18n::{self, Locale};
use crate::models::{
    ApiResponse, ErrorCode,
    actors::{entities::Role, requests::CreateActorRequest, responses::ActorResponse},
};
use crate::runtime::pending::entity_key;
use crate::services::{error_response, error_response_as, not_found_response};
use crate::utils::validate::{require_text, validate_email};

pub async fn create_user(
    service: &UserService,
    mut user_data: CreateActorRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let locale = Locale::from_request(request);

    // 验证姓名与邮箱
    user_data.name = match require_text("name", &user_data.name) {
        Ok(name) => name,
        Err(e) => return Ok(error_response(&e, locale)),
    };
    if let Err(msg) = validate_email(&user_data.email) {
        return Ok(error_response(&LabDeskError::validation(msg), locale));
    }

    let storage = service.get_storage(request)?;
    let pending = service.get_pending(request)?;

    // 学生所属小组必须存在
    if user_data.role == Role::Student
        && let Some(group) = user_data.group.as_deref().map(str::trim).filter(|g| !g.is_empty())
    {
        match storage.get_group_by_name(group).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return Ok(not_found_response(
                    ErrorCode::GroupNotFound,
                    i18n::t_with(locale, "group.not_found", &[("name", group)]),
                ));
            }
            Err(e) => return Ok(error_response(&e, locale)),
        }
    }

    let email_key = entity_key("email", user_data.email.trim().to_lowercase());
    match pending.run(email_key, storage.create_actor(user_data)).await {
        Ok(actor) => {
            info!("Actor {} created with role {}", actor.id, actor.role);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                ActorResponse { actor },
                i18n::t(locale, "user.created"),
            )))
        }
        Err(e @ LabDeskError::Conflict(_)) => Ok(error_response_as(
            &e,
            ErrorCode::EmailAlreadyExists,
            i18n::t(locale, "user.email_exists"),
        )),
        Err(e) => Ok(error_response(&e, locale)),
    }
}
