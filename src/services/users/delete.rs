use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::UserService;
use crate::i18n::{self, Locale};
use crate::models::{ApiResponse, ErrorCode};
use crate::runtime::pending::entity_key;
use crate::services::{current_actor, error_response, not_found_response};

pub async fn delete_user(
    service: &UserService,
    user_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let locale = Locale::from_request(request);
    let current = current_actor(request)?;

    // 禁止删除当前用户
    if user_id == current.id {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::CannotDeleteSelf,
            i18n::t(locale, "user.cannot_delete_self"),
        )));
    }

    let storage = service.get_storage(request)?;
    let pending = service.get_pending(request)?;

    match pending
        .run(entity_key("actor", user_id), storage.delete_actor(user_id))
        .await
    {
        Ok(true) => {
            info!("Actor {} deleted by {}", user_id, current.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(i18n::t(
                locale,
                "user.deleted",
            ))))
        }
        Ok(false) => Ok(not_found_response(
            ErrorCode::ActorNotFound,
            i18n::t(locale, "user.not_found"),
        )),
        Err(e) => Ok(error_response(&e, locale)),
    }
}
