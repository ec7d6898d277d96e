use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::errors::LabDeskError;
use crate::i18n::{self, Locale};
use crate::middlewares::RequireJWT;
use crate::models::actors::requests::UpdateActorRequest;
use crate::models::auth::{SessionResponse, UpdateProfileRequest};
use crate::models::{ApiResponse, ErrorCode};
use crate::runtime::pending::entity_key;
use crate::services::{current_actor, error_response, error_response_as};
use crate::utils::validate::{require_text, validate_email};

use super::AuthService;

pub async fn handle_me(request: &HttpRequest) -> ActixResult<HttpResponse> {
    let locale = Locale::from_request(request);
    let actor = current_actor(request)?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        SessionResponse { actor },
        i18n::t(locale, "auth.me_success"),
    )))
}

pub async fn handle_update_profile(
    service: &AuthService,
    update_data: UpdateProfileRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let locale = Locale::from_request(request);
    let storage = service.get_storage(request)?;
    let session = service.get_session(request)?;
    let pending = service.get_pending(request)?;

    let current = current_actor(request)?;
    let Some(key) = RequireJWT::extract_session_key(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            i18n::t(locale, "auth.missing_token"),
        )));
    };

    // 姓名与邮箱均为必填
    let name = match require_text("name", &update_data.name) {
        Ok(name) => name,
        Err(e) => return Ok(error_response(&e, locale)),
    };
    let email = match require_text("email", &update_data.email) {
        Ok(email) => email,
        Err(e) => return Ok(error_response(&e, locale)),
    };
    if let Err(msg) = validate_email(&email) {
        return Ok(error_response(&LabDeskError::validation(msg), locale));
    }

    let update = UpdateActorRequest {
        name: Some(name),
        email: Some(email),
        ..Default::default()
    };

    let result = pending
        .run(
            entity_key("actor", current.id),
            storage.update_actor(current.id, update),
        )
        .await;

    match result {
        Ok(Some(actor)) => {
            // 会话中保存的是用户快照，资料变更后同步刷新
            if let Err(e) = session.refresh(&key, &actor).await {
                return Ok(error_response(&e, locale));
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                SessionResponse { actor },
                i18n::t(locale, "auth.profile_updated"),
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ActorNotFound,
            i18n::t(locale, "user.not_found"),
        ))),
        Err(e @ LabDeskError::Conflict(_)) => Ok(error_response_as(
            &e,
            ErrorCode::EmailAlreadyExists,
            i18n::t(locale, "user.email_exists"),
        )),
        Err(e) => Ok(error_response(&e, locale)),
    }
}
