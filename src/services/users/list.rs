use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::i18n::{self, Locale};
use crate::models::{
    ApiResponse,
    actors::{
        entities::ActorStatus, requests::ActorListQuery, responses::ActorListResponse,
    },
};
use crate::services::error_response;

pub async fn list_users(
    service: &UserService,
    query: ActorListQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let locale = Locale::from_request(request);
    let storage = service.get_storage(request)?;

    match storage.list_actors(query).await {
        Ok(items) => {
            let total = items.len() as i64;
            let active = items
                .iter()
                .filter(|actor| actor.status == ActorStatus::Active)
                .count() as i64;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                ActorListResponse {
                    items,
                    total,
                    active,
                },
                i18n::t(locale, "user.list_success"),
            )))
        }
        Err(e) => Ok(error_response(&e, locale)),
    }
}
