use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AssignmentService;
use crate::i18n::{self, Locale};
use crate::models::{ApiResponse, ErrorCode};
use crate::runtime::pending::entity_key;
use crate::services::{current_actor, error_response, not_found_response};

/// 删除作业及其全部提交
pub async fn delete_assignment(
    service: &AssignmentService,
    assignment_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let locale = Locale::from_request(request);
    let actor = current_actor(request)?;
    let storage = service.get_storage(request)?;
    let pending = service.get_pending(request)?;

    match pending
        .run(
            entity_key("assignment", assignment_id),
            storage.delete_assignment(assignment_id),
        )
        .await
    {
        Ok(true) => {
            info!("Assignment {} deleted by {}", assignment_id, actor.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(i18n::t(
                locale,
                "assignment.deleted",
            ))))
        }
        Ok(false) => Ok(not_found_response(
            ErrorCode::AssignmentNotFound,
            i18n::t_with(
                locale,
                "assignment.not_found",
                &[("id", assignment_id.to_string().as_str())],
            ),
        )),
        Err(e) => Ok(error_response(&e, locale)),
    }
}
