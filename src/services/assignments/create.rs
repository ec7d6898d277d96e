use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{DateTime, Utc};
use tracing::info;

use super::{AssignmentService, DEFAULT_MAX_GRADE};
use crate::errors::{LabDeskError, Result};
use crate::i18n::{self, Locale};
use crate::models::{
    ApiResponse,
    assignments::{
        entities::NewAssignment, requests::CreateAssignmentRequest,
        responses::AssignmentResponse,
    },
};
use crate::runtime::pending::entity_key;
use crate::services::{current_actor, error_response};
use crate::utils::validate::{require_text, validate_max_grade};

// 校验创建请求：标题、描述非空，截止时间严格晚于 now
fn validate_new_assignment(
    req: CreateAssignmentRequest,
    created_by: i64,
    now: DateTime<Utc>,
) -> Result<NewAssignment> {
    let title = require_text("title", &req.title)?;
    let description = require_text("description", &req.description)?;
    let deadline = req
        .deadline
        .ok_or_else(|| LabDeskError::validation("deadline is required"))?;
    if deadline <= now {
        return Err(LabDeskError::validation("deadline must be in the future"));
    }
    let max_grade = validate_max_grade(req.max_grade.unwrap_or(DEFAULT_MAX_GRADE))?;

    Ok(NewAssignment {
        title,
        description,
        deadline,
        max_grade,
        materials_reference: req
            .materials_reference
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty()),
        created_by,
    })
}

pub async fn create_assignment(
    service: &AssignmentService,
    assignment_data: CreateAssignmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let locale = Locale::from_request(request);
    let actor = current_actor(request)?;

    let new_assignment = match validate_new_assignment(assignment_data, actor.id, Utc::now()) {
        Ok(new_assignment) => new_assignment,
        Err(e) => return Ok(error_response(&e, locale)),
    };

    let storage = service.get_storage(request)?;
    let pending = service.get_pending(request)?;

    // 新作业还没有ID，按创建者限制同时只有一个创建请求
    match pending
        .run(
            entity_key("assignment-draft", actor.id),
            storage.create_assignment(new_assignment),
        )
        .await
    {
        Ok(assignment) => {
            info!("Assignment {} created by {}", assignment.id, actor.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                AssignmentResponse { assignment },
                i18n::t(locale, "assignment.created"),
            )))
        }
        Err(e) => Ok(error_response(&e, locale)),
    }
}
