pub mod assignments;
pub mod auth;
pub mod dashboard;
pub mod groups;
pub mod reports;
pub mod students;
pub mod submissions;
pub mod system;
pub mod users;

pub use assignments::AssignmentService;
pub use auth::AuthService;
pub use dashboard::DashboardService;
pub use groups::GroupService;
pub use reports::ReportService;
pub use students::StudentService;
pub use submissions::SubmissionService;
pub use system::SystemService;
pub use users::UserService;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode, web};
use std::sync::Arc;
use tracing::error;

use crate::errors::LabDeskError;
use crate::i18n::{self, Locale};
use crate::middlewares::RequireJWT;
use crate::models::actors::entities::Actor;
use crate::models::{ApiResponse, ErrorCode};
use crate::runtime::pending::PendingOperations;
use crate::session::SessionService;
use crate::storage::Storage;

// 从 app_data 读取共享组件，缺失属于装配错误
pub(crate) fn shared_data<T: ?Sized + 'static>(
    request: &HttpRequest,
    name: &str,
) -> ActixResult<Arc<T>> {
    request
        .app_data::<web::Data<Arc<T>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| {
            error!("{} not found in app data", name);
            actix_web::error::ErrorInternalServerError(format!("{name} is not configured"))
        })
}

pub(crate) fn storage_from(request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
    shared_data::<dyn Storage>(request, "Storage")
}

pub(crate) fn session_from(request: &HttpRequest) -> ActixResult<Arc<SessionService>> {
    shared_data::<SessionService>(request, "SessionService")
}

pub(crate) fn pending_from(request: &HttpRequest) -> ActixResult<PendingOperations> {
    request
        .app_data::<web::Data<PendingOperations>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| {
            error!("PendingOperations not found in app data");
            actix_web::error::ErrorInternalServerError("PendingOperations is not configured")
        })
}

/// 当前登录用户，由 RequireJWT 写入请求扩展
pub(crate) fn current_actor(request: &HttpRequest) -> ActixResult<Actor> {
    RequireJWT::extract_actor(request)
        .ok_or_else(|| actix_web::error::ErrorUnauthorized("No authenticated actor"))
}

fn error_status(err: &LabDeskError) -> (StatusCode, ErrorCode) {
    match err {
        LabDeskError::Validation(_) => (StatusCode::BAD_REQUEST, ErrorCode::ValidationFailed),
        LabDeskError::InvalidGrade(_) => (StatusCode::BAD_REQUEST, ErrorCode::InvalidGrade),
        LabDeskError::DeadlinePassed(_) => (StatusCode::BAD_REQUEST, ErrorCode::DeadlinePassed),
        LabDeskError::InvalidCredentials(_) => (StatusCode::UNAUTHORIZED, ErrorCode::AuthFailed),
        LabDeskError::Authentication(_) | LabDeskError::Unauthorized(_) => {
            (StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized)
        }
        LabDeskError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
        LabDeskError::Conflict(_) => (StatusCode::CONFLICT, ErrorCode::Conflict),
        LabDeskError::OperationPending(_) => (StatusCode::CONFLICT, ErrorCode::OperationPending),
        LabDeskError::OperationCancelled(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::OperationCancelled,
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::InternalServerError,
        ),
    }
}

fn error_message(err: &LabDeskError, locale: Locale) -> String {
    match err {
        LabDeskError::Validation(detail) => {
            i18n::t_with(locale, "error.validation", &[("detail", detail.as_str())])
        }
        LabDeskError::InvalidGrade(detail) => {
            i18n::t_with(locale, "submission.invalid_grade", &[("detail", detail.as_str())])
        }
        LabDeskError::DeadlinePassed(_) => i18n::t(locale, "submission.deadline_passed"),
        LabDeskError::InvalidCredentials(_) => i18n::t(locale, "auth.invalid_credentials"),
        LabDeskError::Authentication(_) | LabDeskError::Unauthorized(_) => {
            i18n::t(locale, "auth.invalid_token")
        }
        LabDeskError::NotFound(_) => i18n::t(locale, "error.not_found"),
        LabDeskError::Conflict(_) => i18n::t(locale, "error.conflict"),
        LabDeskError::OperationPending(_) => i18n::t(locale, "error.operation_pending"),
        LabDeskError::OperationCancelled(_) => i18n::t(locale, "error.operation_cancelled"),
        _ => i18n::t(locale, "error.internal"),
    }
}

/// 错误 -> (HTTP 状态, 业务码, 本地化文案)
pub(crate) fn error_response(err: &LabDeskError, locale: Locale) -> HttpResponse {
    let (status, code) = error_status(err);
    if status.is_server_error() {
        error!("{}", err);
    }
    HttpResponse::build(status).json(ApiResponse::error_empty(code, error_message(err, locale)))
}

/// 与 `error_response` 相同的状态码，但使用调用方给定的业务码和文案
pub(crate) fn error_response_as(
    err: &LabDeskError,
    code: ErrorCode,
    message: impl Into<String>,
) -> HttpResponse {
    let (status, _) = error_status(err);
    HttpResponse::build(status).json(ApiResponse::error_empty(code, message))
}

pub(crate) fn not_found_response(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(code, message))
}

pub(crate) fn forbidden_response(locale: Locale) -> HttpResponse {
    HttpResponse::Forbidden().json(ApiResponse::error_empty(
        ErrorCode::Forbidden,
        i18n::t(locale, "error.forbidden"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (LabDeskError::validation("x"), StatusCode::BAD_REQUEST),
            (LabDeskError::invalid_grade("x"), StatusCode::BAD_REQUEST),
            (LabDeskError::deadline_passed("x"), StatusCode::BAD_REQUEST),
            (LabDeskError::invalid_credentials("x"), StatusCode::UNAUTHORIZED),
            (LabDeskError::not_found("x"), StatusCode::NOT_FOUND),
            (LabDeskError::conflict("x"), StatusCode::CONFLICT),
            (LabDeskError::operation_pending("x"), StatusCode::CONFLICT),
            (
                LabDeskError::operation_cancelled("x"),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                LabDeskError::division_undefined("x"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(error_status(&err).0, expected, "{err}");
        }
    }

    #[test]
    fn test_error_message_carries_detail() {
        let message = error_message(&LabDeskError::validation("title is required"), Locale::En);
        assert!(message.contains("title is required"));

        let message = error_message(&LabDeskError::invalid_grade("grade 120 is outside [0, 100]"), Locale::En);
        assert!(message.contains("grade 120"));
    }
}
