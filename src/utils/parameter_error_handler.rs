//! 请求参数解析失败时的统一响应

use actix_web::{HttpRequest, HttpResponse, error, error::InternalError};
use tracing::debug;

use crate::i18n::{self, Locale};
use crate::models::{ApiResponse, ErrorCode};

/// JSON 请求体解析错误
pub fn json_error_handler(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("Rejected JSON payload for {}: {}", req.path(), err);
    let locale = Locale::from_request(req);
    let message = format!("{}: {err}", i18n::t(locale, "error.invalid_body"));
    let response = HttpResponse::BadRequest()
        .json(ApiResponse::<()>::error_empty(ErrorCode::BadRequest, message));
    InternalError::from_response(err, response).into()
}

/// 查询参数解析错误
pub fn query_error_handler(err: error::QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("Rejected query string for {}: {}", req.path(), err);
    let locale = Locale::from_request(req);
    let message = format!("{}: {err}", i18n::t(locale, "error.invalid_query"));
    let response = HttpResponse::BadRequest()
        .json(ApiResponse::<()>::error_empty(ErrorCode::BadRequest, message));
    InternalError::from_response(err, response).into()
}

/// 路径参数解析错误
pub fn path_error_handler(err: error::PathError, req: &HttpRequest) -> actix_web::Error {
    debug!("Rejected path parameter for {}: {}", req.path(), err);
    let locale = Locale::from_request(req);
    let message = format!("{}: {err}", i18n::t(locale, "error.invalid_path"));
    let response = HttpResponse::BadRequest()
        .json(ApiResponse::<()>::error_empty(ErrorCode::BadRequest, message));
    InternalError::from_response(err, response).into()
}
