use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::i18n::{self, Locale};
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode};

use super::AuthService;

/// 处理登出：删除会话记录，之后持有同一令牌的请求都会返回 401
pub async fn handle_logout(
    service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let locale = Locale::from_request(request);

    let Some(key) = RequireJWT::extract_session_key(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            i18n::t(locale, "auth.missing_token"),
        )));
    };

    service.get_session(request)?.logout(&key).await;

    Ok(HttpResponse::Ok().json(ApiResponse::success_empty(i18n::t(
        locale,
        "auth.logout_success",
    ))))
}
