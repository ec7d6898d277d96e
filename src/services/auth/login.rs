use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::i18n::{self, Locale};
use crate::models::{
    ApiResponse, ErrorCode,
    auth::{LoginRequest, LoginResponse},
};
use crate::services::error_response;
use crate::session::SessionKey;
use crate::utils::jwt::JwtUtils;

use super::AuthService;

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let locale = Locale::from_request(request);
    let session = service.get_session(request)?;
    let config = service.get_config();

    // 1. 每次登录分配新的会话键
    let (session_id, key) = SessionKey::generate();

    // 2. 校验邮箱与口令，成功后写入会话
    let actor = match session
        .authenticate(&key, &login_request.email, &login_request.password)
        .await
    {
        Ok(actor) => actor,
        Err(e) => return Ok(error_response(&e, locale)),
    };

    // 3. 签发携带会话ID的访问令牌
    match JwtUtils::generate_access_token(actor.id, actor.role, &session_id) {
        Ok(access_token) => {
            tracing::info!("Actor {} logged in successfully", actor.email);

            let response = LoginResponse {
                access_token,
                expires_in: config.jwt.access_token_expiry * 60, // 转换为秒
                actor,
                created_at: chrono::Utc::now(),
            };

            Ok(HttpResponse::Ok().json(ApiResponse::success(
                response,
                i18n::t(locale, "auth.login_success"),
            )))
        }
        Err(e) => {
            tracing::error!("Failed to generate JWT token: {}", e);
            // 令牌签发失败时不保留会话
            session.logout(&key).await;
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    i18n::t(locale, "auth.token_failed"),
                )),
            )
        }
    }
}
