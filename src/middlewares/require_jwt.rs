/*!
 * JWT 认证中间件
 *
 * 验证 access token，并通过会话服务确认会话仍然有效（登出后令牌即失效）。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use actix_web::{web, App};
 * use crate::middlewares::RequireJWT;
 *
 * App::new()
 *     .service(
 *         web::scope("/api")
 *             .wrap(RequireJWT)  // 应用JWT验证中间件
 *             .route("/protected", web::get().to(protected_handler))
 *     )
 * ```
 *
 * 在处理程序中提取当前用户：
 *
 * ```rust,ignore
 * async fn protected_handler(req: HttpRequest) -> Result<HttpResponse> {
 *     let actor = RequireJWT::extract_actor(&req);
 *     // ...
 * }
 * ```
 *
 * ## 认证流程
 *
 * 1. 客户端在请求头中包含 `Authorization: Bearer <JWT_TOKEN>`
 * 2. 中间件验证令牌签名与有效期，取出 `sid`
 * 3. 通过 `SessionService::current_actor` 读取会话记录，并以用户目录中的最新记录为准
 * 4. 会话存在且用户一致时，将用户与会话键存入请求扩展，继续处理请求
 * 5. 否则返回 401
 */

use crate::i18n::{self, Locale};
use crate::models::ErrorCode;
use crate::models::actors::entities::Actor;
use crate::session::{SessionKey, SessionService};
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, error, info};

use super::create_error_response;

const BEARER_PREFIX: &str = "Bearer ";
const AUTHORIZATION_HEADER: &str = "Authorization";

#[derive(Clone)]
pub struct RequireJWT;

// 认证失败原因，对应本地化文案 key
enum AuthFailure {
    MissingToken,
    InvalidToken,
    SessionEnded,
    Misconfigured,
}

impl AuthFailure {
    fn message_key(&self) -> &'static str {
        match self {
            AuthFailure::MissingToken => "auth.missing_token",
            AuthFailure::InvalidToken => "auth.invalid_token",
            AuthFailure::SessionEnded => "auth.session_ended",
            AuthFailure::Misconfigured => "error.internal",
        }
    }

    fn into_response(self, locale: Locale) -> HttpResponse {
        let message = i18n::t(locale, self.message_key());
        match self {
            AuthFailure::Misconfigured => create_error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalServerError,
                &message,
            ),
            _ => create_error_response(StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized, &message),
        }
    }
}

// 辅助函数：验证 JWT 并读取会话
async fn authenticate_request(req: &ServiceRequest) -> Result<(Actor, SessionKey), AuthFailure> {
    let token = req
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .ok_or(AuthFailure::MissingToken)?;

    let claims = crate::utils::jwt::JwtUtils::verify_access_token(token).map_err(|err| {
        info!("JWT token validation failed: {}", err);
        AuthFailure::InvalidToken
    })?;

    let session = req
        .app_data::<actix_web::web::Data<Arc<SessionService>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| {
            error!("SessionService not found in app data");
            AuthFailure::Misconfigured
        })?;

    let key = SessionKey::for_session(&claims.sid);
    let actor = session.current_actor(&key).await.ok_or_else(|| {
        info!("No active session for sid {}", claims.sid);
        AuthFailure::SessionEnded
    })?;

    if actor.id.to_string() != claims.sub {
        info!(
            "Session {} belongs to actor {}, token subject is {}",
            claims.sid, actor.id, claims.sub
        );
        return Err(AuthFailure::InvalidToken);
    }

    Ok((actor, key))
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // 处理 OPTIONS 请求
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(HttpResponse::NoContent().finish().map_into_right_body()));
            }

            match authenticate_request(&req).await {
                Ok((actor, key)) => {
                    debug!("JWT authentication successful for ID: {}", actor.id);
                    req.extensions_mut().insert(actor);
                    req.extensions_mut().insert(key);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(failure) => {
                    info!(
                        "JWT authentication failed for request to {}: {}",
                        req.path(),
                        failure.message_key()
                    );
                    let locale = Locale::from_request(req.request());
                    Ok(req.into_response(failure.into_response(locale).map_into_right_body()))
                }
            }
        })
    }
}

// 辅助函数：从请求中提取用户信息
impl RequireJWT {
    /// 从请求扩展中提取当前用户
    /// 此函数应该在应用了RequireJWT中间件的路由处理程序中使用
    pub fn extract_actor(req: &actix_web::HttpRequest) -> Option<Actor> {
        req.extensions().get::<Actor>().cloned()
    }

    /// 从请求扩展中提取会话键
    pub fn extract_session_key(req: &actix_web::HttpRequest) -> Option<SessionKey> {
        req.extensions().get::<SessionKey>().cloned()
    }
}
