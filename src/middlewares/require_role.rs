/*!
 * 基于角色的访问控制中间件
 *
 * 此中间件必须在 RequireJWT 中间件之后使用。所有受保护路由共用同一个判断
 * `session::is_authorized`：角色在允许集合内，或集合为空（任意已登录用户）。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use crate::middlewares::{RequireJWT, RequireRole};
 * use crate::models::actors::entities::Role;
 *
 * web::scope("/api/v1/users")
 *     .wrap(RequireJWT)  // 先验证JWT
 *     .service(
 *         web::scope("")
 *             .wrap(RequireRole::new_any(Role::admin_roles()))  // 再验证角色
 *             .route("", web::get().to(list_users)),
 *     )
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::info;

use crate::i18n::{self, Locale};
use crate::models::{
    ErrorCode,
    actors::entities::{Actor, Role},
};
use crate::session::is_authorized;

use super::create_error_response;

#[derive(Clone)]
pub struct RequireRole {
    allowed_roles: Vec<Role>,
}

impl RequireRole {
    /// 创建需要特定角色的中间件
    pub fn new(role: Role) -> Self {
        Self {
            allowed_roles: vec![role],
        }
    }

    /// 创建需要任一角色的中间件，空集合表示任意已登录用户
    pub fn new_any(roles: &[Role]) -> Self {
        Self {
            allowed_roles: roles.to_vec(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service: Rc::new(service),
            allowed_roles: self.allowed_roles.clone(),
        }))
    }
}

pub struct RequireRoleMiddleware<S> {
    service: Rc<S>,
    allowed_roles: Vec<Role>,
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
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
        let allowed_roles = self.allowed_roles.clone();

        Box::pin(async move {
            let actor = req.extensions().get::<Actor>().cloned();
            let locale = Locale::from_request(req.request());

            match actor {
                Some(actor) if is_authorized(&actor, &allowed_roles) => {
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Some(actor) => {
                    info!(
                        "Access denied for actor {} (role: {}). Allowed roles: {:?}",
                        actor.id, actor.role, allowed_roles
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::FORBIDDEN,
                            ErrorCode::Forbidden,
                            &i18n::t(locale, "error.forbidden"),
                        )
                        .map_into_right_body(),
                    ))
                }
                None => {
                    info!(
                        "Role check failed: No actor found in request. Make sure RequireJWT middleware is applied first."
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            &i18n::t(locale, "auth.missing_token"),
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}
