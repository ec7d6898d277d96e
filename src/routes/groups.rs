use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, guard, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::actors::entities::Role;
use crate::models::groups::requests::CreateGroupRequest;
use crate::services::GroupService;

// 懒加载的全局 GroupService 实例
static GROUP_SERVICE: Lazy<GroupService> = Lazy::new(GroupService::new_lazy);

pub async fn list_groups(req: HttpRequest) -> ActixResult<HttpResponse> {
    GROUP_SERVICE.list_groups(&req).await
}

pub async fn create_group(
    req: HttpRequest,
    group_data: web::Json<CreateGroupRequest>,
) -> ActixResult<HttpResponse> {
    GROUP_SERVICE.create_group(group_data.into_inner(), &req).await
}

// 配置路由
// 同一路径的读写权限不同，按请求方法拆成两个资源
pub fn configure_groups_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/groups")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .guard(guard::Get())
                    .wrap(middlewares::RequireRole::new_any(Role::staff_roles()))
                    .to(list_groups),
            )
            .service(
                web::resource("")
                    .guard(guard::Post())
                    .wrap(middlewares::RequireRole::new(Role::Admin))
                    .to(create_group),
            ),
    );
}
