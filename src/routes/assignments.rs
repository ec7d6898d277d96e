use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, guard, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::actors::entities::Role;
use crate::models::assignments::requests::{
    AssignmentListParams, CreateAssignmentRequest, UpdateAssignmentRequest,
};
use crate::models::submissions::requests::SubmitAssignmentRequest;
use crate::services::{AssignmentService, SubmissionService};

// 懒加载的全局 Service 实例
static ASSIGNMENT_SERVICE: Lazy<AssignmentService> = Lazy::new(AssignmentService::new_lazy);
static SUBMISSION_SERVICE: Lazy<SubmissionService> = Lazy::new(SubmissionService::new_lazy);

pub async fn list_assignments(
    req: HttpRequest,
    query: web::Query<AssignmentListParams>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .list_assignments(query.into_inner(), &req)
        .await
}

pub async fn get_assignment(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .get_assignment(path.into_inner(), &req)
        .await
}

pub async fn create_assignment(
    req: HttpRequest,
    assignment_data: web::Json<CreateAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .create_assignment(assignment_data.into_inner(), &req)
        .await
}

pub async fn update_assignment(
    req: HttpRequest,
    path: web::Path<i64>,
    update_data: web::Json<UpdateAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .update_assignment(path.into_inner(), update_data.into_inner(), &req)
        .await
}

pub async fn delete_assignment(
    req: HttpRequest,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .delete_assignment(path.into_inner(), &req)
        .await
}

// 学生提交作业
pub async fn submit_assignment(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<SubmitAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .submit(path.into_inner(), body.into_inner(), &req)
        .await
}

// 配置路由
pub fn configure_assignments_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/assignments")
            .wrap(middlewares::RequireJWT)
            // 查看：任意已登录用户
            .service(
                web::resource("")
                    .guard(guard::Get())
                    .wrap(middlewares::RequireRole::new_any(Role::any_authenticated()))
                    .to(list_assignments),
            )
            .service(
                web::resource("/{id}")
                    .guard(guard::Get())
                    .wrap(middlewares::RequireRole::new_any(Role::any_authenticated()))
                    .to(get_assignment),
            )
            // 提交：仅学生
            .service(
                web::resource("/{id}/submissions")
                    .wrap(middlewares::RequireRole::new_any(Role::student_roles()))
                    .route(web::post().to(submit_assignment)),
            )
            // 管理：教师、管理员
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(Role::staff_roles()))
                    .route("", web::post().to(create_assignment))
                    .route("/{id}", web::put().to(update_assignment))
                    .route("/{id}", web::delete().to(delete_assignment)),
            ),
    );
}
