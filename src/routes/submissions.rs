use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::actors::entities::Role;
use crate::models::submissions::requests::GradeSubmissionRequest;
use crate::services::SubmissionService;

// 懒加载的全局 SubmissionService 实例
static SUBMISSION_SERVICE: Lazy<SubmissionService> = Lazy::new(SubmissionService::new_lazy);

// 获取提交详情（本人或教师/管理员）
pub async fn get_submission(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .get_submission(path.into_inner(), &req)
        .await
}

// 评分
pub async fn grade_submission(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<GradeSubmissionRequest>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .grade(path.into_inner(), body.into_inner(), &req)
        .await
}

// 配置路由
pub fn configure_submissions_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/submissions")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/{id}/grade")
                    .wrap(middlewares::RequireRole::new_any(Role::staff_roles()))
                    .route(web::put().to(grade_submission)),
            )
            .service(
                web::resource("/{id}")
                    .wrap(middlewares::RequireRole::new_any(Role::any_authenticated()))
                    .route(web::get().to(get_submission)),
            ),
    );
}
