pub mod assignments;

pub mod auth;

pub mod dashboard;

pub mod groups;

pub mod reports;

pub mod students;

pub mod submissions;

pub mod system;

pub mod users;

pub use assignments::configure_assignments_routes;
pub use auth::configure_auth_routes;
pub use dashboard::configure_dashboard_routes;
pub use groups::configure_groups_routes;
pub use reports::configure_reports_routes;
pub use students::configure_students_routes;
pub use submissions::configure_submissions_routes;
pub use system::configure_system_routes;
pub use users::configure_user_routes;

/// 注册全部 API 路由
pub fn configure_api_routes(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.configure(configure_auth_routes)
        .configure(configure_user_routes)
        .configure(configure_groups_routes)
        .configure(configure_assignments_routes)
        .configure(configure_submissions_routes)
        .configure(configure_students_routes)
        .configure(configure_reports_routes)
        .configure(configure_dashboard_routes)
        .configure(configure_system_routes);
}

#[cfg(test)]
mod tests;
