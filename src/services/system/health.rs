use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use super::SystemService;
use crate::i18n::{self, Locale};
use crate::models::{ApiResponse, AppStartTime, system::responses::HealthResponse};

pub async fn get_health(
    service: &SystemService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let locale = Locale::from_request(request);
    let config = service.get_config();
    let now = chrono::Utc::now();

    // 未注册启动时间时按当前时间计算
    let started_at = request
        .app_data::<web::Data<AppStartTime>>()
        .map(|data| data.start_datetime)
        .unwrap_or(now);

    let response = HealthResponse {
        system_name: config.app.system_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: config.app.environment.clone(),
        session_store: config.session.store.clone(),
        uptime_seconds: now.signed_duration_since(started_at).num_seconds(),
        started_at,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        response,
        i18n::t(locale, "system.health_ok"),
    )))
}
