use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, http::StatusCode, test, web};
use futures_util::future::join;
use serde_json::{Value, json};

use super::configure_api_routes;
use crate::cache::ObjectCache;
use crate::cache::object_cache::MokaCacheWrapper;
use crate::models::AppStartTime;
use crate::models::submissions::requests::SubmissionQuery;
use crate::runtime::cancel::CancellationToken;
use crate::runtime::pending::PendingOperations;
use crate::session::SessionService;
use crate::storage::Storage;
use crate::storage::memory_storage::MemoryStorage;

const TEACHER: &str = "teacher1@gmail.edu";
const STUDENT: &str = "baitur.ibrakhimov@gmail.edu";
const ADMIN: &str = "admin.university@gmail.edu";

struct TestState {
    storage: Arc<dyn Storage>,
    session: Arc<SessionService>,
    pending: PendingOperations,
}

async fn state() -> TestState {
    state_with_latency(Duration::ZERO).await
}

async fn state_with_latency(latency: Duration) -> TestState {
    let storage = MemoryStorage::new();
    storage.seed_demo_data(chrono::Utc::now()).await.unwrap();
    let storage: Arc<dyn Storage> = Arc::new(storage);
    let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_settings(256, 0));
    let session = Arc::new(SessionService::new(cache, storage.clone(), "password", 0).unwrap());
    TestState {
        storage,
        session,
        pending: PendingOperations::new(latency, CancellationToken::new()),
    }
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.storage.clone()))
                .app_data(web::Data::new($state.session.clone()))
                .app_data(web::Data::new($state.pending.clone()))
                .app_data(web::Data::new(AppStartTime {
                    start_datetime: chrono::Utc::now(),
                }))
                .configure(configure_api_routes),
        )
        .await
    };
}

// 每个测试使用不同的客户端地址，互不占用登录限流额度
macro_rules! login {
    ($app:expr, $email:expr, $peer:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .peer_addr($peer.parse().unwrap())
            .set_json(json!({ "email": $email, "password": "password" }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        body["data"]["access_token"].as_str().unwrap().to_string()
    }};
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

#[actix_web::test]
async fn test_login_me_logout_flow() {
    let state = state().await;
    let app = init_app!(state);
    let token = login!(app, TEACHER, "10.1.0.1:4000");

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["actor"]["email"], TEACHER);
    assert_eq!(body["data"]["actor"]["role"], "teacher");

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/logout")
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    // 令牌仍未过期，但会话已删除
    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_web::test]
async fn test_login_rejects_wrong_password_and_unknown_email() {
    let state = state().await;
    let app = init_app!(state);

    for (email, password) in [(TEACHER, "wrong"), ("nobody@gmail.edu", "password")] {
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .peer_addr("10.1.0.2:4000".parse().unwrap())
            .set_json(json!({ "email": email, "password": password }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 2001);
    }
}

#[actix_web::test]
async fn test_protected_route_requires_token() {
    let state = state().await;
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/api/v1/dashboard").to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::get()
        .uri("/api/v1/dashboard")
        .insert_header(bearer("not-a-jwt"))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_web::test]
async fn test_student_cannot_grade_or_manage() {
    let state = state().await;
    let app = init_app!(state);
    let token = login!(app, STUDENT, "10.1.0.3:4000");

    let req = test::TestRequest::put()
        .uri("/api/v1/submissions/3/grade")
        .insert_header(bearer(&token))
        .set_json(json!({ "grade": 100 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 2003);

    for uri in ["/api/v1/users", "/api/v1/reports", "/api/v1/students"] {
        let req = test::TestRequest::get()
            .uri(uri)
            .insert_header(bearer(&token))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::FORBIDDEN,
            "{uri}"
        );
    }

    // 成绩未被修改
    let submission = state.storage.get_submission_by_id(3).await.unwrap().unwrap();
    assert!(submission.grade.is_none());
}

#[actix_web::test]
async fn test_teacher_grades_within_bounds() {
    let state = state().await;
    let app = init_app!(state);
    let token = login!(app, TEACHER, "10.1.0.4:4000");

    let req = test::TestRequest::put()
        .uri("/api/v1/submissions/3/grade")
        .insert_header(bearer(&token))
        .set_json(json!({ "grade": 120 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 4200);

    let req = test::TestRequest::put()
        .uri("/api/v1/submissions/3/grade")
        .insert_header(bearer(&token))
        .set_json(json!({ "grade": 95, "comment": "Clean joins" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["submission"]["status"], "graded");
    assert_eq!(body["data"]["submission"]["grade"], 95);
    assert_eq!(body["data"]["letter_grade"], "A");

    let req = test::TestRequest::put()
        .uri("/api/v1/submissions/999/grade")
        .insert_header(bearer(&token))
        .set_json(json!({ "grade": 50 }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn test_student_submission_rules() {
    let state = state().await;
    let app = init_app!(state);
    let token = login!(app, STUDENT, "10.1.0.5:4000");

    // 已截止
    let req = test::TestRequest::post()
        .uri("/api/v1/assignments/5/submissions")
        .insert_header(bearer(&token))
        .set_json(json!({ "file_reference": "tx.sql" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 4100);

    // 已提交过
    let req = test::TestRequest::post()
        .uri("/api/v1/assignments/2/submissions")
        .insert_header(bearer(&token))
        .set_json(json!({ "file_reference": "select.sql" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CONFLICT
    );

    let req = test::TestRequest::post()
        .uri("/api/v1/assignments/3/submissions")
        .insert_header(bearer(&token))
        .set_json(json!({ "file_reference": "indexes.sql" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["submission"]["status"], "submitted");

    // 学生看不到别人的提交
    let req = test::TestRequest::get()
        .uri("/api/v1/submissions/2")
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    let req = test::TestRequest::get()
        .uri("/api/v1/assignments?status=submitted")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|item| item["progress"] == "submitted"));
}

#[actix_web::test]
async fn test_submit_then_grade_flow() {
    let state = state().await;
    let app = init_app!(state);
    let student = login!(app, STUDENT, "10.1.0.7:4000");
    let teacher = login!(app, TEACHER, "10.1.0.7:4001");

    let req = test::TestRequest::post()
        .uri("/api/v1/assignments/3/submissions")
        .insert_header(bearer(&student))
        .set_json(json!({ "file_reference": "indexes.sql" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["submission"]["status"], "submitted");
    assert!(body["data"]["submission"]["grade"].is_null());
    assert!(body["data"]["letter_grade"].is_null());
    let id = body["data"]["submission"]["id"].as_i64().unwrap();

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/submissions/{id}/grade"))
        .insert_header(bearer(&teacher))
        .set_json(json!({ "grade": 85 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["submission"]["status"], "graded");
    assert_eq!(body["data"]["submission"]["grade"], 85);
    assert_eq!(body["data"]["letter_grade"], "B");

    // 学生查看自己的提交时看到同样的结果
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/submissions/{id}"))
        .insert_header(bearer(&student))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["submission"]["grade"], 85);
}

#[actix_web::test]
async fn test_grade_and_max_grade_change_race() {
    let state = state_with_latency(Duration::from_millis(100)).await;
    let app = init_app!(state);
    let teacher = login!(app, TEACHER, "10.1.0.8:4000");

    let grade = test::TestRequest::put()
        .uri("/api/v1/submissions/3/grade")
        .insert_header(bearer(&teacher))
        .set_json(json!({ "grade": 80 }))
        .to_request();
    let update = test::TestRequest::put()
        .uri("/api/v1/assignments/2")
        .insert_header(bearer(&teacher))
        .set_json(json!({
            "title": "SELECT Queries and JOINs",
            "description": "Write SELECT queries",
            "max_grade": 50
        }))
        .to_request();

    let (graded, updated) = join(
        test::call_service(&app, grade),
        test::call_service(&app, update),
    )
    .await;

    // 两者只能有一个成功，成绩始终不超过满分
    assert_ne!(
        graded.status() == StatusCode::OK,
        updated.status() == StatusCode::OK
    );
    let assignment = state.storage.get_assignment_by_id(2).await.unwrap().unwrap();
    let submission = state.storage.get_submission_by_id(3).await.unwrap().unwrap();
    if let Some(grade) = submission.grade {
        assert!(i64::from(grade) <= i64::from(assignment.max_grade));
        assert_eq!(assignment.max_grade, 100);
    } else {
        assert_eq!(assignment.max_grade, 50);
    }
}

#[actix_web::test]
async fn test_submit_and_delete_assignment_race() {
    let state = state_with_latency(Duration::from_millis(100)).await;
    let app = init_app!(state);
    let teacher = login!(app, TEACHER, "10.1.0.9:4000");
    let student = login!(app, STUDENT, "10.1.0.9:4001");

    let delete = test::TestRequest::delete()
        .uri("/api/v1/assignments/3")
        .insert_header(bearer(&teacher))
        .to_request();
    let submit = test::TestRequest::post()
        .uri("/api/v1/assignments/3/submissions")
        .insert_header(bearer(&student))
        .set_json(json!({ "file_reference": "indexes.sql" }))
        .to_request();

    let (deleted, submitted) = join(
        test::call_service(&app, delete),
        test::call_service(&app, submit),
    )
    .await;

    assert_eq!(deleted.status(), StatusCode::OK);
    assert!(matches!(
        submitted.status(),
        StatusCode::CREATED | StatusCode::NOT_FOUND
    ));

    // 不留下指向已删除作业的提交
    assert!(state.storage.get_assignment_by_id(3).await.unwrap().is_none());
    let orphans = state
        .storage
        .list_submissions(SubmissionQuery {
            assignment_id: Some(3),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(orphans.is_empty());
}

#[actix_web::test]
async fn test_deleted_user_loses_access() {
    let state = state().await;
    let app = init_app!(state);
    let admin = login!(app, ADMIN, "10.1.0.10:4000");
    let student = login!(app, STUDENT, "10.1.0.10:4001");

    let req = test::TestRequest::delete()
        .uri("/api/v1/users/3")
        .insert_header(bearer(&admin))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/v1/assignments/3/submissions")
        .insert_header(bearer(&student))
        .set_json(json!({ "file_reference": "indexes.sql" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
    let submissions = state
        .storage
        .list_submissions(SubmissionQuery {
            assignment_id: Some(3),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(submissions.is_empty());
}

#[actix_web::test]
async fn test_localized_error_message() {
    let state = state().await;
    let app = init_app!(state);
    let token = login!(app, TEACHER, "10.1.0.6:4000");

    let req = test::TestRequest::get()
        .uri("/api/v1/assignments/42")
        .insert_header(bearer(&token))
        .insert_header(("Accept-Language", "ru-RU,ru;q=0.9"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 3002);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("42"));
    assert_ne!(message, "Assignment 42 not found");
}

#[actix_web::test]
async fn test_health_is_public() {
    let state = state().await;
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/api/v1/system/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
}
