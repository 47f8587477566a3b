#[macro_use]
mod common;

use actix_web::{cookie::Cookie, http::StatusCode, test};
use serde_json::json;

use common::TestStore;

#[actix_web::test]
async fn test_health_is_public() {
    let store = TestStore::new();
    let app = init_app!(store.state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_register_sets_session_cookie() {
    let store = TestStore::new();
    let app = init_app!(store.state);

    let req = test::TestRequest::post()
        .uri("/api/user/register")
        .set_json(common::credentials("alice"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == "Authorization")
        .map(|c| c.into_owned())
        .expect("session cookie");
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.path(), Some("/"));

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["token"].as_str(), Some(cookie.value()));
}

#[actix_web::test]
async fn test_login_after_register() {
    let store = TestStore::new();
    let app = init_app!(store.state);
    let (id, _) = register!(app, "alice");

    let req = test::TestRequest::post()
        .uri("/api/user/login")
        .set_json(common::credentials("alice"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let (login_id, cookie) = common::session_of(resp).await;
    assert_eq!(login_id, id);

    let (status, _) = call!(app, test::TestRequest::get().uri("/api/collections"), cookie);
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn test_duplicate_login_conflicts() {
    let store = TestStore::new();
    let app = init_app!(store.state);
    register!(app, "alice");

    let req = test::TestRequest::post()
        .uri("/api/user/register")
        .set_json(common::credentials("alice"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_login_failures() {
    let store = TestStore::new();
    let app = init_app!(store.state);
    register!(app, "alice");

    let wrong_password = test::TestRequest::post()
        .uri("/api/user/login")
        .set_json(json!({ "login": "alice", "password": "not-the-password" }))
        .to_request();
    let resp = test::call_service(&app, wrong_password).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let unknown = test::TestRequest::post()
        .uri("/api/user/login")
        .set_json(common::credentials("nobody"))
        .to_request();
    let resp = test::call_service(&app, unknown).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_protected_routes_require_cookie() {
    let store = TestStore::new();
    let app = init_app!(store.state);

    let req = test::TestRequest::get().uri("/api/collections").to_request();
    let (status, body) = common::json_of(test::call_service(&app, req).await).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 401);
}

#[actix_web::test]
async fn test_tampered_cookie_is_rejected() {
    let store = TestStore::new();
    let app = init_app!(store.state);
    let (_, cookie) = register!(app, "alice");

    let mut token = cookie.value().to_string();
    let last = token.pop().map(|c| if c == 'A' { 'B' } else { 'A' });
    token.extend(last);
    let forged = Cookie::new("Authorization", token);

    let (status, _) = call!(app, test::TestRequest::get().uri("/api/collections"), forged);
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_directly_issued_token_is_accepted() {
    let store = TestStore::new();
    let app = init_app!(store.state);
    let (alice_id, _) = register!(app, "alice");

    let token = store.state.token_codec.issue(&alice_id).unwrap();
    let cookie = Cookie::new("Authorization", token);

    let collection_id = create_collection!(app, cookie, "Issued directly");
    let (status, body) = call!(
        app,
        test::TestRequest::get().uri(&format!("/api/collection/{}", collection_id)),
        cookie
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], alice_id.as_str());
}

#[actix_web::test]
async fn test_malformed_body_is_bad_request() {
    let store = TestStore::new();
    let app = init_app!(store.state);

    let req = test::TestRequest::post()
        .uri("/api/user/register")
        .set_json(json!({ "login": "alice" }))
        .to_request();
    let (status, body) = common::json_of(test::call_service(&app, req).await).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
}
