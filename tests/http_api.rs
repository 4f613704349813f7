mod common;

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use farm_timers::domain::UserId;
use farm_timers::interfaces::http_api::{ApiState, build_router};

use common::Harness;

fn router(h: &Harness, api_token: Option<&str>) -> Router {
    build_router(ApiState {
        store: h.store.clone(),
        clock: Arc::new(h.clock.clone()),
        api_token: api_token.map(str::to_string),
        event_bus: None,
    })
}

fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn activation_then_cooldown_then_cancel() {
    let h = Harness::new();
    let app = router(&h, None);

    let res = app.clone().oneshot(request("POST", "/users/1/timers/Moto")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.clone().oneshot(request("POST", "/users/1/timers/Moto")).await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = app.clone().oneshot(request("GET", "/users/1/timers")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.clone().oneshot(request("DELETE", "/users/1/timers/Moto")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.oneshot(request("DELETE", "/users/1/timers/Moto")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn percent_encoded_action_names_are_decoded() {
    let h = Harness::new();
    let app = router(&h, None);

    // "Питомец"
    let uri = "/users/9/timers/%D0%9F%D0%B8%D1%82%D0%BE%D0%BC%D0%B5%D1%86";
    let res = app.oneshot(request("POST", uri)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(h.store.get_activation(UserId(9), "Питомец").unwrap(), Some(0));
}

#[tokio::test]
async fn zero_custom_timer_is_bad_request() {
    let h = Harness::new();
    let app = router(&h, None);

    let req = Request::builder()
        .method("POST")
        .uri("/users/1/custom-timers")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"minutes":0}"#))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let req = Request::builder()
        .method("POST")
        .uri("/users/1/custom-timers")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"seconds":1}"#))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(h.store.list_active(UserId(1), 0).unwrap().len(), 1);
}

#[tokio::test]
async fn token_is_enforced_when_configured() {
    let h = Harness::new();
    let app = router(&h, Some("secret"));

    let res = app.clone().oneshot(request("GET", "/users/1/timers")).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .uri("/users/1/timers")
        .header("authorization", "Bearer secret")
        .body(Body::empty())
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.oneshot(request("GET", "/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn stream_without_bus_is_not_implemented() {
    let h = Harness::new();
    let res = router(&h, None)
        .oneshot(request("GET", "/notifications/stream"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_IMPLEMENTED);
}
