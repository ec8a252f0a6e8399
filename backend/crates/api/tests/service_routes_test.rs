mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;

async fn call(app: axum::Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
    let res = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = res.status();
    (status, common::body_json(res).await)
}

#[tokio::test]
async fn health_reports_cache_state() {
    let upstream = common::spawn_upstream().await;
    let state = common::state_for(&upstream);

    let (status, json) = call(api::app(state.clone()), "GET", "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["nav_cache_entries"], 0);
    assert_eq!(json["nav_cache_ttl_secs"], 3600);

    call(api::app(state.clone()), "GET", "/api/funds/161226/nav").await;
    let (_, json) = call(api::app(state), "GET", "/api/health").await;
    assert_eq!(json["nav_cache_entries"], 1);
}

#[tokio::test]
async fn cache_routes_clear_entries() {
    let upstream = common::spawn_upstream().await;
    let state = common::state_for(&upstream);

    for uri in [
        "/api/funds/161226/nav?source=jsonp",
        "/api/funds/161226/nav?source=history",
        "/api/funds/501018/nav",
    ] {
        let (status, _) = call(api::app(state.clone()), "GET", uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
    }

    let (status, json) = call(api::app(state.clone()), "DELETE", "/api/cache/nav/sz161226").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], 2);

    let (status, json) = call(api::app(state.clone()), "DELETE", "/api/cache/nav").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], 1);
    assert!(state.nav_cache().is_empty());

    let (status, _) = call(api::app(state), "DELETE", "/api/cache/nav/xyz").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sources_are_listed() {
    let upstream = common::spawn_upstream().await;
    let (status, json) = call(api::app(common::state_for(&upstream)), "GET", "/api/sources").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["manual", "history", "jsonp", "sina"]);
}

#[tokio::test]
async fn source_health_probes_each_upstream() {
    let upstream = common::spawn_upstream().await;
    let (status, json) = call(
        api::app(common::state_for(&upstream)),
        "GET",
        "/api/sources/health",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let items = json.as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|v| v["ok"] == true), "{json}");
}

#[tokio::test]
async fn source_health_can_be_disabled() {
    let upstream = common::spawn_upstream().await;
    let state = common::state_for(&upstream);
    state.config().set_bool("sources_health_probe", false);

    let (_, json) = call(api::app(state), "GET", "/api/sources/health").await;
    assert!(json.as_array().unwrap().iter().all(|v| v["ok"] == false));
    assert_eq!(upstream.hits("/list=sz161226"), 0);
}
