use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, FceDoc, DEFAULT_TOKEN, MAX_LIMIT};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn post_token(uri: &str, token: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(format!(r#"{{"token":"{token}"}}"#))
        .unwrap()
}

fn ids(docs: &Value) -> Vec<&str> {
    docs.as_array()
        .unwrap()
        .iter()
        .map(|d| d["courseID"].as_str().unwrap())
        .collect()
}

// --- search ---

#[tokio::test]
async fn search_first_page() {
    let resp = app()
        .oneshot(get("/api/courses/search/?page=1&schedulesAvailable=true"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let page: Value = body_json(resp).await;
    assert_eq!(page["page"], 1);
    assert_eq!(page["totalDocs"], 14);
    assert_eq!(page["totalPages"], 2);
    assert_eq!(page["docs"].as_array().unwrap().len(), MAX_LIMIT);
}

#[tokio::test]
async fn search_page_past_the_end_is_empty() {
    let resp = app()
        .oneshot(get("/api/courses/search/?page=18446744073709551615"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let page: Value = body_json(resp).await;
    assert_eq!(page["totalDocs"], 15);
    assert!(page["docs"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn search_with_filters_over_post() {
    let resp = app()
        .oneshot(post_token(
            "/api/courses/search/?page=1&schedulesAvailable=true&keywords=systems&department=Computer+Science",
            DEFAULT_TOKEN,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let page: Value = body_json(resp).await;
    assert_eq!(ids(&page["docs"]), vec!["15-213", "15-445"]);
}

#[tokio::test]
async fn search_post_without_body_is_rejected() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/courses/search/?page=1")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

// --- exact lookup ---

#[tokio::test]
async fn exact_lookup_anonymous() {
    let resp = app()
        .oneshot(get("/api/courses?courseID=21-127&courseID=15-122&schedulesAvailable=true"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let docs: Value = body_json(resp).await;
    assert_eq!(ids(&docs), vec!["15-122", "21-127"]);
    assert!(docs[0].get("fces").is_none());
}

#[tokio::test]
async fn exact_lookup_authenticated_includes_fces() {
    let resp = app()
        .oneshot(post_token(
            "/api/courses?courseID=15-213&schedulesAvailable=true&fces=true",
            DEFAULT_TOKEN,
        ))
        .await
        .unwrap();

    let docs: Value = body_json(resp).await;
    assert_eq!(docs[0]["fces"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn exact_lookup_wrong_token_hides_fces() {
    let resp = app()
        .oneshot(post_token("/api/courses?courseID=15-213&fces=true", "guess"))
        .await
        .unwrap();

    let docs: Value = body_json(resp).await;
    assert!(docs[0].get("fces").is_none());
}

// --- single course ---

#[tokio::test]
async fn single_course_with_and_without_schedules() {
    let resp = app()
        .oneshot(get("/api/course/15-122?schedules=true"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let doc: Value = body_json(resp).await;
    assert!(doc["schedules"].is_array());

    let resp = app()
        .oneshot(get("/api/course/15-122?schedules=false"))
        .await
        .unwrap();
    let doc: Value = body_json(resp).await;
    assert_eq!(doc["courseID"], "15-122");
    assert!(doc.get("schedules").is_none());
}

#[tokio::test]
async fn single_course_not_found() {
    let resp = app()
        .oneshot(get("/api/course/99-999?schedules=true"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_bytes(resp).await.is_empty());
}

// --- fces ---

#[tokio::test]
async fn fces_require_valid_token() {
    let resp = app()
        .oneshot(post_token("/api/fces?courseID=15-122", "nope"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn fces_filtered_by_course_id() {
    let resp = app()
        .oneshot(post_token("/api/fces?courseID=15-122&courseID=21-127", DEFAULT_TOKEN))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let fces: Vec<FceDoc> = body_json(resp).await;
    assert_eq!(fces.len(), 4);
    assert!(fces.iter().all(|f| f.course_id == "15-122" || f.course_id == "21-127"));
}

#[tokio::test]
async fn fces_reject_get() {
    let resp = app().oneshot(get("/api/fces?courseID=15-122")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}
