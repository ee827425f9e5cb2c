mod support;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;

use support::{build_app, TestApp, VERIFIER_KEY};

/// A 教吉他想学法语，B 教法语想学吉他，双方技能都已验证。
async fn exchange_pair(app: &TestApp) -> (String, String) {
    let alice = app.sign_up("alice", "Alice").await;
    let bruno = app.sign_up("bruno", "Bruno").await;

    app.declare(&alice, "teaches", "Guitar").await;
    app.declare(&alice, "learns", "French").await;
    app.declare(&bruno, "teaches", "French").await;
    app.declare(&bruno, "learns", "Guitar").await;
    app.verify("alice", "Guitar").await;
    app.verify("bruno", "French").await;

    (alice, bruno)
}

#[tokio::test]
async fn test_health_needs_no_auth() {
    let app = build_app();
    let (status, body) = app.request("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_missing_or_bad_token_is_rejected() {
    let app = build_app();

    let (status, body) = app.request("GET", "/api/chat/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = app
        .request("POST", "/api/matches", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_ineligible_user_gets_reason_and_empty_matches() {
    let app = build_app();
    let token = app.sign_up("carol", "Carol").await;

    let (status, body) = app.request("POST", "/api/matches", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matches"], json!([]));
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("verified"));
    assert!(message.contains("want to learn"));
}

#[tokio::test]
async fn test_mutual_exchange_is_found() {
    let app = build_app();
    let (alice, _) = exchange_pair(&app).await;

    let (status, body) = app.request("POST", "/api/matches", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Found 1 match.");

    let matches = body["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["id"], "bruno");
    assert_eq!(matches[0]["name"], "Bruno");
    assert_eq!(matches[0]["skills"][0]["skill_name"], "French");
    assert_eq!(matches[0]["skills"][0]["verified"], true);
    assert_eq!(matches[0]["interests"], json!(["Guitar"]));
}

#[tokio::test]
async fn test_match_and_chat_flow() {
    let app = build_app();
    let (alice, bruno) = exchange_pair(&app).await;
    let carol = app.sign_up("carol", "Carol").await;

    let (status, users) = app.request("GET", "/api/chat/users", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = users
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Bruno", "Carol"]);

    let (status, created) = app
        .request(
            "POST",
            "/api/chat/matches",
            Some(&alice),
            Some(json!({ "otherUserId": "bruno" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let match_id = created["id"].as_str().unwrap().to_string();

    // 反向重复创建
    let (status, body) = app
        .request(
            "POST",
            "/api/chat/matches",
            Some(&bruno),
            Some(json!({ "otherUserId": "alice" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let messages_uri = format!("/api/chat/matches/{match_id}/messages");
    for (token, text) in [(&bruno, "Salut!"), (&bruno, "Tu veux commencer?")] {
        let (status, sent) = app
            .request("POST", &messages_uri, Some(token), Some(json!({ "content": text })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(sent["sender_name"], "Bruno");
    }

    let (status, conversations) = app
        .request("GET", "/api/chat/conversations", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(conversations[0]["unread_count"], 2);
    assert_eq!(conversations[0]["other_user"]["name"], "Bruno");
    assert_eq!(conversations[0]["last_message"], "Tu veux commencer?");

    let (status, _) = app
        .request("POST", &messages_uri, Some(&alice), Some(json!({ "content": "Oui!" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, conversations) = app
        .request("GET", "/api/chat/conversations", Some(&alice), None)
        .await;
    assert_eq!(conversations[0]["unread_count"], 0);

    let (status, history) = app.request("GET", &messages_uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let contents: Vec<&str> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["Salut!", "Tu veux commencer?", "Oui!"]);

    // 非参与者既不能读也不能写
    let (status, body) = app.request("GET", &messages_uri, Some(&carol), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.get("messages").is_none());
    let (status, _) = app
        .request("POST", &messages_uri, Some(&carol), Some(json!({ "content": "hi" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, matches) = app.request("GET", "/api/chat/matches", Some(&bruno), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(matches[0]["other_user"]["id"], "alice");
}

#[tokio::test]
async fn test_validation_and_not_found_errors() {
    let app = build_app();
    let (alice, _) = exchange_pair(&app).await;

    let (status, _) = app
        .request(
            "POST",
            "/api/chat/matches",
            Some(&alice),
            Some(json!({ "otherUserId": "alice" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .request(
            "POST",
            "/api/chat/matches",
            Some(&alice),
            Some(json!({ "otherUserId": "nobody" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("nobody"));

    let (status, created) = app
        .request(
            "POST",
            "/api/chat/matches",
            Some(&alice),
            Some(json!({ "otherUserId": "bruno" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/chat/matches/{}/messages", created["id"].as_str().unwrap());

    let (status, _) = app
        .request("POST", &uri, Some(&alice), Some(json!({ "content": "   " })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .request("GET", "/api/chat/matches/not-a-uuid/messages", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = app
        .request("POST", "/api/chat/matches", Some(&alice), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_profile_and_skill_routes() {
    let app = build_app();
    let token = app.sign_up("dana", "Dana").await;

    let (status, user) = app
        .request(
            "PUT",
            "/api/users/me",
            Some(&token),
            Some(json!({ "bio": "Pianist", "city": "Oslo" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["bio"], "Pianist");

    app.declare(&token, "teaches", "Piano").await;
    app.declare(&token, "learns", "Spanish").await;

    let (status, profile) = app.request("GET", "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["user"]["name"], "Dana");
    assert_eq!(profile["teaches"][0]["skill_name"], "Piano");
    assert_eq!(profile["teaches"][0]["verified"], false);
    assert_eq!(profile["learns"], json!(["Spanish"]));

    let (status, skills) = app.request("GET", "/api/skills", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(skills.as_array().unwrap().len(), 2);

    let (status, _) = app
        .request("DELETE", "/api/users/me/learns/Spanish", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app
        .request("DELETE", "/api/users/me/learns/Spanish", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_verification_callback_requires_shared_key() {
    let app = build_app();
    let token = app.sign_up("erin", "Erin").await;
    app.declare(&token, "teaches", "Chess").await;

    let payload = json!({
        "userId": "erin",
        "skillName": "Chess",
        "verified": true,
        "score": 77.5
    });
    let request = Request::builder()
        .method("PUT")
        .uri("/internal/verifications")
        .header("content-type", "application/json")
        .header("x-verifier-key", "wrong-key")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .method("PUT")
        .uri("/internal/verifications")
        .header("content-type", "application/json")
        .header("x-verifier-key", VERIFIER_KEY)
        .body(Body::from(payload.to_string()))
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verified"], true);
    assert_eq!(body["score"], 77.5);

    // 未声明教授该技能
    let request = Request::builder()
        .method("PUT")
        .uri("/internal/verifications")
        .header("content-type", "application/json")
        .header("x-verifier-key", VERIFIER_KEY)
        .body(Body::from(
            json!({ "userId": "erin", "skillName": "Go", "verified": true, "score": 50 })
                .to_string(),
        ))
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
