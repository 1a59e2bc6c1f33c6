mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn get_user_returns_demo_record() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/user/alice", server.base_url))
        .basic_auth("user", Some("userpw"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(
        body,
        json!({
            "username": "alice",
            "mail": "alice@test.com",
            "password": "****",
            "lastName": "Test",
            "name": "user",
            "address": "My Adress"
        })
    );

    Ok(())
}

#[tokio::test]
async fn create_user_returns_created_without_body() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/user", server.base_url))
        .basic_auth("admin", Some("adminpw"))
        .json(&json!({
            "username": "carol",
            "mail": "carol@example.com",
            "password": "secret",
            "lastName": "Smith",
            "name": "Carol",
            "address": "Main Street 1"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert!(res.bytes().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn create_user_rejects_bad_payloads() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/user", server.base_url))
        .basic_auth("admin", Some("adminpw"))
        .header("Content-Type", "application/json")
        .body("{\"username\": ")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "INVALID_JSON");

    let res = client
        .post(format!("{}/user", server.base_url))
        .basic_auth("admin", Some("adminpw"))
        .header("Content-Type", "text/plain")
        .body("username=carol")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    Ok(())
}
