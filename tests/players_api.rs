//! End-to-end tests over the application router with an in-memory record
//! store: auth gate, response envelopes, and the full player lifecycle.

use std::sync::Arc;

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use courtside_api::auth::{generate_jwt, Claims};
use courtside_api::handlers::app;
use courtside_api::store::MemoryStore;

fn test_app() -> Router {
    app(Arc::new(MemoryStore::new()))
}

fn bearer_token() -> String {
    let claims = Claims::new(Uuid::new_v4(), "coach@example.com".to_string());
    format!("Bearer {}", generate_jwt(claims).expect("token"))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, value))
}

#[tokio::test]
async fn player_routes_require_a_bearer_token() -> Result<()> {
    let app = test_app();

    let (status, body) = send(&app, Method::GET, "/players", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["code"], json!("UNAUTHORIZED"));

    let (status, body) =
        send(&app, Method::GET, "/players", Some("Bearer not-a-real-token"), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], json!("UNAUTHORIZED"));

    // The banner and health probe stay public.
    let (status, _) = send(&app, Method::GET, "/", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn create_get_update_delete_lifecycle() -> Result<()> {
    let app = test_app();
    let token = bearer_token();

    let (status, body) = send(
        &app,
        Method::POST,
        "/players",
        Some(&token),
        Some(json!({
            "name": "Dana Vega",
            "position": "PG",
            "performances": [{ "date": "2025-01-01", "points": 20 }]
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
    let id = body["data"]["id"].as_str().expect("created id").to_string();
    assert_eq!(body["data"]["performances"][0]["points"], json!(20));

    // Same-date append merges field-level.
    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/players/{}", id),
        Some(&token),
        Some(json!({ "append_performances": [{ "date": "2025-01-01", "assists": 7 }] })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let series = body["data"]["performances"].as_array().expect("series");
    assert_eq!(series.len(), 1);
    assert_eq!(series[0]["points"], json!(20));
    assert_eq!(series[0]["assists"], json!(7));

    let (status, body) =
        send(&app, Method::GET, &format!("/players/{}", id), Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], json!("Dana Vega"));

    let (status, body) = send(&app, Method::GET, "/players", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().expect("list").len(), 1);

    let (status, body) =
        send(&app, Method::DELETE, &format!("/players/{}", id), Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    let (status, body) =
        send(&app, Method::GET, &format!("/players/{}", id), Some(&token), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], json!("NOT_FOUND"));

    // Delete of an absent player still reports success.
    let (status, body) =
        send(&app, Method::DELETE, &format!("/players/{}", id), Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    Ok(())
}

#[tokio::test]
async fn windowed_get_filters_old_entries() -> Result<()> {
    let app = test_app();
    let token = bearer_token();

    let today = chrono::Utc::now().date_naive();
    let recent = today - chrono::Duration::days(5);
    let old = today - chrono::Duration::days(90);

    let (_, body) = send(
        &app,
        Method::POST,
        "/players",
        Some(&token),
        Some(json!({
            "name": "Dana Vega",
            "performances": [
                { "date": old.to_string(), "points": 4 },
                { "date": recent.to_string(), "points": 11 }
            ]
        })),
    )
    .await?;
    let id = body["data"]["id"].as_str().expect("created id").to_string();

    let (status, body) =
        send(&app, Method::GET, &format!("/players/{}?days=30", id), Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    let series = body["data"]["performances"].as_array().expect("series");
    assert_eq!(series.len(), 1);
    assert_eq!(series[0]["date"], json!(recent.to_string()));

    // Without ?days the stored series comes back whole.
    let (_, body) =
        send(&app, Method::GET, &format!("/players/{}", id), Some(&token), None).await?;
    assert_eq!(body["data"]["performances"].as_array().expect("series").len(), 2);

    Ok(())
}

#[tokio::test]
async fn malformed_request_input_gets_the_error_envelope() -> Result<()> {
    let app = test_app();
    let token = bearer_token();

    // Negative counting stat fails body deserialization.
    let (status, body) = send(
        &app,
        Method::POST,
        "/players",
        Some(&token),
        Some(json!({
            "name": "Dana Vega",
            "performances": [{ "date": "2025-01-01", "points": -5 }]
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
    assert!(body["error"]["message"].as_str().expect("message").contains("points"));

    // Syntactically broken JSON body.
    let request = Request::builder()
        .method(Method::POST)
        .uri("/players")
        .header(header::AUTHORIZATION, token.as_str())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))?;
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let body: Value = serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await?)?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));

    // Non-numeric window parameter.
    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/players/{}?days=soon", Uuid::new_v4()),
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));

    Ok(())
}

#[tokio::test]
async fn invalid_payloads_fail_before_any_write() -> Result<()> {
    let app = test_app();
    let token = bearer_token();

    let (status, body) = send(
        &app,
        Method::POST,
        "/players",
        Some(&token),
        Some(json!({
            "name": "",
            "performances": [{ "date": "2025-01-01", "free_throw_pct": 250.0 }]
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
    assert!(body["error"]["details"].get("name").is_some());
    assert!(body["error"]["details"].get("performances[0].free_throw_pct").is_some());

    // Nothing was persisted by the rejected create.
    let (_, body) = send(&app, Method::GET, "/players", Some(&token), None).await?;
    assert_eq!(body["data"].as_array().expect("list").len(), 0);

    // Update must change something.
    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/players/{}", Uuid::new_v4()),
        Some(&token),
        Some(json!({})),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));

    // Replace and append in one request is ambiguous.
    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/players/{}", Uuid::new_v4()),
        Some(&token),
        Some(json!({
            "performances": [{ "date": "2025-01-01" }],
            "append_performances": [{ "date": "2025-01-02" }]
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));

    Ok(())
}
