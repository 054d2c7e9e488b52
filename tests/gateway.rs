//! End-to-end dispatch tests: client → gateway → mock function → client.

use base64::Engine;
use reqwest::StatusCode;
use serde_json::{json, Value};

mod common;

fn ok_reply(_: &Value) -> Value {
    json!({
        "statusCode": 200,
        "headers": {"Content-Type": "application/json", "X-Handler": "mock"},
        "body": "{\"ok\":true}"
    })
}

#[tokio::test]
async fn test_preflight_short_circuits() {
    let (backend, captured) = common::start_function(ok_reply).await;
    let (gateway, shutdown) = common::start_gateway(backend, |_| {}).await;

    let res = common::client()
        .request(reqwest::Method::OPTIONS, format!("http://{gateway}/users/42"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    assert_eq!(
        res.headers()["access-control-allow-methods"],
        "DELETE,GET,HEAD,OPTIONS,PATCH,POST,PUT"
    );
    assert_eq!(
        res.headers()["access-control-allow-headers"],
        "Content-Type,Authorization,X-Amz-Date,X-Api-Key,X-Amz-Security-Token"
    );
    assert!(res.text().await.unwrap().is_empty());
    assert!(captured.lock().unwrap().is_empty());

    shutdown.trigger();
}

#[tokio::test]
async fn test_envelope_carries_route_identity_and_query() {
    let (backend, captured) = common::start_function(ok_reply).await;
    let (gateway, shutdown) = common::start_gateway(backend, |_| {}).await;

    let res = common::client()
        .get(format!("http://{gateway}/users/42/orders/7?expand=items&tag=a&tag=b"))
        .header("Authorization", "Bearer admin123")
        .header("x-api-key", "k")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-handler"], "mock");
    assert_eq!(res.headers()["content-type"], "application/json");
    assert_eq!(res.text().await.unwrap(), r#"{"ok":true}"#);

    let envelopes = captured.lock().unwrap();
    assert_eq!(envelopes.len(), 1);
    let event = &envelopes[0];

    assert_eq!(event["resource"], "/users/{userId}/orders/{orderId}");
    assert_eq!(event["path"], "/users/42/orders/7");
    assert_eq!(event["httpMethod"], "GET");
    assert_eq!(event["pathParameters"], json!({"userId": "42", "orderId": "7"}));
    assert_eq!(event["queryStringParameters"], json!({"expand": "items", "tag": "b"}));
    assert_eq!(
        event["multiValueQueryStringParameters"],
        json!({"expand": ["items"], "tag": ["a", "b"]})
    );
    assert_eq!(event["headers"]["X-Api-Key"], "k");
    assert_eq!(event["body"], Value::Null);
    assert_eq!(event["isBase64Encoded"], json!(false));
    assert_eq!(
        event["requestContext"]["authorizer"]["claims"],
        json!({
            "sub": "11111111-1111-1111-1111-111111111111",
            "email": "admin@example.com"
        })
    );
    assert_eq!(
        event["requestContext"]["resourcePath"],
        "/users/{userId}/orders/{orderId}"
    );

    drop(envelopes);
    shutdown.trigger();
}

#[tokio::test]
async fn test_literal_template_beats_wildcard() {
    let (backend, captured) = common::start_function(ok_reply).await;
    let (gateway, shutdown) = common::start_gateway(backend, |_| {}).await;

    let client = common::client();
    client
        .get(format!("http://{gateway}/users/me"))
        .send()
        .await
        .unwrap();
    client
        .get(format!("http://{gateway}/users/abc"))
        .send()
        .await
        .unwrap();

    let envelopes = captured.lock().unwrap();
    assert_eq!(envelopes[0]["resource"], "/users/me");
    assert_eq!(envelopes[0]["pathParameters"], Value::Null);
    assert_eq!(envelopes[1]["resource"], "/users/{userId}");
    assert_eq!(envelopes[1]["pathParameters"], json!({"userId": "abc"}));

    drop(envelopes);
    shutdown.trigger();
}

#[tokio::test]
async fn test_unknown_route_is_still_forwarded() {
    let (backend, captured) = common::start_function(ok_reply).await;
    let (gateway, shutdown) = common::start_gateway(backend, |_| {}).await;

    let res = common::client()
        .delete(format!("http://{gateway}/nowhere/at/all"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let envelopes = captured.lock().unwrap();
    assert_eq!(envelopes[0]["resource"], "/nowhere/at/all");
    assert_eq!(envelopes[0]["httpMethod"], "DELETE");
    assert_eq!(envelopes[0]["pathParameters"], Value::Null);

    drop(envelopes);
    shutdown.trigger();
}

#[tokio::test]
async fn test_body_and_claim_headers_pass_through() {
    let (backend, captured) = common::start_function(|event| {
        json!({"statusCode": 201, "body": event["body"].clone()})
    })
    .await;
    let (gateway, shutdown) = common::start_gateway(backend, |_| {}).await;

    let res = common::client()
        .post(format!("http://{gateway}/orders"))
        .header("X-Cognito-Subject", "abc")
        .header("X-Cognito-Email", "abc@example.com")
        .header("X-Cognito-Groups", "admins")
        .body(r#"{"sku":"X1"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    assert_eq!(res.text().await.unwrap(), r#"{"sku":"X1"}"#);

    let envelopes = captured.lock().unwrap();
    assert_eq!(envelopes[0]["resource"], "/orders");
    assert_eq!(
        envelopes[0]["requestContext"]["authorizer"]["claims"],
        json!({"sub": "abc", "email": "abc@example.com", "cognito:groups": "admins"})
    );

    drop(envelopes);
    shutdown.trigger();
}

#[tokio::test]
async fn test_unknown_token_has_no_claims() {
    let (backend, captured) = common::start_function(ok_reply).await;
    let (gateway, shutdown) = common::start_gateway(backend, |_| {}).await;

    common::client()
        .get(format!("http://{gateway}/users/1"))
        .header("Authorization", "Bearer nope")
        .header("X-Cognito-Subject", "ignored")
        .send()
        .await
        .unwrap();

    let envelopes = captured.lock().unwrap();
    assert_eq!(envelopes[0]["requestContext"]["authorizer"]["claims"], Value::Null);

    drop(envelopes);
    shutdown.trigger();
}

#[tokio::test]
async fn test_backend_status_passes_through() {
    let (backend, _) = common::start_function(|_| {
        json!({"statusCode": 404, "body": "not here"})
    })
    .await;
    let (gateway, shutdown) = common::start_gateway(backend, |_| {}).await;

    let res = common::client()
        .get(format!("http://{gateway}/users/404"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    assert_eq!(res.text().await.unwrap(), "not here");

    shutdown.trigger();
}

#[tokio::test]
async fn test_base64_body_is_decoded() {
    let encoded = base64::engine::general_purpose::STANDARD.encode(b"\x89PNG\r\n");
    let (backend, _) = common::start_function(move |_| {
        json!({
            "statusCode": 200,
            "headers": {"Content-Type": "image/png"},
            "body": encoded,
            "isBase64Encoded": true
        })
    })
    .await;
    let (gateway, shutdown) = common::start_gateway(backend, |_| {}).await;

    let res = common::client()
        .get(format!("http://{gateway}/users/1"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "image/png");
    assert_eq!(res.bytes().await.unwrap().as_ref(), b"\x89PNG\r\n");

    shutdown.trigger();
}

#[tokio::test]
async fn test_error_message_fallback() {
    let (backend, _) = common::start_function(|_| {
        json!({"errorMessage": "boom", "errorType": "RuntimeError"})
    })
    .await;
    let (gateway, shutdown) = common::start_gateway(backend, |_| {}).await;

    let res = common::client()
        .get(format!("http://{gateway}/users/1"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    assert_eq!(res.text().await.unwrap(), "boom");

    shutdown.trigger();
}

#[tokio::test]
async fn test_multi_value_headers_merge() {
    let (backend, _) = common::start_function(|_| {
        json!({
            "statusCode": 200,
            "headers": {"Content-Type": "text/plain"},
            "multiValueHeaders": {"Set-Cookie": ["a=1", "b=2"]},
            "body": "ok"
        })
    })
    .await;
    let (gateway, shutdown) = common::start_gateway(backend, |_| {}).await;

    let res = common::client()
        .get(format!("http://{gateway}/users/1"))
        .send()
        .await
        .unwrap();

    let cookies: Vec<_> = res.headers().get_all("set-cookie").iter().collect();
    assert_eq!(cookies, ["a=1", "b=2"]);
    assert_eq!(res.headers()["content-type"], "text/plain");

    shutdown.trigger();
}

#[tokio::test]
async fn test_concurrent_requests_are_independent() {
    let (backend, captured) = common::start_function(|event| {
        json!({"statusCode": 200, "body": event["pathParameters"]["userId"].clone()})
    })
    .await;
    let (gateway, shutdown) = common::start_gateway(backend, |_| {}).await;

    let client = common::client();
    let mut tasks = Vec::new();
    for i in 0..20 {
        let client = client.clone();
        let url = format!("http://{gateway}/users/{i}");
        tasks.push(tokio::spawn(async move {
            let res = client.get(&url).send().await.unwrap();
            (i, res.status(), res.text().await.unwrap())
        }));
    }

    for task in tasks {
        let (i, status, body) = task.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, i.to_string());
    }
    assert_eq!(captured.lock().unwrap().len(), 20);

    shutdown.trigger();
}

#[tokio::test]
async fn test_generated_request_id_is_not_forwarded() {
    let (backend, captured) = common::start_function(ok_reply).await;
    let (gateway, shutdown) = common::start_gateway(backend, |_| {}).await;
    let client = common::client();

    let res = client
        .get(format!("http://{gateway}/users/1"))
        .header("X-Custom", "1")
        .send()
        .await
        .unwrap();
    assert!(res.headers().contains_key("x-request-id"));

    client
        .get(format!("http://{gateway}/users/2"))
        .header("X-Request-Id", "client-id")
        .send()
        .await
        .unwrap();

    let envelopes = captured.lock().unwrap();
    let generated = &envelopes[0];
    assert_eq!(generated["headers"]["X-Custom"], "1");
    assert!(generated["headers"].get("X-Request-Id").is_none());
    assert!(generated["multiValueHeaders"].get("X-Request-Id").is_none());

    let supplied = &envelopes[1];
    assert_eq!(supplied["headers"]["X-Request-Id"], "client-id");

    drop(envelopes);
    shutdown.trigger();
}

#[tokio::test]
async fn test_encoded_path_is_decoded_once() {
    let (backend, captured) = common::start_function(ok_reply).await;
    let (gateway, shutdown) = common::start_gateway(backend, |_| {}).await;
    let client = common::client();

    for path in ["/users/a%20b", "/users/%6De", "/users/100%2525"] {
        client
            .get(format!("http://{gateway}{path}"))
            .send()
            .await
            .unwrap();
    }

    let envelopes = captured.lock().unwrap();

    assert_eq!(envelopes[0]["path"], "/users/a b");
    assert_eq!(envelopes[0]["requestContext"]["path"], "/users/a b");
    assert_eq!(envelopes[0]["resource"], "/users/{userId}");
    assert_eq!(envelopes[0]["pathParameters"], json!({"userId": "a b"}));

    assert_eq!(envelopes[1]["path"], "/users/me");
    assert_eq!(envelopes[1]["resource"], "/users/me");
    assert_eq!(envelopes[1]["pathParameters"], Value::Null);

    assert_eq!(envelopes[2]["pathParameters"], json!({"userId": "100%25"}));

    drop(envelopes);
    shutdown.trigger();
}
