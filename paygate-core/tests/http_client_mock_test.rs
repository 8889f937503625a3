//! Integration tests driving the real executor against a mock gateway.

use flate2::Compression;
use flate2::write::GzEncoder;
use paygate_core::error::{Error, NetworkError, RATE_LIMIT_MESSAGE, RETRY_LIMIT_MESSAGE};
use paygate_core::http_client::{
    HttpClient, HttpConfig, HttpExecutor, HttpMethod, HttpRequest, HttpResponse, ReqwestExecutor,
};
use paygate_core::RetryPolicy;
use std::io::Write;
use std::time::Duration;
use tokio::sync::oneshot;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gzip(text: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

fn client() -> HttpClient {
    HttpClient::new(HttpConfig::default()).expect("Failed to create client")
}

#[tokio::test]
async fn test_status_mapping() {
    let server = MockServer::start().await;
    let statuses = [200u16, 201, 202, 204, 400, 401, 403, 404, 418, 422, 426, 500, 502, 503];
    for status in statuses {
        Mock::given(method("GET"))
            .and(path(format!("/status/{status}")))
            .respond_with(ResponseTemplate::new(status).set_body_string(format!("body {status}")))
            .mount(&server)
            .await;
    }

    let client = client();
    for status in statuses {
        let request = client
            .request()
            .base_url(server.uri())
            .path(format!("/status/{status}"))
            .build();
        let outcome = client.send_synchronous(request).await;
        let expected_body = if status == 204 {
            String::new()
        } else {
            format!("body {status}")
        };

        match (status, outcome) {
            (200..=202, Ok(body)) => assert_eq!(body, expected_body),
            (400 | 422, Err(e @ Error::UnprocessableEntity(_)))
            | (401, Err(e @ Error::Authentication(_)))
            | (403, Err(e @ Error::Authorization(_)))
            | (426, Err(e @ Error::UpgradeRequired(_)))
            | (500, Err(e @ Error::ServerError(_)))
            | (503, Err(e @ Error::ServiceUnavailable(_))) => {
                assert_eq!(e.message(), Some(expected_body.as_str()));
            }
            (204 | 404 | 418 | 502, Err(e @ Error::UnexpectedStatus { .. })) => {
                assert_eq!(e.status_code(), Some(status));
                assert_eq!(e.message(), Some(expected_body.as_str()));
            }
            (status, other) => panic!("status {status} produced {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_rate_limit_has_fixed_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down please"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client();
    let request = client.request().base_url(server.uri()).path("limited").build();
    let err = client.fetch(request).await.unwrap_err();

    assert!(matches!(err, Error::RateLimit(_)));
    assert_eq!(err.to_string(), RATE_LIMIT_MESSAGE);
}

#[tokio::test]
async fn test_gzip_and_plain_bodies_decode_identically() {
    let server = MockServer::start().await;
    let json = r#"{"clientApiUrl":"https://api.example.com","environment":"sandbox"}"#;

    Mock::given(method("GET"))
        .and(path("/gzip"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Encoding", "gzip")
                .set_body_bytes(gzip(json)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/plain"))
        .respond_with(ResponseTemplate::new(200).set_body_string(json))
        .mount(&server)
        .await;

    let client = client();
    let gz = client
        .send_synchronous(client.request().base_url(server.uri()).path("gzip").build())
        .await
        .unwrap();
    let plain = client
        .send_synchronous(client.request().base_url(server.uri()).path("plain").build())
        .await
        .unwrap();

    assert_eq!(gz, json);
    assert_eq!(gz, plain);
}

#[tokio::test]
async fn test_invalid_gzip_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Encoding", "gzip")
                .set_body_string("not compressed"),
        )
        .mount(&server)
        .await;

    let client = client();
    let err = client
        .send_synchronous(client.request().base_url(server.uri()).path("x").build())
        .await
        .unwrap_err();
    assert!(matches!(err.as_network(), Some(NetworkError::Decode(_))));
}

#[tokio::test]
async fn test_default_and_custom_headers_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/configuration"))
        .and(query_param("configVersion", "3"))
        .and(header("accept-encoding", "gzip"))
        .and(header("accept-language", "fr"))
        .and(header("client-key", "sandbox_abcdefgh_merchant"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(HttpConfig {
        accept_language: "fr".to_string(),
        ..Default::default()
    })
    .unwrap();
    let request = client
        .request()
        .base_url(format!("{}/", server.uri()))
        .path("/v1/configuration?configVersion=3")
        .add_header("Client-Key", "sandbox_abcdefgh_merchant")
        .build();

    assert_eq!(client.send_synchronous(request).await.unwrap(), "ok");
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/things"))
        .and(header("content-type", "application/json"))
        .and(body_string("{\"a\":1}"))
        .respond_with(ResponseTemplate::new(201).set_body_string("created"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client();
    let request = client
        .request()
        .method(HttpMethod::Post)
        .base_url(server.uri())
        .path("v1/things")
        .data("{\"a\":1}")
        .build();

    let (tx, rx) = oneshot::channel();
    client.send(
        request,
        Some(Box::new(move |outcome| {
            let _ = tx.send(outcome.map(HttpResponse::into_body));
        })),
    );

    assert_eq!(rx.await.unwrap().unwrap(), "created");
}

#[tokio::test]
async fn test_get_does_not_send_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(body_string(""))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client();
    let request = client
        .request()
        .base_url(server.uri())
        .path("things")
        .data("{\"ignored\":true}")
        .build();
    assert_eq!(client.send_synchronous(request).await.unwrap(), "ok");
}

#[tokio::test]
async fn test_retries_post_with_intact_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/things/1"))
        .and(body_string("{\"a\":2}"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(3)
        .mount(&server)
        .await;

    let client = client();
    let request = client
        .request()
        .method(HttpMethod::Put)
        .base_url(server.uri())
        .path("v1/things/1")
        .data("{\"a\":2}")
        .build();

    let err = client
        .fetch_with_retry(request, RetryPolicy::max_3_times())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), RETRY_LIMIT_MESSAGE);
    assert!(matches!(err.last_attempt_error(), Some(Error::ServerError(_))));
}

#[tokio::test]
async fn test_retry_recovers_after_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("up"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client();
    let request = client.request().base_url(server.uri()).path("status").build();
    let response = client
        .fetch_with_retry(request, RetryPolicy::max_3_times())
        .await
        .unwrap();
    assert_eq!(response.body(), "up");
}

#[tokio::test]
async fn test_send_without_callback_still_executes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client();
    client.send(client.request().base_url(server.uri()).path("fire").build(), None);

    for _ in 0..100 {
        if !server.received_requests().await.unwrap_or_default().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_read_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = client();
    let request = client
        .request()
        .base_url(server.uri())
        .path("slow")
        .read_timeout(Duration::from_millis(100))
        .build();

    let err = client.send_synchronous(request).await.unwrap_err();
    assert!(err.as_network().is_some(), "expected network error, got {err:?}");
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let client = client();
    let request = client
        .request()
        .base_url("http://127.0.0.1:9")
        .path("nothing")
        .connect_timeout(Duration::from_secs(2))
        .build();

    let err = client.send_synchronous(request).await.unwrap_err();
    assert!(err.as_network().is_some(), "expected network error, got {err:?}");
}

#[tokio::test]
async fn test_response_size_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(4096)))
        .mount(&server)
        .await;

    let client = HttpClient::new(HttpConfig {
        max_response_size: 1024,
        ..Default::default()
    })
    .unwrap();
    let err = client
        .send_synchronous(client.request().base_url(server.uri()).path("big").build())
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_network(),
        Some(NetworkError::ResponseTooLarge { limit: 1024, .. })
    ));
}

#[tokio::test]
async fn test_absolute_path_overrides_base_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/absolute"))
        .respond_with(ResponseTemplate::new(200).set_body_string("reached"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client();
    let request = client
        .request()
        .base_url("http://127.0.0.1:9/unused")
        .path(format!("{}/absolute", server.uri()))
        .build();
    assert_eq!(client.send_synchronous(request).await.unwrap(), "reached");
}

#[tokio::test]
async fn test_executor_zeroes_body_even_when_request_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/payment_methods"))
        .and(body_string("{\"number\":\"4111111111111111\"}"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let executor = ReqwestExecutor::new(HttpConfig::default());
    let mut request = HttpRequest::builder()
        .method(HttpMethod::Post)
        .base_url(server.uri())
        .path("v1/payment_methods")
        .data("{\"number\":\"4111111111111111\"}")
        .build();
    let length = request.body().unwrap().len();

    let err = executor.execute(&mut request).await.unwrap_err();
    assert!(matches!(err, Error::ServerError(_)));

    let body = request.body().unwrap();
    assert!(body.is_disposed());
    assert_eq!(body.len(), length);
}
