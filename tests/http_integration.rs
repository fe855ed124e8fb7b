// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the HTTP fetch primitive using wiremock.

use std::time::Duration;

use serde_json::{Value, json};
use webhook_bridge::FetchError;
use webhook_bridge::protocol::{FetchData, HttpClient, HttpMethod, fetch};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn data(value: Value) -> FetchData {
    match value {
        Value::Object(map) => map,
        _ => panic!("test data must be an object"),
    }
}

// ============================================================================
// Success path
// ============================================================================

mod success {
    use super::*;

    #[tokio::test]
    async fn get_without_data() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .and(header("content-type", "application/json"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "success",
                "method": "GET"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let body = fetch(
            &mock_server.uri(),
            HttpMethod::Get,
            &FetchData::new(),
            Duration::from_secs(5),
        )
        .await
        .unwrap();

        assert_eq!(body, json!({"message": "success", "method": "GET"}));
    }

    #[tokio::test]
    async fn get_with_data_in_query() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/light/0"))
            .and(query_param("turn", "on"))
            .and(query_param("brightness", "50"))
            .and(query_param("flag", "true"))
            .and(query_param("nul", ""))
            .and(query_param("obj", r#"{"a":1}"#))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HttpClient::new().unwrap();
        let body = client
            .fetch(
                &format!("{}/light/0", mock_server.uri()),
                HttpMethod::Get,
                &data(json!({
                    "turn": "on",
                    "brightness": 50,
                    "flag": true,
                    "nul": null,
                    "obj": {"a": 1}
                })),
            )
            .await
            .unwrap();

        assert_eq!(body["ok"], json!(true));
    }

    #[tokio::test]
    async fn get_extends_existing_query() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("a", "1"))
            .and(query_param("b", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HttpClient::new().unwrap();
        client
            .fetch(
                &format!("{}/x?a=1", mock_server.uri()),
                HttpMethod::Get,
                &data(json!({"b": 2})),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn post_sends_json_body() {
        let mock_server = MockServer::start().await;
        let payload = json!({"key": "value", "num": 42});
        let length = payload.to_string().len().to_string();

        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(header("content-type", "application/json"))
            .and(header("content-length", length.as_str()))
            .and(body_json(&payload))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "success",
                "received": payload.clone()
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HttpClient::new().unwrap();
        let body = client
            .fetch(
                &format!("{}/hook", mock_server.uri()),
                HttpMethod::Post,
                &data(payload.clone()),
            )
            .await
            .unwrap();

        assert_eq!(body["received"], payload);
    }

    #[tokio::test]
    async fn post_without_data_sends_empty_object() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("content-length", "2"))
            .and(body_json(json!({})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"created": true})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HttpClient::new().unwrap();
        let body = client
            .fetch(&mock_server.uri(), HttpMethod::Post, &FetchData::new())
            .await
            .unwrap();
        assert_eq!(body["created"], json!(true));
    }

    #[tokio::test]
    async fn put_sends_json_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(body_json(json!({"level": 128})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"updated": true})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HttpClient::new().unwrap();
        let body = client
            .fetch(
                &mock_server.uri(),
                HttpMethod::Put,
                &data(json!({"level": 128})),
            )
            .await
            .unwrap();
        assert_eq!(body["updated"], json!(true));
    }
}

// ============================================================================
// Failure classification
// ============================================================================

mod failures {
    use super::*;

    #[tokio::test]
    async fn not_found_reports_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new().unwrap();
        let err = client
            .fetch(&mock_server.uri(), HttpMethod::Get, &FetchData::new())
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status(404)));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn redirect_is_not_followed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("location", format!("{}/new", mock_server.uri()).as_str()),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = HttpClient::new().unwrap();
        let err = client
            .fetch(
                &format!("{}/old", mock_server.uri()),
                HttpMethod::Get,
                &FetchData::new(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Request failed with status code: 302");
    }

    #[tokio::test]
    async fn status_300_is_a_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(300))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new().unwrap();
        let err = client
            .fetch(&mock_server.uri(), HttpMethod::Post, &FetchData::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status(300)));
    }

    #[tokio::test]
    async fn invalid_json_reports_parse_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("invalid json"))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new().unwrap();
        let err = client
            .fetch(&mock_server.uri(), HttpMethod::Get, &FetchData::new())
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Parse(_)));
        assert!(err.to_string().contains("Failed to parse response JSON"));
    }

    #[tokio::test]
    async fn empty_body_is_a_parse_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new().unwrap();
        let err = client
            .fetch(&mock_server.uri(), HttpMethod::Get, &FetchData::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_secs(1)),
            )
            .mount(&mock_server)
            .await;

        let err = fetch(
            &mock_server.uri(),
            HttpMethod::Get,
            &FetchData::new(),
            Duration::from_millis(100),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, FetchError::Timeout { .. }));
        assert_eq!(err.to_string(), "Request timed out after 0.1 seconds");
    }

    #[tokio::test]
    async fn client_timeout_applies() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(1)))
            .mount(&mock_server)
            .await;

        let client = HttpClient::builder()
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap();
        let err = client
            .fetch(&mock_server.uri(), HttpMethod::Post, &FetchData::new())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Request timed out after 0.2 seconds");
    }

    #[tokio::test]
    async fn connection_refused_reports_request_failure() {
        // Bind then drop to get a port with nothing listening.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = HttpClient::new().unwrap();
        let err = client
            .fetch(
                &format!("http://127.0.0.1:{port}/"),
                HttpMethod::Get,
                &FetchData::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Request { .. }));
        let text = err.to_string();
        assert!(text.starts_with("Request failed: "), "{text}");
        assert!(text.to_lowercase().contains("refused"), "{text}");
    }

    #[tokio::test]
    async fn invalid_url_reports_request_failure() {
        let client = HttpClient::new().unwrap();
        let err = client
            .fetch("not a url", HttpMethod::Get, &FetchData::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Request { .. }));
        assert!(
            err.to_string().contains("relative URL without a base"),
            "{err}"
        );
    }
}
