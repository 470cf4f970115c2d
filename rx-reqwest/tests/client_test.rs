//! Tests for the observable HTTP client against a mock server

mod common;

#[cfg(test)]
mod tests {
    use super::common::{Event, drain, setup_test_client, subscribe_events};
    use mockito::Matcher;
    use rx_reqwest::{
        Method, RequestConfig, RequestDescriptor, ResponseType, RxClient, RxHttpError, StatusCode,
    };
    use serde::Deserialize;
    use serde_json::{Value, json};
    use std::io::Write;
    use std::time::Duration;

    const USERS: &str = r#"[{"name":"John","lastname":"Doe"}]"#;

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        name: String,
        lastname: String,
    }

    fn john_doe() -> Vec<User> {
        vec![User {
            name: "John".to_string(),
            lastname: "Doe".to_string(),
        }]
    }

    #[tokio::test]
    async fn test_get_emits_once_then_completes() {
        let (client, mut server) = setup_test_client().await;

        let mock = server
            .mock("GET", "/users")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(USERS)
            .create_async()
            .await;

        let (_sub, rx) = subscribe_events(&client.get::<Vec<User>>("/users", None));
        let events = drain(rx).await;

        assert_eq!(events.len(), 2);
        match &events[0] {
            Event::Next(response) => {
                assert_eq!(response.status, StatusCode::OK);
                assert_eq!(response.status_text, "OK");
                assert_eq!(response.data, john_doe());
                assert_eq!(response.headers["content-type"], "application/json");
            }
            other => panic!("expected next, got {:?}", other),
        }
        assert!(matches!(events[1], Event::Complete));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_request_with_descriptor() {
        let (client, mut server) = setup_test_client().await;

        let mock = server
            .mock("GET", "/users")
            .with_status(200)
            .with_body(USERS)
            .create_async()
            .await;

        let response = client
            .request::<Vec<User>>(RequestDescriptor::new(Method::GET, "/users"))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.data, john_doe());

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unsubscribe_before_send_never_hits_server() {
        let (client, mut server) = setup_test_client().await;

        let mock = server
            .mock("GET", "/users")
            .with_status(200)
            .with_body(USERS)
            .expect(0)
            .create_async()
            .await;

        let (sub, rx) = subscribe_events(&client.get::<Vec<User>>("/users", None));
        sub.unsubscribe();

        assert!(sub.is_closed());
        assert!(drain(rx).await.is_empty());

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unsubscribe_while_in_flight_discards_response() {
        let (client, mut server) = setup_test_client().await;

        let _mock = server
            .mock("GET", "/slow")
            .with_status(200)
            .with_chunked_body(|w| {
                std::thread::sleep(Duration::from_millis(300));
                w.write_all(USERS.as_bytes())
            })
            .create_async()
            .await;

        let (sub, rx) = subscribe_events(&client.get::<Vec<User>>("/slow", None));
        tokio::time::sleep(Duration::from_millis(50)).await;
        sub.unsubscribe();

        assert!(drain(rx).await.is_empty());
    }

    #[tokio::test]
    async fn test_post_with_cancel_token_still_succeeds() {
        let (client, mut server) = setup_test_client().await;

        let mock = server
            .mock("POST", "/users")
            .match_body(Matcher::Json(json!({"name": "John", "lastname": "Doe"})))
            .with_status(201)
            .with_body(r#"{"id": 1}"#)
            .create_async()
            .await;

        let source = rx_reqwest::CancelToken::source();
        source.cancel(Some("ignored".to_string()));
        let config = RequestConfig::new().with_cancel_token(source.token.clone());

        let response = client
            .post::<Value, _>(
                "/users",
                Some(&json!({"name": "John", "lastname": "Doe"})),
                Some(config),
            )
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.data, json!({"id": 1}));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_no_content() {
        let (client, mut server) = setup_test_client().await;

        let mock = server
            .mock("DELETE", "/users/1")
            .with_status(204)
            .create_async()
            .await;

        let (_sub, rx) = subscribe_events(&client.delete::<()>("/users/1", None));
        let events = drain(rx).await;

        assert_eq!(events.len(), 2);
        match &events[0] {
            Event::Next(response) => assert_eq!(response.status, StatusCode::NO_CONTENT),
            other => panic!("expected next, got {:?}", other),
        }
        assert!(matches!(events[1], Event::Complete));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_concurrent_requests_are_independent() {
        let (client, mut server) = setup_test_client().await;

        let _mock = server
            .mock("GET", "/users")
            .with_status(200)
            .with_body(USERS)
            .expect_at_most(2)
            .create_async()
            .await;

        let (kept, kept_rx) = subscribe_events(&client.get::<Vec<User>>("/users", None));
        let (dropped, dropped_rx) = subscribe_events(&client.get::<Vec<User>>("/users", None));
        dropped.unsubscribe();

        let kept_events = drain(kept_rx).await;
        assert!(drain(dropped_rx).await.is_empty());

        assert_eq!(kept_events.len(), 2);
        assert!(matches!(&kept_events[0], Event::Next(r) if r.data == john_doe()));
        assert!(kept.is_closed());
    }

    #[tokio::test]
    async fn test_error_status_emits_error_only() {
        let (client, mut server) = setup_test_client().await;

        let mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .with_body("not here")
            .create_async()
            .await;

        let (_sub, rx) = subscribe_events(&client.get::<Value>("/missing", None));
        let events = drain(rx).await;

        assert_eq!(events.len(), 1);
        match &events[0] {
            Event::Error(RxHttpError::Status { status, body }) => {
                assert_eq!(*status, StatusCode::NOT_FOUND);
                assert_eq!(body, "not here");
            }
            other => panic!("expected status error, got {:?}", other),
        }

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_custom_validate_status_accepts_404() {
        let (client, mut server) = setup_test_client().await;

        let _mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .with_body(r#"{"error": "missing"}"#)
            .create_async()
            .await;

        let config = RequestConfig::new().with_validate_status(|status| status.as_u16() < 500);
        let response = client
            .get::<Value>("/missing", Some(config))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.data["error"], "missing");
    }

    #[tokio::test]
    async fn test_decode_error_is_passed_through() {
        let (client, mut server) = setup_test_client().await;

        let _mock = server
            .mock("GET", "/users")
            .with_status(200)
            .with_body("{broken")
            .create_async()
            .await;

        let result = client.get::<Vec<User>>("/users", None).await;
        assert!(matches!(result, Err(RxHttpError::Decode(_))));
    }

    #[tokio::test]
    async fn test_text_response_type() {
        let (client, mut server) = setup_test_client().await;

        let _mock = server
            .mock("GET", "/health")
            .with_status(200)
            .with_body("ok")
            .create_async()
            .await;

        let config = RequestConfig::new().with_response_type(ResponseType::Text);
        let response = client.get::<String>("/health", Some(config)).await.unwrap();

        assert_eq!(response.data, "ok");
    }

    #[tokio::test]
    async fn test_query_params_and_headers() {
        let (client, mut server) = setup_test_client().await;

        let mock = server
            .mock("GET", "/users")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page".into(), "2".into()),
                Matcher::UrlEncoded("q".into(), "john doe".into()),
            ]))
            .match_header("x-request-id", "abc")
            .with_status(200)
            .with_body(USERS)
            .create_async()
            .await;

        let config = RequestConfig::new()
            .with_param("page", "2")
            .with_param("q", "john doe")
            .with_header(
                "x-request-id".parse().unwrap(),
                "abc".parse().unwrap(),
            );

        let response = client.get::<Vec<User>>("/users", Some(config)).await.unwrap();
        assert_eq!(response.data, john_doe());

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_basic_auth_and_bearer_token() {
        let mut server = super::common::create_mock_server().await;

        let bearer = server
            .mock("GET", "/me")
            .match_header("authorization", "Bearer secret-token")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = RxClient::create(
            rx_reqwest::ClientConfig::new()
                .with_base_url(server.url())
                .with_auth_token("secret-token"),
        )
        .unwrap();
        client.get::<Value>("/me", None).await.unwrap();
        bearer.assert_async().await;

        let basic = server
            .mock("GET", "/admin")
            // base64("john:secret")
            .match_header("authorization", "Basic am9objpzZWNyZXQ=")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let config = RequestConfig::new().with_basic_auth("john", "secret");
        RxClient::new()
            .get::<Value>(&format!("{}/admin", server.url()), Some(config))
            .await
            .unwrap();
        basic.assert_async().await;
    }

    #[tokio::test]
    async fn test_put_and_patch_json() {
        let (client, mut server) = setup_test_client().await;

        let put = server
            .mock("PUT", "/users/1")
            .match_body(Matcher::Json(json!({"name": "Jane"})))
            .with_status(200)
            .with_body(r#"{"updated": true}"#)
            .create_async()
            .await;

        let patch = server
            .mock("PATCH", "/users/1")
            .match_body(Matcher::Json(json!({"lastname": "Roe"})))
            .with_status(200)
            .with_body(r#"{"updated": true}"#)
            .create_async()
            .await;

        let body = json!({"name": "Jane"});
        let response = client
            .put::<Value, _>("/users/1", Some(&body), None)
            .await
            .unwrap();
        assert_eq!(response.data["updated"], true);

        let body = json!({"lastname": "Roe"});
        client
            .patch::<Value, _>("/users/1", Some(&body), None)
            .await
            .unwrap();

        put.assert_async().await;
        patch.assert_async().await;
    }

    #[tokio::test]
    async fn test_form_variants_send_multipart_bodies() {
        let (client, mut server) = setup_test_client().await;

        let mut mocks = Vec::new();
        for method in ["POST", "PUT", "PATCH"] {
            mocks.push(
                server
                    .mock(method, "/profile")
                    .match_header(
                        "content-type",
                        Matcher::Regex("^multipart/form-data; boundary=".into()),
                    )
                    .match_body(Matcher::AllOf(vec![
                        Matcher::Regex(r#"(?s)name="name".*?\r\n\r\nJohn\r\n"#.into()),
                        Matcher::Regex(
                            r#"(?s)name="address\[city\]".*?\r\n\r\nQuito\r\n"#.into(),
                        ),
                    ]))
                    .with_status(200)
                    .with_body("{}")
                    .create_async()
                    .await,
            );
        }

        let body = json!({"name": "John", "address": {"city": "Quito"}});
        client
            .post_form::<Value, _>("/profile", Some(&body), None)
            .await
            .unwrap();
        client
            .put_form::<Value, _>("/profile", Some(&body), None)
            .await
            .unwrap();
        client
            .patch_form::<Value, _>("/profile", Some(&body), None)
            .await
            .unwrap();

        for mock in mocks {
            mock.assert_async().await;
        }
    }

    #[tokio::test]
    async fn test_head_and_options() {
        let (client, mut server) = setup_test_client().await;

        let head = server
            .mock("HEAD", "/users")
            .with_status(200)
            .with_header("x-total-count", "42")
            .create_async()
            .await;

        let options = server
            .mock("OPTIONS", "/users")
            .with_status(204)
            .with_header("allow", "GET, POST")
            .create_async()
            .await;

        let response = client.head::<()>("/users", None).await.unwrap();
        assert_eq!(response.headers["x-total-count"], "42");

        let response = client.options::<()>("/users", None).await.unwrap();
        assert_eq!(response.status, StatusCode::NO_CONTENT);
        assert_eq!(response.headers["allow"], "GET, POST");

        head.assert_async().await;
        options.assert_async().await;
    }

    #[tokio::test]
    async fn test_resubscribe_issues_request_again() {
        let (client, mut server) = setup_test_client().await;

        let mock = server
            .mock("GET", "/users")
            .with_status(200)
            .with_body(USERS)
            .expect(2)
            .create_async()
            .await;

        let observable = client.get::<Vec<User>>("/users", None);
        let (_first, first_rx) = subscribe_events(&observable);
        assert_eq!(drain(first_rx).await.len(), 2);
        let (_second, second_rx) = subscribe_events(&observable);
        assert_eq!(drain(second_rx).await.len(), 2);

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_map_response() {
        let (client, mut server) = setup_test_client().await;

        let _mock = server
            .mock("GET", "/users")
            .with_status(200)
            .with_body(USERS)
            .create_async()
            .await;

        let names = client
            .get::<Vec<User>>("/users", None)
            .map(|response| {
                response
                    .data
                    .into_iter()
                    .map(|u| format!("{} {}", u.name, u.lastname))
                    .collect::<Vec<_>>()
            })
            .await
            .unwrap();

        assert_eq!(names, vec!["John Doe".to_string()]);
    }

    #[tokio::test]
    async fn test_transport_error_is_client_error() {
        // Port 9 (discard) is not expected to accept HTTP connections
        let result = RxClient::new()
            .get::<Value>("http://127.0.0.1:9/users", None)
            .await;

        let err = result.unwrap_err();
        assert!(RxClient::is_client_error(&err));
        assert!(!RxClient::is_cancel(&err));
    }
}
