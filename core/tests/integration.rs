//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the echo server on a random port, builds the client through
//! `create_api_client` (so the runtime probe and the native adapter are both
//! on the path) and asserts on what the server saw.

use std::sync::Arc;

use api_client_core::{
    create_api_client, ApiClient, ApiError, FileRequestData, HeaderDecorator, RequestForm,
    RequestHeader, RequestMethod,
};
use mock_server::Echo;

async fn start_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { mock_server::run(listener).await });
    addr.to_string()
}

fn decorator() -> Arc<dyn HeaderDecorator> {
    Arc::new(|header: &mut RequestHeader| {
        header.insert("Authorization", "session-token");
        header.insert("A", "android/9.0.0/ko");
    })
}

async fn client(host: &str) -> Box<dyn ApiClient> {
    create_api_client("http", host, Some(decorator())).await.unwrap()
}

#[tokio::test]
async fn request_sends_urlencoded_body() {
    let host = start_server().await;
    let client = client(&host).await;
    assert_eq!(client.url(), format!("http://{host}"));

    let form = RequestForm::new()
        .with("email", "user@example.com")
        .with("password", "p&ss word")
        .with("forced", false);
    let res = client
        .request(RequestMethod::Post, "android/account/login.json", Some(&form), None)
        .await
        .unwrap();
    assert_eq!(res.status(), Some(0));

    let echo: Echo = res.into_typed().unwrap();
    assert_eq!(echo.method, "POST");
    assert_eq!(echo.path, "/android/account/login.json");
    assert_eq!(echo.form["email"], "user@example.com");
    assert_eq!(echo.form["password"], "p&ss word");
    assert_eq!(echo.form["forced"], "false");
    assert_eq!(echo.headers["authorization"], "session-token");
    assert_eq!(echo.headers["a"], "android/9.0.0/ko");
    assert!(echo.query.is_empty());
}

#[tokio::test]
async fn request_params_sends_query_string() {
    let host = start_server().await;
    let client = client(&host).await;

    let form = RequestForm::new().with("since", 0).with("lang", "한국어 ko");
    let explicit = RequestHeader::new().with("authorization", "override");
    let res = client
        .request_params(RequestMethod::Get, "/account/more_settings.json", Some(&form), Some(&explicit))
        .await
        .unwrap();

    let echo: Echo = res.into_typed().unwrap();
    assert_eq!(echo.method, "GET");
    assert_eq!(echo.path, "/account/more_settings.json");
    assert_eq!(echo.query["since"], "0");
    assert_eq!(echo.query["lang"], "한국어 ko");
    assert_eq!(echo.headers["authorization"], "override");
    assert_eq!(echo.headers["a"], "android/9.0.0/ko");
    assert!(echo.form.is_empty());
}

#[tokio::test]
async fn request_multipart_sends_text_and_file_parts() {
    let host = start_server().await;
    let client = client(&host).await;

    let form = RequestForm::new().with("chatId", 9_007_199_254_740_993_u64).with(
        "file",
        FileRequestData::new(vec![0xff, 0xd8, 0xff, 0xe0, 0x00], "photo.jpg")
            .with_content_type("image/jpeg"),
    );
    let res = client
        .request_multipart(RequestMethod::Put, "upload", Some(&form), None)
        .await
        .unwrap();

    let echo: Echo = res.into_typed().unwrap();
    assert_eq!(echo.method, "PUT");
    assert_eq!(echo.parts.len(), 2);
    assert_eq!(echo.parts[0].name, "chatId");
    assert_eq!(echo.parts[0].text.as_deref(), Some("9007199254740993"));
    assert_eq!(echo.parts[1].name, "file");
    assert_eq!(echo.parts[1].filename.as_deref(), Some("photo.jpg"));
    assert_eq!(echo.parts[1].content_type.as_deref(), Some("image/jpeg"));
    assert_eq!(echo.parts[1].size, 5);
}

#[tokio::test]
async fn extension_verbs_reach_the_server() {
    let host = start_server().await;
    let client = client(&host).await;

    for method in [RequestMethod::Link, RequestMethod::Unlink, RequestMethod::Patch] {
        let res = client.request(method, "relation", None, None).await.unwrap();
        let echo: Echo = res.into_typed().unwrap();
        assert_eq!(echo.method, method.as_str());
    }
}

#[tokio::test]
async fn head_request_yields_empty_envelope() {
    let host = start_server().await;
    let client = client(&host).await;

    let res = client
        .request(RequestMethod::Head, "anything", None, None)
        .await
        .unwrap();
    assert!(res.into_inner().is_empty());

    let form = RequestForm::new().with("id", 1);
    let res = client
        .request_params(RequestMethod::Head, "anything", Some(&form), None)
        .await
        .unwrap();
    assert_eq!(res.status(), None);
}

#[tokio::test]
async fn non_success_status_surfaces_as_http_error() {
    let host = start_server().await;
    let client = client(&host).await;

    let err = client
        .request(RequestMethod::Get, "status/503", None, None)
        .await
        .unwrap_err();
    match err {
        ApiError::HttpError { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "forced status 503");
        }
        other => panic!("expected HttpError, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_body_is_a_deserialization_error() {
    let host = start_server().await;
    let client = client(&host).await;

    let err = client
        .request(RequestMethod::Get, "text", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::DeserializationError(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_on_one_client() {
    let host = start_server().await;
    let client: Arc<dyn ApiClient> = Arc::from(client(&host).await);

    let mut handles = Vec::new();
    for i in 0..16 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            let form = RequestForm::new().with("i", i);
            let res = client
                .request_params(RequestMethod::Get, "concurrent", Some(&form), None)
                .await
                .unwrap();
            let echo: Echo = res.into_typed().unwrap();
            (i, echo.query["i"].clone())
        }));
    }
    for handle in handles {
        let (i, seen) = handle.await.unwrap();
        assert_eq!(seen, i.to_string());
    }
}
