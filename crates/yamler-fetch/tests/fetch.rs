use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use yamler_core::{FetchConfig, YamlerError};
use yamler_fetch::FetchClient;

fn client() -> FetchClient {
    FetchClient::new(&FetchConfig::default()).unwrap()
}

#[tokio::test]
async fn returns_body_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/values.yaml"))
        .respond_with(ResponseTemplate::new(200).set_body_string("replicaCount: 1\n"))
        .expect(1)
        .mount(&server)
        .await;

    let text = client()
        .fetch_text(&format!("{}/values.yaml", server.uri()))
        .await
        .unwrap();
    assert_eq!(text, "replicaCount: 1\n");
}

#[tokio::test]
async fn sends_configured_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", "yamler-test"))
        .respond_with(ResponseTemplate::new(200).set_body_string("a: 1\n"))
        .expect(1)
        .mount(&server)
        .await;

    let config = FetchConfig {
        user_agent: "yamler-test".into(),
        ..FetchConfig::default()
    };
    let client = FetchClient::new(&config).unwrap();
    client.fetch_text(&server.uri()).await.unwrap();
}

#[tokio::test]
async fn non_success_status_is_a_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&server)
        .await;

    let err = client()
        .fetch_text(&format!("{}/missing.yaml", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, YamlerError::Fetch(_)));
    let message = err.to_string();
    assert!(message.starts_with("failed to fetch the file"), "{message}");
    assert!(message.contains("404"), "{message}");
}

#[tokio::test]
async fn invalid_url_never_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let bare = server.uri().replacen("http://", "", 1);
    let err = client().fetch_text(&bare).await.unwrap_err();
    assert!(matches!(err, YamlerError::Input(_)));

    let err = client().fetch_text("").await.unwrap_err();
    assert!(matches!(err, YamlerError::Input(_)));
}

#[tokio::test]
async fn unreachable_host_is_a_fetch_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let err = client().fetch_text(&uri).await.unwrap_err();
    assert!(matches!(err, YamlerError::Fetch(_)));
}
