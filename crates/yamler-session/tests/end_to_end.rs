use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use yamler_core::{FetchConfig, OutputFormat, YamlerConfig, YamlerError};
use yamler_fetch::FetchClient;
use yamler_session::{LoadOutcome, SearchReport, Session};

const VALUES: &str = "\
webhook:
  replicas: 2
  image: quay.io/jetstack/cert-manager-webhook
service:
  port: 443
  type: ClusterIP
debug: false
";

async fn serve(body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/values.yaml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;
    server
}

fn client() -> FetchClient {
    FetchClient::new(&FetchConfig::default()).unwrap()
}

#[tokio::test]
async fn load_then_search_highlights_the_match() {
    let server = serve(VALUES).await;
    let mut session = Session::new(YamlerConfig::default());

    let outcome = session
        .load(&client(), &format!("{}/values.yaml", server.uri()))
        .await;
    assert!(matches!(outcome, LoadOutcome::Loaded { entry_count: 5 }));
    assert_eq!(
        session.state().to_string(),
        "YAML loaded successfully (5 entries found)"
    );
    assert!(session.error().is_none());

    session.search("replicas");
    let results = session.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].path, "webhook.replicas");

    let report = SearchReport::from_session(&session);
    let target: Vec<_> = report.results[0]
        .context_lines
        .iter()
        .filter(|l| l.is_target)
        .collect();
    assert_eq!(target.len(), 1);
    assert_eq!(target[0].line_number, 2);
    assert_eq!(target[0].content, "  replicas: 2");
}

#[tokio::test]
async fn failed_load_clears_the_session() {
    let server = serve(VALUES).await;
    Mock::given(method("GET"))
        .and(path("/gone.yaml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut session = Session::new(YamlerConfig::default());
    session
        .load(&client(), &format!("{}/values.yaml", server.uri()))
        .await;
    session.search("port");
    assert_eq!(session.results().len(), 1);

    let outcome = session
        .load(&client(), &format!("{}/gone.yaml", server.uri()))
        .await;
    assert!(matches!(outcome, LoadOutcome::Failed(YamlerError::Fetch(_))));
    assert!(session.entries().is_empty());
    assert!(session.document().is_none());
    assert!(session.results().is_empty());
    assert!(session
        .error()
        .unwrap()
        .starts_with("failed to fetch the file"));
}

#[tokio::test]
async fn invalid_yaml_is_reported_as_parse_error() {
    let server = serve("image: [unterminated\n").await;
    let mut session = Session::new(YamlerConfig::default());

    let outcome = session
        .load(&client(), &format!("{}/values.yaml", server.uri()))
        .await;
    assert!(matches!(outcome, LoadOutcome::Failed(YamlerError::Parse(_))));
    assert!(session.error().unwrap().starts_with("invalid YAML format"));
}

#[tokio::test]
async fn invalid_url_fails_without_fetching() {
    let mut session = Session::new(YamlerConfig::default());
    let outcome = session.load(&client(), "values.yaml").await;
    assert!(matches!(outcome, LoadOutcome::Failed(YamlerError::Input(_))));
    assert_eq!(
        session.error(),
        Some("please enter a valid URL (must start with http:// or https://)")
    );
}

#[tokio::test]
async fn latest_request_wins() {
    let server = serve(VALUES).await;
    Mock::given(method("GET"))
        .and(path("/small.yaml"))
        .respond_with(ResponseTemplate::new(200).set_body_string("only: one\n"))
        .mount(&server)
        .await;

    let client = client();
    let mut session = Session::new(YamlerConfig::default());
    let big_url = format!("{}/values.yaml", server.uri());
    let small_url = format!("{}/small.yaml", server.uri());

    let older = session.begin_load(&big_url);
    let newer = session.begin_load(&small_url);
    let (big, small) = tokio::join!(client.fetch_text(&big_url), client.fetch_text(&small_url));

    assert!(matches!(
        session.complete_load(newer, small),
        LoadOutcome::Loaded { entry_count: 1 }
    ));
    assert!(matches!(session.complete_load(older, big), LoadOutcome::Stale));
    assert_eq!(session.entries()[0].path, "only");
}

#[tokio::test]
async fn json_report_round_trips_through_serde() {
    let server = serve(VALUES).await;
    let mut session = Session::new(YamlerConfig::default());
    session
        .load(&client(), &format!("{}/values.yaml", server.uri()))
        .await;
    session.search("debug");

    let json = SearchReport::from_session(&session)
        .render(OutputFormat::Json, false)
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["results"][0]["path"], "debug");
    assert_eq!(parsed["results"][0]["value"], false);
}
