//! End-to-end tests against the live mock server.
//!
//! # Design
//! Each test starts the mock server on a random port in a background thread
//! with its own tokio runtime, then drives `DappierApp` over real HTTP with
//! the default `UreqClient`. The server records what it received so headers
//! and bodies can be checked on the wire.

use std::net::SocketAddr;
use std::time::Duration;

use dappier_core::{ApiError, DappierApp, RecommendationsOption, TransportError, UreqClient};
use mock_server::{MockState, Reply, REALTIME_DATAMODEL_ID};

const API_KEY: &str = "mock-api-key";
const NEWS_DATAMODEL_ID: &str = "dm_02hr75e8ate6adr15hjrf3ikol";

fn start_server(state: MockState) -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, state).await
        })
        .unwrap();
    });

    addr
}

fn realtime_app(addr: SocketAddr) -> DappierApp {
    DappierApp::new(API_KEY)
        .unwrap()
        .with_base_url(&format!("http://{addr}/app/datamodel/{REALTIME_DATAMODEL_ID}"))
}

fn body_json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).unwrap()
}

// ---------------------------------------------------------------------------
// Realtime search
// ---------------------------------------------------------------------------

#[test]
fn realtime_search_returns_answer() {
    let state = MockState::fixtures();
    let addr = start_server(state.clone());

    let result = realtime_app(addr)
        .realtime_search("when is election in USA")
        .unwrap();
    assert_eq!(result.response.results, "Election Day is November 5, 2024");

    let seen = state.blocking_requests();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].path, format!("/app/datamodel/{REALTIME_DATAMODEL_ID}"));
    assert_eq!(seen[0].authorization.as_deref(), Some("Bearer mock-api-key"));
    assert_eq!(seen[0].content_type.as_deref(), Some("application/json"));
    assert_eq!(
        body_json(&seen[0].body),
        serde_json::json!({"query": "when is election in USA"})
    );
}

#[test]
fn realtime_search_empty_query_sends_nothing() {
    let state = MockState::fixtures();
    let addr = start_server(state.clone());

    let err = realtime_app(addr).realtime_search("").unwrap_err();
    assert!(matches!(err, ApiError::InvalidArgument(_)));
    assert!(state.blocking_requests().is_empty());
}

#[test]
fn realtime_search_non_200_status() {
    let addr = start_server(MockState::replying(Reply::new(500, "")));

    let err = realtime_app(addr)
        .realtime_search("when is election in USA")
        .unwrap_err();
    assert!(matches!(err, ApiError::UnexpectedStatus { status: 500, .. }));
    assert!(err
        .to_string()
        .contains("received non-OK response status: 500"));
}

#[test]
fn realtime_search_invalid_json() {
    let addr = start_server(MockState::replying(Reply::new(200, "invalid-json")));

    let err = realtime_app(addr)
        .realtime_search("when is election in USA")
        .unwrap_err();
    assert!(matches!(err, ApiError::DeserializationError(_)));
    assert!(err.to_string().contains("failed to unmarshal response"));
}

#[test]
fn realtime_search_empty_array() {
    let addr = start_server(MockState::replying(Reply::new(200, "[]")));

    let err = realtime_app(addr)
        .realtime_search("when is election in USA")
        .unwrap_err();
    assert!(matches!(err, ApiError::EmptyResult));
}

#[test]
fn realtime_search_connection_refused() {
    // Bind then drop so nothing is listening on the port.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let app = realtime_app(addr).with_http_client(UreqClient::with_timeout(Duration::from_secs(5)));

    let err = app.realtime_search("when is election in USA").unwrap_err();
    assert!(matches!(err, ApiError::Transport(TransportError::Send(_))));
    assert!(err.is_transient());
}

// ---------------------------------------------------------------------------
// AI recommendations
// ---------------------------------------------------------------------------

#[test]
fn ai_recommendations_with_defaults() {
    let state = MockState::fixtures();
    let addr = start_server(state.clone());
    let app = DappierApp::new(API_KEY)
        .unwrap()
        .with_base_url(&format!("http://{addr}/app/datamodel/{NEWS_DATAMODEL_ID}"));

    let result = app
        .ai_recommendations("latest tech news", NEWS_DATAMODEL_ID, &[])
        .unwrap();
    assert_eq!(result.results.len(), 1);
    assert_eq!(result.results[0].title, "Test Title");
    assert_eq!(result.results[0].site_domain, "techcrunch.com");

    let seen = state.blocking_requests();
    assert_eq!(seen.len(), 1);
    assert_eq!(
        body_json(&seen[0].body),
        serde_json::json!({
            "query": "latest tech news",
            "similarity_top_k": 9,
            "ref": "",
            "num_articles_ref": 0
        })
    );
}

#[test]
fn ai_recommendations_sends_options() {
    let state = MockState::fixtures();
    let addr = start_server(state.clone());
    let app = DappierApp::new(API_KEY)
        .unwrap()
        .with_base_url(&format!("http://{addr}/app/datamodel/{NEWS_DATAMODEL_ID}"));

    app.ai_recommendations(
        "latest tech news",
        NEWS_DATAMODEL_ID,
        &[
            RecommendationsOption::similarity_top_k(5),
            RecommendationsOption::reference("techcrunch.com"),
            RecommendationsOption::num_articles_ref(2),
        ],
    )
    .unwrap();

    let body = body_json(&state.blocking_requests()[0].body);
    assert_eq!(body["similarity_top_k"], 5);
    assert_eq!(body["ref"], "techcrunch.com");
    assert_eq!(body["num_articles_ref"], 2);
}

#[test]
fn ai_recommendations_override_url_is_not_extended() {
    let state = MockState::replying(Reply::new(200, r#"{"results":[{"title":"Custom"}]}"#));
    let addr = start_server(state.clone());
    let app = DappierApp::new(API_KEY)
        .unwrap()
        .with_base_url(&format!("http://{addr}/custom"));

    let result = app.ai_recommendations("q", "dm_x", &[]).unwrap();
    assert_eq!(result.results[0].title, "Custom");
    assert_eq!(state.blocking_requests()[0].path, "/custom");
}

#[test]
fn ai_recommendations_invalid_arguments() {
    let state = MockState::fixtures();
    let addr = start_server(state.clone());
    let app = realtime_app(addr);

    let err = app.ai_recommendations("", "dm_x", &[]).unwrap_err();
    assert!(err.to_string().contains("query"));

    let err = app.ai_recommendations("q", "", &[]).unwrap_err();
    assert!(err.to_string().contains("datamodel"));

    assert!(state.blocking_requests().is_empty());
}

#[test]
fn ai_recommendations_error_responses() {
    let cases = [
        (Reply::new(503, r#"{"error":"busy"}"#), "status"),
        (Reply::new(200, "not json"), "decode"),
        (Reply::new(200, r#"{"results":[]}"#), "empty"),
    ];
    for (reply, kind) in cases {
        let addr = start_server(MockState::replying(reply));
        let app = DappierApp::new(API_KEY)
            .unwrap()
            .with_base_url(&format!("http://{addr}/app/datamodel/dm_x"));

        let err = app.ai_recommendations("q", "dm_x", &[]).unwrap_err();
        match kind {
            "status" => {
                assert_eq!(err.status(), Some(503));
                assert!(err.is_transient());
            }
            "decode" => assert!(matches!(err, ApiError::DeserializationError(_))),
            "empty" => assert!(matches!(err, ApiError::EmptyResult)),
            other => panic!("unknown case: {other}"),
        }
    }
}

#[test]
fn unauthorized_response_carries_body() {
    let state = MockState::fixtures();
    let addr = start_server(state);
    let app = realtime_app(addr);

    // Bypass the handle so the request goes out without a bearer token.
    let mut request = app.build_realtime_search("q").unwrap();
    request.headers.retain(|(name, _)| name != "Authorization");
    let response = dappier_core::HttpClient::execute(&UreqClient::new(), &request).unwrap();

    let err = app.parse_realtime_search(response).unwrap_err();
    match err {
        ApiError::UnexpectedStatus { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("bearer"));
        }
        other => panic!("expected UnexpectedStatus, got {other:?}"),
    }
}
