use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

pub const REALTIME_DATAMODEL_ID: &str = "dm_01hpsxyfm2fwdt2zet9cg6fdxt";

pub const REALTIME_FIXTURE: &str =
    r#"[{"response":{"results":"Election Day is November 5, 2024"}}]"#;

pub const RECOMMENDATIONS_FIXTURE: &str = r#"{"results":[{"author":"Jane Doe","image_url":"https://images.example.com/ai.jpg","preview_content":"A look at this week's AI launches.","pubdate":"Mon, 07 Oct 2024 10:00:00 +0000","pubdate_unix":1728295200,"score":0.92,"site":"TechCrunch","site_domain":"techcrunch.com","title":"Test Title","url":"https://techcrunch.com/2024/10/07/test-title"}]}"#;

/// A fixed status and body returned for every request.
#[derive(Clone, Debug)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

/// What the server saw for one request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecordedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Clone, Debug, Default)]
pub struct MockState {
    reply: Option<Reply>,
    requests: Arc<RwLock<Vec<RecordedRequest>>>,
}

impl MockState {
    /// Serve the built-in fixtures, keyed by datamodel id.
    pub fn fixtures() -> Self {
        Self::default()
    }

    /// Answer every request with `reply`, whatever the path.
    pub fn replying(reply: Reply) -> Self {
        Self {
            reply: Some(reply),
            requests: Arc::default(),
        }
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.read().await.clone()
    }

    /// Like `requests`, for callers outside the server's runtime.
    pub fn blocking_requests(&self) -> Vec<RecordedRequest> {
        self.requests.blocking_read().clone()
    }

    async fn record(&self, uri: &Uri, headers: &HeaderMap, body: String) {
        let get = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let request = RecordedRequest {
            path: uri.path().to_string(),
            authorization: get(header::AUTHORIZATION),
            content_type: get(header::CONTENT_TYPE),
            body,
        };
        debug!(path = %request.path, "recorded request");
        self.requests.write().await.push(request);
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

pub fn app(state: MockState) -> Router {
    Router::new()
        .route("/app/datamodel/{id}", post(datamodel))
        .fallback(fallback)
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: MockState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}

async fn datamodel(
    State(state): State<MockState>,
    Path(id): Path<String>,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    state.record(&uri, &headers, body).await;
    if let Some(reply) = &state.reply {
        return canned(reply);
    }

    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.strip_prefix("Bearer ").is_some_and(|key| !key.is_empty()));
    if !authorized {
        return json_response(
            StatusCode::UNAUTHORIZED,
            error_json("missing or malformed bearer token"),
        );
    }

    if id == REALTIME_DATAMODEL_ID {
        json_response(StatusCode::OK, REALTIME_FIXTURE.to_string())
    } else {
        json_response(StatusCode::OK, RECOMMENDATIONS_FIXTURE.to_string())
    }
}

async fn fallback(
    State(state): State<MockState>,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    state.record(&uri, &headers, body).await;
    match &state.reply {
        Some(reply) => canned(reply),
        None => json_response(StatusCode::NOT_FOUND, error_json("unknown route")),
    }
}

fn canned(reply: &Reply) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    json_response(status, reply.body.clone())
}

fn json_response(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

fn error_json(message: &str) -> String {
    serde_json::to_string(&ErrorBody { error: message }).unwrap_or_default()
}
