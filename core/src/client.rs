//! `DappierApp`: request building, dispatch and response parsing.
//!
//! # Design
//! Each operation is split three ways. `build_*` validates inputs and
//! produces an `HttpRequest` with no I/O. `parse_*` turns an `HttpResponse`
//! into a typed result. The plain method (`realtime_search`,
//! `ai_recommendations`) runs build, dispatch through the configured
//! `HttpClient`, and parse in one call.
//!
//! The handle holds no mutable state, so it can be cloned and shared across
//! threads as long as its `HttpClient` can.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::ApiError;
use crate::http::{HttpClient, HttpRequest, HttpResponse, UreqClient};
use crate::options::RecommendationsOption;
use crate::types::{
    decode_object, decode_objects, AiRecommendationsRequest, AiRecommendationsResult,
    RealtimeSearchRequest, RealtimeSearchResult,
};

pub const BASE_URL: &str = "https://api.dappier.com/app/datamodel";
pub const REALTIME_DATAMODEL_ID: &str = "dm_01hpsxyfm2fwdt2zet9cg6fdxt";
pub const CONTENT_TYPE: &str = "application/json";

/// Client handle for the Dappier datamodel API.
#[derive(Clone)]
pub struct DappierApp {
    api_key: String,
    http_client: Arc<dyn HttpClient>,
    base_url: Option<String>,
}

impl DappierApp {
    /// Create a handle using the default `UreqClient`.
    ///
    /// Fails with `InvalidArgument` if `api_key` is empty.
    pub fn new(api_key: &str) -> Result<Self, ApiError> {
        if api_key.is_empty() {
            return Err(ApiError::InvalidArgument("API key"));
        }
        Ok(Self {
            api_key: api_key.to_string(),
            http_client: Arc::new(UreqClient::new()),
            base_url: None,
        })
    }

    /// Replace the HTTP client used to execute requests.
    pub fn with_http_client(mut self, client: impl HttpClient + 'static) -> Self {
        self.http_client = Arc::new(client);
        self
    }

    /// Send every request to `url` verbatim instead of the vendor host.
    ///
    /// Meant for pointing the client at a local mock server. Note that the
    /// recommendations datamodel id is not appended to an override URL.
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = Some(url.to_string());
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url_override(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn realtime_search_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.clone(),
            None => format!("{BASE_URL}/{REALTIME_DATAMODEL_ID}"),
        }
    }

    // TODO: append `datamodel_id` to the override too once the tests that
    // rely on the verbatim override point at per-datamodel mock routes.
    pub fn recommendations_url(&self, datamodel_id: &str) -> String {
        match &self.base_url {
            Some(url) => url.clone(),
            None => format!("{BASE_URL}/{datamodel_id}"),
        }
    }

    // -----------------------------------------------------------------------
    // Realtime search
    // -----------------------------------------------------------------------

    pub fn build_realtime_search(&self, query: &str) -> Result<HttpRequest, ApiError> {
        if query.is_empty() {
            return Err(ApiError::InvalidArgument("query"));
        }
        let payload = RealtimeSearchRequest {
            query: query.to_string(),
        };
        let body = serde_json::to_string(&payload).map_err(ApiError::SerializationError)?;
        Ok(self.post_json(self.realtime_search_url(), body))
    }

    /// Decode a realtime search response and keep only its first element.
    pub fn parse_realtime_search(
        &self,
        response: HttpResponse,
    ) -> Result<RealtimeSearchResult, ApiError> {
        check_status(&response)?;
        let results: Vec<RealtimeSearchResult> =
            decode_objects(&response.body).map_err(ApiError::DeserializationError)?;
        results.into_iter().next().ok_or(ApiError::EmptyResult)
    }

    /// Ask the realtime search datamodel a natural language question.
    pub fn realtime_search(&self, query: &str) -> Result<RealtimeSearchResult, ApiError> {
        let request = self.build_realtime_search(query)?;
        let response = self.execute(&request)?;
        self.parse_realtime_search(response)
    }

    // -----------------------------------------------------------------------
    // AI recommendations
    // -----------------------------------------------------------------------

    pub fn build_ai_recommendations(
        &self,
        query: &str,
        datamodel_id: &str,
        options: &[RecommendationsOption],
    ) -> Result<HttpRequest, ApiError> {
        if query.is_empty() {
            return Err(ApiError::InvalidArgument("query"));
        }
        if datamodel_id.is_empty() {
            return Err(ApiError::InvalidArgument("datamodel ID"));
        }

        let mut payload = AiRecommendationsRequest::new(query);
        for option in options {
            option.apply(&mut payload);
        }

        let body = serde_json::to_string(&payload).map_err(ApiError::SerializationError)?;
        Ok(self.post_json(self.recommendations_url(datamodel_id), body))
    }

    pub fn parse_ai_recommendations(
        &self,
        response: HttpResponse,
    ) -> Result<AiRecommendationsResult, ApiError> {
        check_status(&response)?;
        let result: AiRecommendationsResult =
            decode_object(&response.body).map_err(ApiError::DeserializationError)?;
        if result.results.is_empty() {
            return Err(ApiError::EmptyResult);
        }
        Ok(result)
    }

    /// Fetch ranked article recommendations from the datamodel `datamodel_id`.
    ///
    /// `query` may be a natural language query or a URL; for a URL the API
    /// summarizes the page and searches from that summary.
    pub fn ai_recommendations(
        &self,
        query: &str,
        datamodel_id: &str,
        options: &[RecommendationsOption],
    ) -> Result<AiRecommendationsResult, ApiError> {
        let request = self.build_ai_recommendations(query, datamodel_id, options)?;
        let response = self.execute(&request)?;
        self.parse_ai_recommendations(response)
    }

    fn post_json(&self, url: String, body: String) -> HttpRequest {
        HttpRequest {
            url,
            headers: vec![
                ("Content-Type".to_string(), CONTENT_TYPE.to_string()),
                ("Authorization".to_string(), format!("Bearer {}", self.api_key)),
            ],
            body,
        }
    }

    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(url = %request.url, "dispatching request");
        let response = self.http_client.execute(request)?;
        debug!(status = response.status, "received response");
        Ok(response)
    }
}

impl fmt::Debug for DappierApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DappierApp")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Only 200 counts as success.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.status == 200 {
        return Ok(());
    }
    Err(ApiError::UnexpectedStatus {
        status: response.status,
        body: response.body.clone(),
    })
}
