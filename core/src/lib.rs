//! Synchronous client for the Dappier realtime search and AI recommendations API.
//!
//! # Overview
//! `DappierApp` wraps the vendor's JSON-over-HTTPS datamodel endpoints behind
//! two typed operations:
//! - `realtime_search`: one synthesized answer built from live web search.
//! - `ai_recommendations`: ranked articles from a chosen datamodel, tunable
//!   with `RecommendationsOption`s.
//!
//! # Design
//! - Every call is a single blocking POST. No retries, caching or pagination.
//! - Requests and responses are plain data (`HttpRequest` / `HttpResponse`),
//!   and the I/O itself goes through the `HttpClient` trait. `UreqClient` is
//!   the default; any other implementation can be injected.
//! - `build_*` and `parse_*` are public so callers can run the round-trip
//!   themselves.
//!
//! ```no_run
//! use dappier_core::{DappierApp, RecommendationsOption};
//!
//! # fn main() -> Result<(), dappier_core::ApiError> {
//! let app = DappierApp::new("my-api-key")?;
//! let answer = app.realtime_search("when is election in USA")?;
//! println!("{}", answer.response.results);
//!
//! let news = app.ai_recommendations(
//!     "latest tech news",
//!     "dm_02hr75e8ate6adr15hjrf3ikol",
//!     &[RecommendationsOption::reference("techcrunch.com")],
//! )?;
//! for article in &news.results {
//!     println!("{} ({})", article.title, article.site_domain);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod http;
pub mod options;
pub mod types;

pub use client::{DappierApp, BASE_URL, CONTENT_TYPE, REALTIME_DATAMODEL_ID};
pub use error::{ApiError, BoxError, TransportError};
pub use http::{HttpClient, HttpRequest, HttpResponse, UreqClient};
pub use options::RecommendationsOption;
pub use types::{
    AiRecommendationsRequest, AiRecommendationsResult, Article, RealtimeSearchRequest,
    RealtimeSearchResponse, RealtimeSearchResult,
};
