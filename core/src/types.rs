//! Request and response DTOs for the Dappier datamodel API.
//!
//! # Design
//! Field names follow the vendor's snake_case wire names. Response fields
//! that are missing or `null` decode to their zero value instead of failing
//! the whole response. Structs only decode from JSON objects; serde's derived
//! impls would also take an array, so response bodies go through
//! `decode_object` / `decode_objects`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Request payload for the realtime search datamodel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealtimeSearchRequest {
    pub query: String,
}

/// One element of the realtime search response array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealtimeSearchResult {
    #[serde(deserialize_with = "object_or_null")]
    pub response: RealtimeSearchResponse,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealtimeSearchResponse {
    /// The synthesized answer text.
    #[serde(deserialize_with = "null_as_default")]
    pub results: String,
}

/// Request payload for the AI recommendations datamodels.
///
/// Start from `AiRecommendationsRequest::new` to get the vendor defaults,
/// then adjust with `RecommendationsOption`s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiRecommendationsRequest {
    /// Natural language query, or a URL to summarize and search from.
    pub query: String,
    /// Number of articles to return.
    pub similarity_top_k: u32,
    /// Domain the recommendations should come from. Empty means no filter.
    #[serde(rename = "ref")]
    pub reference: String,
    /// How many articles are guaranteed to match `reference`.
    pub num_articles_ref: u32,
}

impl AiRecommendationsRequest {
    pub const DEFAULT_SIMILARITY_TOP_K: u32 = 9;

    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_string(),
            similarity_top_k: Self::DEFAULT_SIMILARITY_TOP_K,
            reference: String::new(),
            num_articles_ref: 0,
        }
    }
}

/// Response of the AI recommendations datamodels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiRecommendationsResult {
    #[serde(deserialize_with = "objects_or_null")]
    pub results: Vec<Article>,
}

/// A single recommended article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Article {
    #[serde(deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(deserialize_with = "null_as_default")]
    pub image_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub preview_content: String,
    #[serde(rename = "pubdate", deserialize_with = "null_as_default")]
    pub pub_date: String,
    #[serde(rename = "pubdate_unix", deserialize_with = "null_as_default")]
    pub pub_date_unix: i64,
    /// Relevance score assigned by the API.
    #[serde(deserialize_with = "null_as_default")]
    pub score: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub site: String,
    #[serde(deserialize_with = "null_as_default")]
    pub site_domain: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
}

/// Decode a body that must be a JSON object. `null` yields `T::default()`.
pub(crate) fn decode_object<T>(body: &str) -> serde_json::Result<T>
where
    T: DeserializeOwned + Default,
{
    let mut de = serde_json::Deserializer::from_str(body);
    let value = object_or_null(&mut de)?;
    de.end()?;
    Ok(value)
}

/// Decode a body that must be a JSON array of objects. `null` yields an
/// empty vector.
pub(crate) fn decode_objects<T>(body: &str) -> serde_json::Result<Vec<T>>
where
    T: DeserializeOwned + Default,
{
    let mut de = serde_json::Deserializer::from_str(body);
    let values = objects_or_null(&mut de)?;
    de.end()?;
    Ok(values)
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn from_map<T, E>(map: Option<Map<String, Value>>) -> Result<T, E>
where
    T: DeserializeOwned + Default,
    E: serde::de::Error,
{
    match map {
        Some(map) => serde_json::from_value(Value::Object(map)).map_err(E::custom),
        None => Ok(T::default()),
    }
}

// `Map` only deserializes from a JSON object, which keeps arrays out.
fn object_or_null<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    from_map(Option::<Map<String, Value>>::deserialize(deserializer)?)
}

fn objects_or_null<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Option::<Vec<Option<Map<String, Value>>>>::deserialize(deserializer)?
        .unwrap_or_default()
        .into_iter()
        .map(from_map::<T, D::Error>)
        .collect()
}
