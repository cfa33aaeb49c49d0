//! Optional overrides for the AI recommendations request.

use crate::types::AiRecommendationsRequest;

/// One override applied to an `AiRecommendationsRequest`.
///
/// Options are applied in the order they are passed; when two options touch
/// the same field the later one wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecommendationsOption {
    SimilarityTopK(u32),
    Ref(String),
    NumArticlesRef(u32),
}

impl RecommendationsOption {
    /// Number of articles to return. Defaults to 9.
    pub fn similarity_top_k(k: u32) -> Self {
        RecommendationsOption::SimilarityTopK(k)
    }

    /// Domain the recommendations should come from, e.g. `techcrunch.com`.
    pub fn reference(domain: impl Into<String>) -> Self {
        RecommendationsOption::Ref(domain.into())
    }

    /// How many articles must match the domain given with `reference`.
    pub fn num_articles_ref(n: u32) -> Self {
        RecommendationsOption::NumArticlesRef(n)
    }

    pub fn apply(&self, request: &mut AiRecommendationsRequest) {
        match self {
            RecommendationsOption::SimilarityTopK(k) => request.similarity_top_k = *k,
            RecommendationsOption::Ref(domain) => request.reference.clone_from(domain),
            RecommendationsOption::NumArticlesRef(n) => request.num_articles_ref = *n,
        }
    }
}
