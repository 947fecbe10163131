use crate::error::{Result, SearchError};
use netrag_protocol::{EnhancedResults, Outcome, SearchHit, DEFAULT_CATEGORY_LIMIT};
use netrag_vector_store::{where_eq, CollectionHandle, QueryRequest, QueryResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const ERROR_PATTERNS: &str = "error_patterns";
const BEST_PRACTICES: &str = "best_practices";
const GENERAL: &str = "general";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Restrict the general pool of enhanced search to `general` documents
    pub scope_general_pool: bool,
}

/// Pool sizes for enhanced search: 60% general, 20% error patterns, 20% best practices
///
/// Each share is rounded up, so small limits still query every pool.
pub fn pool_sizes(limit: usize) -> (usize, usize, usize) {
    let general = (3 * limit).div_ceil(5);
    let minor = limit.div_ceil(5);
    (general, minor, minor)
}

/// Similarity search over the shared collection
pub struct RetrievalService {
    handle: Arc<CollectionHandle>,
    config: RetrievalConfig,
}

impl RetrievalService {
    pub fn new(handle: Arc<CollectionHandle>, config: RetrievalConfig) -> Self {
        Self { handle, config }
    }

    /// Nearest chunks, closest first, optionally restricted to one category
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
        category: Option<&str>,
    ) -> Outcome<Vec<SearchHit>> {
        match self.try_search(query, limit, category).await {
            Ok(hits) => Outcome::ok(hits),
            Err(e) => {
                log::error!("Error searching documents: {e}");
                Outcome::failed(Vec::new(), e.to_string())
            }
        }
    }

    pub async fn search_error_patterns(
        &self,
        query: &str,
        limit: Option<usize>,
    ) -> Outcome<Vec<SearchHit>> {
        self.search(
            query,
            limit.unwrap_or(DEFAULT_CATEGORY_LIMIT),
            Some(ERROR_PATTERNS),
        )
        .await
    }

    pub async fn search_best_practices(
        &self,
        query: &str,
        limit: Option<usize>,
    ) -> Outcome<Vec<SearchHit>> {
        self.search(
            query,
            limit.unwrap_or(DEFAULT_CATEGORY_LIMIT),
            Some(BEST_PRACTICES),
        )
        .await
    }

    /// General documents plus error-pattern and best-practice pools, queried concurrently
    ///
    /// Pools are returned as-is: no merging, re-ranking or deduplication. A failing pool
    /// comes back empty next to the others and marks the outcome failed.
    pub async fn enhanced_search(&self, query: &str, limit: usize) -> Outcome<EnhancedResults> {
        let (general_limit, errors_limit, practices_limit) = pool_sizes(limit);
        let general_scope = self.config.scope_general_pool.then_some(GENERAL);

        let (general, error_patterns, best_practices) = tokio::join!(
            self.try_search(query, general_limit, general_scope),
            self.try_search(query, errors_limit, Some(ERROR_PATTERNS)),
            self.try_search(query, practices_limit, Some(BEST_PRACTICES)),
        );

        let mut failures = Vec::new();
        let mut pool = |name: &str, result: Result<Vec<SearchHit>>| {
            result.unwrap_or_else(|e| {
                log::error!("Error searching {name} pool: {e}");
                failures.push(format!("{name}: {e}"));
                Vec::new()
            })
        };
        let results = EnhancedResults {
            general: pool(GENERAL, general),
            error_patterns: pool(ERROR_PATTERNS, error_patterns),
            best_practices: pool(BEST_PRACTICES, best_practices),
        };

        log::debug!(
            "Enhanced search '{query}': {} general, {} error patterns, {} best practices",
            results.general.len(),
            results.error_patterns.len(),
            results.best_practices.len()
        );

        if failures.is_empty() {
            Outcome::ok(results)
        } else {
            Outcome::failed(results, failures.join("; "))
        }
    }

    async fn try_search(
        &self,
        query: &str,
        limit: usize,
        category: Option<&str>,
    ) -> Result<Vec<SearchHit>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let collection = self.handle.collection()?;
        let request = QueryRequest::new(query, limit)
            .filter(category.map(|category| where_eq("category", category)));
        let response = collection.query(request).await?;
        hits_from_response(response)
    }
}

/// First (and only) query row of a response as hits
fn hits_from_response(response: QueryResponse) -> Result<Vec<SearchHit>> {
    let ids = response.ids.into_iter().next().unwrap_or_default();
    let documents = response.documents.into_iter().next().unwrap_or_default();
    let metadatas = response.metadatas.into_iter().next().unwrap_or_default();
    let distances = response.distances.into_iter().next().unwrap_or_default();

    if documents.len() != ids.len() || metadatas.len() != ids.len() || distances.len() != ids.len()
    {
        return Err(SearchError::MalformedResponse(format!(
            "{} ids, {} documents, {} metadatas, {} distances",
            ids.len(),
            documents.len(),
            metadatas.len(),
            distances.len()
        )));
    }

    Ok(ids
        .into_iter()
        .zip(documents)
        .zip(metadatas)
        .zip(distances)
        .map(|(((id, content), metadata), distance)| SearchHit {
            id,
            content,
            metadata,
            distance,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn pool_sizes_round_up() {
        assert_eq!(pool_sizes(10), (6, 2, 2));
        assert_eq!(pool_sizes(5), (3, 1, 1));
        assert_eq!(pool_sizes(1), (1, 1, 1));
        assert_eq!(pool_sizes(0), (0, 0, 0));
        assert_eq!(pool_sizes(7), (5, 2, 2));
    }

    #[test]
    fn mismatched_columns_are_rejected() {
        let response = QueryResponse {
            ids: vec![vec!["a".into(), "b".into()]],
            documents: vec![vec!["x".into()]],
            metadatas: vec![vec![Default::default(), Default::default()]],
            distances: vec![vec![0.1, 0.2]],
        };
        assert!(matches!(
            hits_from_response(response),
            Err(SearchError::MalformedResponse(_))
        ));
    }

    #[test]
    fn empty_response_has_no_hits() {
        let response = QueryResponse {
            ids: vec![],
            documents: vec![],
            metadatas: vec![],
            distances: vec![],
        };
        assert!(hits_from_response(response).unwrap().is_empty());
    }
}
