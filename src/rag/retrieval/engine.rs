// Two-stage retrieval: similarity search, then rule-group expansion
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::embedding::Embedder;
use crate::errors::Result;
use crate::vector_db::{RulePayload, RuleStore, StoredRule};

/// Search parameters for retrieval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Nearest points fetched by similarity
    pub top_k: usize,
    /// Cap on points fetched by the group expansion scroll
    pub expansion_limit: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            top_k: 5,
            expansion_limit: 100,
        }
    }
}

/// Distinct `rule_group` values of the hits, sorted
pub fn hit_groups(hits: &[StoredRule]) -> Vec<String> {
    hits.iter()
        .map(|hit| hit.payload.rule_group.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Deduplicate by rule number (later entries win) and sort by rule number string
pub fn dedup_sorted(rules: impl IntoIterator<Item = RulePayload>) -> Vec<RulePayload> {
    let unique: BTreeMap<String, RulePayload> = rules
        .into_iter()
        .map(|rule| (rule.rule_number.clone(), rule))
        .collect();
    unique.into_values().collect()
}

/// Retrieval engine over a rule store
pub struct RetrievalEngine<'a> {
    embedder: &'a dyn Embedder,
    store: &'a dyn RuleStore,
    params: SearchParams,
}

impl<'a> RetrievalEngine<'a> {
    pub fn new(embedder: &'a dyn Embedder, store: &'a dyn RuleStore) -> Self {
        Self::with_params(embedder, store, SearchParams::default())
    }

    pub fn with_params(embedder: &'a dyn Embedder, store: &'a dyn RuleStore, params: SearchParams) -> Self {
        Self {
            embedder,
            store,
            params,
        }
    }

    /// Top-k nearest rules for a question, best first
    pub async fn similar(&self, question: &str) -> Result<Vec<StoredRule>> {
        let vector = self.embedder.embed(question)?;
        self.store.search(&vector, self.params.top_k).await
    }

    /// Similarity search expanded to every rule sharing a hit's rule group.
    ///
    /// Returns rules unique by `rule_number`, sorted by string order.
    pub async fn search_with_expansion(&self, question: &str) -> Result<Vec<RulePayload>> {
        let hits = self.similar(question).await?;

        let groups = hit_groups(&hits);

        let expanded = self
            .store
            .scroll_groups(&groups, self.params.expansion_limit)
            .await?;

        tracing::debug!(
            hits = hits.len(),
            groups = groups.len(),
            expanded = expanded.len(),
            "retrieved rules"
        );

        Ok(dedup_sorted(
            hits.into_iter()
                .chain(expanded)
                .map(|stored| stored.payload),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(number: &str, group: &str, text: &str) -> RulePayload {
        RulePayload {
            rule_number: number.to_string(),
            rule_group: group.to_string(),
            rule_root: number[..3].to_string(),
            text: text.to_string(),
            examples: Vec::new(),
            source_doc: "doc".to_string(),
        }
    }

    fn stored(number: &str, group: &str) -> StoredRule {
        StoredRule {
            id: number.to_string(),
            score: Some(0.5),
            payload: payload(number, group, number),
        }
    }

    #[test]
    fn test_search_params_default() {
        let params = SearchParams::default();
        assert_eq!(params.top_k, 5);
        assert_eq!(params.expansion_limit, 100);
    }

    #[test]
    fn test_hit_groups_distinct_and_sorted() {
        let hits = vec![stored("702.9b", "702.9"), stored("100.1a", "100.1"), stored("702.9c", "702.9")];
        assert_eq!(hit_groups(&hits), vec!["100.1", "702.9"]);
        assert!(hit_groups(&[]).is_empty());
    }

    #[test]
    fn test_dedup_sorted_is_lexicographic() {
        let rules = vec![
            payload("100.2", "", "two"),
            payload("100.10", "", "ten"),
            payload("100.1a", "100.1", "one-a"),
        ];
        let numbers: Vec<String> = dedup_sorted(rules).into_iter().map(|r| r.rule_number).collect();
        assert_eq!(numbers, vec!["100.10", "100.1a", "100.2"]);
    }

    #[test]
    fn test_dedup_last_write_wins() {
        let rules = vec![payload("100.1a", "100.1", "first"), payload("100.1a", "100.1", "second")];
        let deduped = dedup_sorted(rules);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].text, "second");
    }
}
