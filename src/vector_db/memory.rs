//! In-process rule store
//!
//! Brute-force cosine search over a vector of points. Mirrors the Qdrant
//! store's semantics closely enough for offline runs and tests: upsert
//! replaces by id, scrolls return points in id order.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::{JudgeError, Result};
use crate::vector_db::{IndexedPoint, RuleStore, StoredRule};

#[derive(Default)]
pub struct InMemoryRuleStore {
    dimension: RwLock<Option<usize>>,
    points: RwLock<Vec<IndexedPoint>>,
}

impl InMemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn stored(point: &IndexedPoint, score: Option<f32>) -> StoredRule {
        StoredRule {
            id: point.id.to_string(),
            score,
            payload: point.payload.clone(),
        }
    }

    async fn scroll_where<F>(&self, limit: usize, predicate: F) -> Vec<StoredRule>
    where
        F: Fn(&IndexedPoint) -> bool,
    {
        let points = self.points.read().await;
        let mut matched: Vec<&IndexedPoint> = points.iter().filter(|p| predicate(p)).collect();
        matched.sort_by_key(|p| p.id);
        matched
            .into_iter()
            .take(limit)
            .map(|p| Self::stored(p, None))
            .collect()
    }
}

/// Cosine similarity; zero when either vector has zero length
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl RuleStore for InMemoryRuleStore {
    async fn recreate_collection(&self, dimension: usize) -> Result<()> {
        *self.dimension.write().await = Some(dimension);
        self.points.write().await.clear();
        Ok(())
    }

    async fn upsert(&self, new_points: Vec<IndexedPoint>) -> Result<()> {
        let dimension = *self.dimension.read().await;
        let mut points = self.points.write().await;
        for point in new_points {
            if let Some(expected) = dimension {
                if point.vector.len() != expected {
                    return Err(JudgeError::DimensionMismatch {
                        expected,
                        actual: point.vector.len(),
                    });
                }
            }
            match points.iter_mut().find(|p| p.id == point.id) {
                Some(existing) => *existing = point,
                None => points.push(point),
            }
        }
        Ok(())
    }

    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<StoredRule>> {
        let points = self.points.read().await;
        let mut scored: Vec<(f32, &IndexedPoint)> = points
            .iter()
            .map(|p| (cosine_similarity(vector, &p.vector), p))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(score, p)| Self::stored(p, Some(score)))
            .collect())
    }

    async fn scroll_groups(&self, groups: &[String], limit: usize) -> Result<Vec<StoredRule>> {
        if groups.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .scroll_where(limit, |p| groups.iter().any(|g| *g == p.payload.rule_group))
            .await)
    }

    async fn find_rule(&self, rule_number: &str) -> Result<Option<StoredRule>> {
        Ok(self
            .scroll_where(1, |p| p.payload.rule_number == rule_number)
            .await
            .into_iter()
            .next())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.points.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_db::RulePayload;
    use uuid::Uuid;

    fn point(n: u128, number: &str, group: &str, vector: Vec<f32>) -> IndexedPoint {
        IndexedPoint {
            id: Uuid::from_u128(n),
            vector,
            payload: RulePayload {
                rule_number: number.to_string(),
                rule_group: group.to_string(),
                rule_root: number[..3].to_string(),
                text: format!("{} text", number),
                examples: Vec::new(),
                source_doc: "doc".to_string(),
            },
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity() {
        let store = InMemoryRuleStore::new();
        store.recreate_collection(2).await.unwrap();
        store
            .upsert(vec![
                point(1, "100.1a", "100.1", vec![0.0, 1.0]),
                point(2, "100.1b", "100.1", vec![1.0, 0.1]),
            ])
            .await
            .unwrap();

        let hits = store.search(&[1.0, 0.0], 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].payload.rule_number, "100.1b");
        assert!(hits[0].score.is_some());
    }

    #[tokio::test]
    async fn test_upsert_replaces_same_id() {
        let store = InMemoryRuleStore::new();
        store.upsert(vec![point(1, "100.1a", "100.1", vec![1.0])]).await.unwrap();
        store.upsert(vec![point(1, "100.1b", "100.1", vec![1.0])]).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
        assert!(store.find_rule("100.1a").await.unwrap().is_none());
        assert!(store.find_rule("100.1b").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_recreate_clears_and_checks_dimension() {
        let store = InMemoryRuleStore::new();
        store.upsert(vec![point(1, "100.1a", "100.1", vec![1.0])]).await.unwrap();
        store.recreate_collection(3).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);

        let err = store
            .upsert(vec![point(2, "100.1b", "100.1", vec![1.0])])
            .await
            .unwrap_err();
        assert!(matches!(err, JudgeError::DimensionMismatch { expected: 3, actual: 1 }));
    }

    #[tokio::test]
    async fn test_scroll_groups_respects_limit_and_filter() {
        let store = InMemoryRuleStore::new();
        store
            .upsert(vec![
                point(1, "100.1a", "100.1", vec![1.0]),
                point(2, "100.1b", "100.1", vec![1.0]),
                point(3, "702.9a", "702.9", vec![1.0]),
            ])
            .await
            .unwrap();

        let groups = vec!["100.1".to_string()];
        assert_eq!(store.scroll_groups(&groups, 100).await.unwrap().len(), 2);
        assert_eq!(store.scroll_groups(&groups, 1).await.unwrap().len(), 1);
        assert!(store.scroll_groups(&[], 100).await.unwrap().is_empty());
    }
}
