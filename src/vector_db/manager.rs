// Qdrant-backed rule store
use async_trait::async_trait;
use qdrant_client::{
    qdrant::{
        point_id::PointIdOptions, value::Kind, Condition, CreateCollectionBuilder, Distance,
        Filter, ListValue, PointId, PointStruct, ScrollPointsBuilder, SearchPointsBuilder,
        UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
    },
    Qdrant,
};
use std::collections::HashMap;

use crate::errors::{JudgeError, Result};
use crate::vector_db::{IndexedPoint, RulePayload, RuleStore, StoredRule};

/// Default gRPC endpoint of a local Qdrant
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";
pub const DEFAULT_COLLECTION: &str = "mtg_rules";

/// Rule store backed by one Qdrant collection
pub struct QdrantRuleStore {
    client: Qdrant,
    collection: String,
}

impl QdrantRuleStore {
    /// Connect to Qdrant; no request is made until the first operation
    pub fn new(url: &str, api_key: Option<String>, collection: impl Into<String>) -> Result<Self> {
        let mut builder = Qdrant::from_url(url);
        if let Some(key) = api_key {
            builder = builder.api_key(key);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            collection: collection.into(),
        })
    }
}

#[async_trait]
impl RuleStore for QdrantRuleStore {
    async fn recreate_collection(&self, dimension: usize) -> Result<()> {
        if self.client.collection_exists(self.collection.clone()).await? {
            tracing::info!(collection = %self.collection, "dropping existing collection");
            self.client.delete_collection(self.collection.clone()).await?;
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(dimension as u64, Distance::Cosine)),
            )
            .await?;
        Ok(())
    }

    async fn upsert(&self, points: Vec<IndexedPoint>) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        let points: Vec<PointStruct> = points
            .into_iter()
            .map(|point| {
                PointStruct::new(
                    point.id.to_string(),
                    point.vector,
                    payload_to_qdrant(&point.payload),
                )
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await?;
        Ok(())
    }

    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<StoredRule>> {
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, vector.to_vec(), limit as u64)
                    .with_payload(true),
            )
            .await?;

        response
            .result
            .into_iter()
            .map(|point| {
                Ok(StoredRule {
                    id: point_id_to_string(&point.id),
                    score: Some(point.score),
                    payload: payload_from_qdrant(&point.payload)?,
                })
            })
            .collect()
    }

    async fn scroll_groups(&self, groups: &[String], limit: usize) -> Result<Vec<StoredRule>> {
        if groups.is_empty() {
            return Ok(Vec::new());
        }
        let filter = Filter::should(
            groups
                .iter()
                .map(|group| Condition::matches("rule_group", group.clone())),
        );
        self.scroll(filter, limit).await
    }

    async fn find_rule(&self, rule_number: &str) -> Result<Option<StoredRule>> {
        let filter = Filter::must([Condition::matches("rule_number", rule_number.to_string())]);
        Ok(self.scroll(filter, 1).await?.into_iter().next())
    }

    async fn count(&self) -> Result<u64> {
        let info = self.client.collection_info(self.collection.clone()).await?;
        Ok(info.result.and_then(|r| r.points_count).unwrap_or(0))
    }
}

impl QdrantRuleStore {
    async fn scroll(&self, filter: Filter, limit: usize) -> Result<Vec<StoredRule>> {
        let response = self
            .client
            .scroll(
                ScrollPointsBuilder::new(&self.collection)
                    .filter(filter)
                    .limit(limit as u32)
                    .with_payload(true),
            )
            .await?;

        response
            .result
            .into_iter()
            .map(|point| {
                Ok(StoredRule {
                    id: point_id_to_string(&point.id),
                    score: None,
                    payload: payload_from_qdrant(&point.payload)?,
                })
            })
            .collect()
    }
}

// Helper functions for type conversions
fn payload_to_qdrant(payload: &RulePayload) -> HashMap<String, QdrantValue> {
    let mut map = HashMap::new();
    map.insert("rule_number".to_string(), QdrantValue::from(payload.rule_number.clone()));
    map.insert("rule_group".to_string(), QdrantValue::from(payload.rule_group.clone()));
    map.insert("rule_root".to_string(), QdrantValue::from(payload.rule_root.clone()));
    map.insert("text".to_string(), QdrantValue::from(payload.text.clone()));
    map.insert("source_doc".to_string(), QdrantValue::from(payload.source_doc.clone()));
    map.insert(
        "examples".to_string(),
        QdrantValue {
            kind: Some(Kind::ListValue(ListValue {
                values: payload
                    .examples
                    .iter()
                    .map(|ex| QdrantValue::from(ex.clone()))
                    .collect(),
            })),
        },
    );
    map
}

fn payload_from_qdrant(payload: &HashMap<String, QdrantValue>) -> Result<RulePayload> {
    let required = |key: &str| {
        payload
            .get(key)
            .and_then(qdrant_value_to_string)
            .ok_or_else(|| JudgeError::VectorStore(format!("point payload missing '{}'", key)))
    };
    let optional = |key: &str| payload.get(key).and_then(qdrant_value_to_string).unwrap_or_default();

    let examples = match payload.get("examples").and_then(|v| v.kind.as_ref()) {
        Some(Kind::ListValue(list)) => list.values.iter().filter_map(qdrant_value_to_string).collect(),
        _ => Vec::new(),
    };

    Ok(RulePayload {
        rule_number: required("rule_number")?,
        text: required("text")?,
        rule_group: optional("rule_group"),
        rule_root: optional("rule_root"),
        source_doc: optional("source_doc"),
        examples,
    })
}

fn qdrant_value_to_string(value: &QdrantValue) -> Option<String> {
    match value.kind.as_ref()? {
        Kind::StringValue(s) => Some(s.clone()),
        _ => None,
    }
}

fn point_id_to_string(point_id: &Option<PointId>) -> String {
    match point_id.as_ref().and_then(|id| id.point_id_options.as_ref()) {
        Some(PointIdOptions::Num(n)) => n.to_string(),
        Some(PointIdOptions::Uuid(u)) => u.clone(),
        None => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> RulePayload {
        RulePayload {
            rule_number: "702.9b".to_string(),
            rule_group: "702.9".to_string(),
            rule_root: "702".to_string(),
            text: "702.9b Deathtouch.\nExamples:\nExample: one.\nExample: two.".to_string(),
            examples: vec!["Example: one.".to_string(), "Example: two.".to_string()],
            source_doc: "doc".to_string(),
        }
    }

    #[test]
    fn test_payload_conversion_preserves_fields() {
        let original = payload();
        let converted = payload_from_qdrant(&payload_to_qdrant(&original)).unwrap();
        assert_eq!(converted, original);
    }

    #[test]
    fn test_payload_without_rule_number_is_error() {
        let mut map = payload_to_qdrant(&payload());
        map.remove("rule_number");
        assert!(payload_from_qdrant(&map).is_err());
    }

    #[test]
    fn test_payload_without_examples_defaults_empty() {
        let mut map = payload_to_qdrant(&payload());
        map.remove("examples");
        assert!(payload_from_qdrant(&map).unwrap().examples.is_empty());
    }

    #[test]
    fn test_point_id_to_string() {
        let uuid = "2c6b2d7e-0bb3-4d2c-9a0f-3f0f5a1b9c11".to_string();
        assert_eq!(point_id_to_string(&Some(PointId::from(uuid.clone()))), uuid);
        assert_eq!(point_id_to_string(&Some(PointId::from(7u64))), "7");
        assert_eq!(point_id_to_string(&None), "unknown");
    }

    #[tokio::test]
    #[ignore] // Integration test - requires Qdrant
    async fn test_recreate_and_count() {
        let store = QdrantRuleStore::new(DEFAULT_QDRANT_URL, None, "mtgjudge_test").unwrap();
        store.recreate_collection(4).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
