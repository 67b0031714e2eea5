//! Typed rows of the GraphRAG output tables.
//!
//! Column names follow the current GraphRAG output. Older column names are
//! accepted through serde aliases. Every listed column must be present, but
//! may be null: a null array reads as an empty list and a null scalar as
//! `None`. A missing column is a deserialization error.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// The column must be present; a null value reads as `None`.
fn required_nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub title: String,
}

/// A chunk of source text, the unit of extraction and citation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextUnitRecord {
    pub id: String,
    pub text: String,
    pub n_tokens: i64,
    #[serde(deserialize_with = "null_as_empty")]
    pub document_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: String,
    #[serde(alias = "name")]
    pub title: String,
    #[serde(rename = "type", deserialize_with = "required_nullable")]
    pub entity_type: Option<String>,
    #[serde(deserialize_with = "required_nullable")]
    pub description: Option<String>,
    #[serde(deserialize_with = "required_nullable")]
    pub human_readable_id: Option<i64>,
    #[serde(deserialize_with = "null_as_empty")]
    pub text_unit_ids: Vec<String>,
    /// Precomputed embedding of `description`, when the table carries one.
    #[serde(default)]
    pub description_embedding: Option<Vec<f32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(deserialize_with = "required_nullable")]
    pub weight: Option<f64>,
    #[serde(alias = "rank", deserialize_with = "required_nullable")]
    pub combined_degree: Option<i64>,
    #[serde(deserialize_with = "required_nullable")]
    pub human_readable_id: Option<i64>,
    #[serde(deserialize_with = "required_nullable")]
    pub description: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub text_unit_ids: Vec<String>,
}

/// Community structure: membership is derived from `relationship_ids`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityRecord {
    pub community: CommunityId,
    #[serde(deserialize_with = "required_nullable")]
    pub level: Option<i64>,
    #[serde(deserialize_with = "required_nullable")]
    pub title: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub text_unit_ids: Vec<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub relationship_ids: Vec<String>,
}

/// Community narrative content, merged onto the same node as [`CommunityRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityReportRecord {
    #[serde(deserialize_with = "required_nullable")]
    pub id: Option<String>,
    pub community: CommunityId,
    #[serde(deserialize_with = "required_nullable")]
    pub level: Option<i64>,
    #[serde(deserialize_with = "required_nullable")]
    pub title: Option<String>,
    #[serde(deserialize_with = "required_nullable")]
    pub summary: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub findings: Vec<Value>,
    #[serde(deserialize_with = "required_nullable")]
    pub rank: Option<f64>,
    #[serde(alias = "rating_explanation", deserialize_with = "required_nullable")]
    pub rank_explanation: Option<String>,
    #[serde(deserialize_with = "required_nullable")]
    pub full_content: Option<String>,
}

/// A claim with a free-form set of columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CovariateRecord {
    pub id: String,
    pub text_unit_id: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Community key as written by the indexer.
///
/// Depending on the GraphRAG version the key is an integer or a numeric
/// string. Both forms normalize to [`CommunityId::Number`] so structure and
/// reports land on the same node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommunityId {
    Number(i64),
    Text(String),
}

impl CommunityId {
    pub fn to_value(&self) -> Value {
        match self {
            CommunityId::Number(n) => Value::from(*n),
            CommunityId::Text(s) => Value::from(s.as_str()),
        }
    }
}

impl From<i64> for CommunityId {
    fn from(value: i64) -> Self {
        CommunityId::Number(value)
    }
}

impl From<&str> for CommunityId {
    fn from(value: &str) -> Self {
        match value.trim().parse::<i64>() {
            Ok(n) => CommunityId::Number(n),
            Err(_) => CommunityId::Text(value.to_string()),
        }
    }
}

impl fmt::Display for CommunityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommunityId::Number(n) => write!(f, "{n}"),
            CommunityId::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for CommunityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CommunityId::Number(n) => serializer.serialize_i64(*n),
            CommunityId::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for CommunityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        match Value::deserialize(deserializer)? {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .map(CommunityId::Number)
                .ok_or_else(|| D::Error::custom(format!("invalid community id {n}"))),
            Value::String(s) => Ok(CommunityId::from(s.as_str())),
            other => Err(D::Error::custom(format!(
                "community id must be a number or string, got {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entity_accepts_legacy_name_column() {
        let entity: EntityRecord = serde_json::from_value(json!({
            "id": "e1",
            "name": "A",
            "type": "person",
            "description": "x",
            "human_readable_id": 0,
            "text_unit_ids": ["c1"]
        }))
        .unwrap();

        assert_eq!(entity.title, "A");
        assert_eq!(entity.entity_type.as_deref(), Some("person"));
        assert!(entity.description_embedding.is_none());
    }

    #[test]
    fn missing_array_column_is_an_error() {
        let result = serde_json::from_value::<TextUnitRecord>(json!({
            "id": "c1",
            "text": "hello",
            "n_tokens": 1
        }));
        let message = result.unwrap_err().to_string();
        assert!(message.contains("document_ids"), "{message}");
    }

    #[test]
    fn missing_scalar_column_is_an_error() {
        let result = serde_json::from_value::<EntityRecord>(json!({
            "id": "e1",
            "title": "A",
            "description": "x",
            "human_readable_id": 0,
            "text_unit_ids": []
        }));
        let message = result.unwrap_err().to_string();
        assert!(message.contains("missing field `type`"), "{message}");

        let result = serde_json::from_value::<CommunityReportRecord>(json!({
            "id": "rep1",
            "community": 1,
            "level": 0,
            "title": "T",
            "summary": "S",
            "findings": [],
            "rank_explanation": "r",
            "full_content": "F"
        }));
        let message = result.unwrap_err().to_string();
        assert!(message.contains("missing field `rank`"), "{message}");
    }

    #[test]
    fn null_scalar_column_reads_as_none() {
        let entity: EntityRecord = serde_json::from_value(json!({
            "id": "e1",
            "title": "A",
            "type": null,
            "description": null,
            "human_readable_id": null,
            "text_unit_ids": []
        }))
        .unwrap();
        assert!(entity.entity_type.is_none());
        assert!(entity.description.is_none());
    }

    #[test]
    fn null_array_column_reads_as_empty() {
        let unit: TextUnitRecord = serde_json::from_value(json!({
            "id": "c1",
            "text": "hello",
            "n_tokens": 1,
            "document_ids": null
        }))
        .unwrap();
        assert!(unit.document_ids.is_empty());
    }

    #[test]
    fn relationship_accepts_legacy_rank() {
        let rel: RelationshipRecord = serde_json::from_value(json!({
            "id": "r1",
            "source": "A",
            "target": "B",
            "weight": 2.0,
            "rank": 5,
            "human_readable_id": null,
            "description": null,
            "text_unit_ids": []
        }))
        .unwrap();
        assert_eq!(rel.combined_degree, Some(5));
        assert_eq!(rel.weight, Some(2.0));
    }

    #[test]
    fn community_ids_normalize_numeric_strings() {
        let community: CommunityRecord = serde_json::from_value(json!({
            "community": "7",
            "level": 0,
            "title": "Community 7",
            "text_unit_ids": null,
            "relationship_ids": ["r1"]
        }))
        .unwrap();
        assert_eq!(community.community, CommunityId::Number(7));

        let report: CommunityReportRecord = serde_json::from_value(json!({
            "id": null,
            "community": 7.0,
            "level": 0,
            "title": "Community 7",
            "summary": null,
            "findings": null,
            "rank": null,
            "rating_explanation": "high",
            "full_content": null
        }))
        .unwrap();
        assert_eq!(report.community, community.community);
        assert_eq!(report.rank_explanation.as_deref(), Some("high"));
        assert!(report.findings.is_empty());

        assert_eq!(
            CommunityId::from("cluster-a"),
            CommunityId::Text("cluster-a".to_string())
        );
    }

    #[test]
    fn covariate_keeps_free_form_columns() {
        let covariate: CovariateRecord = serde_json::from_value(json!({
            "id": "cv1",
            "text_unit_id": "c1",
            "subject_id": "A",
            "status": "TRUE",
            "n_tokens": 12
        }))
        .unwrap();

        assert_eq!(covariate.text_unit_id.as_deref(), Some("c1"));
        assert_eq!(covariate.fields["subject_id"], json!("A"));
        assert!(!covariate.fields.contains_key("id"));
    }
}
