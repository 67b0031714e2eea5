//! Conversion of typed source records into the row objects bound to the
//! upsert statements.
//!
//! Everything here is pure. Property objects never carry `null` values or
//! an `id` key, so merging them onto an existing node only adds or
//! overwrites fields.

use ragport_core::{
    strip_quotes, CommunityRecord, CommunityReportRecord, CovariateRecord, DocumentRecord,
    EntityRecord, RelationshipRecord, TextUnitRecord, TypeLabel,
};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Covariate columns that link rather than describe.
pub const COVARIATE_DENYLIST: [&str; 4] = ["id", "text_unit_id", "document_ids", "n_tokens"];

/// Insert `value` unless it is null.
fn put(properties: &mut Map<String, Value>, key: &str, value: impl Into<Value>) {
    let value = value.into();
    if !value.is_null() {
        properties.insert(key.to_string(), value);
    }
}

pub fn document_rows(records: &[DocumentRecord]) -> Vec<Value> {
    records
        .iter()
        .map(|d| json!({ "id": d.id, "title": d.title }))
        .collect()
}

pub fn chunk_rows(records: &[TextUnitRecord]) -> Vec<Value> {
    records
        .iter()
        .map(|c| {
            json!({
                "id": c.id,
                "text": c.text,
                "n_tokens": c.n_tokens,
                "document_ids": c.document_ids,
            })
        })
        .collect()
}

pub fn entity_row(record: &EntityRecord) -> Value {
    let label = TypeLabel::derive(record.entity_type.as_deref());
    let mut row = Map::new();
    put(&mut row, "id", record.id.as_str());
    put(&mut row, "name", strip_quotes(&record.title));
    put(&mut row, "entity_type", record.entity_type.as_deref().map(strip_quotes));
    put(&mut row, "labels", label.to_labels());
    put(&mut row, "description", record.description.clone());
    put(&mut row, "human_readable_id", record.human_readable_id);
    put(&mut row, "text_unit_ids", record.text_unit_ids.clone());
    put(&mut row, "description_embedding", record.description_embedding.clone());
    Value::Object(row)
}

pub fn entity_rows(records: &[EntityRecord]) -> Vec<Value> {
    records.iter().map(entity_row).collect()
}

pub fn relationship_rows(records: &[RelationshipRecord]) -> Vec<Value> {
    records
        .iter()
        .map(|r| {
            json!({
                "id": r.id,
                "source": strip_quotes(&r.source),
                "target": strip_quotes(&r.target),
                "weight": r.weight,
                "combined_degree": r.combined_degree,
                "human_readable_id": r.human_readable_id,
                "description": r.description,
                "text_unit_ids": r.text_unit_ids,
            })
        })
        .collect()
}

pub fn community_rows(records: &[CommunityRecord]) -> Vec<Value> {
    records
        .iter()
        .map(|c| {
            let mut properties = Map::new();
            put(&mut properties, "community", c.community.to_value());
            put(&mut properties, "level", c.level);
            put(&mut properties, "title", c.title.clone());
            put(&mut properties, "text_unit_ids", c.text_unit_ids.clone());
            json!({
                "community": c.community.to_value(),
                "relationship_ids": c.relationship_ids,
                "properties": properties,
            })
        })
        .collect()
}

/// Properties of the finding at `position`.
///
/// Object findings contribute their non-null fields; anything else is
/// stored as `content`.
pub fn finding_properties(community: &Value, position: usize, finding: &Value) -> Map<String, Value> {
    let mut properties = Map::new();
    match finding {
        Value::Object(fields) => {
            for (key, value) in fields {
                if key != "id" {
                    put(&mut properties, key, value.clone());
                }
            }
        }
        Value::Null => {}
        other => put(&mut properties, "content", other.clone()),
    }
    properties.insert("community".to_string(), community.clone());
    properties.insert("position".to_string(), Value::from(position));
    properties
}

pub fn community_report_rows(records: &[CommunityReportRecord]) -> Vec<Value> {
    records
        .iter()
        .map(|r| {
            let community = r.community.to_value();
            let mut properties = Map::new();
            put(&mut properties, "community", community.clone());
            put(&mut properties, "level", r.level);
            put(&mut properties, "title", r.title.clone());
            put(&mut properties, "summary", r.summary.clone());
            put(&mut properties, "rank", r.rank);
            put(&mut properties, "rank_explanation", r.rank_explanation.clone());
            put(&mut properties, "full_content", r.full_content.clone());
            put(&mut properties, "report_id", r.id.clone());

            let findings: Vec<Value> = r
                .findings
                .iter()
                .enumerate()
                .map(|(position, finding)| {
                    json!({
                        "position": position,
                        "properties": finding_properties(&community, position, finding),
                    })
                })
                .collect();

            json!({
                "community": community,
                "properties": properties,
                "findings": findings,
            })
        })
        .collect()
}

/// Descriptive columns of a covariate: non-null, non-empty and not a link.
pub fn covariate_properties(record: &CovariateRecord) -> Map<String, Value> {
    record
        .fields
        .iter()
        .filter(|(key, _)| !COVARIATE_DENYLIST.contains(&key.as_str()))
        .filter(|(_, value)| match value {
            Value::Null => false,
            Value::String(s) => !s.is_empty(),
            _ => true,
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

pub fn covariate_rows(records: &[CovariateRecord]) -> Vec<Value> {
    records
        .iter()
        .map(|c| {
            let text_unit_id = c.text_unit_id.as_deref().filter(|id| !id.is_empty());
            json!({
                "id": c.id,
                "text_unit_id": text_unit_id,
                "properties": covariate_properties(c),
            })
        })
        .collect()
}

/// Relationship ids that occur more than once, with their counts.
pub fn duplicate_relationship_ids(records: &[RelationshipRecord]) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for record in records {
        *counts.entry(record.id.clone()).or_default() += 1;
    }
    counts.retain(|_, count| *count > 1);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use ragport_core::CommunityId;

    fn entity(title: &str, entity_type: Option<&str>) -> EntityRecord {
        EntityRecord {
            id: "e1".to_string(),
            title: title.to_string(),
            entity_type: entity_type.map(str::to_string),
            description: Some("x".to_string()),
            human_readable_id: Some(0),
            text_unit_ids: vec!["c1".to_string()],
            description_embedding: None,
        }
    }

    fn relationship(id: &str) -> RelationshipRecord {
        RelationshipRecord {
            id: id.to_string(),
            source: "\"Foo\"".to_string(),
            target: "Bar\"".to_string(),
            weight: Some(1.5),
            combined_degree: Some(3),
            human_readable_id: None,
            description: None,
            text_unit_ids: Vec::new(),
        }
    }

    #[test]
    fn entity_rows_carry_stripped_name_and_type_label() {
        let row = entity_row(&entity("\"Acme\"", Some("\"ORGANIZATION\"")));
        assert_eq!(row["name"], "Acme");
        assert_eq!(row["entity_type"], "ORGANIZATION");
        assert_eq!(row["labels"], json!(["Organization"]));
        assert!(row.get("description_embedding").is_none());
    }

    #[test]
    fn untyped_entities_get_no_label() {
        let row = entity_row(&entity("A", Some("  ")));
        assert_eq!(row["labels"], json!([]));

        let row = entity_row(&entity("A", None));
        assert_eq!(row["labels"], json!([]));
        assert!(row.get("entity_type").is_none());
    }

    #[test]
    fn relationship_endpoints_are_stripped() {
        let rows = relationship_rows(&[relationship("r1")]);
        assert_eq!(rows[0]["source"], "Foo");
        assert_eq!(rows[0]["target"], "Bar");
        assert_eq!(rows[0]["weight"], 1.5);
    }

    #[test]
    fn duplicate_ids_are_counted() {
        let records = vec![relationship("r1"), relationship("r2"), relationship("r1")];
        let duplicates = duplicate_relationship_ids(&records);
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates["r1"], 2);
        assert!(duplicate_relationship_ids(&records[..2]).is_empty());
    }

    #[test]
    fn community_properties_omit_missing_fields() {
        let rows = community_rows(&[CommunityRecord {
            community: CommunityId::Number(4),
            level: None,
            title: Some("Community 4".to_string()),
            text_unit_ids: Vec::new(),
            relationship_ids: vec!["r1".to_string()],
        }]);
        let properties = rows[0]["properties"].as_object().unwrap();
        assert_eq!(properties["community"], 4);
        assert!(!properties.contains_key("level"));
        assert_eq!(rows[0]["relationship_ids"], json!(["r1"]));
    }

    #[test]
    fn findings_keep_position_and_content() {
        let rows = community_report_rows(&[CommunityReportRecord {
            id: Some("rep-1".to_string()),
            community: CommunityId::Number(4),
            level: Some(0),
            title: Some("T".to_string()),
            summary: Some("S".to_string()),
            findings: vec![
                json!({"summary": "first", "explanation": "why", "id": 9}),
                json!("plain text"),
            ],
            rank: Some(7.5),
            rank_explanation: None,
            full_content: None,
        }]);

        let properties = rows[0]["properties"].as_object().unwrap();
        assert_eq!(properties["report_id"], "rep-1");
        assert!(!properties.contains_key("id"));
        assert!(!properties.contains_key("rank_explanation"));

        let findings = rows[0]["findings"].as_array().unwrap();
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0]["properties"]["summary"], "first");
        assert!(findings[0]["properties"].get("id").is_none());
        assert_eq!(findings[1]["position"], 1);
        assert_eq!(findings[1]["properties"]["content"], "plain text");
        assert_eq!(findings[1]["properties"]["community"], 4);
    }

    #[test]
    fn covariate_properties_drop_links_and_blanks() {
        let record: CovariateRecord = serde_json::from_value(json!({
            "id": "cov1",
            "text_unit_id": "c1",
            "document_ids": ["d1"],
            "n_tokens": 10,
            "type": "claim",
            "status": "TRUE",
            "description": "",
            "object_id": null,
            "human_readable_id": 3
        }))
        .unwrap();

        let properties = covariate_properties(&record);
        let mut keys: Vec<_> = properties.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["human_readable_id", "status", "type"]);

        let rows = covariate_rows(&[record]);
        assert_eq!(rows[0]["text_unit_id"], "c1");
    }

    proptest! {
        #[test]
        fn entity_rows_never_keep_quotes(title in "[ -~]{1,30}", kind in "[ -~]{0,20}") {
            let row = entity_row(&entity(&title, Some(&kind)));
            prop_assert!(!row["name"].as_str().unwrap().contains('"'));
            for label in row["labels"].as_array().unwrap() {
                let label = label.as_str().unwrap();
                prop_assert!(label.chars().all(char::is_alphanumeric));
            }
        }
    }
}
