//! Shared helpers for store integration tests.
#![allow(dead_code)]

use ragport_core::{apply_in_batches, BatchOutcome, GraphStore, ImportResult, Mutation};
use ragport_surrealdb::SurrealGraphStore;
use serde_json::{json, Value};

/// Fresh in-memory store with constraints applied.
pub async fn store() -> SurrealGraphStore {
    let store = SurrealGraphStore::memory().await.expect("in-memory store");
    store.apply_schema().await.expect("schema");
    store
}

pub async fn import(
    store: &SurrealGraphStore,
    mutation: Mutation,
    rows: Vec<Value>,
    batch_size: usize,
) -> ImportResult<BatchOutcome> {
    let statement = store.statement(mutation);
    apply_in_batches(store, &statement, rows, batch_size).await
}

pub fn document(id: &str) -> Value {
    json!({ "id": id, "title": format!("Title {id}") })
}

pub fn chunk(id: &str, documents: &[&str]) -> Value {
    json!({ "id": id, "text": format!("text of {id}"), "n_tokens": 3, "document_ids": documents })
}

pub fn entity(id: &str, name: &str, labels: &[&str], chunks: &[&str]) -> Value {
    json!({
        "id": id,
        "name": name,
        "entity_type": labels.first().map(|l| l.to_uppercase()),
        "labels": labels,
        "description": format!("about {name}"),
        "human_readable_id": 0,
        "text_unit_ids": chunks
    })
}

pub fn relationship(id: &str, source: &str, target: &str) -> Value {
    json!({
        "id": id,
        "source": source,
        "target": target,
        "weight": 1.0,
        "combined_degree": 2,
        "human_readable_id": 0,
        "description": format!("{source} relates to {target}"),
        "text_unit_ids": ["c1"]
    })
}

pub fn community(key: i64, relationship_ids: &[&str]) -> Value {
    json!({
        "community": key,
        "relationship_ids": relationship_ids,
        "properties": {
            "community": key,
            "level": 0,
            "title": format!("Community {key}")
        }
    })
}

/// Three entities A, B, C linked A->B (r1) and B->C (r2), all seen in chunk c1.
pub async fn seed_path(store: &SurrealGraphStore) {
    import(store, Mutation::Documents, vec![document("d1")], 10)
        .await
        .unwrap();
    import(store, Mutation::Chunks, vec![chunk("c1", &["d1"])], 10)
        .await
        .unwrap();
    import(
        store,
        Mutation::Entities,
        vec![
            entity("e1", "A", &["Person"], &["c1"]),
            entity("e2", "B", &["Person"], &["c1"]),
            entity("e3", "C", &[], &["c1"]),
        ],
        10,
    )
    .await
    .unwrap();
    import(
        store,
        Mutation::Relationships,
        vec![relationship("r1", "A", "B"), relationship("r2", "B", "C")],
        10,
    )
    .await
    .unwrap();
}
