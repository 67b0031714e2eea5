//! Store-level behavior of the import statements against in-memory SurrealDB.

mod common;

use common::*;
use ragport_core::{EdgeType, GraphStore, ImportError, Mutation, NodeLabel};
use serde_json::json;

#[tokio::test]
async fn constraints_can_be_reapplied() {
    let store = store().await;
    store.apply_schema().await.unwrap();
    store.apply_schema().await.unwrap();
}

#[tokio::test]
async fn documents_are_upserted_not_duplicated() {
    let store = store().await;
    let rows = vec![document("d1"), document("d2")];

    let first = import(&store, Mutation::Documents, rows.clone(), 1000)
        .await
        .unwrap();
    let second = import(&store, Mutation::Documents, rows, 1000).await.unwrap();

    assert_eq!(first.counters.nodes_created, 2);
    assert_eq!(second.counters.nodes_created, 0);
    assert_eq!(second.counters.rows, 2);
    assert_eq!(store.count_nodes(NodeLabel::Document).await.unwrap(), 2);
}

#[tokio::test]
async fn updated_properties_overwrite_in_place() {
    let store = store().await;
    import(&store, Mutation::Documents, vec![document("d1")], 10)
        .await
        .unwrap();
    import(
        &store,
        Mutation::Documents,
        vec![json!({ "id": "d1", "title": "Renamed" })],
        10,
    )
    .await
    .unwrap();

    let mut response = store
        .db()
        .query("SELECT VALUE title FROM document")
        .await
        .unwrap();
    let titles: Vec<String> = response.take(0).unwrap();
    assert_eq!(titles, vec!["Renamed".to_string()]);
}

#[tokio::test]
async fn chunk_links_skip_unknown_documents() {
    let store = store().await;
    import(&store, Mutation::Documents, vec![document("d1")], 10)
        .await
        .unwrap();

    let outcome = import(
        &store,
        Mutation::Chunks,
        vec![chunk("c1", &["d1", "never-imported"])],
        10,
    )
    .await
    .unwrap();

    assert_eq!(outcome.counters.nodes_created, 1);
    assert_eq!(outcome.counters.edges_created, 1);
    assert_eq!(store.count_nodes(NodeLabel::Chunk).await.unwrap(), 1);
    assert_eq!(store.count_edges(EdgeType::PartOf).await.unwrap(), 1);
}

#[tokio::test]
async fn entity_import_is_idempotent_with_links() {
    let store = store().await;
    import(&store, Mutation::Documents, vec![document("d1")], 10)
        .await
        .unwrap();
    import(&store, Mutation::Chunks, vec![chunk("c1", &["d1"]), chunk("c2", &["d1"])], 10)
        .await
        .unwrap();

    let rows = vec![
        entity("e1", "A", &["Person"], &["c1", "c2"]),
        entity("e2", "B", &[], &["c2", "c9"]),
    ];
    import(&store, Mutation::Entities, rows.clone(), 10)
        .await
        .unwrap();
    let again = import(&store, Mutation::Entities, rows, 10).await.unwrap();

    assert!(again.counters.is_empty());
    assert_eq!(store.count_nodes(NodeLabel::Entity).await.unwrap(), 2);
    assert_eq!(store.count_edges(EdgeType::HasEntity).await.unwrap(), 3);
    assert_eq!(store.count_tagged("Person").await.unwrap(), 1);
}

#[tokio::test]
async fn final_state_does_not_depend_on_batch_size() {
    let rows: Vec<_> = (0..7)
        .map(|i| entity(&format!("e{i}"), &format!("Name {i}"), &["Thing"], &["c1"]))
        .collect();

    let mut snapshots = Vec::new();
    for batch_size in [1, 3, 1000] {
        let store = store().await;
        import(&store, Mutation::Documents, vec![document("d1")], batch_size)
            .await
            .unwrap();
        import(&store, Mutation::Chunks, vec![chunk("c1", &["d1"])], batch_size)
            .await
            .unwrap();
        let outcome = import(&store, Mutation::Entities, rows.clone(), batch_size)
            .await
            .unwrap();
        assert_eq!(outcome.batches, 7usize.div_ceil(batch_size));

        let mut response = store
            .db()
            .query("SELECT name, labels, description FROM entity ORDER BY name")
            .await
            .unwrap();
        let entities: Vec<serde_json::Value> = response.take(0).unwrap();
        snapshots.push((
            entities,
            store.count_edges(EdgeType::HasEntity).await.unwrap(),
        ));
    }

    assert_eq!(snapshots[0], snapshots[1]);
    assert_eq!(snapshots[1], snapshots[2]);
    assert_eq!(snapshots[0].1, 7);
}

#[tokio::test]
async fn relationships_resolve_endpoints_by_name() {
    let store = store().await;
    seed_path(&store).await;

    assert_eq!(store.count_edges(EdgeType::Related).await.unwrap(), 2);

    let dangling = import(
        &store,
        Mutation::Relationships,
        vec![relationship("r3", "A", "Nobody")],
        10,
    )
    .await
    .unwrap();
    assert_eq!(dangling.counters.edges_created, 0);
    assert_eq!(store.count_edges(EdgeType::Related).await.unwrap(), 2);
}

#[tokio::test]
async fn repeated_relationship_id_updates_the_existing_edge() {
    let store = store().await;
    seed_path(&store).await;

    let mut changed = relationship("r1", "A", "B");
    changed["weight"] = json!(9.5);
    import(&store, Mutation::Relationships, vec![changed], 10)
        .await
        .unwrap();

    assert_eq!(store.count_edges(EdgeType::Related).await.unwrap(), 2);
    let mut response = store
        .db()
        .query("SELECT VALUE weight FROM related WHERE relationship_id = 'r1'")
        .await
        .unwrap();
    let weights: Vec<f64> = response.take(0).unwrap();
    assert_eq!(weights, vec![9.5]);
}

#[tokio::test]
async fn community_membership_is_derived_without_duplicates() {
    let store = store().await;
    seed_path(&store).await;

    let rows = vec![community(1, &["r1", "r2"])];
    let first = import(&store, Mutation::Communities, rows.clone(), 10)
        .await
        .unwrap();
    import(&store, Mutation::Communities, rows, 10).await.unwrap();

    // A, B and C each linked once although B ends both relationships.
    assert_eq!(first.counters.edges_created, 3);
    assert_eq!(store.count_edges(EdgeType::InCommunity).await.unwrap(), 3);
    assert_eq!(store.count_nodes(NodeLabel::Community).await.unwrap(), 1);
}

#[tokio::test]
async fn reports_and_structure_merge_onto_one_community() {
    let store = store().await;
    seed_path(&store).await;

    let report = json!({
        "community": 1,
        "properties": {
            "community": 1,
            "level": 0,
            "summary": "A and B work together",
            "rank": 7.5,
            "full_content": "# Community 1"
        },
        "findings": [
            { "position": 0, "properties": { "community": 1, "position": 0, "summary": "first", "explanation": "..." } },
            { "position": 1, "properties": { "community": 1, "position": 1, "content": "second" } }
        ]
    });

    // Narrative content first, structure second.
    import(&store, Mutation::CommunityReports, vec![report.clone()], 10)
        .await
        .unwrap();
    import(&store, Mutation::Communities, vec![community(1, &["r1"])], 10)
        .await
        .unwrap();
    import(&store, Mutation::CommunityReports, vec![report], 10)
        .await
        .unwrap();

    assert_eq!(store.count_nodes(NodeLabel::Community).await.unwrap(), 1);
    assert_eq!(store.count_nodes(NodeLabel::Finding).await.unwrap(), 2);
    assert_eq!(store.count_edges(EdgeType::HasFinding).await.unwrap(), 2);
    assert_eq!(store.count_edges(EdgeType::InCommunity).await.unwrap(), 2);

    let mut response = store
        .db()
        .query("SELECT title, summary FROM community")
        .await
        .unwrap();
    let communities: Vec<serde_json::Value> = response.take(0).unwrap();
    assert_eq!(communities[0]["title"], json!("Community 1"));
    assert_eq!(communities[0]["summary"], json!("A and B work together"));
}

#[tokio::test]
async fn covariate_without_chunk_is_left_dangling() {
    let store = store().await;
    import(&store, Mutation::Documents, vec![document("d1")], 10)
        .await
        .unwrap();
    import(&store, Mutation::Chunks, vec![chunk("c1", &["d1"])], 10)
        .await
        .unwrap();

    let rows = vec![
        json!({ "id": "cv1", "text_unit_id": "c1", "properties": { "subject_id": "A", "status": "TRUE" } }),
        json!({ "id": "cv2", "text_unit_id": "c404", "properties": { "subject_id": "B" } }),
        json!({ "id": "cv3", "properties": { "subject_id": "C" } }),
    ];
    import(&store, Mutation::Covariates, rows, 10).await.unwrap();

    assert_eq!(store.count_nodes(NodeLabel::Covariate).await.unwrap(), 3);
    assert_eq!(store.count_edges(EdgeType::HasCovariate).await.unwrap(), 1);
}

#[tokio::test]
async fn constraint_violation_keeps_earlier_batches() {
    let store = store().await;
    let rows = vec![
        entity("e1", "Same", &[], &[]),
        entity("e2", "Other", &[], &[]),
        entity("e3", "Same", &[], &[]),
        entity("e4", "Later", &[], &[]),
    ];

    let err = import(&store, Mutation::Entities, rows, 2)
        .await
        .unwrap_err();

    match err {
        ImportError::Batch {
            batch, committed, ..
        } => {
            assert_eq!(batch, 1);
            assert_eq!(committed, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    // The failing batch is rolled back as a whole.
    assert_eq!(store.count_nodes(NodeLabel::Entity).await.unwrap(), 2);
}

#[tokio::test]
async fn reimport_without_vectors_keeps_stored_embeddings() {
    let store = store().await;
    import(&store, Mutation::Documents, vec![document("d1")], 10)
        .await
        .unwrap();
    import(&store, Mutation::Chunks, vec![chunk("c1", &["d1"])], 10)
        .await
        .unwrap();

    let mut embedded = entity("e1", "A", &["Person"], &["c1"]);
    embedded["description_embedding"] = json!([0.5, 0.25]);
    import(&store, Mutation::Entities, vec![embedded], 10)
        .await
        .unwrap();

    let mut renamed = entity("e1", "A", &["Person"], &["c1"]);
    renamed["description"] = json!("updated");
    import(&store, Mutation::Entities, vec![renamed], 10)
        .await
        .unwrap();

    let mut response = store
        .db()
        .query("SELECT description, description_embedding FROM entity")
        .await
        .unwrap();
    let entities: Vec<serde_json::Value> = response.take(0).unwrap();
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0]["description"], json!("updated"));
    assert_eq!(entities[0]["description_embedding"], json!([0.5, 0.25]));
}
