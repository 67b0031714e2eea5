//! SurrealQL upsert statements, one per [`Mutation`].
//!
//! Every statement iterates the bound `$rows` list. Nodes are upserted by
//! record id so re-imports update in place. Edges are created only when
//! both endpoints exist and no edge of the same type already joins them,
//! which gives the same result as merging on the pattern.

use ragport_core::{Mutation, Statement};

/// Relate `$from` to `$to` through `edge` unless already related.
///
/// `require` names the endpoint variable that may be missing, in which case
/// the edge is skipped without error.
fn link(edge: &str, from: &str, to: &str, require: Option<&str>) -> String {
    let mut conditions = Vec::new();
    let mut lets = String::new();
    if let Some(var) = require {
        lets.push_str(&format!(
            "LET $found = SELECT VALUE id FROM {var};\n        "
        ));
        conditions.push("array::len($found) > 0".to_string());
    }
    // Walk the outgoing edges of `from` rather than scanning the edge table.
    lets.push_str(&format!(
        "LET $linked = SELECT VALUE id FROM {from}->{edge} WHERE out = {to};"
    ));
    conditions.push("array::len($linked) = 0".to_string());

    format!(
        "{lets}
        IF {} {{
            RELATE {from}->{edge}->{to} RETURN NONE;
        }};",
        conditions.join(" AND ")
    )
}

const DOCUMENTS: &str = "
FOR $row IN $rows {
    LET $document = type::thing('document', $row.id);
    UPSERT $document SET title = $row.title RETURN NONE;
};";

fn chunks() -> String {
    format!(
        "
FOR $row IN $rows {{
    LET $chunk = type::thing('chunk', $row.id);
    UPSERT $chunk SET text = $row.text, n_tokens = $row.n_tokens RETURN NONE;
    FOR $document_id IN $row.document_ids {{
        LET $document = type::thing('document', $document_id);
        {}
    }};
}};",
        link("part_of", "$chunk", "$document", Some("$document"))
    )
}

fn entities() -> String {
    format!(
        "
FOR $row IN $rows {{
    LET $entity = type::thing('entity', $row.id);
    UPSERT $entity SET
        name = $row.name,
        entity_type = $row.entity_type,
        labels = $row.labels,
        description = $row.description,
        human_readable_id = $row.human_readable_id
    RETURN NONE;
    IF $row.description_embedding {{
        UPDATE $entity SET description_embedding = $row.description_embedding RETURN NONE;
    }};
    FOR $chunk_id IN $row.text_unit_ids {{
        LET $chunk = type::thing('chunk', $chunk_id);
        {}
    }};
}};",
        link("has_entity", "$chunk", "$entity", Some("$chunk"))
    )
}

// Endpoints are resolved by exact name; rows carry quote-stripped names.
const RELATIONSHIPS: &str = "
FOR $row IN $rows {
    LET $sources = SELECT VALUE id FROM entity WHERE name = $row.source LIMIT 1;
    LET $targets = SELECT VALUE id FROM entity WHERE name = $row.target LIMIT 1;
    IF array::len($sources) > 0 AND array::len($targets) > 0 {
        LET $source = $sources[0];
        LET $target = $targets[0];
        LET $existing = SELECT VALUE id FROM related WHERE relationship_id = $row.id;
        IF array::len($existing) = 0 {
            RELATE $source->related->$target SET
                relationship_id = $row.id,
                weight = $row.weight,
                combined_degree = $row.combined_degree,
                human_readable_id = $row.human_readable_id,
                description = $row.description,
                text_unit_ids = $row.text_unit_ids
            RETURN NONE;
        } ELSE {
            LET $edge = $existing[0];
            UPDATE $edge SET
                weight = $row.weight,
                combined_degree = $row.combined_degree,
                human_readable_id = $row.human_readable_id,
                description = $row.description,
                text_unit_ids = $row.text_unit_ids
            RETURN NONE;
        };
    };
};";

// Membership is recomputed from the endpoints of the listed relationships.
fn communities() -> String {
    format!(
        "
FOR $row IN $rows {{
    LET $community = type::thing('community', $row.community);
    LET $properties = $row.properties;
    UPSERT $community MERGE $properties RETURN NONE;
    LET $sources = SELECT VALUE in FROM related WHERE relationship_id IN $row.relationship_ids;
    LET $targets = SELECT VALUE out FROM related WHERE relationship_id IN $row.relationship_ids;
    LET $members = array::union($sources, $targets);
    FOR $member IN $members {{
        {}
    }};
}};",
        link("in_community", "$member", "$community", None)
    )
}

// Findings are replayed in full: each position is overwritten with CONTENT.
fn community_reports() -> String {
    format!(
        "
FOR $row IN $rows {{
    LET $community = type::thing('community', $row.community);
    LET $properties = $row.properties;
    UPSERT $community MERGE $properties RETURN NONE;
    FOR $finding IN $row.findings {{
        LET $node = type::thing('finding', [$row.community, $finding.position]);
        LET $content = $finding.properties;
        UPSERT $node CONTENT $content RETURN NONE;
        {}
    }};
}};",
        link("has_finding", "$community", "$node", None)
    )
}

fn covariates() -> String {
    format!(
        "
FOR $row IN $rows {{
    LET $covariate = type::thing('covariate', $row.id);
    LET $properties = $row.properties;
    UPSERT $covariate MERGE $properties RETURN NONE;
    IF $row.text_unit_id {{
        LET $chunk = type::thing('chunk', $row.text_unit_id);
        {}
    }};
}};",
        link("has_covariate", "$chunk", "$covariate", Some("$chunk"))
    )
}

/// Render the statement for `mutation`.
pub fn statement_for(mutation: Mutation) -> Statement {
    let text = match mutation {
        Mutation::Documents => DOCUMENTS.to_string(),
        Mutation::Chunks => chunks(),
        Mutation::Entities => entities(),
        Mutation::Relationships => RELATIONSHIPS.to_string(),
        Mutation::Communities => communities(),
        Mutation::CommunityReports => community_reports(),
        Mutation::Covariates => covariates(),
    };
    Statement::new(mutation.name(), text.trim()).touching(mutation.touches())
}
