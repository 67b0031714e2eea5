//! Constraint declarations.
//!
//! Record ids are the primary keys (`document:⟨d1⟩`), so uniqueness of node
//! ids is structural. The statements below add the secondary unique keys,
//! constrain edge endpoints, and make every edge unique per endpoint pair.
//! All of them use `IF NOT EXISTS` and can be re-run at any time.

use ragport_core::{EdgeType, NodeLabel, Statement};

/// Ordered list of constraint statements.
pub fn constraint_statements() -> Vec<Statement> {
    let mut statements: Vec<Statement> = NodeLabel::ALL
        .iter()
        .map(|label| {
            Statement::new(
                format!("table:{}", label.table()),
                format!("DEFINE TABLE IF NOT EXISTS {} SCHEMALESS;", label.table()),
            )
        })
        .collect();

    statements.extend([
        Statement::new(
            "unique:entity.name",
            "DEFINE INDEX IF NOT EXISTS entity_name ON TABLE entity FIELDS name UNIQUE;",
        ),
        Statement::new(
            "index:entity.labels",
            "DEFINE INDEX IF NOT EXISTS entity_labels ON TABLE entity FIELDS labels;",
        ),
        Statement::new(
            "unique:community.community",
            "DEFINE INDEX IF NOT EXISTS community_key ON TABLE community FIELDS community UNIQUE;",
        ),
        Statement::new(
            "unique:finding.position",
            "DEFINE INDEX IF NOT EXISTS finding_position ON TABLE finding FIELDS community, position UNIQUE;",
        ),
    ]);

    for edge in EdgeType::ALL {
        let (from, to) = edge.endpoints();
        let table = edge.table();
        statements.push(Statement::new(
            format!("relation:{table}"),
            format!(
                "DEFINE TABLE IF NOT EXISTS {table} SCHEMALESS TYPE RELATION IN {} OUT {};",
                from.table(),
                to.table()
            ),
        ));
        let unique = if edge == EdgeType::Related {
            // Keyed by relationship id: one edge per source row id.
            format!(
                "DEFINE INDEX IF NOT EXISTS related_id ON TABLE {table} FIELDS relationship_id UNIQUE;"
            )
        } else {
            format!("DEFINE INDEX IF NOT EXISTS {table}_pair ON TABLE {table} FIELDS in, out UNIQUE;")
        };
        statements.push(Statement::new(format!("unique:{table}"), unique));
    }

    statements
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_statement_is_guarded() {
        for statement in constraint_statements() {
            assert!(
                statement.text.contains("IF NOT EXISTS"),
                "{} is not idempotent",
                statement.name
            );
        }
    }

    #[test]
    fn tables_are_declared_before_their_indexes() {
        let names: Vec<String> = constraint_statements()
            .into_iter()
            .map(|s| s.name)
            .collect();
        let position = |name: &str| names.iter().position(|n| n == name).unwrap();

        assert!(position("table:entity") < position("unique:entity.name"));
        assert!(position("relation:related") < position("unique:related"));
        assert!(position("table:chunk") < position("relation:part_of"));
    }
}
