//! Graph vocabulary and the store abstraction.
//!
//! The importer never writes query text itself. It asks the store for the
//! [`Statement`] implementing a [`Mutation`] and feeds it batches of rows
//! bound to a single list parameter. Each backend renders the mutations in
//! its own query language with merge semantics: re-applying a statement to
//! the same rows must leave the graph unchanged.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::ops::AddAssign;

use crate::error::StoreResult;

/// Node labels produced by the import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeLabel {
    Document,
    Chunk,
    Entity,
    Community,
    Finding,
    Covariate,
}

impl NodeLabel {
    pub const ALL: [NodeLabel; 6] = [
        NodeLabel::Document,
        NodeLabel::Chunk,
        NodeLabel::Entity,
        NodeLabel::Community,
        NodeLabel::Finding,
        NodeLabel::Covariate,
    ];

    /// Storage table name for this label.
    pub fn table(self) -> &'static str {
        match self {
            NodeLabel::Document => "document",
            NodeLabel::Chunk => "chunk",
            NodeLabel::Entity => "entity",
            NodeLabel::Community => "community",
            NodeLabel::Finding => "finding",
            NodeLabel::Covariate => "covariate",
        }
    }
}

impl fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeLabel::Document => "Document",
            NodeLabel::Chunk => "Chunk",
            NodeLabel::Entity => "Entity",
            NodeLabel::Community => "Community",
            NodeLabel::Finding => "Finding",
            NodeLabel::Covariate => "Covariate",
        };
        f.write_str(name)
    }
}

/// Edge types produced by the import, with their direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeType {
    /// Chunk -> Document
    PartOf,
    /// Chunk -> Entity
    HasEntity,
    /// Entity -> Entity, keyed by relationship id
    Related,
    /// Entity -> Community
    InCommunity,
    /// Community -> Finding
    HasFinding,
    /// Chunk -> Covariate
    HasCovariate,
}

impl EdgeType {
    pub const ALL: [EdgeType; 6] = [
        EdgeType::PartOf,
        EdgeType::HasEntity,
        EdgeType::Related,
        EdgeType::InCommunity,
        EdgeType::HasFinding,
        EdgeType::HasCovariate,
    ];

    pub fn table(self) -> &'static str {
        match self {
            EdgeType::PartOf => "part_of",
            EdgeType::HasEntity => "has_entity",
            EdgeType::Related => "related",
            EdgeType::InCommunity => "in_community",
            EdgeType::HasFinding => "has_finding",
            EdgeType::HasCovariate => "has_covariate",
        }
    }

    pub fn endpoints(self) -> (NodeLabel, NodeLabel) {
        match self {
            EdgeType::PartOf => (NodeLabel::Chunk, NodeLabel::Document),
            EdgeType::HasEntity => (NodeLabel::Chunk, NodeLabel::Entity),
            EdgeType::Related => (NodeLabel::Entity, NodeLabel::Entity),
            EdgeType::InCommunity => (NodeLabel::Entity, NodeLabel::Community),
            EdgeType::HasFinding => (NodeLabel::Community, NodeLabel::Finding),
            EdgeType::HasCovariate => (NodeLabel::Chunk, NodeLabel::Covariate),
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.table().to_uppercase())
    }
}

/// A node label or an edge type, used to declare what a statement writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphElement {
    Node(NodeLabel),
    Edge(EdgeType),
}

/// One upsert procedure per source table.
///
/// The row shape each mutation expects is produced by the pipeline's row
/// preparation and documented on the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
    /// `{id, title}`
    Documents,
    /// `{id, text, n_tokens, document_ids[]}`, linking each chunk to existing documents
    Chunks,
    /// `{id, name, entity_type?, labels[], description?, human_readable_id?,
    /// text_unit_ids[], description_embedding?}`
    Entities,
    /// `{id, source, target, weight?, combined_degree?, human_readable_id?,
    /// description?, text_unit_ids[]}` with endpoints resolved by entity name
    Relationships,
    /// `{community, relationship_ids[], properties{}}`, membership derived
    /// from the endpoints of the listed relationships
    Communities,
    /// `{community, properties{}, findings: [{position, properties{}}]}`
    CommunityReports,
    /// `{id, text_unit_id?, properties{}}`
    Covariates,
}

impl Mutation {
    pub fn name(self) -> &'static str {
        match self {
            Mutation::Documents => "documents",
            Mutation::Chunks => "chunks",
            Mutation::Entities => "entities",
            Mutation::Relationships => "relationships",
            Mutation::Communities => "communities",
            Mutation::CommunityReports => "community_reports",
            Mutation::Covariates => "covariates",
        }
    }

    /// Node labels and edge types this mutation may create.
    pub fn touches(self) -> Vec<GraphElement> {
        use GraphElement::{Edge, Node};
        match self {
            Mutation::Documents => vec![Node(NodeLabel::Document)],
            Mutation::Chunks => vec![Node(NodeLabel::Chunk), Edge(EdgeType::PartOf)],
            Mutation::Entities => vec![Node(NodeLabel::Entity), Edge(EdgeType::HasEntity)],
            Mutation::Relationships => vec![Edge(EdgeType::Related)],
            Mutation::Communities => {
                vec![Node(NodeLabel::Community), Edge(EdgeType::InCommunity)]
            }
            Mutation::CommunityReports => vec![
                Node(NodeLabel::Community),
                Node(NodeLabel::Finding),
                Edge(EdgeType::HasFinding),
            ],
            Mutation::Covariates => {
                vec![Node(NodeLabel::Covariate), Edge(EdgeType::HasCovariate)]
            }
        }
    }
}

/// A parameterized mutation ready to run against a store.
///
/// Row data is always bound as the single list parameter `$rows`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub name: String,
    pub text: String,
    pub touches: Vec<GraphElement>,
}

impl Statement {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            touches: Vec::new(),
        }
    }

    pub fn touching(mut self, touches: Vec<GraphElement>) -> Self {
        self.touches = touches;
        self
    }
}

/// Mutation counters reported per batch and accumulated per statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationCounters {
    /// Rows sent to the store.
    pub rows: u64,
    pub nodes_created: u64,
    pub edges_created: u64,
}

impl MutationCounters {
    pub fn is_empty(&self) -> bool {
        self.nodes_created == 0 && self.edges_created == 0
    }
}

impl AddAssign for MutationCounters {
    fn add_assign(&mut self, other: Self) {
        self.rows += other.rows;
        self.nodes_created += other.nodes_created;
        self.edges_created += other.edges_created;
    }
}

impl fmt::Display for MutationCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rows={} nodes_created={} edges_created={}",
            self.rows, self.nodes_created, self.edges_created
        )
    }
}

/// Backend-agnostic property graph store.
///
/// Implementations hold an explicit connection handle; there is no global
/// driver. All methods take `&self` so one handle can be shared by the
/// pipeline stages through an `Arc`.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Render the upsert statement for `mutation` in the store's dialect.
    fn statement(&self, mutation: Mutation) -> Statement;

    /// Ordered, individually idempotent constraint declarations.
    fn constraint_statements(&self) -> Vec<Statement>;

    /// Run a statement that takes no rows.
    async fn execute(&self, statement: &Statement) -> StoreResult<()>;

    /// Run `statement` once with `rows` bound as `$rows`.
    ///
    /// The batch is applied atomically: on error nothing from this batch is
    /// kept.
    async fn execute_batch(
        &self,
        statement: &Statement,
        rows: Vec<Value>,
    ) -> StoreResult<MutationCounters>;

    async fn count_nodes(&self, label: NodeLabel) -> StoreResult<u64>;

    async fn count_edges(&self, edge: EdgeType) -> StoreResult<u64>;

    /// Number of entity nodes carrying the given type label.
    async fn count_tagged(&self, label: &str) -> StoreResult<u64>;

    /// Count of nodes or edges for any graph element.
    async fn count(&self, element: GraphElement) -> StoreResult<u64> {
        match element {
            GraphElement::Node(label) => self.count_nodes(label).await,
            GraphElement::Edge(edge) => self.count_edges(edge).await,
        }
    }
}
