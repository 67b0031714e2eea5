//! The declared import sequence.

use ragport_core::{EdgeType, GraphElement, Mutation, NodeLabel};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A named step of the import, run in [`Stage::ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    Constraints,
    Documents,
    Chunks,
    Entities,
    Relationships,
    Communities,
    CommunityReports,
    Covariates,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown stage '{0}' (expected one of: {list})", list = Stage::names().join(", "))]
pub struct UnknownStage(pub String);

impl Stage {
    pub const ORDER: [Stage; 8] = [
        Stage::Constraints,
        Stage::Documents,
        Stage::Chunks,
        Stage::Entities,
        Stage::Relationships,
        Stage::Communities,
        Stage::CommunityReports,
        Stage::Covariates,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Constraints => "constraints",
            Stage::Documents => "documents",
            Stage::Chunks => "chunks",
            Stage::Entities => "entities",
            Stage::Relationships => "relationships",
            Stage::Communities => "communities",
            Stage::CommunityReports => "community_reports",
            Stage::Covariates => "covariates",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ORDER.iter().map(|s| s.name()).collect()
    }

    /// The upsert this stage applies; `None` for schema setup.
    pub fn mutation(self) -> Option<Mutation> {
        match self {
            Stage::Constraints => None,
            Stage::Documents => Some(Mutation::Documents),
            Stage::Chunks => Some(Mutation::Chunks),
            Stage::Entities => Some(Mutation::Entities),
            Stage::Relationships => Some(Mutation::Relationships),
            Stage::Communities => Some(Mutation::Communities),
            Stage::CommunityReports => Some(Mutation::CommunityReports),
            Stage::Covariates => Some(Mutation::Covariates),
        }
    }

    /// What must already exist in the store before this stage imports rows.
    pub fn requirement(self) -> Option<GraphElement> {
        match self {
            Stage::Chunks => Some(GraphElement::Node(NodeLabel::Document)),
            Stage::Entities | Stage::Covariates => Some(GraphElement::Node(NodeLabel::Chunk)),
            Stage::Relationships => Some(GraphElement::Node(NodeLabel::Entity)),
            Stage::Communities => Some(GraphElement::Edge(EdgeType::Related)),
            Stage::Constraints | Stage::Documents | Stage::CommunityReports => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ORDER
            .into_iter()
            .find(|stage| stage.name() == wanted)
            .ok_or_else(|| UnknownStage(s.to_string()))
    }
}

/// Selected stages in declared order, without repeats.
pub fn ordered(selected: &[Stage]) -> Vec<Stage> {
    Stage::ORDER
        .into_iter()
        .filter(|stage| selected.contains(stage))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_dashes() {
        assert_eq!("entities".parse::<Stage>(), Ok(Stage::Entities));
        assert_eq!("community-reports".parse::<Stage>(), Ok(Stage::CommunityReports));
        assert_eq!(" Covariates ".parse::<Stage>(), Ok(Stage::Covariates));

        let err = "claims".parse::<Stage>().unwrap_err();
        assert!(err.to_string().contains("community_reports"));
    }

    #[test]
    fn mutation_names_match_stage_names() {
        for stage in Stage::ORDER {
            if let Some(mutation) = stage.mutation() {
                assert_eq!(mutation.name(), stage.name());
            }
        }
    }

    #[test]
    fn each_requirement_is_produced_by_an_earlier_stage() {
        for (index, stage) in Stage::ORDER.iter().enumerate() {
            let Some(requirement) = stage.requirement() else {
                continue;
            };
            let produced_earlier = Stage::ORDER[..index]
                .iter()
                .filter_map(|s| s.mutation())
                .any(|m| m.touches().contains(&requirement));
            assert!(produced_earlier, "{stage} requires {requirement:?}");
        }
    }

    #[test]
    fn selection_follows_declared_order() {
        let selected = [Stage::Covariates, Stage::Documents, Stage::Documents];
        assert_eq!(ordered(&selected), vec![Stage::Documents, Stage::Covariates]);
    }
}
