// src/errors.rs

//! Crate-wide error type.

use std::fmt;

use thiserror::Error;

use crate::types::{NodeId, PartitionId};

/// Which loop hit its iteration ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Refinement,
    Scheduling,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Refinement => write!(f, "partition refinement"),
            Stage::Scheduling => write!(f, "list scheduling"),
        }
    }
}

/// A group whose total resource demand exceeds the partition limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityViolation {
    pub partition: PartitionId,
    pub resource: u64,
    pub limit: u64,
}

impl fmt::Display for CapacityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "partition {} uses {}/{}",
            self.partition, self.resource, self.limit
        )
    }
}

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// The input graph is not a valid DAG (cycle, duplicate edge, self-loop,
    /// unknown node reference).
    #[error("Precondition violated: {0}")]
    Precondition(String),

    #[error("Infeasible partition: node {node} demands {demand} but resource_limit is {limit}")]
    InfeasiblePartition {
        node: NodeId,
        demand: u64,
        limit: u64,
    },

    #[error("{stage} did not converge within {limit} iterations")]
    NonConvergence { stage: Stage, limit: usize },

    #[error("Capacity exceeded after refinement: {}", format_violations(.0))]
    CapacityViolation(Vec<CapacityViolation>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn format_violations(violations: &[CapacityViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, PlanError>;
