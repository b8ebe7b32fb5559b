// src/dag/mod.rs

//! Graph model shared by the partitioner and the scheduler.
//!
//! - [`graph`] holds the task DAG: nodes, weighted/delayed edges and derived
//!   adjacency.
//! - [`partitioning`] assigns every node to exactly one group.
//! - [`quotient`] is the group-level graph derived from a partitioning.

pub mod graph;
pub mod partitioning;
pub mod quotient;

pub use graph::{Edge, Graph, Node};
pub use partitioning::Partitioning;
pub use quotient::QuotientGraph;
