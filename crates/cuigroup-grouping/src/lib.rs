//! # cuigroup-grouping
//!
//! Groups biomedical records that describe the same disease/drug combination.
//!
//! Feature store → feature index → pruned similarity graph → union-find
//! components → grouping result. The inverted concept index bounds the work
//! to pairs that share at least one concept identifier.

pub mod graph;
pub mod index;
pub mod pipeline;
pub mod resolver;
pub mod result;
pub mod similarity;
pub mod store;
pub mod union_find;

pub use graph::{Adjacency, BuildStats, GraphBuilder};
pub use index::{Channel, FeatureIndex};
pub use pipeline::{GroupingDiagnostics, GroupingPipeline, GroupingRun};
pub use resolver::{GroupResolver, Partition, Resolution};
pub use result::{GroupingResult, GroupingTag};
pub use similarity::{channel_similarity, feature_similarity, similarity};
pub use store::FeatureStore;
pub use union_find::DisjointSet;
