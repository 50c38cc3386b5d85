//! Similarity graph construction.
//!
//! An undirected graph over arena slots whose edges are the record pairs that
//! pass the distance threshold on one channel. The builder never scores a
//! pair that shares no concept unless the threshold is degenerate.

pub mod adjacency;
pub mod builder;
pub mod inverted_index;

pub use adjacency::Adjacency;
pub use builder::{BuildStats, GraphBuilder};
pub use inverted_index::InvertedIndex;
