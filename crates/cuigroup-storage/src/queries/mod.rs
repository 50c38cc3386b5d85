//! SQL queries, one module per table family.

pub mod features;
pub mod groupings;
