//! Trait seams between the grouping engine and its collaborators.

pub mod feature_provider;

pub use feature_provider::FeatureProvider;
