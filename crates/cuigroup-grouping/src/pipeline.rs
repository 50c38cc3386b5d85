//! Grouping pipeline: provider → feature index → resolution → result.

use std::fmt;
use std::time::Instant;

use cuigroup_core::errors::{ConfigError, GroupingError};
use cuigroup_core::traits::FeatureProvider;
use cuigroup_core::types::{GroupingParams, GroupingPolicy, RecordKey};
use serde::Serialize;
use tracing::{info, info_span};

use crate::index::{Channel, FeatureIndex};
use crate::resolver::{GroupResolver, Resolution};
use crate::result::{GroupingResult, GroupingTag};

/// Runs one batch grouping of a dataset.
pub struct GroupingPipeline {
    params: GroupingParams,
    resolver: GroupResolver,
}

impl GroupingPipeline {
    pub fn new(params: GroupingParams) -> Self {
        let resolver = GroupResolver::from_params(&params);
        Self { params, resolver }
    }

    pub fn params(&self) -> &GroupingParams {
        &self.params
    }

    /// Group every record the provider knows.
    pub fn run(&self, provider: &dyn FeatureProvider) -> Result<GroupingRun, GroupingError> {
        self.check_dataset(provider)?;
        let index = FeatureIndex::from_provider(provider)?;
        self.run_index(&index)
    }

    /// Group an explicit universe of records. Every key must be present in
    /// the provider.
    pub fn run_for(
        &self,
        provider: &dyn FeatureProvider,
        universe: &[RecordKey],
    ) -> Result<GroupingRun, GroupingError> {
        self.check_dataset(provider)?;
        let index = FeatureIndex::from_provider_for(provider, universe)?;
        self.run_index(&index)
    }

    /// Group an already built index.
    pub fn run_index(&self, index: &FeatureIndex) -> Result<GroupingRun, GroupingError> {
        let _span = info_span!(
            "grouping_run",
            dataset = %self.params.dataset,
            metric = self.params.metric.as_str(),
            threshold = self.params.threshold.distance(),
            policy = self.params.policy.as_str()
        )
        .entered();
        let started = Instant::now();

        let resolution = self.resolver.resolve(index);
        let tag = GroupingTag::from_params(&self.params);
        let result = GroupingResult::from_resolution(tag, &resolution, index)?;
        let diagnostics =
            GroupingDiagnostics::compute(index, &resolution, started.elapsed().as_millis() as u64);

        info!(
            records = diagnostics.record_count,
            supergroups = diagnostics.supergroup_count,
            largest = diagnostics.largest_supergroup,
            featureless = diagnostics.featureless_count,
            elapsed_ms = diagnostics.elapsed_ms,
            "grouping complete"
        );

        Ok(GroupingRun {
            result,
            diagnostics,
        })
    }

    fn check_dataset(&self, provider: &dyn FeatureProvider) -> Result<(), ConfigError> {
        if provider.dataset() != self.params.dataset {
            return Err(ConfigError::ValidationFailed {
                field: "grouping.dataset".to_string(),
                message: format!(
                    "provider serves dataset '{}', run expects '{}'",
                    provider.dataset(),
                    self.params.dataset
                ),
            });
        }
        Ok(())
    }
}

/// A grouping result plus what it took to produce it.
#[derive(Debug, Clone)]
pub struct GroupingRun {
    pub result: GroupingResult,
    pub diagnostics: GroupingDiagnostics,
}

/// Diagnostics summary for one grouping run.
#[derive(Debug, Clone, Serialize)]
pub struct GroupingDiagnostics {
    pub policy: GroupingPolicy,
    /// Records in the grouped universe.
    pub record_count: usize,
    /// Records with neither disease nor drug concepts.
    pub featureless_count: usize,
    /// Distinct concept identifiers observed.
    pub vocabulary_size: usize,
    /// Pairs whose exact similarity was computed, summed over channels.
    pub candidate_pairs: u64,
    /// Edges of the supergroup graph.
    pub edge_count: usize,
    /// Group count per channel graph.
    pub base_group_counts: Vec<(String, usize)>,
    pub supergroup_count: usize,
    pub largest_supergroup: usize,
    pub singleton_count: usize,
    /// Whether the threshold linked every pair with concepts.
    pub degenerate_threshold: bool,
    pub elapsed_ms: u64,
}

impl GroupingDiagnostics {
    fn compute(index: &FeatureIndex, resolution: &Resolution, elapsed_ms: u64) -> Self {
        Self {
            policy: resolution.policy,
            record_count: index.len(),
            featureless_count: index.featureless_count(),
            vocabulary_size: index.vocabulary_size(),
            candidate_pairs: resolution.candidate_pairs(),
            edge_count: resolution.supergroup_edges,
            base_group_counts: resolution
                .base_groups
                .iter()
                .map(|(channel, groups)| (channel.as_str().to_string(), groups.len()))
                .collect(),
            supergroup_count: resolution.supergroups.len(),
            largest_supergroup: resolution.supergroups.largest(),
            singleton_count: resolution.supergroups.singletons(),
            degenerate_threshold: resolution.builds.iter().any(|(_, s)| s.degenerate),
            elapsed_ms,
        }
    }

    /// Group count of one channel graph, if the policy built it.
    pub fn base_group_count(&self, channel: Channel) -> Option<usize> {
        self.base_group_counts
            .iter()
            .find(|(name, _)| name == channel.as_str())
            .map(|(_, count)| *count)
    }
}

impl fmt::Display for GroupingDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let groups: Vec<String> = self
            .base_group_counts
            .iter()
            .map(|(channel, count)| format!("{channel}={count}"))
            .collect();
        write!(
            f,
            "GroupingDiagnostics {{ policy={}, records={}, featureless={}, vocabulary={}, candidates={}, edges={}, groups[{}], supergroups={}, largest={}, singletons={}, degenerate={} }}",
            self.policy,
            self.record_count,
            self.featureless_count,
            self.vocabulary_size,
            self.candidate_pairs,
            self.edge_count,
            groups.join(", "),
            self.supergroup_count,
            self.largest_supergroup,
            self.singleton_count,
            self.degenerate_threshold,
        )
    }
}
