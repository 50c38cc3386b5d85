//! Group resolution: threshold graphs → connected components → supergroups.
//!
//! Under the `combined` policy one graph over the union of disease and drug
//! concepts defines both the groups and the supergroups. Under `conjunctive`
//! the disease and drug graphs are resolved separately as base groups, and
//! supergroups are the components of the pairs linked on both channels, so
//! every supergroup sits inside exactly one disease group and one drug group.

use cuigroup_core::types::{GroupingParams, GroupingPolicy};
use tracing::{debug, info_span};

use crate::graph::{Adjacency, BuildStats, GraphBuilder};
use crate::index::{Channel, FeatureIndex};
use crate::union_find::DisjointSet;

/// A partition of arena slots `0..n` into cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    cells: Vec<Vec<u32>>,
    cell_of: Vec<u32>,
}

impl Partition {
    /// Connected components of a graph, numbered by smallest member.
    pub fn from_adjacency(adjacency: &Adjacency) -> Self {
        let mut ds = DisjointSet::new(adjacency.node_count());
        for &(a, b) in adjacency.edges() {
            ds.union(a, b);
        }
        Self::from_cells(adjacency.node_count(), ds.components())
    }

    fn from_cells(node_count: usize, cells: Vec<Vec<u32>>) -> Self {
        let mut cell_of = vec![0u32; node_count];
        for (cell, members) in cells.iter().enumerate() {
            for &slot in members {
                cell_of[slot as usize] = cell as u32;
            }
        }
        Self { cells, cell_of }
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Vec<u32>] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<&[u32]> {
        self.cells.get(index).map(Vec::as_slice)
    }

    /// Cell holding `slot`.
    pub fn cell_of(&self, slot: u32) -> u32 {
        self.cell_of[slot as usize]
    }

    /// Size of the largest cell, 0 for an empty partition.
    pub fn largest(&self) -> usize {
        self.cells.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Cells with exactly one member.
    pub fn singletons(&self) -> usize {
        self.cells.iter().filter(|c| c.len() == 1).count()
    }

    /// True if every cell of `self` lies inside a single cell of `coarser`.
    pub fn is_refinement_of(&self, coarser: &Partition) -> bool {
        self.cell_of.len() == coarser.cell_of.len()
            && self.cells.iter().all(|cell| {
                cell.split_first().map_or(true, |(&first, rest)| {
                    let target = coarser.cell_of(first);
                    rest.iter().all(|&slot| coarser.cell_of(slot) == target)
                })
            })
    }
}

/// Output of one resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub policy: GroupingPolicy,
    /// Groups per channel: `[combined]` or `[disease, drug]`.
    pub base_groups: Vec<(Channel, Partition)>,
    pub supergroups: Partition,
    /// Build counters per channel graph.
    pub builds: Vec<(Channel, BuildStats)>,
    /// Edges of the graph whose components are the supergroups.
    pub supergroup_edges: usize,
}

impl Resolution {
    pub fn base_groups(&self, channel: Channel) -> Option<&Partition> {
        self.base_groups
            .iter()
            .find(|(c, _)| *c == channel)
            .map(|(_, p)| p)
    }

    /// Candidate pairs scored across all channel builds.
    pub fn candidate_pairs(&self) -> u64 {
        self.builds.iter().map(|(_, s)| s.candidate_pairs).sum()
    }
}

/// Resolves a feature index into groups and supergroups under a policy.
#[derive(Debug, Clone, Copy)]
pub struct GroupResolver {
    builder: GraphBuilder,
    policy: GroupingPolicy,
}

impl GroupResolver {
    pub fn new(builder: GraphBuilder, policy: GroupingPolicy) -> Self {
        Self { builder, policy }
    }

    pub fn from_params(params: &GroupingParams) -> Self {
        let builder =
            GraphBuilder::new(params.metric, params.threshold).with_parallel(params.parallel);
        Self::new(builder, params.policy)
    }

    pub fn policy(&self) -> GroupingPolicy {
        self.policy
    }

    pub fn resolve(&self, index: &FeatureIndex) -> Resolution {
        let _span = info_span!(
            "resolve",
            dataset = index.dataset(),
            policy = self.policy.as_str(),
            records = index.len()
        )
        .entered();

        let resolution = match self.policy {
            GroupingPolicy::Combined => {
                let (adjacency, stats) = self.builder.build(index, Channel::Combined);
                let groups = Partition::from_adjacency(&adjacency);
                Resolution {
                    policy: self.policy,
                    base_groups: vec![(Channel::Combined, groups.clone())],
                    supergroups: groups,
                    builds: vec![(Channel::Combined, stats)],
                    supergroup_edges: adjacency.edge_count(),
                }
            }
            GroupingPolicy::Conjunctive => {
                let (disease_adj, disease_stats) = self.builder.build(index, Channel::Disease);
                let (drug_adj, drug_stats) = self.builder.build(index, Channel::Drug);
                let both = self.builder.conjunction(index, &disease_adj, &drug_adj);
                Resolution {
                    policy: self.policy,
                    base_groups: vec![
                        (Channel::Disease, Partition::from_adjacency(&disease_adj)),
                        (Channel::Drug, Partition::from_adjacency(&drug_adj)),
                    ],
                    supergroups: Partition::from_adjacency(&both),
                    builds: vec![(Channel::Disease, disease_stats), (Channel::Drug, drug_stats)],
                    supergroup_edges: both.edge_count(),
                }
            }
        };

        debug!(
            supergroups = resolution.supergroups.len(),
            largest = resolution.supergroups.largest(),
            edges = resolution.supergroup_edges,
            "resolved"
        );
        resolution
    }
}
