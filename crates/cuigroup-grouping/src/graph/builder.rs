//! Pruned similarity graph builder.
//!
//! For every record `i`, candidates are gathered from the postings of its
//! concepts, keeping only slots `j > i`. Shared-concept counts accumulate in a
//! per-record scratch buffer, so the similarity of each candidate pair is
//! computed from `(|A ∩ B|, |A|, |B|)` without a second merge. The full
//! candidate-pair set is never materialized.

use cuigroup_core::constants::PARALLEL_MIN_RECORDS;
use cuigroup_core::types::{SimilarityMetric, Threshold};
use rayon::prelude::*;
use tracing::{debug, warn};

use super::adjacency::Adjacency;
use super::inverted_index::InvertedIndex;
use crate::index::{Channel, ConceptId, FeatureIndex};
use crate::similarity::channel_similarity;

/// Counters from one graph build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Pairs whose exact similarity was computed.
    pub candidate_pairs: u64,
    /// Edges that passed the threshold.
    pub edge_count: usize,
    /// True when the threshold links every pair with non-empty sets. The
    /// graph is then a spanning star over those records.
    pub degenerate: bool,
}

/// Builds the threshold graph of one channel.
#[derive(Debug, Clone, Copy)]
pub struct GraphBuilder {
    metric: SimilarityMetric,
    threshold: Threshold,
    parallel: bool,
}

impl GraphBuilder {
    pub fn new(metric: SimilarityMetric, threshold: Threshold) -> Self {
        Self {
            metric,
            threshold,
            parallel: true,
        }
    }

    /// Enable or disable rayon scoring. Output is identical either way.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn metric(&self) -> SimilarityMetric {
        self.metric
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Whether two indexed records are linked on `channel`. Records with an
    /// empty set on the channel are never linked.
    pub fn links(&self, index: &FeatureIndex, channel: Channel, a: usize, b: usize) -> bool {
        !index.concepts(channel, a).is_empty()
            && !index.concepts(channel, b).is_empty()
            && self
                .threshold
                .links(channel_similarity(index, channel, self.metric, a, b))
    }

    /// Build the graph of `channel` using inverted-index candidate pruning.
    pub fn build(&self, index: &FeatureIndex, channel: Channel) -> (Adjacency, BuildStats) {
        let n = index.len();
        let sets: Vec<&[ConceptId]> = (0..n).map(|slot| index.concepts(channel, slot)).collect();

        if self.threshold.is_degenerate() {
            warn!(
                channel = channel.as_str(),
                threshold = self.threshold.distance(),
                record_count = n,
                "degenerate threshold links every pair with concepts; building a spanning star"
            );
            return self.build_star(&sets);
        }

        let inverted = InvertedIndex::build(&sets);
        let use_rayon = self.parallel && n >= PARALLEL_MIN_RECORDS;

        let rows: Vec<(Vec<(u32, u32)>, u64)> = if use_rayon {
            (0..n)
                .into_par_iter()
                .map_init(
                    || Scratch::new(n),
                    |scratch, i| scratch.row(i as u32, &sets, &inverted, self),
                )
                .collect()
        } else {
            let mut scratch = Scratch::new(n);
            (0..n)
                .map(|i| scratch.row(i as u32, &sets, &inverted, self))
                .collect()
        };

        let candidate_pairs: u64 = rows.iter().map(|(_, c)| c).sum();
        let adjacency = Adjacency::from_edges(n, rows.into_iter().flat_map(|(edges, _)| edges));
        let stats = BuildStats {
            candidate_pairs,
            edge_count: adjacency.edge_count(),
            degenerate: false,
        };

        debug!(
            channel = channel.as_str(),
            record_count = n,
            concept_count = inverted.concept_count(),
            posting_total = inverted.posting_total(),
            candidate_pairs = stats.candidate_pairs,
            edge_count = stats.edge_count,
            parallel = use_rayon,
            "graph built"
        );

        (adjacency, stats)
    }

    /// Reference construction scoring every pair. Quadratic; used to check
    /// the pruned builder. Unlike `build`, a degenerate threshold yields the
    /// complete graph here.
    pub fn build_brute_force(&self, index: &FeatureIndex, channel: Channel) -> Adjacency {
        let n = index.len();
        let mut edges = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                if self.links(index, channel, i, j) {
                    edges.push((i as u32, j as u32));
                }
            }
        }
        Adjacency::from_edges(n, edges)
    }

    /// Graph of records linked on both channels.
    ///
    /// Degenerate channel graphs are spanning stars, not complete graphs, so
    /// their edge intersection would drop links; the conjunction is then a
    /// star over the records with both channels non-empty.
    pub fn conjunction(&self, index: &FeatureIndex, disease: &Adjacency, drug: &Adjacency) -> Adjacency {
        if !self.threshold.is_degenerate() {
            return disease.intersect(drug);
        }
        let live = (0..index.len()).filter(|&slot| {
            !index.concepts(Channel::Disease, slot).is_empty()
                && !index.concepts(Channel::Drug, slot).is_empty()
        });
        star(index.len(), live)
    }

    /// Every record with concepts links to every other, so only the
    /// components matter: a star rooted at the first live slot has the same
    /// components in `live - 1` edges.
    fn build_star(&self, sets: &[&[ConceptId]]) -> (Adjacency, BuildStats) {
        let live = sets
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_empty())
            .map(|(slot, _)| slot);
        let adjacency = star(sets.len(), live);
        let stats = BuildStats {
            candidate_pairs: 0,
            edge_count: adjacency.edge_count(),
            degenerate: true,
        };
        (adjacency, stats)
    }
}

fn star(node_count: usize, mut live: impl Iterator<Item = usize>) -> Adjacency {
    let Some(root) = live.next() else {
        return Adjacency::empty(node_count);
    };
    let edges: Vec<(u32, u32)> = live.map(|slot| (root as u32, slot as u32)).collect();
    Adjacency::from_edges(node_count, edges)
}

/// Per-record scratch: shared-concept counts stamped with the current row so
/// the buffers are never cleared between rows.
struct Scratch {
    shared: Vec<u32>,
    stamp: Vec<u32>,
    touched: Vec<u32>,
}

impl Scratch {
    fn new(n: usize) -> Self {
        Self {
            shared: vec![0; n],
            stamp: vec![0; n],
            touched: Vec::new(),
        }
    }

    /// Edges `(i, j)` with `j > i`, plus the number of candidates scored.
    fn row(
        &mut self,
        i: u32,
        sets: &[&[ConceptId]],
        inverted: &InvertedIndex,
        builder: &GraphBuilder,
    ) -> (Vec<(u32, u32)>, u64) {
        let mark = i + 1;
        let own = sets[i as usize];
        self.touched.clear();

        for &concept in own {
            for &j in inverted.postings_after(concept, i) {
                let ju = j as usize;
                if self.stamp[ju] != mark {
                    self.stamp[ju] = mark;
                    self.shared[ju] = 0;
                    self.touched.push(j);
                }
                self.shared[ju] += 1;
            }
        }

        let mut edges = Vec::new();
        for &j in &self.touched {
            let ju = j as usize;
            let sim = builder
                .metric
                .score_counts(self.shared[ju] as usize, own.len(), sets[ju].len());
            if builder.threshold.links(sim) {
                edges.push((i, j));
            }
        }
        (edges, self.touched.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuigroup_core::types::{FeatureSet, RecordKey, Source};

    /// Records as whitespace-separated disease and drug CUIs.
    fn index(records: &[(&str, &str)]) -> FeatureIndex {
        FeatureIndex::from_records(
            "t",
            records.iter().enumerate().map(|(i, (d, r))| {
                (
                    RecordKey::new(Source::Ctgov, format!("NCT{i:08}")),
                    FeatureSet::new(d.split_whitespace(), r.split_whitespace()),
                )
            }),
        )
        .unwrap()
    }

    fn builder(metric: SimilarityMetric, d: f64) -> GraphBuilder {
        GraphBuilder::new(metric, Threshold::new(d).unwrap())
    }

    #[test]
    fn links_pairs_within_threshold_only() {
        let idx = index(&[
            ("C1 C2", ""),
            ("C1 C2", ""),
            ("C1 C3", ""),
            ("C9", ""),
        ]);
        let (adj, stats) = builder(SimilarityMetric::Jaccard, 0.4).build(&idx, Channel::Combined);
        // 0-1 identical; 0-2 and 1-2 share one of three concepts (distance 2/3)
        assert_eq!(adj.edges(), &[(0, 1)]);
        assert_eq!(stats.candidate_pairs, 3);
        assert!(!stats.degenerate);
    }

    #[test]
    fn disjoint_records_are_never_candidates() {
        let idx = index(&[("C1", ""), ("C2", ""), ("C3", "")]);
        let (adj, stats) = builder(SimilarityMetric::Cosine, 0.99).build(&idx, Channel::Combined);
        assert_eq!(adj.edge_count(), 0);
        assert_eq!(stats.candidate_pairs, 0);
    }

    #[test]
    fn degenerate_threshold_builds_a_star() {
        let idx = index(&[("C1", ""), ("", ""), ("C2", ""), ("C3", "C4")]);
        let b = builder(SimilarityMetric::Jaccard, 1.0);
        let (adj, stats) = b.build(&idx, Channel::Combined);
        assert!(stats.degenerate);
        assert_eq!(stats.candidate_pairs, 0);
        assert_eq!(adj.edges(), &[(0, 2), (0, 3)]);
        assert_eq!(b.build_brute_force(&idx, Channel::Combined).edges(), &[(0, 2), (0, 3), (2, 3)]);
    }

    #[test]
    fn degenerate_edges_grow_linearly() {
        // no two records share a concept
        let records: Vec<(String, String)> =
            (0..3000).map(|i| (format!("C{i}"), String::new())).collect();
        let pairs: Vec<(&str, &str)> = records.iter().map(|(d, r)| (d.as_str(), r.as_str())).collect();
        let idx = index(&pairs);
        let (adj, stats) = builder(SimilarityMetric::Cosine, 1.0).build(&idx, Channel::Combined);
        assert_eq!(adj.edge_count(), 2999);
        assert_eq!(stats.edge_count, 2999);
    }

    #[test]
    fn degenerate_conjunction_needs_both_channels() {
        let idx = index(&[("", "D1"), ("C1", "D2"), ("C2", ""), ("C3", "D3"), ("C4", "D4")]);
        let b = builder(SimilarityMetric::Jaccard, 1.0);
        let (disease, _) = b.build(&idx, Channel::Disease);
        let (drug, _) = b.build(&idx, Channel::Drug);
        // stars rooted at 1 and 0 share no edge
        assert_eq!(disease.intersect(&drug).edge_count(), 0);
        assert_eq!(b.conjunction(&idx, &disease, &drug).edges(), &[(1, 3), (1, 4)]);
    }

    #[test]
    fn conjunction_below_degenerate_is_intersection() {
        let idx = index(&[("C1", "D1"), ("C1", "D1"), ("C1", "D9")]);
        let b = builder(SimilarityMetric::Jaccard, 0.0);
        let (disease, _) = b.build(&idx, Channel::Disease);
        let (drug, _) = b.build(&idx, Channel::Drug);
        assert_eq!(b.conjunction(&idx, &disease, &drug).edges(), &[(0, 1)]);
    }

    #[test]
    fn zero_threshold_requires_identical_sets() {
        let idx = index(&[("C1 C2", ""), ("C2 C1", ""), ("C1", "")]);
        let (adj, _) = builder(SimilarityMetric::Cosine, 0.0).build(&idx, Channel::Combined);
        assert_eq!(adj.edges(), &[(0, 1)]);
    }

    #[test]
    fn channels_are_scored_independently() {
        let idx = index(&[("C1", "D1"), ("C1", "D2")]);
        let b = builder(SimilarityMetric::Jaccard, 0.1);
        assert_eq!(b.build(&idx, Channel::Disease).0.edge_count(), 1);
        assert_eq!(b.build(&idx, Channel::Drug).0.edge_count(), 0);
        assert_eq!(b.build(&idx, Channel::Combined).0.edge_count(), 0);
    }

    #[test]
    fn parallel_and_serial_agree() {
        let records: Vec<(Vec<String>, Vec<String>)> = (0..PARALLEL_MIN_RECORDS + 16)
            .map(|i| {
                (
                    vec![format!("C{}", i % 37), format!("C{}", i % 11)],
                    vec![format!("D{}", i % 5)],
                )
            })
            .collect();
        let idx = FeatureIndex::from_records(
            "t",
            records.iter().enumerate().map(|(i, (d, r))| {
                (
                    RecordKey::new(Source::Pubmed, i.to_string()),
                    FeatureSet::new(d.clone(), r.clone()),
                )
            }),
        )
        .unwrap();
        let b = builder(SimilarityMetric::Cosine, 0.3);
        let (par, par_stats) = b.with_parallel(true).build(&idx, Channel::Combined);
        let (ser, ser_stats) = b.with_parallel(false).build(&idx, Channel::Combined);
        assert_eq!(par, ser);
        assert_eq!(par_stats, ser_stats);
        assert!(par.edge_count() > 0);
    }
}
