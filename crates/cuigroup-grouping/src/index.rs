//! Feature index: the per-run arena of records and interned concept ids.
//!
//! Each record gets a dense arena slot `0..n`. Concept identifiers are
//! interned into one vocabulary shared by the disease and drug channels, and
//! every record stores its concepts as strictly ascending id slices so that
//! similarity is a linear merge.

use cuigroup_core::errors::GroupingError;
use cuigroup_core::traits::FeatureProvider;
use cuigroup_core::types::collections::{BTreeSet, FxHashSet};
use cuigroup_core::types::{FeatureSet, RecordKey};
use lasso::{Key, Rodeo, RodeoReader, Spur};
use tracing::{debug, warn};

/// Interned concept identifier.
pub type ConceptId = u32;

/// Which concept set a similarity is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Union of disease and drug concepts.
    Combined,
    /// Disease concepts only.
    Disease,
    /// Drug concepts only.
    Drug,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Combined => "combined",
            Self::Disease => "disease",
            Self::Drug => "drug",
        }
    }
}

/// Arena of records with interned, sorted concept ids per channel.
///
/// Built once per grouping run from a read-only feature provider and dropped
/// with the run.
pub struct FeatureIndex {
    dataset: String,
    keys: Vec<RecordKey>,
    disease: Vec<Vec<ConceptId>>,
    drug: Vec<Vec<ConceptId>>,
    combined: Vec<Vec<ConceptId>>,
    vocabulary: RodeoReader<Spur>,
    featureless: usize,
}

impl FeatureIndex {
    /// Index every record of the provider's dataset.
    pub fn from_provider(provider: &dyn FeatureProvider) -> Result<Self, GroupingError> {
        let universe = provider.record_keys()?;
        Self::from_provider_for(provider, &universe)
    }

    /// Index an explicit universe of records.
    ///
    /// Every key must be known to the provider; an unknown key is
    /// `MissingRecord`.
    pub fn from_provider_for(
        provider: &dyn FeatureProvider,
        universe: &[RecordKey],
    ) -> Result<Self, GroupingError> {
        let fetched = provider.fetch_many(universe)?;
        let mut records = Vec::with_capacity(universe.len());
        for (key, features) in universe.iter().zip(fetched) {
            match features {
                Some(f) => records.push((key.clone(), f)),
                None => {
                    return Err(GroupingError::MissingRecord {
                        dataset: provider.dataset().to_string(),
                        key: key.clone(),
                    })
                }
            }
        }
        Self::from_records(provider.dataset(), records)
    }

    /// Index records given directly.
    pub fn from_records<I>(dataset: &str, records: I) -> Result<Self, GroupingError>
    where
        I: IntoIterator<Item = (RecordKey, FeatureSet)>,
    {
        let mut seen: FxHashSet<RecordKey> = FxHashSet::default();
        let mut vocabulary: Rodeo<Spur> = Rodeo::default();
        let mut keys = Vec::new();
        let (mut disease, mut drug, mut combined) = (Vec::new(), Vec::new(), Vec::new());
        let mut featureless = 0;

        for (key, features) in records {
            if !seen.insert(key.clone()) {
                return Err(GroupingError::DuplicateRecord { key });
            }
            if features.is_featureless() {
                featureless += 1;
            }
            let disease_ids = intern_all(&mut vocabulary, &features.disease_cuis);
            let drug_ids = intern_all(&mut vocabulary, &features.drug_cuis);
            combined.push(merge_sorted(&disease_ids, &drug_ids));
            disease.push(disease_ids);
            drug.push(drug_ids);
            keys.push(key);
        }

        // Read-only from here on.
        let index = Self {
            dataset: dataset.to_string(),
            keys,
            disease,
            drug,
            combined,
            vocabulary: vocabulary.into_reader(),
            featureless,
        };

        if index.featureless > 0 {
            warn!(
                featureless_count = index.featureless,
                record_count = index.keys.len(),
                "records without disease or drug concepts; they stay singleton supergroups"
            );
        }
        debug!(
            record_count = index.keys.len(),
            vocabulary_size = index.vocabulary.len(),
            "feature index built"
        );

        Ok(index)
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    /// Number of records in the arena.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn key(&self, slot: usize) -> &RecordKey {
        &self.keys[slot]
    }

    pub fn keys(&self) -> &[RecordKey] {
        &self.keys
    }

    /// Sorted concept ids of a record on a channel.
    pub fn concepts(&self, channel: Channel, slot: usize) -> &[ConceptId] {
        match channel {
            Channel::Combined => &self.combined[slot],
            Channel::Disease => &self.disease[slot],
            Channel::Drug => &self.drug[slot],
        }
    }

    /// Distinct concept identifiers across both channels.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Interned id of a concept, if it was observed.
    pub fn concept_id(&self, cui: &str) -> Option<ConceptId> {
        self.vocabulary.get(cui).map(|s| s.into_usize() as ConceptId)
    }

    /// Records with both concept sets empty.
    pub fn featureless_count(&self) -> usize {
        self.featureless
    }
}

fn intern_all(vocabulary: &mut Rodeo<Spur>, cuis: &BTreeSet<String>) -> Vec<ConceptId> {
    let mut ids: Vec<ConceptId> = cuis
        .iter()
        .map(|c| vocabulary.get_or_intern(c.as_str()).into_usize() as ConceptId)
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Sorted union of two ascending, duplicate-free slices.
fn merge_sorted(a: &[ConceptId], b: &[ConceptId]) -> Vec<ConceptId> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => {
                out.push(a[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                out.push(b[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}
