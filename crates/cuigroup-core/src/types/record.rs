//! Record keys and per-record concept features.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// The ingestion source a record comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// ClinicalTrials.gov registry entries.
    Ctgov,
    /// PubMed publications.
    Pubmed,
    /// European Medicines Agency drug-registry entries.
    Ema,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Ctgov, Source::Pubmed, Source::Ema];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ctgov => "ctgov",
            Self::Pubmed => "pubmed",
            Self::Ema => "ema",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ctgov" => Ok(Self::Ctgov),
            "pubmed" => Ok(Self::Pubmed),
            "ema" => Ok(Self::Ema),
            _ => Err(ConfigError::UnknownSource {
                name: s.to_string(),
            }),
        }
    }
}

/// Uniquely names a record across all ingestion sources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    pub source: Source,
    pub record_id: String,
}

impl RecordKey {
    pub fn new(source: Source, record_id: impl Into<String>) -> Self {
        Self {
            source,
            record_id: record_id.into(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.record_id)
    }
}

/// Parses the `source:record_id` display form.
impl FromStr for RecordKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (source, record_id) = s.split_once(':').ok_or_else(|| ConfigError::ValidationFailed {
            field: "record_key".to_string(),
            message: format!("'{s}' is not of the form source:record_id"),
        })?;
        if record_id.is_empty() {
            return Err(ConfigError::ValidationFailed {
                field: "record_key".to_string(),
                message: format!("'{s}' has an empty record id"),
            });
        }
        Ok(Self::new(source.parse()?, record_id))
    }
}

/// Disease and drug concept identifiers extracted for one record.
///
/// Empty sets are valid and mean "no concept detected".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSet {
    #[serde(default)]
    pub disease_cuis: BTreeSet<String>,
    #[serde(default)]
    pub drug_cuis: BTreeSet<String>,
}

impl FeatureSet {
    pub fn new<D, R>(disease_cuis: D, drug_cuis: R) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            disease_cuis: disease_cuis.into_iter().map(Into::into).collect(),
            drug_cuis: drug_cuis.into_iter().map(Into::into).collect(),
        }
    }

    /// True when both concept sets are empty.
    pub fn is_featureless(&self) -> bool {
        self.disease_cuis.is_empty() && self.drug_cuis.is_empty()
    }

    /// Union of disease and drug identifiers. A CUI present in both counts once.
    pub fn combined(&self) -> BTreeSet<&str> {
        self.disease_cuis
            .iter()
            .chain(self.drug_cuis.iter())
            .map(String::as_str)
            .collect()
    }
}
