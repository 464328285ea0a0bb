//! Structural evidence for the low-32 partition hypotheses.
//!
//! For one scheme, every record's low 32 bits are split into that
//! scheme's sub-fields and the corpus is grouped by each sub-field's
//! value. Values shared by two or more ids are collisions; the ratio of
//! distinct values to records says whether a field behaves like a coarse
//! identifier (low ratio) or a fine-grained counter (high ratio). The
//! output is evidence for interpretation, never a verdict on a scheme.

use std::collections::BTreeMap;

use crate::{
    AnalysisConfig, Error, IdRecord, PartitionScheme, Result, SchemeRegistry, decode::decode,
};

/// Grouping of a corpus by one sub-field's values.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct FieldCorrelation {
    /// Sub-field name within the scheme.
    pub field: &'static str,
    pub width: u8,
    pub distinct_values: u64,
    pub total_records: u64,
    /// Field values shared by at least two records, each listing the
    /// contributing `(label, id)` pairs in corpus order.
    pub collisions: BTreeMap<u32, Vec<(String, u64)>>,
}

impl FieldCorrelation {
    /// Distinct values over total records, in `(0, 1]`.
    pub fn uniqueness_ratio(&self) -> f64 {
        self.distinct_values as f64 / self.total_records as f64
    }

    pub fn collision_count(&self) -> usize {
        self.collisions.len()
    }
}

/// Correlation evidence for every sub-field of one scheme.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct SchemeCorrelation {
    pub scheme: &'static str,
    /// One entry per sub-field, in the scheme's field order.
    pub fields: Vec<FieldCorrelation>,
}

impl SchemeCorrelation {
    pub fn field(&self, name: &str) -> Option<&FieldCorrelation> {
        self.fields.iter().find(|f| f.field == name)
    }
}

/// Groups a corpus by every sub-field of the given scheme.
///
/// Fails with [`Error::EmptyCorpus`] on zero records, since a uniqueness
/// ratio over nothing is undefined.
#[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all))]
pub fn correlate_scheme(
    records: &[IdRecord],
    scheme: &PartitionScheme,
) -> Result<SchemeCorrelation> {
    if records.is_empty() {
        return Err(Error::EmptyCorpus);
    }
    let total_records = records.len() as u64;
    let fields = scheme
        .fields
        .iter()
        .map(|field| {
            let mut groups: BTreeMap<u32, Vec<(String, u64)>> = BTreeMap::new();
            for record in records {
                let value = field.extract(decode(record.id).low32);
                groups
                    .entry(value)
                    .or_default()
                    .push((record.label.clone(), record.id));
            }
            let distinct_values = groups.len() as u64;
            let collisions = groups
                .into_iter()
                .filter(|(_, members)| members.len() >= 2)
                .collect();
            FieldCorrelation {
                field: field.name,
                width: field.width,
                distinct_values,
                total_records,
                collisions,
            }
        })
        .collect();
    Ok(SchemeCorrelation {
        scheme: scheme.name,
        fields,
    })
}

/// Correlates under the scheme named by `config.correlation_scheme`.
///
/// An unregistered scheme name is rejected with [`Error::InvalidInput`].
pub fn correlate_corpus(
    records: &[IdRecord],
    registry: &SchemeRegistry,
    config: &AnalysisConfig,
) -> Result<SchemeCorrelation> {
    let scheme = registry.get(&config.correlation_scheme).ok_or_else(|| {
        Error::invalid_input(format!(
            "unknown correlation scheme `{}`",
            config.correlation_scheme
        ))
    })?;
    correlate_scheme(records, scheme)
}
