//! Ground-truth validation of decoded timestamps.
//!
//! Each record that carries a source timestamp is decoded and the signed
//! delta `decoded - source` is classified as [`MatchClass::Exact`],
//! [`MatchClass::Close`], or [`MatchClass::Divergent`]. Aggregation is a
//! fold over [`DeltaStats`] partials, which merge associatively so a
//! corpus can be split, folded in pieces, and recombined with
//! [`DeltaStats::merge`] without changing the result.

use std::collections::BTreeMap;

use crate::{AnalysisConfig, Error, IdRecord, Result, decode::decode};

/// Classification of a decoded timestamp against its ground truth.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatchClass {
    /// The decoded timestamp equals the source timestamp.
    Exact,
    /// Nonzero delta within the configured close-match window.
    Close,
    /// Delta outside the close-match window.
    Divergent,
}

impl MatchClass {
    /// Classifies a signed delta against a close-match window.
    ///
    /// A negative window degenerates to exact-or-divergent.
    pub const fn classify(delta_secs: i64, close_threshold_secs: i64) -> Self {
        if delta_secs == 0 {
            Self::Exact
        } else if 0 <= close_threshold_secs
            && delta_secs.unsigned_abs() <= close_threshold_secs as u64
        {
            Self::Close
        } else {
            Self::Divergent
        }
    }

    /// Whether this classification counts toward the accuracy rate.
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Exact | Self::Close)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Close => "close",
            Self::Divergent => "divergent",
        }
    }
}

impl core::fmt::Display for MatchClass {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-record validation result for a record with ground truth.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub id: u64,
    pub label: String,
    pub decoded_timestamp: i64,
    pub source_timestamp: i64,
    /// Signed seconds: `decoded_timestamp - source_timestamp`.
    pub delta_secs: i64,
    pub class: MatchClass,
}

/// Decodes one record and classifies it against its source timestamp.
///
/// Returns `None` when the record carries no ground truth, since there is
/// nothing to validate against.
pub fn validate_record(record: &IdRecord, close_threshold_secs: i64) -> Option<ValidationOutcome> {
    let source_timestamp = record.source_timestamp?;
    let decoded_timestamp = decode(record.id).timestamp_sec;
    let delta_secs = decoded_timestamp.saturating_sub(source_timestamp);
    Some(ValidationOutcome {
        id: record.id,
        label: record.label.clone(),
        decoded_timestamp,
        source_timestamp,
        delta_secs,
        class: MatchClass::classify(delta_secs, close_threshold_secs),
    })
}

/// Mergeable aggregate of validation outcomes.
///
/// [`DeltaStats::EMPTY`] is the identity: folding a slice of outcomes in
/// any grouping and merging the partials yields the same value as one
/// sequential fold. Rate and mean accessors return `None` on the empty
/// aggregate rather than a fabricated `0%` or `NaN`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeltaStats {
    total: u64,
    exact: u64,
    close: u64,
    divergent: u64,
    sum_delta: i128,
    sum_abs_delta: u128,
    min_delta: Option<i64>,
    max_delta: Option<i64>,
    min_abs_delta: Option<u64>,
    max_abs_delta: Option<u64>,
}

impl DeltaStats {
    /// The identity aggregate: no outcomes observed.
    pub const EMPTY: Self = Self {
        total: 0,
        exact: 0,
        close: 0,
        divergent: 0,
        sum_delta: 0,
        sum_abs_delta: 0,
        min_delta: None,
        max_delta: None,
        min_abs_delta: None,
        max_abs_delta: None,
    };

    /// Folds one outcome into the aggregate.
    pub fn observe(self, outcome: &ValidationOutcome) -> Self {
        let delta = outcome.delta_secs;
        let abs = delta.unsigned_abs();
        let (exact, close, divergent) = match outcome.class {
            MatchClass::Exact => (1, 0, 0),
            MatchClass::Close => (0, 1, 0),
            MatchClass::Divergent => (0, 0, 1),
        };
        Self {
            total: self.total + 1,
            exact: self.exact + exact,
            close: self.close + close,
            divergent: self.divergent + divergent,
            sum_delta: self.sum_delta + i128::from(delta),
            sum_abs_delta: self.sum_abs_delta + u128::from(abs),
            min_delta: merge_min(self.min_delta, Some(delta)),
            max_delta: merge_max(self.max_delta, Some(delta)),
            min_abs_delta: merge_min(self.min_abs_delta, Some(abs)),
            max_abs_delta: merge_max(self.max_abs_delta, Some(abs)),
        }
    }

    /// Combines two partial aggregates.
    pub fn merge(self, other: Self) -> Self {
        Self {
            total: self.total + other.total,
            exact: self.exact + other.exact,
            close: self.close + other.close,
            divergent: self.divergent + other.divergent,
            sum_delta: self.sum_delta + other.sum_delta,
            sum_abs_delta: self.sum_abs_delta + other.sum_abs_delta,
            min_delta: merge_min(self.min_delta, other.min_delta),
            max_delta: merge_max(self.max_delta, other.max_delta),
            min_abs_delta: merge_min(self.min_abs_delta, other.min_abs_delta),
            max_abs_delta: merge_max(self.max_abs_delta, other.max_abs_delta),
        }
    }

    pub const fn total(&self) -> u64 {
        self.total
    }

    pub const fn exact(&self) -> u64 {
        self.exact
    }

    pub const fn close(&self) -> u64 {
        self.close
    }

    pub const fn divergent(&self) -> u64 {
        self.divergent
    }

    /// Outcomes counting toward the accuracy rate (exact plus close).
    pub const fn matched(&self) -> u64 {
        self.exact + self.close
    }

    /// Accuracy rate in percent, `None` when nothing was observed.
    pub fn accuracy_pct(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.matched() as f64 / self.total as f64 * 100.0)
        }
    }

    /// Mean signed delta in seconds.
    pub fn mean_delta_secs(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.sum_delta as f64 / self.total as f64)
        }
    }

    /// Mean absolute delta in seconds.
    pub fn mean_abs_delta_secs(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.sum_abs_delta as f64 / self.total as f64)
        }
    }

    pub const fn min_delta_secs(&self) -> Option<i64> {
        self.min_delta
    }

    pub const fn max_delta_secs(&self) -> Option<i64> {
        self.max_delta
    }

    pub const fn min_abs_delta_secs(&self) -> Option<u64> {
        self.min_abs_delta
    }

    pub const fn max_abs_delta_secs(&self) -> Option<u64> {
        self.max_abs_delta
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for DeltaStats {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("DeltaStats", 11)?;
        s.serialize_field("total", &self.total)?;
        s.serialize_field("exact", &self.exact)?;
        s.serialize_field("close", &self.close)?;
        s.serialize_field("divergent", &self.divergent)?;
        s.serialize_field("accuracy_pct", &self.accuracy_pct())?;
        s.serialize_field("mean_delta_secs", &self.mean_delta_secs())?;
        s.serialize_field("min_delta_secs", &self.min_delta)?;
        s.serialize_field("max_delta_secs", &self.max_delta)?;
        s.serialize_field("mean_abs_delta_secs", &self.mean_abs_delta_secs())?;
        s.serialize_field("min_abs_delta_secs", &self.min_abs_delta)?;
        s.serialize_field("max_abs_delta_secs", &self.max_abs_delta)?;
        s.end()
    }
}

fn merge_min<T: Ord>(a: Option<T>, b: Option<T>) -> Option<T> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (x, None) => x,
        (None, y) => y,
    }
}

fn merge_max<T: Ord>(a: Option<T>, b: Option<T>) -> Option<T> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.max(y)),
        (x, None) => x,
        (None, y) => y,
    }
}

/// Corpus-level validation statistics.
///
/// `by_label` keys on the record label, so per-platform sections come out
/// in a stable order.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorpusStats {
    pub overall: DeltaStats,
    pub by_label: BTreeMap<String, DeltaStats>,
    /// Records that carried no source timestamp and were not validated.
    pub skipped: u64,
}

/// Validates a corpus against its ground-truth timestamps.
///
/// Records without a source timestamp are counted as skipped. Fails with
/// [`Error::EmptyCorpus`] when no record is validatable, since an
/// accuracy rate over zero outcomes is undefined.
#[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all))]
pub fn validate_corpus(records: &[IdRecord], config: &AnalysisConfig) -> Result<CorpusStats> {
    let threshold = config.close_match_threshold_secs;
    let mut overall = DeltaStats::EMPTY;
    let mut by_label: BTreeMap<String, DeltaStats> = BTreeMap::new();
    let mut skipped = 0u64;
    for record in records {
        match validate_record(record, threshold) {
            Some(outcome) => {
                let group = by_label.entry(record.label.clone()).or_default();
                *group = group.observe(&outcome);
                overall = overall.observe(&outcome);
            }
            None => skipped += 1,
        }
    }
    if overall.total() == 0 {
        return Err(Error::EmptyCorpus);
    }
    Ok(CorpusStats {
        overall,
        by_label,
        skipped,
    })
}
