//! One-call analysis over a whole corpus.
//!
//! Bundles the per-record decoded views, every scheme's partition of the
//! low 32 bits, the ground-truth statistics, and the correlation evidence
//! into a single value a reporting layer can render without calling back
//! into the core.

use crate::{
    AnalysisConfig, CalendarStamp, CorpusStats, DecodedId, Error, IdRecord, PartitionResult,
    Result, SchemeCorrelation, SchemeRegistry, ValidationOutcome,
    correlate::correlate_corpus,
    decode::decode,
    partition::analyze_all,
    validate::{validate_corpus, validate_record},
};

/// Everything the core derives from one record.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct RecordAnalysis {
    pub record: IdRecord,
    pub decoded: DecodedId,
    /// The decoded timestamp in UTC and the configured display zone.
    pub calendar: CalendarStamp,
    /// One partition per registered scheme, in registry order.
    pub partitions: Vec<PartitionResult>,
    /// Ground-truth comparison, when the record carries one.
    pub outcome: Option<ValidationOutcome>,
}

/// The combined result of one analysis run.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct CorpusAnalysis {
    pub records: Vec<RecordAnalysis>,
    /// `None` when no record carried ground truth; the corpus still
    /// decodes and correlates, there is just nothing to validate.
    pub stats: Option<CorpusStats>,
    pub correlation: SchemeCorrelation,
}

impl CorpusAnalysis {
    /// Earliest and latest decoded timestamps across the corpus.
    pub fn decoded_time_span(&self) -> Option<(i64, i64)> {
        let min = self.records.iter().map(|r| r.decoded.timestamp_sec).min()?;
        let max = self.records.iter().map(|r| r.decoded.timestamp_sec).max()?;
        Some((min, max))
    }
}

/// Runs the full pipeline over a corpus with the built-in schemes.
pub fn analyze_corpus(records: &[IdRecord], config: &AnalysisConfig) -> Result<CorpusAnalysis> {
    let registry = SchemeRegistry::builtin()?;
    analyze_corpus_with(records, &registry, config)
}

/// Runs the full pipeline over a corpus with a caller-supplied registry.
///
/// Fails with [`Error::EmptyCorpus`] on zero records. A corpus whose
/// records all lack ground truth is not an error: `stats` comes back
/// `None` so a reporting layer can say "no data" instead of crashing.
#[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all))]
pub fn analyze_corpus_with(
    records: &[IdRecord],
    registry: &SchemeRegistry,
    config: &AnalysisConfig,
) -> Result<CorpusAnalysis> {
    if records.is_empty() {
        return Err(Error::EmptyCorpus);
    }
    let stats = match validate_corpus(records, config) {
        Ok(stats) => Some(stats),
        Err(Error::EmptyCorpus) => None,
        Err(err) => return Err(err),
    };
    let correlation = correlate_corpus(records, registry, config)?;
    let records = records
        .iter()
        .map(|record| {
            let decoded = decode(record.id);
            RecordAnalysis {
                record: record.clone(),
                decoded,
                calendar: decoded.calendar(config.display_timezone),
                partitions: analyze_all(decoded.low32, registry),
                outcome: validate_record(record, config.close_match_threshold_secs),
            }
        })
        .collect();
    Ok(CorpusAnalysis {
        records,
        stats,
        correlation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MatchClass;

    fn sample_corpus() -> Vec<IdRecord> {
        vec![
            IdRecord::new(7153549929326120227, "Douyin").with_source_timestamp(1665565640),
            IdRecord::new(7196618597496524067, "Douyin").with_source_timestamp(1675593344),
            IdRecord::new(7559684939684400414, "TikTok").with_source_timestamp(1760126333),
        ]
    }

    #[test]
    fn empty_corpus_is_an_error() {
        let config = AnalysisConfig::default();
        assert!(matches!(
            analyze_corpus(&[], &config),
            Err(Error::EmptyCorpus)
        ));
    }

    #[test]
    fn full_pipeline_bundles_every_view() {
        let config = AnalysisConfig::default();
        let analysis = analyze_corpus(&sample_corpus(), &config).unwrap();

        assert_eq!(analysis.records.len(), 3);
        for record in &analysis.records {
            assert_eq!(record.partitions.len(), 4);
            assert!(record.outcome.is_some());
            assert_eq!(record.decoded.id, record.record.id);
        }

        let stats = analysis.stats.as_ref().unwrap();
        assert_eq!(stats.overall.total(), 3);
        assert_eq!(analysis.correlation.scheme, "16+16");
    }

    #[test]
    fn corpus_without_ground_truth_still_analyzes() {
        let config = AnalysisConfig::default();
        let records = vec![
            IdRecord::new(7153549929326120227, "Douyin"),
            IdRecord::new(7559684939684400414, "TikTok"),
        ];
        let analysis = analyze_corpus(&records, &config).unwrap();
        assert!(analysis.stats.is_none());
        assert_eq!(analysis.records.len(), 2);
        assert!(analysis.records.iter().all(|r| r.outcome.is_none()));
        assert_eq!(analysis.correlation.fields.len(), 2);
    }

    #[test]
    fn calendar_follows_the_configured_zone() {
        let config = AnalysisConfig::default().with_display_timezone(chrono_tz::UTC);
        let analysis = analyze_corpus(&sample_corpus(), &config).unwrap();
        let stamp = &analysis.records[0].calendar;
        assert_eq!(stamp.utc_rfc3339(), stamp.zoned_rfc3339());
    }

    #[test]
    fn unknown_correlation_scheme_propagates() {
        let config = AnalysisConfig::default().with_correlation_scheme("nope");
        let err = analyze_corpus(&sample_corpus(), &config).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
    }

    #[test]
    fn known_divergence_shows_up_in_the_outcome() {
        let config = AnalysisConfig::default();
        let analysis = analyze_corpus(&sample_corpus(), &config).unwrap();
        let outcome = analysis.records[0].outcome.as_ref().unwrap();
        assert_eq!(outcome.delta_secs, -6);
        assert_eq!(outcome.class, MatchClass::Divergent);
    }

    #[test]
    fn time_span_covers_decoded_extremes() {
        let config = AnalysisConfig::default();
        let analysis = analyze_corpus(&sample_corpus(), &config).unwrap();
        let (min, max) = analysis.decoded_time_span().unwrap();
        assert_eq!(min, 1665565634);
        assert!(max > min);
    }

    #[test]
    fn analysis_is_deterministic() {
        let config = AnalysisConfig::default();
        let first = analyze_corpus(&sample_corpus(), &config).unwrap();
        let second = analyze_corpus(&sample_corpus(), &config).unwrap();
        assert_eq!(first, second);
    }
}
