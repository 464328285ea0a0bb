//! Subcommand dispatch and report assembly.
//!
//! Each handler renders one report to `out`: human-readable text by
//! default, one pretty-printed JSON document under `--json`. Diagnostics
//! go through `tracing` on stderr, keeping stdout machine-parseable.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use snowmelt::{
    AwemeId, CorpusStats, DecodedId, FieldValue, MatchClass, PartitionResult, PartitionScheme,
    SchemeCorrelation, SchemeRegistry, ValidationOutcome, analyze, analyze_all,
    analyze_corpus_with, decode, encode,
};
use snowmelt_corpus::{CorpusDocument, extract_from_path, load_records};

use super::args::{Cli, Command};
use super::render::{field_hex, write_decoded, write_field_table, write_heading, write_kv};

/// Executes the parsed command, writing its report to `out`.
pub fn run(cli: &Cli, out: &mut impl Write) -> anyhow::Result<()> {
    let registry = SchemeRegistry::builtin()?;
    let Some(scheme) = registry.get(&cli.scheme).copied() else {
        let known: Vec<&str> = registry.all_schemes().iter().map(|s| s.name).collect();
        bail!(
            "unknown scheme `{}` (registered: {})",
            cli.scheme,
            known.join(", ")
        );
    };

    match &cli.command {
        Command::Decode { ids } => decode_ids(cli, ids, out),
        Command::Schemes { ids } => scheme_tables(cli, &registry, ids, out),
        Command::Inspect { id } => inspect_id(cli, &scheme, *id, out),
        Command::Validate { corpus } => validate(cli, &registry, corpus, out),
        Command::Correlate { corpus } => correlate(cli, &registry, corpus, out),
        Command::Forge { timestamp, low32 } => forge(cli, &registry, *timestamp, *low32, out),
        Command::Extract {
            douyin,
            tiktok,
            output,
        } => extract(cli, douyin.as_deref(), tiktok.as_deref(), output, out),
    }
}

fn write_json(out: &mut impl Write, report: &impl serde::Serialize) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}

/// RFC 3339 UTC rendering of a Unix timestamp.
///
/// Decoded timestamps always fit the calendar range; caller-supplied
/// ground truth is an arbitrary `i64` and falls back to the raw value.
fn utc_string(timestamp_sec: i64) -> String {
    match DateTime::from_timestamp(timestamp_sec, 0) {
        Some(utc) => utc.to_rfc3339(),
        None => format!("{timestamp_sec} (outside calendar range)"),
    }
}

#[derive(serde::Serialize)]
struct DecodeReport {
    id: String,
    timestamp_sec: i64,
    datetime_utc: String,
    datetime_zoned: String,
    timezone: &'static str,
    low32_dec: u32,
    low32_hex: String,
    low32_bin: String,
}

fn decode_report(id: AwemeId, tz: Tz) -> DecodeReport {
    let decoded = decode(id.to_raw());
    let stamp = decoded.calendar(tz);
    DecodeReport {
        id: id.to_string(),
        timestamp_sec: decoded.timestamp_sec,
        datetime_utc: stamp.utc_rfc3339(),
        datetime_zoned: stamp.zoned_rfc3339(),
        timezone: tz.name(),
        low32_dec: decoded.low32,
        low32_hex: format!("{:#010x}", decoded.low32),
        low32_bin: format!("{:#034b}", decoded.low32),
    }
}

fn decode_ids(cli: &Cli, ids: &[AwemeId], out: &mut impl Write) -> anyhow::Result<()> {
    if cli.json {
        let reports: Vec<DecodeReport> = ids
            .iter()
            .map(|id| decode_report(*id, cli.timezone))
            .collect();
        return write_json(out, &reports);
    }
    let noun = if ids.len() == 1 { "ID" } else { "IDs" };
    write_heading(out, &format!("Decoding {} aweme {noun}", ids.len()))?;
    for (i, id) in ids.iter().enumerate() {
        writeln!(out)?;
        let decoded = decode(id.to_raw());
        let stamp = decoded.calendar(cli.timezone);
        write_decoded(out, i + 1, &decoded, &stamp, cli.timezone)?;
    }
    Ok(())
}

#[derive(serde::Serialize)]
struct SchemesReport {
    id: String,
    low32_hex: String,
    partitions: Vec<PartitionResult>,
}

fn scheme_tables(
    cli: &Cli,
    registry: &SchemeRegistry,
    ids: &[AwemeId],
    out: &mut impl Write,
) -> anyhow::Result<()> {
    if cli.json {
        let reports: Vec<SchemesReport> = ids
            .iter()
            .map(|id| {
                let decoded = decode(id.to_raw());
                SchemesReport {
                    id: id.to_string(),
                    low32_hex: format!("{:#010x}", decoded.low32),
                    partitions: analyze_all(decoded.low32, registry),
                }
            })
            .collect();
        return write_json(out, &reports);
    }
    for (i, id) in ids.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        let decoded = decode(id.to_raw());
        write_heading(out, &format!("ID {id} low32 {:#010x}", decoded.low32))?;
        for partition in analyze_all(decoded.low32, registry) {
            writeln!(out, "  [{}]", partition.scheme)?;
            write_field_table(out, "  ", &partition.fields, false)?;
        }
    }
    Ok(())
}

#[derive(serde::Serialize)]
struct InspectReport {
    id: String,
    padded: String,
    raw_hex: String,
    timestamp_sec: i64,
    datetime_utc: String,
    datetime_zoned: String,
    timezone: &'static str,
    halves: Vec<FieldValue>,
    partition: PartitionResult,
}

/// The two 32-bit halves as synthetic fields, for the top-level box.
fn halves_of(decoded: &DecodedId) -> Vec<FieldValue> {
    vec![
        FieldValue {
            name: "timestamp",
            width: 32,
            value: decoded.timestamp_sec as u32,
        },
        FieldValue {
            name: "uniqueness",
            width: 32,
            value: decoded.low32,
        },
    ]
}

fn inspect_id(
    cli: &Cli,
    scheme: &PartitionScheme,
    id: AwemeId,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let decoded = decode(id.to_raw());
    let stamp = decoded.calendar(cli.timezone);
    let partition = analyze(decoded.low32, scheme);
    if cli.json {
        return write_json(
            out,
            &InspectReport {
                id: id.to_string(),
                padded: id.to_padded_string(),
                raw_hex: format!("{:#018x}", decoded.id),
                timestamp_sec: decoded.timestamp_sec,
                datetime_utc: stamp.utc_rfc3339(),
                datetime_zoned: stamp.zoned_rfc3339(),
                timezone: cli.timezone.name(),
                halves: halves_of(&decoded),
                partition,
            },
        );
    }
    write_heading(out, &format!("Bit structure of {id}"))?;
    write_kv(out, "raw", format_args!("{:#018x}", decoded.id))?;
    write_kv(out, "padded", id.to_padded_string())?;
    write_kv(out, "utc", stamp.utc_rfc3339())?;
    write_kv(
        out,
        "zoned",
        format_args!("{} ({})", stamp.zoned_rfc3339(), cli.timezone.name()),
    )?;
    writeln!(out)?;
    writeln!(out, "  64-bit halves")?;
    write_field_table(out, "  ", &halves_of(&decoded), true)?;
    writeln!(out)?;
    writeln!(out, "  low 32 bits under {}", scheme.name)?;
    write_field_table(out, "  ", &partition.fields, true)?;
    Ok(())
}

#[derive(serde::Serialize)]
struct ValidateReport<'a> {
    corpus: String,
    total_count: u64,
    douyin_count: u64,
    tiktok_count: u64,
    threshold_secs: i64,
    stats: &'a CorpusStats,
    divergent: Vec<&'a ValidationOutcome>,
    verdict: &'static str,
}

/// Conclusion bands for the timestamp-half accuracy rate. Says nothing
/// about low-32 semantics.
fn verdict(accuracy_pct: f64) -> &'static str {
    if accuracy_pct >= 95.0 {
        "timestamp decode is highly accurate"
    } else if accuracy_pct >= 80.0 {
        "timestamp decode is mostly correct; deltas suggest a small constant offset"
    } else {
        "timestamp decode shows significant errors against this corpus"
    }
}

fn validate(
    cli: &Cli,
    registry: &SchemeRegistry,
    corpus_path: &Path,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let config = cli.analysis_config();
    let document = CorpusDocument::from_path(corpus_path)
        .with_context(|| format!("cannot load corpus `{}`", corpus_path.display()))?;
    let records = document.to_records()?;
    tracing::info!(
        records = records.len(),
        corpus = %corpus_path.display(),
        "corpus loaded"
    );
    let analysis = analyze_corpus_with(&records, registry, &config)?;
    let Some(stats) = analysis.stats.as_ref() else {
        if cli.json {
            return write_json(
                out,
                &serde_json::json!({
                    "corpus": corpus_path.display().to_string(),
                    "validated": 0,
                    "skipped": records.len(),
                }),
            );
        }
        writeln!(
            out,
            "corpus `{}` carries no ground-truth timestamps; nothing to validate",
            corpus_path.display()
        )?;
        return Ok(());
    };
    let accuracy = stats.overall.accuracy_pct().unwrap_or(0.0);
    let divergent: Vec<&ValidationOutcome> = analysis
        .records
        .iter()
        .filter_map(|r| r.outcome.as_ref())
        .filter(|o| o.class == MatchClass::Divergent)
        .collect();

    if cli.json {
        return write_json(
            out,
            &ValidateReport {
                corpus: corpus_path.display().to_string(),
                total_count: document.total_count,
                douyin_count: document.douyin_count,
                tiktok_count: document.tiktok_count,
                threshold_secs: config.close_match_threshold_secs,
                stats,
                divergent,
                verdict: verdict(accuracy),
            },
        );
    }

    write_heading(
        out,
        &format!(
            "Validating {} decoded timestamps against ground truth",
            stats.overall.total()
        ),
    )?;
    write_kv(
        out,
        "corpus",
        format_args!(
            "{} ({} Douyin, {} TikTok)",
            corpus_path.display(),
            document.douyin_count,
            document.tiktok_count
        ),
    )?;
    write_kv(
        out,
        "threshold",
        format_args!("±{}s", config.close_match_threshold_secs),
    )?;
    if stats.skipped > 0 {
        write_kv(
            out,
            "skipped",
            format_args!("{} records without ground truth", stats.skipped),
        )?;
    }

    if !divergent.is_empty() {
        writeln!(out)?;
        writeln!(out, "  divergent records:")?;
        for outcome in &divergent {
            writeln!(
                out,
                "    [{}] {} decoded {} vs source {} ({:+}s)",
                outcome.label,
                outcome.id,
                utc_string(outcome.decoded_timestamp),
                utc_string(outcome.source_timestamp),
                outcome.delta_secs,
            )?;
        }
    }

    let overall = &stats.overall;
    writeln!(out)?;
    write_kv(out, "validated", overall.total())?;
    write_kv(out, "exact", overall.exact())?;
    write_kv(out, "close", overall.close())?;
    write_kv(out, "divergent", overall.divergent())?;
    write_kv(
        out,
        "accuracy",
        format_args!(
            "{accuracy:.1}% ({}/{} within ±{}s)",
            overall.matched(),
            overall.total(),
            config.close_match_threshold_secs
        ),
    )?;
    write_kv(
        out,
        "mean delta",
        format_args!("{:+.2}s", overall.mean_delta_secs().unwrap_or(0.0)),
    )?;
    write_kv(
        out,
        "abs delta",
        format_args!(
            "mean {:.2}s, min {}s, max {}s",
            overall.mean_abs_delta_secs().unwrap_or(0.0),
            overall.min_abs_delta_secs().unwrap_or(0),
            overall.max_abs_delta_secs().unwrap_or(0)
        ),
    )?;

    writeln!(out)?;
    writeln!(out, "  by label:")?;
    for (label, group) in &stats.by_label {
        writeln!(
            out,
            "    {label}: {} validated, {:.1}% within ±{}s, mean delta {:+.2}s, range {:+}s ~ {:+}s",
            group.total(),
            group.accuracy_pct().unwrap_or(0.0),
            config.close_match_threshold_secs,
            group.mean_delta_secs().unwrap_or(0.0),
            group.min_delta_secs().unwrap_or(0),
            group.max_delta_secs().unwrap_or(0),
        )?;
    }

    writeln!(out)?;
    write_kv(out, "verdict", verdict(accuracy))?;
    Ok(())
}

#[derive(serde::Serialize)]
struct TimeSpan {
    earliest_sec: i64,
    earliest_utc: String,
    latest_sec: i64,
    latest_utc: String,
    span_secs: i64,
}

#[derive(serde::Serialize)]
struct CorrelateReport<'a> {
    corpus: String,
    records: usize,
    correlation: &'a SchemeCorrelation,
    time_span: Option<TimeSpan>,
}

fn correlate(
    cli: &Cli,
    registry: &SchemeRegistry,
    corpus_path: &Path,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let config = cli.analysis_config();
    let records = load_records(corpus_path)
        .with_context(|| format!("cannot load corpus `{}`", corpus_path.display()))?;
    tracing::info!(
        records = records.len(),
        corpus = %corpus_path.display(),
        "corpus loaded"
    );
    let analysis = analyze_corpus_with(&records, registry, &config)?;
    let correlation = &analysis.correlation;
    let span = analysis.decoded_time_span().map(|(min, max)| TimeSpan {
        earliest_sec: min,
        earliest_utc: utc_string(min),
        latest_sec: max,
        latest_utc: utc_string(max),
        span_secs: max - min,
    });

    if cli.json {
        return write_json(
            out,
            &CorrelateReport {
                corpus: corpus_path.display().to_string(),
                records: records.len(),
                correlation,
                time_span: span,
            },
        );
    }

    write_heading(
        out,
        &format!(
            "Correlating {} IDs under scheme {}",
            records.len(),
            correlation.scheme
        ),
    )?;
    for field in &correlation.fields {
        writeln!(out)?;
        writeln!(
            out,
            "  {} ({} bits): {} distinct / {} records, uniqueness {:.2}",
            field.field,
            field.width,
            field.distinct_values,
            field.total_records,
            field.uniqueness_ratio(),
        )?;
        if field.collisions.is_empty() {
            writeln!(out, "    no shared values")?;
        }
        for (value, members) in &field.collisions {
            writeln!(
                out,
                "    value {value} ({}) shared by {} IDs:",
                field_hex(*value, field.width),
                members.len()
            )?;
            for (label, id) in members {
                writeln!(out, "      [{label}] {id}")?;
            }
        }
    }
    if let Some(span) = &span {
        writeln!(out)?;
        write_kv(
            out,
            "earliest",
            format_args!("{} ({})", span.earliest_utc, span.earliest_sec),
        )?;
        write_kv(
            out,
            "latest",
            format_args!("{} ({})", span.latest_utc, span.latest_sec),
        )?;
        write_kv(
            out,
            "span",
            format_args!(
                "{}s ({:.2} hours, {:.2} days)",
                span.span_secs,
                span.span_secs as f64 / 3600.0,
                span.span_secs as f64 / 86400.0
            ),
        )?;
    }
    Ok(())
}

#[derive(serde::Serialize)]
struct ForgeReport {
    #[serde(flatten)]
    decode: DecodeReport,
    random_low32: bool,
}

fn forge(
    cli: &Cli,
    registry: &SchemeRegistry,
    timestamp: Option<u32>,
    low32: Option<u32>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let timestamp_sec = match timestamp {
        Some(ts) => ts,
        None => u32::try_from(Utc::now().timestamp())
            .context("current time does not fit the 32-bit timestamp field")?,
    };
    let id = AwemeId::from_raw(encode(timestamp_sec, low32));
    tracing::info!(
        %id,
        timestamp_sec,
        random_low32 = low32.is_none(),
        "forged aweme-style id"
    );
    if cli.json {
        return write_json(
            out,
            &ForgeReport {
                decode: decode_report(id, cli.timezone),
                random_low32: low32.is_none(),
            },
        );
    }
    let decoded = decode(id.to_raw());
    let stamp = decoded.calendar(cli.timezone);
    write_heading(out, "Forged aweme-style ID")?;
    writeln!(out)?;
    write_decoded(out, 1, &decoded, &stamp, cli.timezone)?;
    writeln!(out)?;
    for partition in analyze_all(decoded.low32, registry) {
        writeln!(out, "  [{}]", partition.scheme)?;
        write_field_table(out, "  ", &partition.fields, false)?;
    }
    Ok(())
}

#[derive(serde::Serialize)]
struct ExtractReport {
    douyin_count: u64,
    tiktok_count: u64,
    total_count: u64,
    output: String,
}

fn extract(
    cli: &Cli,
    douyin: Option<&Path>,
    tiktok: Option<&Path>,
    output: &Path,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    if douyin.is_none() && tiktok.is_none() {
        bail!("nothing to extract: pass --douyin and/or --tiktok");
    }
    let mut videos = Vec::new();
    if let Some(path) = douyin {
        let entries = extract_from_path(path, "Douyin", cli.timezone)
            .with_context(|| format!("cannot extract Douyin posts from `{}`", path.display()))?;
        tracing::info!(count = entries.len(), file = %path.display(), "extracted Douyin posts");
        videos.extend(entries);
    }
    if let Some(path) = tiktok {
        let entries = extract_from_path(path, "TikTok", cli.timezone)
            .with_context(|| format!("cannot extract TikTok posts from `{}`", path.display()))?;
        tracing::info!(count = entries.len(), file = %path.display(), "extracted TikTok posts");
        videos.extend(entries);
    }
    let document = CorpusDocument::from_videos(videos);
    document
        .write_to_path(output)
        .with_context(|| format!("cannot write corpus `{}`", output.display()))?;
    if cli.json {
        return write_json(
            out,
            &ExtractReport {
                douyin_count: document.douyin_count,
                tiktok_count: document.tiktok_count,
                total_count: document.total_count,
                output: output.display().to_string(),
            },
        );
    }
    writeln!(
        out,
        "wrote {} entries ({} Douyin, {} TikTok) to {}",
        document.total_count,
        document.douyin_count,
        document.tiktok_count,
        output.display()
    )?;
    Ok(())
}
