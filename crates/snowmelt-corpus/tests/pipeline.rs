//! End-to-end pipeline tests: raw platform responses through extraction,
//! the corpus document on disk, and the analysis core.
//!
//! These cover the read path the CLI drives: extract posts, persist the
//! corpus document, reload it as records, and run the full analysis.

use snowmelt::{AnalysisConfig, MatchClass, analyze_corpus};
use snowmelt_corpus::{CorpusDocument, extract_entries, load_records};
use tempfile::TempDir;

const DOUYIN_RESPONSE: &str = r#"{
  "status_code": 0,
  "data": {
    "aweme_list": [
      {"aweme_id": "7153549929326120227", "create_time": 1665565640, "desc": "demo"},
      {"aweme_id": "7196618597496524067", "create_time": 1675593344}
    ],
    "has_more": 0
  }
}"#;

const TIKTOK_RESPONSE: &str = r#"{
  "data": {
    "aweme_list": [
      {"aweme_id": 7559684939684400414, "create_time": "1760126333"},
      {"aweme_id": "not-an-id", "create_time": 1760126000},
      {"aweme_id": "7559661864628538654", "create_time": 0}
    ]
  }
}"#;

const TZ: chrono_tz::Tz = chrono_tz::Asia::Shanghai;

fn build_corpus() -> CorpusDocument {
    let mut videos = extract_entries(DOUYIN_RESPONSE.as_bytes(), "Douyin", TZ).unwrap();
    videos.extend(extract_entries(TIKTOK_RESPONSE.as_bytes(), "TikTok", TZ).unwrap());
    CorpusDocument::from_videos(videos)
}

#[test]
fn extraction_keeps_only_usable_posts() {
    let document = build_corpus();
    assert_eq!(document.total_count, 3);
    assert_eq!(document.douyin_count, 2);
    assert_eq!(document.tiktok_count, 1);
    assert!(document.videos.iter().all(|v| v.aweme_id >= (1u64 << 32)));
}

#[test]
fn ground_truth_renders_in_the_extraction_zone() {
    let document = build_corpus();
    assert_eq!(document.videos[0].create_datetime, "2022-10-12 17:07:20");
}

#[test]
fn document_survives_a_disk_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("corpus.json");
    let document = build_corpus();
    document.write_to_path(&path).unwrap();
    let reloaded = CorpusDocument::from_path(&path).unwrap();
    assert_eq!(reloaded, document);
}

#[test]
fn reloaded_corpus_flows_through_the_full_analysis() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("corpus.json");
    build_corpus().write_to_path(&path).unwrap();

    let records = load_records(&path).unwrap();
    assert_eq!(records.len(), 3);

    let config = AnalysisConfig::default();
    let analysis = analyze_corpus(&records, &config).unwrap();

    // Known upload from October 2022: decoded six seconds early.
    let first = &analysis.records[0];
    assert_eq!(first.decoded.timestamp_sec, 1665565634);
    assert_eq!(first.calendar.utc_rfc3339(), "2022-10-12T09:07:14+00:00");
    let outcome = first.outcome.as_ref().unwrap();
    assert_eq!(outcome.delta_secs, -6);
    assert_eq!(outcome.class, MatchClass::Divergent);

    let stats = analysis.stats.as_ref().unwrap();
    assert_eq!(stats.overall.total(), 3);
    assert_eq!(stats.overall.matched(), 1);
    assert_eq!(stats.by_label["Douyin"].total(), 2);
    assert_eq!(stats.by_label["TikTok"].total(), 1);

    // Both Douyin uploads share sequence 3363 under the 16+16 split.
    let sequence = analysis.correlation.field("sequence").unwrap();
    assert_eq!(sequence.collisions[&3363].len(), 2);

    let (earliest, latest) = analysis.decoded_time_span().unwrap();
    assert_eq!(earliest, 1665565634);
    assert_eq!(latest, 1760126310);
}

#[test]
fn correlation_scheme_is_selectable_from_config() {
    let records = build_corpus().to_records().unwrap();
    let config = AnalysisConfig::default().with_correlation_scheme("8+8+8+8");
    let analysis = analyze_corpus(&records, &config).unwrap();
    assert_eq!(analysis.correlation.scheme, "8+8+8+8");
    // Low byte 0x23 is shared by the two Douyin uploads.
    let byte0 = analysis.correlation.field("byte0").unwrap();
    assert_eq!(byte0.collisions[&0x23].len(), 2);
}
