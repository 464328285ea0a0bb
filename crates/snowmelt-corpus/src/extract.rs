//! Extraction from platform user-posts responses.
//!
//! Both the Douyin and TikTok user-posts endpoints return a document with
//! a `data.aweme_list` array whose items carry `aweme_id` and
//! `create_time` among dozens of other fields. Extraction keeps exactly
//! those two, labels each entry with its platform, and skips items
//! missing either one.

use std::io;
use std::path::Path;

use chrono_tz::Tz;
use serde_json::Value;

use crate::{Result, VideoEntry, document::MIN_AWEME_ID};

#[derive(Debug, serde::Deserialize)]
struct UserPostsResponse {
    #[serde(default)]
    data: PostsData,
}

#[derive(Debug, Default, serde::Deserialize)]
struct PostsData {
    #[serde(default)]
    aweme_list: Vec<RawPost>,
}

/// One item of `aweme_list`, reduced to the two fields of interest.
///
/// Exports are not uniform across endpoint versions; ids arrive as
/// strings or integers and the occasional malformed item is tolerated
/// rather than failing the whole file.
#[derive(Debug, serde::Deserialize)]
struct RawPost {
    #[serde(default)]
    aweme_id: Option<Value>,
    #[serde(default)]
    create_time: Option<Value>,
}

impl RawPost {
    fn id(&self) -> Option<u64> {
        match self.aweme_id.as_ref()? {
            Value::String(s) => s.trim().parse().ok(),
            Value::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    fn creation(&self) -> Option<i64> {
        match self.create_time.as_ref()? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
        .filter(|&t| t != 0)
    }
}

/// Extracts labeled entries from one platform user-posts response.
///
/// Items without a usable id or creation time are skipped, as are ids
/// below `2^32`, which cannot carry a timestamp field. The zone only
/// affects the informational `create_datetime` rendering.
pub fn extract_entries(reader: impl io::Read, source: &str, tz: Tz) -> Result<Vec<VideoEntry>> {
    let response: UserPostsResponse = serde_json::from_reader(reader)?;
    let mut entries = Vec::with_capacity(response.data.aweme_list.len());
    for post in &response.data.aweme_list {
        let (Some(id), Some(create_time)) = (post.id(), post.creation()) else {
            continue;
        };
        if id < MIN_AWEME_ID {
            continue;
        }
        entries.push(VideoEntry::new(id, create_time, source, tz)?);
    }
    Ok(entries)
}

pub fn extract_from_path(
    path: impl AsRef<Path>,
    source: &str,
    tz: Tz,
) -> Result<Vec<VideoEntry>> {
    let file = std::fs::File::open(path)?;
    extract_entries(io::BufReader::new(file), source, tz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CorpusDocument;

    const TZ: Tz = chrono_tz::Asia::Shanghai;

    const DOUYIN_RESPONSE: &str = r#"{
      "status_code": 0,
      "data": {
        "aweme_list": [
          {
            "aweme_id": "7153549929326120227",
            "create_time": 1665565640,
            "desc": "demo",
            "statistics": {"digg_count": 1024}
          },
          {
            "aweme_id": "7196618597496524067",
            "create_time": 1675593344
          }
        ],
        "has_more": 1
      }
    }"#;

    #[test]
    fn extracts_id_and_creation_time() {
        let entries = extract_entries(DOUYIN_RESPONSE.as_bytes(), "Douyin", TZ).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].aweme_id, 7153549929326120227);
        assert_eq!(entries[0].create_time, 1665565640);
        assert_eq!(entries[0].create_datetime, "2022-10-12 17:07:20");
        assert_eq!(entries[0].source, "Douyin");
        assert_eq!(entries[1].aweme_id, 7196618597496524067);
    }

    #[test]
    fn tolerates_integer_ids_and_string_times() {
        let raw = r#"{"data": {"aweme_list": [
          {"aweme_id": 7559684939684400414, "create_time": "1760126333"}
        ]}}"#;
        let entries = extract_entries(raw.as_bytes(), "TikTok", TZ).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].aweme_id, 7559684939684400414);
        assert_eq!(entries[0].create_time, 1760126333);
    }

    #[test]
    fn skips_unusable_items() {
        let raw = r#"{"data": {"aweme_list": [
          {"aweme_id": "7153549929326120227", "create_time": 1665565640},
          {"aweme_id": "", "create_time": 1665565640},
          {"aweme_id": "not-a-number", "create_time": 1665565640},
          {"aweme_id": "7196618597496524067"},
          {"aweme_id": "7196618597496524067", "create_time": 0},
          {"aweme_id": "123", "create_time": 1665565640},
          {"create_time": 1665565640}
        ]}}"#;
        let entries = extract_entries(raw.as_bytes(), "Douyin", TZ).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn missing_list_extracts_nothing() {
        for raw in ["{}", r#"{"data": {}}"#, r#"{"data": {"aweme_list": []}}"#] {
            let entries = extract_entries(raw.as_bytes(), "Douyin", TZ).unwrap();
            assert!(entries.is_empty(), "raw {raw}");
        }
    }

    #[test]
    fn extracted_platforms_combine_into_one_document() {
        let douyin = extract_entries(DOUYIN_RESPONSE.as_bytes(), "Douyin", TZ).unwrap();
        let tiktok_raw = r#"{"data": {"aweme_list": [
          {"aweme_id": "7559684939684400414", "create_time": 1760126333}
        ]}}"#;
        let tiktok = extract_entries(tiktok_raw.as_bytes(), "TikTok", TZ).unwrap();

        let doc = CorpusDocument::from_videos(douyin.into_iter().chain(tiktok).collect());
        assert_eq!(doc.total_count, 3);
        assert_eq!(doc.douyin_count, 2);
        assert_eq!(doc.tiktok_count, 1);

        let records = doc.to_records().unwrap();
        assert!(records.iter().all(|r| r.source_timestamp.is_some()));
    }
}
