//! The corpus JSON document.
//!
//! A corpus bundles labeled video ids with their ground-truth creation
//! times, in the layout the extraction step writes:
//!
//! ```json
//! {
//!   "total_count": 2,
//!   "douyin_count": 1,
//!   "tiktok_count": 1,
//!   "videos": [
//!     {
//!       "aweme_id": "7153549929326120227",
//!       "create_time": 1665565640,
//!       "create_datetime": "2022-10-12 17:07:20",
//!       "source": "Douyin"
//!     }
//!   ]
//! }
//! ```
//!
//! Ids are stored as decimal strings, the form the platform APIs use.

use std::io::{self, Write};
use std::path::Path;

use chrono::DateTime;
use chrono_tz::Tz;
use snowmelt::IdRecord;

use crate::{Error, Result};

/// Smallest value whose high 32 bits are nonzero.
pub(crate) const MIN_AWEME_ID: u64 = 1 << 32;

/// One video entry in a corpus document.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VideoEntry {
    /// The aweme id. Serialized as a decimal string; integers are
    /// accepted on read.
    #[serde(with = "id_string")]
    pub aweme_id: u64,
    /// Ground-truth creation time, Unix seconds.
    pub create_time: i64,
    /// Calendar rendering of `create_time`, informational only.
    pub create_datetime: String,
    /// Platform label, `Douyin` or `TikTok`.
    pub source: String,
}

impl VideoEntry {
    /// Builds an entry, rendering `create_datetime` in the given zone.
    pub fn new(
        aweme_id: u64,
        create_time: i64,
        source: impl Into<String>,
        tz: Tz,
    ) -> Result<Self> {
        let create_datetime = render_datetime(create_time, tz).ok_or_else(|| {
            Error::bad_record(format!(
                "create_time {create_time} is outside the calendar range"
            ))
        })?;
        Ok(Self {
            aweme_id,
            create_time,
            create_datetime,
            source: source.into(),
        })
    }
}

/// `%Y-%m-%d %H:%M:%S` rendering of a Unix timestamp in one zone.
pub fn render_datetime(timestamp: i64, tz: Tz) -> Option<String> {
    let utc = DateTime::from_timestamp(timestamp, 0)?;
    Some(utc.with_timezone(&tz).format("%Y-%m-%d %H:%M:%S").to_string())
}

/// A corpus of labeled video ids with ground-truth creation times.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CorpusDocument {
    pub total_count: u64,
    pub douyin_count: u64,
    pub tiktok_count: u64,
    pub videos: Vec<VideoEntry>,
}

impl CorpusDocument {
    /// Bundles entries into a document, computing the count header.
    pub fn from_videos(videos: Vec<VideoEntry>) -> Self {
        let douyin_count = videos.iter().filter(|v| v.source == "Douyin").count() as u64;
        let tiktok_count = videos.iter().filter(|v| v.source == "TikTok").count() as u64;
        Self {
            total_count: videos.len() as u64,
            douyin_count,
            tiktok_count,
            videos,
        }
    }

    pub fn from_reader(reader: impl io::Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(io::BufReader::new(file))
    }

    /// Writes the document as pretty-printed JSON.
    pub fn write_to(&self, writer: impl io::Write) -> Result<()> {
        Ok(serde_json::to_writer_pretty(writer, self)?)
    }

    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let mut writer = io::BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Converts the document into the record list the analysis consumes.
    ///
    /// Every entry becomes an [`IdRecord`] labeled with its platform and
    /// carrying its creation time as ground truth. An id below `2^32`
    /// cannot hold a timestamp field and fails with [`Error::BadRecord`].
    pub fn to_records(&self) -> Result<Vec<IdRecord>> {
        self.videos
            .iter()
            .map(|video| {
                if video.aweme_id < MIN_AWEME_ID {
                    return Err(Error::bad_record(format!(
                        "aweme id {} is below 2^32 and carries no timestamp field",
                        video.aweme_id
                    )));
                }
                Ok(IdRecord::new(video.aweme_id, video.source.clone())
                    .with_source_timestamp(video.create_time))
            })
            .collect()
    }
}

/// Loads a corpus document and converts it to records in one step.
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<IdRecord>> {
    CorpusDocument::from_path(path)?.to_records()
}

mod id_string {
    use core::fmt;

    use serde::{Deserializer, Serializer, de};

    pub fn serialize<S>(id: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(id)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IdVisitor;

        impl de::Visitor<'_> for IdVisitor {
            type Value = u64;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a decimal string or unsigned 64-bit integer")
            }

            fn visit_str<E>(self, v: &str) -> Result<u64, E>
            where
                E: de::Error,
            {
                v.trim()
                    .parse()
                    .map_err(|_| E::custom(format!("invalid aweme id `{v}`")))
            }

            fn visit_u64<E>(self, v: u64) -> Result<u64, E>
            where
                E: de::Error,
            {
                Ok(v)
            }

            fn visit_i64<E>(self, v: i64) -> Result<u64, E>
            where
                E: de::Error,
            {
                u64::try_from(v).map_err(|_| E::custom(format!("negative aweme id `{v}`")))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}
