use crate::{Error, RandSource, Result, ThreadRandom};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use core::fmt;
use core::str::FromStr;

/// A 64-bit aweme-style ID
///
/// - 32 bits Unix timestamp (seconds since 1970-01-01 UTC)
/// - 32 bits uniqueness (shard/worker bits and sequence bits, exact split
///   unconfirmed)
///
/// ```text
///  Bit Index:  63             32 31               0
///              +----------------+-----------------+
///  Field:      | timestamp (32) | uniqueness (32) |
///              +----------------+-----------------+
///              |<--- MSB --- 64 bits --- LSB ---->|
/// ```
///
/// The timestamp half is the only field validated against ground truth;
/// the low half is analyzed under candidate partition schemes (see
/// [`SchemeRegistry`]) without claiming any split is authoritative.
///
/// # Example
///
/// ```
/// use snowmelt::AwemeId;
///
/// let id = AwemeId::from_raw(7153549929326120227);
/// assert_eq!(id.timestamp_sec(), 1665565634);
/// assert_eq!(id.low32(), 0x74810d23);
/// ```
///
/// [`SchemeRegistry`]: crate::SchemeRegistry
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AwemeId {
    id: u64,
}

impl AwemeId {
    /// Bitmask for extracting the 32-bit uniqueness field. Occupies bits 0
    /// through 31.
    pub const LOW32_MASK: u64 = (1 << 32) - 1;

    /// Number of bits to shift the timestamp to its correct position
    /// (bit 32).
    pub const TIMESTAMP_SHIFT: u64 = 32;

    /// Packs a timestamp and uniqueness value into an ID.
    pub const fn from_parts(timestamp_sec: u32, low32: u32) -> Self {
        Self {
            id: ((timestamp_sec as u64) << Self::TIMESTAMP_SHIFT) | (low32 as u64),
        }
    }

    /// Extracts the second-level Unix timestamp from the packed ID.
    pub const fn timestamp_sec(&self) -> u32 {
        (self.id >> Self::TIMESTAMP_SHIFT) as u32
    }

    /// Extracts the 32-bit uniqueness field from the packed ID.
    pub const fn low32(&self) -> u32 {
        (self.id & Self::LOW32_MASK) as u32
    }

    /// Converts this type into its raw `u64` representation.
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Converts a raw `u64` into this type.
    ///
    /// Any `u64` is accepted; values below `2^32` decode to a zero
    /// timestamp. Use the [`FromStr`] impl when parsing untrusted input.
    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    /// Returns the ID as a zero-padded 20-digit string.
    pub fn to_padded_string(&self) -> String {
        format!("{:020}", self.id)
    }
}

impl FromStr for AwemeId {
    type Err = Error;

    /// Parses a decimal ID string as produced by the platform APIs.
    ///
    /// Rejects with [`Error::InvalidInput`]:
    /// - non-integral or non-decimal text
    /// - negative values
    /// - values above `u64::MAX`
    /// - values below `2^32`, whose timestamp field would be empty
    ///
    /// # Example
    ///
    /// ```
    /// use snowmelt::AwemeId;
    ///
    /// let id: AwemeId = "7153549929326120227".parse().unwrap();
    /// assert_eq!(id.timestamp_sec(), 1665565634);
    /// assert!("-1".parse::<AwemeId>().is_err());
    /// assert!("123".parse::<AwemeId>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(rest) = s.strip_prefix('-') {
            return Err(Error::invalid_input(format!(
                "id `-{rest}` is negative; aweme ids are unsigned"
            )));
        }
        let raw: u64 = s.parse().map_err(|_| {
            Error::invalid_input(format!(
                "id `{s}` is not a decimal unsigned 64-bit integer"
            ))
        })?;
        if raw <= Self::LOW32_MASK {
            return Err(Error::invalid_input(format!(
                "id `{raw}` is below 2^32 and carries no timestamp field"
            )));
        }
        Ok(Self::from_raw(raw))
    }
}

impl fmt::Display for AwemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for AwemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwemeId")
            .field("id", &self.id)
            .field("timestamp_sec", &self.timestamp_sec())
            .field("low32", &self.low32())
            .finish()
    }
}

impl From<AwemeId> for u64 {
    fn from(id: AwemeId) -> u64 {
        id.to_raw()
    }
}

/// The decoded halves of a 64-bit ID.
///
/// Invariant: `id == (timestamp_sec << 32) | low32`. `timestamp_sec` is
/// widened to `i64` because it is compared against caller-supplied ground
/// truth with signed deltas.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DecodedId {
    /// The raw 64-bit ID.
    pub id: u64,
    /// High 32 bits: second-level Unix timestamp.
    pub timestamp_sec: i64,
    /// Low 32 bits: uniqueness field of unconfirmed structure.
    pub low32: u32,
}

impl DecodedId {
    /// Renders the timestamp half as calendar time, in UTC and in one
    /// configurable display zone.
    ///
    /// This is presentation support for validation reports, not a decoding
    /// concern: the decoded value stays `timestamp_sec`.
    pub fn calendar(&self, tz: Tz) -> CalendarStamp {
        let utc = DateTime::from_timestamp(self.timestamp_sec, 0)
            .expect("a 32-bit second count is always in chrono's range");
        CalendarStamp {
            utc,
            zoned: utc.with_timezone(&tz),
        }
    }
}

/// One decoded instant, viewed in UTC and in a target IANA zone.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CalendarStamp {
    /// The instant in UTC.
    pub utc: DateTime<Utc>,
    /// The same instant in the configured display zone.
    pub zoned: DateTime<Tz>,
}

impl CalendarStamp {
    /// RFC 3339 rendering of the UTC instant.
    pub fn utc_rfc3339(&self) -> String {
        self.utc.to_rfc3339()
    }

    /// RFC 3339 rendering of the zoned instant.
    pub fn zoned_rfc3339(&self) -> String {
        self.zoned.to_rfc3339()
    }
}

/// Splits an ID into its timestamp and uniqueness halves.
///
/// Total over all `u64` values: `timestamp_sec = id >> 32` and
/// `low32 = id & 0xFFFF_FFFF`.
///
/// # Example
///
/// ```
/// use snowmelt::decode;
///
/// let decoded = decode(7153549929326120227);
/// assert_eq!(decoded.timestamp_sec, 1665565634);
/// assert_eq!(decoded.low32, 1954614563);
/// ```
pub const fn decode(id: u64) -> DecodedId {
    let id_ = AwemeId::from_raw(id);
    DecodedId {
        id,
        timestamp_sec: id_.timestamp_sec() as i64,
        low32: id_.low32(),
    }
}

/// Packs a timestamp and an explicit uniqueness value into an ID.
///
/// Round-trip guarantee: `decode(encode_with(t, l))` yields `(t, l)` for
/// every `t` and `l`.
///
/// # Example
///
/// ```
/// use snowmelt::{decode, encode_with};
///
/// let id = encode_with(1665565640, 0x12345678);
/// let back = decode(id);
/// assert_eq!(back.timestamp_sec, 1665565640);
/// assert_eq!(back.low32, 0x12345678);
/// ```
pub const fn encode_with(timestamp_sec: u32, low32: u32) -> u64 {
    AwemeId::from_parts(timestamp_sec, low32).to_raw()
}

/// Forges an aweme-style ID for the given timestamp.
///
/// When `low32` is `None`, the uniqueness half is drawn from the
/// thread-local CSPRNG, emulating the unpredictability of real sequence
/// bits. Forged IDs are for testing and demonstration; the random bits are
/// never a correctness-relevant identifier.
pub fn encode(timestamp_sec: u32, low32: Option<u32>) -> u64 {
    match low32 {
        Some(low32) => encode_with(timestamp_sec, low32),
        None => encode_random(timestamp_sec, &ThreadRandom),
    }
}

/// Forges an ID drawing the uniqueness half from an injected source.
pub fn encode_random<R: RandSource<u32>>(timestamp_sec: u32, rng: &R) -> u64 {
    encode_with(timestamp_sec, rng.rand())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Real Douyin upload from October 2022.
    const DOUYIN_ID: u64 = 7153549929326120227;

    #[test]
    fn decode_splits_halves() {
        let decoded = decode(DOUYIN_ID);
        assert_eq!(decoded.id, DOUYIN_ID);
        assert_eq!(decoded.timestamp_sec, 1665565634);
        assert_eq!(decoded.low32, 0x74810d23);
        assert_eq!(
            decoded.id,
            ((decoded.timestamp_sec as u64) << 32) | decoded.low32 as u64
        );
    }

    #[test]
    fn decode_is_total_over_u64() {
        assert_eq!(decode(0).timestamp_sec, 0);
        assert_eq!(decode(0).low32, 0);
        let max = decode(u64::MAX);
        assert_eq!(max.timestamp_sec, u32::MAX as i64);
        assert_eq!(max.low32, u32::MAX);
    }

    #[test]
    fn encode_round_trips_boundaries() {
        for &t in &[0u32, 1, 1665565640, u32::MAX] {
            for &l in &[0u32, 1, 0x74810d23, u32::MAX] {
                let decoded = decode(encode_with(t, l));
                assert_eq!(decoded.timestamp_sec, t as i64);
                assert_eq!(decoded.low32, l);
            }
        }
    }

    #[test]
    fn encode_round_trips_random_low_bits() {
        let rng = ThreadRandom;
        for _ in 0..64 {
            let t: u32 = rng.rand();
            let id = encode_random(t, &rng);
            assert_eq!(decode(id).timestamp_sec, t as i64);
        }
    }

    #[test]
    fn encode_defaults_to_random_uniqueness() {
        let id = encode(1665565640, None);
        assert_eq!(decode(id).timestamp_sec, 1665565640);
    }

    #[test]
    fn parse_accepts_decimal_strings() {
        let id: AwemeId = "7153549929326120227".parse().unwrap();
        assert_eq!(id.to_raw(), DOUYIN_ID);
        let padded: AwemeId = " 7153549929326120227 ".parse().unwrap();
        assert_eq!(padded, id);
    }

    #[test]
    fn parse_rejects_invalid_input() {
        for bad in ["", "abc", "12.5", "-7153549929326120227", "18446744073709551616"] {
            assert!(matches!(
                bad.parse::<AwemeId>(),
                Err(Error::InvalidInput { .. })
            ));
        }
        // Below 2^32: no timestamp field.
        assert!(matches!(
            "4294967295".parse::<AwemeId>(),
            Err(Error::InvalidInput { .. })
        ));
        // Smallest representable id.
        assert!("4294967296".parse::<AwemeId>().is_ok());
    }

    #[test]
    fn calendar_renders_utc_and_zoned() {
        let stamp = decode(DOUYIN_ID).calendar(chrono_tz::America::Los_Angeles);
        assert_eq!(stamp.utc_rfc3339(), "2022-10-12T09:07:14+00:00");
        assert_eq!(stamp.zoned_rfc3339(), "2022-10-12T02:07:14-07:00");
        assert_eq!(stamp.utc, stamp.zoned);
    }

    #[test]
    fn padded_string_is_twenty_digits() {
        assert_eq!(
            AwemeId::from_raw(DOUYIN_ID).to_padded_string(),
            "07153549929326120227"
        );
    }
}
