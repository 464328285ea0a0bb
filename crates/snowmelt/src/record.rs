/// One externally supplied corpus record.
///
/// This is the contract between the core and whatever loader produced the
/// corpus: an ID, a group label (typically the platform name), and the
/// ground-truth creation timestamp when the source document carried one.
/// Records are constructed once by the caller and never mutated by the
/// core.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdRecord {
    /// The raw 64-bit ID.
    pub id: u64,
    /// Group label for per-group statistics. May be empty.
    pub label: String,
    /// Ground-truth Unix timestamp (seconds), when known.
    pub source_timestamp: Option<i64>,
}

impl IdRecord {
    pub fn new(id: u64, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            source_timestamp: None,
        }
    }

    /// Attaches the ground-truth creation timestamp.
    pub fn with_source_timestamp(mut self, timestamp: i64) -> Self {
        self.source_timestamp = Some(timestamp);
        self
    }
}
