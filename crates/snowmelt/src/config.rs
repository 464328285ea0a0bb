use chrono_tz::Tz;

/// Classification threshold: |delta| within this many seconds is Close.
pub const DEFAULT_CLOSE_MATCH_THRESHOLD_SECS: i64 = 5;

/// Default display zone for calendar rendering.
pub const DEFAULT_DISPLAY_TIMEZONE: Tz = chrono_tz::America::Los_Angeles;

/// Default correlation hypothesis: the simplified 16+16 split.
pub const DEFAULT_CORRELATION_SCHEME: &str = "16+16";

/// Tunable knobs recognized by the analysis core.
///
/// All analysis entry points take a borrowed config; the defaults
/// reproduce the reference behavior (5-second close window, Los Angeles
/// display zone, 16+16 correlation hypothesis).
///
/// # Example
///
/// ```
/// use snowmelt::AnalysisConfig;
///
/// let config = AnalysisConfig::default()
///     .with_close_match_threshold(10)
///     .with_correlation_scheme("8+8+8+8");
/// assert_eq!(config.close_match_threshold_secs, 10);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Maximum |delta| in seconds still classified as a close match.
    pub close_match_threshold_secs: i64,
    /// IANA zone used for the non-UTC half of calendar rendering.
    pub display_timezone: Tz,
    /// Name of the registered scheme the correlator groups by.
    pub correlation_scheme: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            close_match_threshold_secs: DEFAULT_CLOSE_MATCH_THRESHOLD_SECS,
            display_timezone: DEFAULT_DISPLAY_TIMEZONE,
            correlation_scheme: DEFAULT_CORRELATION_SCHEME.to_owned(),
        }
    }
}

impl AnalysisConfig {
    pub fn with_close_match_threshold(mut self, secs: i64) -> Self {
        self.close_match_threshold_secs = secs;
        self
    }

    pub fn with_display_timezone(mut self, tz: Tz) -> Self {
        self.display_timezone = tz;
        self
    }

    pub fn with_correlation_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.correlation_scheme = scheme.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_behavior() {
        let config = AnalysisConfig::default();
        assert_eq!(config.close_match_threshold_secs, 5);
        assert_eq!(config.display_timezone, chrono_tz::America::Los_Angeles);
        assert_eq!(config.correlation_scheme, "16+16");
    }
}
