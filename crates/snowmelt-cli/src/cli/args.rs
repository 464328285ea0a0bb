use std::path::PathBuf;

use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use snowmelt::{AnalysisConfig, AwemeId, DEFAULT_CORRELATION_SCHEME};

/// Command-line surface of the `snowmelt` binary.
///
/// The global flags mirror the analysis core's configuration options and
/// apply to every subcommand. All values are parsed from CLI arguments or
/// environment variables, with defaults that reproduce the reference
/// behavior.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "snowmelt",
    version,
    about = "Decode and statistically analyze Douyin / TikTok aweme IDs"
)]
pub struct Cli {
    /// IANA zone for the non-UTC half of calendar output.
    ///
    /// Environment variable: `DISPLAY_TIMEZONE`
    #[arg(
        long,
        global = true,
        env = "DISPLAY_TIMEZONE",
        default_value = "America/Los_Angeles"
    )]
    pub timezone: Tz,

    /// Maximum |decoded - source| in seconds still counted as a close
    /// match during validation.
    ///
    /// Environment variable: `CLOSE_MATCH_THRESHOLD_SECS`
    #[arg(
        long,
        global = true,
        env = "CLOSE_MATCH_THRESHOLD_SECS",
        default_value_t = snowmelt::DEFAULT_CLOSE_MATCH_THRESHOLD_SECS
    )]
    pub threshold: i64,

    /// Registered partition scheme used for correlation and inspection.
    ///
    /// Environment variable: `CORRELATION_SCHEME`
    #[arg(
        long,
        global = true,
        env = "CORRELATION_SCHEME",
        default_value = DEFAULT_CORRELATION_SCHEME
    )]
    pub scheme: String,

    /// Emit machine-readable JSON instead of text reports.
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// The analysis configuration these arguments describe.
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig::default()
            .with_close_match_threshold(self.threshold)
            .with_display_timezone(self.timezone)
            .with_correlation_scheme(self.scheme.clone())
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Decode IDs: timestamp halves as calendar time, low 32 bits in
    /// decimal, hex, and binary
    Decode {
        /// One or more aweme IDs, decimal.
        #[arg(required = true)]
        ids: Vec<AwemeId>,
    },

    /// Candidate sub-fields of the low 32 bits, one table per scheme
    Schemes {
        /// One or more aweme IDs, decimal.
        #[arg(required = true)]
        ids: Vec<AwemeId>,
    },

    /// Bit-level view of one ID and the active scheme's split
    Inspect {
        /// The aweme ID, decimal.
        id: AwemeId,
    },

    /// Validate decoded timestamps against a corpus of known upload times
    Validate {
        /// Corpus document with ground-truth creation times.
        corpus: PathBuf,
    },

    /// Collision evidence for the active partition hypothesis
    Correlate {
        /// Corpus document with labeled IDs.
        corpus: PathBuf,
    },

    /// Forge an aweme-style ID and echo its decode
    Forge {
        /// Second-level Unix timestamp; defaults to the current instant.
        #[arg(long)]
        timestamp: Option<u32>,

        /// Uniqueness half; defaults to CSPRNG-drawn bits.
        #[arg(long)]
        low32: Option<u32>,
    },

    /// Build a corpus document from raw platform user-posts responses
    Extract {
        /// Douyin user-posts response file.
        #[arg(long)]
        douyin: Option<PathBuf>,

        /// TikTok user-posts response file.
        #[arg(long)]
        tiktok: Option<PathBuf>,

        /// Output corpus document.
        #[arg(short, long, default_value = "aweme_ids_output.json")]
        output: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use snowmelt::DEFAULT_DISPLAY_TIMEZONE;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_the_core_config() {
        let cli = Cli::try_parse_from(["snowmelt", "decode", "7153549929326120227"]).unwrap();
        let config = cli.analysis_config();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(cli.timezone, DEFAULT_DISPLAY_TIMEZONE);
        assert!(!cli.json);
    }

    #[test]
    fn global_flags_parse_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "snowmelt",
            "decode",
            "7153549929326120227",
            "--timezone",
            "Asia/Shanghai",
            "--threshold",
            "10",
            "--scheme",
            "8+8+8+8",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.timezone, chrono_tz::Asia::Shanghai);
        assert_eq!(cli.threshold, 10);
        assert_eq!(cli.scheme, "8+8+8+8");
        assert!(cli.json);

        let Command::Decode { ids } = cli.command else {
            panic!("expected decode");
        };
        assert_eq!(ids, vec![AwemeId::from_raw(7153549929326120227)]);
    }

    #[test]
    fn unusable_ids_are_rejected_at_parse_time() {
        // Below 2^32: no timestamp field.
        assert!(Cli::try_parse_from(["snowmelt", "decode", "123"]).is_err());
        assert!(Cli::try_parse_from(["snowmelt", "inspect", "-1"]).is_err());
        assert!(Cli::try_parse_from(["snowmelt", "schemes", "abc"]).is_err());
    }

    #[test]
    fn decode_requires_at_least_one_id() {
        assert!(Cli::try_parse_from(["snowmelt", "decode"]).is_err());
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let result = Cli::try_parse_from([
            "snowmelt",
            "decode",
            "7153549929326120227",
            "--timezone",
            "Mars/Olympus_Mons",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn forge_accepts_fixed_halves() {
        let cli = Cli::try_parse_from([
            "snowmelt",
            "forge",
            "--timestamp",
            "1665565640",
            "--low32",
            "3363",
        ])
        .unwrap();
        let Command::Forge { timestamp, low32 } = cli.command else {
            panic!("expected forge");
        };
        assert_eq!(timestamp, Some(1665565640));
        assert_eq!(low32, Some(3363));
    }

    #[test]
    fn extract_defaults_its_output_path() {
        let cli =
            Cli::try_parse_from(["snowmelt", "extract", "--douyin", "douyin.json"]).unwrap();
        let Command::Extract {
            douyin,
            tiktok,
            output,
        } = cli.command
        else {
            panic!("expected extract");
        };
        assert_eq!(douyin, Some(PathBuf::from("douyin.json")));
        assert_eq!(tiktok, None);
        assert_eq!(output, PathBuf::from("aweme_ids_output.json"));
    }
}
