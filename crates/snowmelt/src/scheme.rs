//! Candidate bit-partition schemes for the low 32 bits.
//!
//! The uniqueness half of an aweme ID has no confirmed structure. This
//! module registers the candidate layouts the corpus evidence is weighed
//! against. Each scheme is a hypothesis, not a decoding: only the
//! timestamp half (bits 32..64) is independently validated against ground
//! truth.

use crate::{Error, Result};

/// One named bit field within the low 32 bits.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name, unique within its scheme.
    pub name: &'static str,
    /// Field width in bits, `1..=32`.
    pub width: u8,
    /// Offset of the field's least significant bit.
    pub offset: u8,
}

impl FieldSpec {
    pub const fn new(name: &'static str, width: u8, offset: u8) -> Self {
        Self {
            name,
            width,
            offset,
        }
    }

    /// Bitmask selecting this field after shifting by `offset`.
    pub const fn mask(&self) -> u32 {
        (((1u64 << self.width) - 1) & 0xFFFF_FFFF) as u32
    }

    /// Extracts this field's value from a low-32 word.
    pub const fn extract(&self, low32: u32) -> u32 {
        (low32 >> self.offset) & self.mask()
    }
}

/// A named partition of the low 32 bits into ordered fields.
///
/// Fields are listed most significant first, matching how the layouts are
/// conventionally written (`10+10+12` means a 10-bit field at the top).
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PartitionScheme {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl PartitionScheme {
    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Verifies that the fields tile bits `[0, 32)` exactly.
    ///
    /// Every violation is a configuration error, reported as
    /// [`Error::MalformedScheme`]: zero-width fields, fields reaching past
    /// bit 32, overlapping fields, uncovered bits, and duplicate names.
    pub fn verify(&self) -> Result<()> {
        let mut covered: u32 = 0;
        for (i, field) in self.fields.iter().enumerate() {
            if field.width == 0 {
                return Err(Error::malformed_scheme(
                    self.name,
                    format!("field `{}` has zero width", field.name),
                ));
            }
            if field.width > 32 || field.offset >= 32 || field.offset + field.width > 32 {
                return Err(Error::malformed_scheme(
                    self.name,
                    format!(
                        "field `{}` ({} bits at offset {}) reaches past bit 32",
                        field.name, field.width, field.offset
                    ),
                ));
            }
            let mask = field.mask() << field.offset;
            if covered & mask != 0 {
                return Err(Error::malformed_scheme(
                    self.name,
                    format!("field `{}` overlaps an earlier field", field.name),
                ));
            }
            covered |= mask;
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(Error::malformed_scheme(
                    self.name,
                    format!("duplicate field name `{}`", field.name),
                ));
            }
        }
        if covered != u32::MAX {
            return Err(Error::malformed_scheme(
                self.name,
                format!(
                    "fields cover {} of 32 bits",
                    covered.count_ones()
                ),
            ));
        }
        Ok(())
    }
}

/// Standard Snowflake split: 10-bit datacenter, 10-bit worker, 12-bit
/// sequence.
pub const SCHEME_10_10_12: PartitionScheme = PartitionScheme {
    name: "10+10+12",
    fields: &[
        FieldSpec::new("datacenter_id", 10, 22),
        FieldSpec::new("worker_id", 10, 12),
        FieldSpec::new("sequence", 12, 0),
    ],
};

/// Modified split: 8-bit datacenter, 8-bit worker, 16-bit sequence.
pub const SCHEME_8_8_16: PartitionScheme = PartitionScheme {
    name: "8+8+16",
    fields: &[
        FieldSpec::new("datacenter_id", 8, 24),
        FieldSpec::new("worker_id", 8, 16),
        FieldSpec::new("sequence", 16, 0),
    ],
};

/// Simplified split: 16-bit shard, 16-bit sequence. The working hypothesis
/// for correlation.
pub const SCHEME_16_16: PartitionScheme = PartitionScheme {
    name: "16+16",
    fields: &[
        FieldSpec::new("shard_id", 16, 16),
        FieldSpec::new("sequence", 16, 0),
    ],
};

/// Byte split: four independent octets, for byte-level pattern hunting.
pub const SCHEME_BYTES: PartitionScheme = PartitionScheme {
    name: "8+8+8+8",
    fields: &[
        FieldSpec::new("byte3", 8, 24),
        FieldSpec::new("byte2", 8, 16),
        FieldSpec::new("byte1", 8, 8),
        FieldSpec::new("byte0", 8, 0),
    ],
};

/// The immutable set of registered partition schemes.
///
/// Construction verifies every scheme; a malformed scheme is fatal and the
/// registry refuses to exist. After construction the set never changes:
/// adding a scheme is a config-time edit, not a runtime operation.
///
/// # Example
///
/// ```
/// use snowmelt::SchemeRegistry;
///
/// let registry = SchemeRegistry::builtin().unwrap();
/// assert_eq!(registry.all_schemes().len(), 4);
/// assert!(registry.get("16+16").is_some());
/// ```
#[derive(Clone, Debug)]
pub struct SchemeRegistry {
    schemes: Vec<PartitionScheme>,
}

impl SchemeRegistry {
    /// Constructs the registry of the four built-in candidate layouts.
    pub fn builtin() -> Result<Self> {
        Self::new(vec![
            SCHEME_10_10_12,
            SCHEME_8_8_16,
            SCHEME_16_16,
            SCHEME_BYTES,
        ])
    }

    /// Constructs a registry from caller-supplied schemes.
    ///
    /// Fails with [`Error::MalformedScheme`] if any scheme does not tile
    /// the low 32 bits exactly or if two schemes share a name.
    pub fn new(schemes: Vec<PartitionScheme>) -> Result<Self> {
        for (i, scheme) in schemes.iter().enumerate() {
            scheme.verify()?;
            if schemes[..i].iter().any(|s| s.name == scheme.name) {
                return Err(Error::malformed_scheme(
                    scheme.name,
                    "duplicate scheme name",
                ));
            }
        }
        Ok(Self { schemes })
    }

    /// All registered schemes, in registration order.
    pub fn all_schemes(&self) -> &[PartitionScheme] {
        &self.schemes
    }

    /// Looks up a scheme by name.
    pub fn get(&self, name: &str) -> Option<&PartitionScheme> {
        self.schemes.iter().find(|s| s.name == name)
    }
}
