use crate::{PartitionScheme, SchemeRegistry};

/// One extracted field value under a candidate scheme.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FieldValue {
    pub name: &'static str,
    pub width: u8,
    pub value: u32,
}

/// The ordered field values of one scheme applied to a low-32 word.
///
/// Field order follows the scheme definition (most significant first), so
/// rendering layers can tabulate without re-sorting.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartitionResult {
    pub scheme: &'static str,
    pub fields: Vec<FieldValue>,
}

impl PartitionResult {
    /// Looks up a field value by name.
    pub fn get(&self, name: &str) -> Option<u32> {
        self.fields.iter().find(|f| f.name == name).map(|f| f.value)
    }
}

/// Applies one scheme to a low-32 word.
///
/// Pure and total: every field is `(low32 >> offset) & ((1 << width) - 1)`.
///
/// # Example
///
/// ```
/// use snowmelt::{analyze, SCHEME_16_16};
///
/// let result = analyze(0x74810d23, &SCHEME_16_16);
/// assert_eq!(result.get("shard_id"), Some(0x7481));
/// assert_eq!(result.get("sequence"), Some(0x0d23));
/// ```
pub fn analyze(low32: u32, scheme: &PartitionScheme) -> PartitionResult {
    PartitionResult {
        scheme: scheme.name,
        fields: scheme
            .fields
            .iter()
            .map(|spec| FieldValue {
                name: spec.name,
                width: spec.width,
                value: spec.extract(low32),
            })
            .collect(),
    }
}

/// Applies every registered scheme to a low-32 word, in registry order.
pub fn analyze_all(low32: u32, registry: &SchemeRegistry) -> Vec<PartitionResult> {
    registry
        .all_schemes()
        .iter()
        .map(|scheme| analyze(low32, scheme))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode;

    // low32 of Douyin id 7153549929326120227.
    const LOW32: u32 = 0x74810d23;

    #[test]
    fn analyze_extracts_known_fields() {
        let registry = SchemeRegistry::builtin().unwrap();

        let snowflake = analyze(LOW32, registry.get("10+10+12").unwrap());
        assert_eq!(snowflake.get("datacenter_id"), Some(466));
        assert_eq!(snowflake.get("worker_id"), Some(16));
        assert_eq!(snowflake.get("sequence"), Some(3363));

        let modified = analyze(LOW32, registry.get("8+8+16").unwrap());
        assert_eq!(modified.get("datacenter_id"), Some(116));
        assert_eq!(modified.get("worker_id"), Some(129));
        assert_eq!(modified.get("sequence"), Some(3363));

        let bytes = analyze(LOW32, registry.get("8+8+8+8").unwrap());
        assert_eq!(bytes.get("byte3"), Some(0x74));
        assert_eq!(bytes.get("byte2"), Some(0x81));
        assert_eq!(bytes.get("byte1"), Some(0x0d));
        assert_eq!(bytes.get("byte0"), Some(0x23));
    }

    #[test]
    fn analyze_all_follows_registry_order() {
        let registry = SchemeRegistry::builtin().unwrap();
        let results = analyze_all(LOW32, &registry);
        let names: Vec<_> = results.iter().map(|r| r.scheme).collect();
        assert_eq!(names, ["10+10+12", "8+8+16", "16+16", "8+8+8+8"]);
    }

    #[test]
    fn analyze_all_is_deterministic() {
        let registry = SchemeRegistry::builtin().unwrap();
        let first = analyze_all(LOW32, &registry);
        let second = analyze_all(LOW32, &registry);
        assert_eq!(first, second);
    }

    #[test]
    fn fields_reassemble_to_input() {
        let registry = SchemeRegistry::builtin().unwrap();
        let low32 = decode(7559684939684400414).low32;
        for scheme in registry.all_schemes() {
            let result = analyze(low32, scheme);
            let mut rebuilt = 0u32;
            for (spec, field) in scheme.fields.iter().zip(&result.fields) {
                rebuilt |= field.value << spec.offset;
            }
            assert_eq!(rebuilt, low32, "scheme {}", scheme.name);
        }
    }

    #[test]
    fn unknown_field_name_is_none() {
        let result = analyze(LOW32, &crate::SCHEME_16_16);
        assert_eq!(result.get("machine_id"), None);
    }
}
