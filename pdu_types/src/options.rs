/* Generator options as written in a schema document or a config file */

use serde_derive::{Deserialize, Serialize};

/* Byte order of multi-byte primitives on the wire */
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Endianness {
    /* Network byte order, used by DIS */
    #[default]
    Big,
    Little,
}

/* Every field is optional so that several layers can be merged */
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub struct GeneratorOptions {
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub endianness: Option<Endianness>,
    #[serde(default)]
    pub emit_equality: Option<bool>,
    #[serde(default)]
    pub emit_dump: Option<bool>,
    #[serde(default)]
    pub emit_bitfield_accessors: Option<bool>,
    #[serde(default)]
    pub emit_initial_values: Option<bool>,
}

impl GeneratorOptions {
    /* Layer `over` on top of `self`; fields set in `over` win */
    pub fn merged(self, over: GeneratorOptions) -> GeneratorOptions {
        GeneratorOptions {
            package: over.package.or(self.package),
            endianness: over.endianness.or(self.endianness),
            emit_equality: over.emit_equality.or(self.emit_equality),
            emit_dump: over.emit_dump.or(self.emit_dump),
            emit_bitfield_accessors: over.emit_bitfield_accessors.or(self.emit_bitfield_accessors),
            emit_initial_values: over.emit_initial_values.or(self.emit_initial_values),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_layers_override_earlier_ones() {
        let base = GeneratorOptions {
            package: Some("dis".into()),
            emit_dump: Some(false),
            ..Default::default()
        };
        let over = GeneratorOptions {
            emit_dump: Some(true),
            endianness: Some(Endianness::Little),
            ..Default::default()
        };
        let merged = base.merged(over);
        assert_eq!(merged.package.as_deref(), Some("dis"));
        assert_eq!(merged.emit_dump, Some(true));
        assert_eq!(merged.endianness, Some(Endianness::Little));
        assert_eq!(merged.emit_equality, None);
    }
}
