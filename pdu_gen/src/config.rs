/* Immutable per-run generator configuration */

use pdu_types::{Endianness, GeneratorOptions};
use serde_derive::{Deserialize, Serialize};

pub const DEFAULT_PACKAGE: &str = "pdu";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct GeneratorConfig {
    pub package: String,
    pub endianness: Endianness,
    pub emit_equality: bool,
    pub emit_dump: bool,
    pub emit_bitfield_accessors: bool,
    pub emit_initial_values: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            package: DEFAULT_PACKAGE.to_string(),
            endianness: Endianness::Big,
            emit_equality: true,
            emit_dump: true,
            emit_bitfield_accessors: true,
            emit_initial_values: true,
        }
    }
}

impl GeneratorConfig {
    /* Fill every unset option from the built-in defaults. `fallback_package`
     * is the schema's own `package:` entry. */
    pub fn from_options(options: &GeneratorOptions, fallback_package: Option<&str>) -> Self {
        let defaults = Self::default();
        let package = options
            .package
            .clone()
            .or_else(|| fallback_package.map(str::to_string))
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(defaults.package);
        Self {
            package,
            endianness: options.endianness.unwrap_or(defaults.endianness),
            emit_equality: options.emit_equality.unwrap_or(defaults.emit_equality),
            emit_dump: options.emit_dump.unwrap_or(defaults.emit_dump),
            emit_bitfield_accessors: options
                .emit_bitfield_accessors
                .unwrap_or(defaults.emit_bitfield_accessors),
            emit_initial_values: options.emit_initial_values.unwrap_or(defaults.emit_initial_values),
        }
    }

    /* Last dotted segment of the package, used as a file stem */
    pub fn file_stem(&self) -> &str {
        self.package.rsplit('.').next().unwrap_or(&self.package)
    }

    pub fn is_big_endian(&self) -> bool {
        self.endianness == Endianness::Big
    }
}
