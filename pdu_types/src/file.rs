use crate::options::GeneratorOptions;
use crate::types::{ClassDef, EnumDef};
use indexmap::IndexMap;
use serde_derive::{Deserialize, Serialize};

/* ============================================================================
   Schema Document
   ============================================================================ */

/* Top-level schema document */
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "kebab-case")]
pub struct SchemaFile {
    /* Namespace handed to the backends */
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub options: GeneratorOptions,
    #[serde(default)]
    pub classes: Vec<ClassDef>,
    #[serde(default)]
    pub enums: Vec<EnumDef>,
}

impl SchemaFile {
    /* Append the classes and enums of `other`, keeping declaration order.
     * Options already set on `self` win over the ones in `other`. */
    pub fn extend(&mut self, other: SchemaFile) {
        if self.package.is_none() {
            self.package = other.package;
        }
        self.options = other.options.merged(std::mem::take(&mut self.options));
        self.classes.extend(other.classes);
        self.enums.extend(other.enums);
    }
}

/* ============================================================================
   UID Alias Table
   ============================================================================ */

#[derive(PartialEq, Eq, Hash)]
struct UidKey(String);

impl<'de> serde::Deserialize<'de> for UidKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        crate::types::uid_key_to_string(deserializer).map(UidKey)
    }
}

/* Maps a numeric identifier string to a concrete type name */
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct AliasTable {
    entries: IndexMap<String, String>,
}

impl<'de> serde::Deserialize<'de> for AliasTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw: IndexMap<UidKey, String> = IndexMap::deserialize(deserializer)?;
        Ok(AliasTable {
            entries: raw.into_iter().map(|(k, v)| (k.0, v)).collect(),
        })
    }
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, uid: impl Into<String>, type_name: impl Into<String>) {
        self.entries.insert(uid.into(), type_name.into());
    }

    pub fn lookup(&self, uid: &str) -> Option<&str> {
        self.entries.get(uid.trim()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for AliasTable {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        AliasTable {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_table_accepts_numeric_and_string_keys() {
        let table: AliasTable = serde_yml::from_str("4: DisPduType\n\"29\": EntityKind\n").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("4"), Some("DisPduType"));
        assert_eq!(table.lookup("29"), Some("EntityKind"));
        assert_eq!(table.lookup("30"), None);
    }

    #[test]
    fn schema_file_defaults() {
        let file: SchemaFile = serde_yml::from_str("classes:\n  - name: Empty\n").unwrap();
        assert_eq!(file.package, None);
        assert_eq!(file.classes.len(), 1);
        assert!(file.classes[0].attributes.is_empty());
        assert!(!file.classes[0].is_abstract);
    }
}
