use anyhow::Context;
use pdu_types::{AliasTable, SchemaFile};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/* Loads schema documents and merges them in the order given */
pub struct SchemaLoader {
    /* Canonical paths already merged, so a file given twice is read once */
    loaded_files: HashSet<PathBuf>,

    merged: SchemaFile,
}

impl SchemaLoader {
    pub fn new() -> Self {
        Self {
            loaded_files: HashSet::new(),
            merged: SchemaFile::default(),
        }
    }

    /* Read one schema document and append its classes and enums */
    pub fn load_file(&mut self, file_path: &Path, verbose: bool) -> anyhow::Result<()> {
        let canonical_path = file_path
            .canonicalize()
            .with_context(|| format!("schema file '{}' not found", file_path.display()))?;

        if !self.loaded_files.insert(canonical_path) {
            if verbose {
                println!("    [~] Skipping already loaded file: {}", file_path.display());
            }
            return Ok(());
        }

        if verbose {
            println!("[~] Loading schema file: {}", file_path.display());
        }

        let file = parse_schema_file(file_path)?;

        if verbose {
            if let Some(package) = &file.package {
                println!("    Package: {}", package);
            }
            println!("    Classes: {}", file.classes.len());
            if !file.enums.is_empty() {
                println!("    Enums: {}", file.enums.len());
            }
        }

        self.merged.extend(file);
        Ok(())
    }

    pub fn loaded_file_count(&self) -> usize {
        self.loaded_files.len()
    }

    pub fn into_schema(self) -> SchemaFile {
        self.merged
    }
}

impl Default for SchemaLoader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn parse_schema_file(file_path: &Path) -> anyhow::Result<SchemaFile> {
    let contents = std::fs::read_to_string(file_path)
        .with_context(|| format!("failed to read schema file '{}'", file_path.display()))?;
    serde_yml::from_str(&contents)
        .with_context(|| format!("failed to parse schema file '{}'", file_path.display()))
}

/* A missing alias table is not an error: every UID falls back to its declared name */
pub fn load_alias_table(file_path: Option<&Path>) -> anyhow::Result<AliasTable> {
    let Some(file_path) = file_path else {
        return Ok(AliasTable::new());
    };
    if !file_path.exists() {
        tracing::warn!(path = %file_path.display(), "alias table not found; using declared type names");
        return Ok(AliasTable::new());
    }
    let contents = std::fs::read_to_string(file_path)
        .with_context(|| format!("failed to read alias table '{}'", file_path.display()))?;
    if contents.trim().is_empty() {
        return Ok(AliasTable::new());
    }
    serde_yml::from_str(&contents)
        .with_context(|| format!("failed to parse alias table '{}'", file_path.display()))
}
