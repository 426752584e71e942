//! # Persistence
//!
//! The compiler core never touches the filesystem. Loading catalogs and
//! blueprints and writing generated files goes through [`Persistence`];
//! [`DirectoryPersistence`] is the plain on-disk implementation the CLI uses.
//!
//! Directory layout under the project root:
//!
//! ```text
//! catalog.json        optional; node definitions, replaces the built-in set
//! blueprints/*.bp     blueprint documents
//! scripts/*.ts        generated code and the helper library
//! ```

use crate::document::BlueprintDocument;
use crate::error::{BlueprintError, Result};
use crate::graph::NodeDefinition;
use crate::metadata::NodeCatalog;
use std::fs;
use std::path::{Path, PathBuf};

pub const BLUEPRINT_EXTENSION: &str = "bp";
pub const CATALOG_FILE: &str = "catalog.json";

const INVALID_FILE_NAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Storage the compiler's callers load from and save to.
pub trait Persistence {
    fn load_catalog(&self) -> Result<NodeCatalog>;

    /// Load a blueprint document by name (with or without the `.bp` extension).
    fn load_blueprint(&self, reference: &str) -> Result<BlueprintDocument>;

    /// Store `text` under `name`. `Ok(None)` means the save was cancelled.
    fn persist(&self, name: &str, text: &str) -> Result<Option<PathBuf>>;

    /// Names of the stored blueprints, without extension.
    fn list_blueprints(&self) -> Result<Vec<String>>;

    fn save_document(&self, document: &BlueprintDocument) -> Result<Option<PathBuf>> {
        let name = if document.name.trim().is_empty() {
            "blueprint"
        } else {
            document.name.as_str()
        };
        self.persist(&format!("{}.{}", name, BLUEPRINT_EXTENSION), &document.serialize()?)
    }
}

/// A file name is usable when it is non-blank and free of path and wildcard characters.
pub fn is_valid_file_name(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty() && !trimmed.chars().all(|c| c == '.') && !name.contains(INVALID_FILE_NAME_CHARS)
}

#[derive(Debug, Clone)]
pub struct DirectoryPersistence {
    root: PathBuf,
}

impl DirectoryPersistence {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn blueprints_dir(&self) -> PathBuf {
        self.root.join("blueprints")
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.root.join("scripts")
    }

    fn blueprint_path(&self, reference: &str) -> PathBuf {
        let suffix = format!(".{}", BLUEPRINT_EXTENSION);
        let file = if reference.ends_with(&suffix) {
            reference.to_string()
        } else {
            format!("{}{}", reference, suffix)
        };
        self.blueprints_dir().join(file)
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| BlueprintError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl Persistence for DirectoryPersistence {
    fn load_catalog(&self) -> Result<NodeCatalog> {
        let path = self.root.join(CATALOG_FILE);
        if !path.exists() {
            tracing::debug!("[BGC] No {} under {}; using built-in catalog", CATALOG_FILE, self.root.display());
            return Ok(NodeCatalog::builtin());
        }
        let definitions: Vec<NodeDefinition> = serde_json::from_str(&read(&path)?)?;
        tracing::info!("[BGC] Loaded {} node definitions from {}", definitions.len(), path.display());
        Ok(NodeCatalog::from_definitions(definitions))
    }

    fn load_blueprint(&self, reference: &str) -> Result<BlueprintDocument> {
        if !is_valid_file_name(reference) {
            return Err(BlueprintError::InvalidFileName(reference.to_string()));
        }
        BlueprintDocument::deserialize(&read(&self.blueprint_path(reference))?)
    }

    fn persist(&self, name: &str, text: &str) -> Result<Option<PathBuf>> {
        if !is_valid_file_name(name) {
            return Err(BlueprintError::InvalidFileName(name.to_string()));
        }
        let is_blueprint = Path::new(name)
            .extension()
            .map(|ext| ext == BLUEPRINT_EXTENSION)
            .unwrap_or(false);
        let dir = if is_blueprint {
            self.blueprints_dir()
        } else {
            self.scripts_dir()
        };

        fs::create_dir_all(&dir).map_err(|source| BlueprintError::Io {
            path: dir.clone(),
            source,
        })?;
        let path = dir.join(name);
        fs::write(&path, text).map_err(|source| BlueprintError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::info!("[BGC] Wrote {} ({} bytes)", path.display(), text.len());
        Ok(Some(path))
    }

    fn list_blueprints(&self) -> Result<Vec<String>> {
        let dir = self.blueprints_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&dir).map_err(|source| BlueprintError::Io {
            path: dir.clone(),
            source,
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| BlueprintError::Io {
                path: dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.extension().map(|ext| ext == BLUEPRINT_EXTENSION).unwrap_or(false) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
