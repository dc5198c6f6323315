//! Bundled reference documents served by the documentation tools.
//!
//! Both documents are opaque text returned as-is. They are compiled into the
//! binary, or read from an override directory on every call. A read failure
//! never fails the tool call; it turns into an error string instead.

use std::fs;
use std::path::{Path, PathBuf};

/// File name of the FIQL query guide.
pub const FIQL_QUERY_HOWTO_FILE: &str = "fiql_query_howto.md";

/// File name of the TOPdesk object schema reference.
pub const OBJECT_SCHEMAS_FILE: &str = "object_schemas.yaml";

const BUNDLED_FIQL_QUERY_HOWTO: &str = include_str!("../resources/fiql_query_howto.md");
const BUNDLED_OBJECT_SCHEMAS: &str = include_str!("../resources/object_schemas.yaml");

/// Serves the reference documents, either built in or from a directory.
#[derive(Debug, Clone, Default)]
pub struct ResourceStore {
    /// Override directory; `None` serves the compiled-in copies.
    dir: Option<PathBuf>,
}

impl ResourceStore {
    /// Creates a store reading from `dir` on every call.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// Creates a store serving the documents compiled into the binary.
    pub fn bundled() -> Self {
        Self::default()
    }

    /// Builds the store for an optional override directory.
    pub fn from_override(dir: Option<PathBuf>) -> Self {
        dir.map_or_else(Self::bundled, Self::new)
    }

    /// The override directory, if documents are read from disk.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Returns the FIQL query guide, or a description of why it couldn't be read.
    pub fn fiql_query_howto(&self) -> String {
        self.read_or_describe(FIQL_QUERY_HOWTO_FILE, "FIQL query guide", BUNDLED_FIQL_QUERY_HOWTO)
    }

    /// Returns the object schema reference, or a description of why it couldn't be read.
    pub fn object_schemas(&self) -> String {
        self.read_or_describe(OBJECT_SCHEMAS_FILE, "object schemas", BUNDLED_OBJECT_SCHEMAS)
    }

    fn read_or_describe(&self, file_name: &str, label: &str, bundled: &str) -> String {
        let Some(dir) = &self.dir else {
            return bundled.to_string();
        };
        let path = dir.join(file_name);
        match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read bundled resource");
                format!("Error reading {}: {}", label, e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_returns_literal_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let guide = "# FIQL\n\n`status==firstLine`\n";
        let schemas = "incident:\n  briefDescription: string\n";
        fs::write(dir.path().join(FIQL_QUERY_HOWTO_FILE), guide).unwrap();
        fs::write(dir.path().join(OBJECT_SCHEMAS_FILE), schemas).unwrap();

        let store = ResourceStore::new(dir.path());
        assert_eq!(store.fiql_query_howto(), guide);
        assert_eq!(store.object_schemas(), schemas);
    }

    #[test]
    fn test_missing_files_become_error_strings() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResourceStore::new(dir.path());

        let guide = store.fiql_query_howto();
        assert!(guide.starts_with("Error reading FIQL query guide: "));

        let schemas = store.object_schemas();
        assert!(schemas.starts_with("Error reading object schemas: "));
    }

    #[test]
    fn test_unreadable_path_becomes_error_string() {
        // A directory where a file is expected fails to read on every platform.
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(OBJECT_SCHEMAS_FILE)).unwrap();
        let store = ResourceStore::new(dir.path());
        assert!(store.object_schemas().starts_with("Error reading object schemas: "));
    }

    #[test]
    fn test_bundled_documents_need_no_directory() {
        let store = ResourceStore::bundled();
        assert!(store.dir().is_none());
        assert!(store.fiql_query_howto().contains("FIQL"));
        assert!(store.object_schemas().starts_with("# TOPdesk object schemas"));
    }

    #[test]
    fn test_from_override_picks_source() {
        assert!(ResourceStore::from_override(None).dir().is_none());

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(OBJECT_SCHEMAS_FILE), "person: {}").unwrap();
        let store = ResourceStore::from_override(Some(dir.path().to_path_buf()));
        assert_eq!(store.dir(), Some(dir.path()));
        assert_eq!(store.object_schemas(), "person: {}");
    }
}
