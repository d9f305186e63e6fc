//! Where the grammar files live.

use std::path::{Path, PathBuf};

use cip36_core::MetadataKind;

/// Default grammar directory, relative to the working directory.
pub const DEFAULT_SCHEMA_DIR: &str = "schema";

/// Locations of the three grammar files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaConfig {
    /// Directory holding the grammar files.
    pub dir: PathBuf,
    pub registration_file: String,
    pub witness_file: String,
    pub deregistration_file: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEMA_DIR)
    }
}

impl SchemaConfig {
    /// Standard file names in the given directory.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            registration_file: "cip36_registration.cddl".into(),
            witness_file: "cip36_witness.cddl".into(),
            deregistration_file: "cip36_deregistration.cddl".into(),
        }
    }

    /// Full path of the grammar for `kind`.
    pub fn path(&self, kind: MetadataKind) -> PathBuf {
        let file = match kind {
            MetadataKind::Registration => &self.registration_file,
            MetadataKind::Witness => &self.witness_file,
            MetadataKind::Deregistration => &self.deregistration_file,
        };
        self.dir.join(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let config = SchemaConfig::default();
        assert_eq!(
            config.path(MetadataKind::Witness),
            Path::new("schema").join("cip36_witness.cddl")
        );
    }

    #[test]
    fn test_custom_file_name() {
        let mut config = SchemaConfig::new("/etc/cip36");
        config.deregistration_file = "dereg.cddl".into();
        assert_eq!(
            config.path(MetadataKind::Deregistration),
            Path::new("/etc/cip36/dereg.cddl")
        );
    }
}
