//! On-disk persistence of the registry: validated load, diff-checked save,
//! backup of the previous file and atomic replacement.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use lexis_protocol::PosFamily;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::RegistryError;
use crate::registry::{LemmaRegistry, RegistryRanges};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The registry gained no entries; the file was left untouched.
    Unchanged,
    Written { backup: Option<PathBuf> },
}

/// A registry JSON file together with the ranges it is validated against.
#[derive(Debug, Clone)]
pub struct RegistryFile {
    path: PathBuf,
    ranges: RegistryRanges,
}

impl RegistryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ranges: RegistryRanges::default(),
        }
    }

    pub fn with_ranges(mut self, ranges: RegistryRanges) -> Self {
        self.ranges = ranges;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `lemma_registry.json` -> `lemma_registry.backup.json`
    pub fn backup_path(&self) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "registry".to_string());
        self.path.with_file_name(format!("{stem}.backup.json"))
    }

    /// Reads and validates the file, or starts a fresh registry if absent.
    pub fn load(&self) -> Result<LemmaRegistry, RegistryError> {
        if !self.path.exists() {
            info!("No registry at {}, starting fresh", self.path.display());
            let registry = LemmaRegistry::new(self.ranges);
            registry.validate()?;
            return Ok(registry);
        }

        let text = fs::read_to_string(&self.path).map_err(|source| RegistryError::Read {
            path: self.path.clone(),
            source,
        })?;
        let registry: LemmaRegistry = serde_json::from_str(&text).map_err(|source| RegistryError::Parse {
            path: self.path.clone(),
            source,
        })?;
        let registry = registry.with_ranges(self.ranges);
        registry.validate()?;

        info!(
            "Loaded registry: {} nouns, {} verbs",
            registry.len(PosFamily::Noun),
            registry.len(PosFamily::Verb)
        );
        Ok(registry)
    }

    /// Persists `registry` after proving it only appends to `original`.
    ///
    /// The previous file is copied to [`Self::backup_path`] first; the new
    /// document is written to a temporary file in the same directory and
    /// renamed over the old one, so the file is never half-written.
    pub fn save(&self, registry: &LemmaRegistry, original: &LemmaRegistry) -> Result<SaveOutcome, RegistryError> {
        registry.validate()?;
        registry.verify_extends(original)?;

        if self.path.exists() && registry.total_len() == original.total_len() {
            debug!("Registry unchanged, skipping save");
            return Ok(SaveOutcome::Unchanged);
        }

        let mut document = serde_json::to_string_pretty(registry).map_err(RegistryError::Serialize)?;
        document.push('\n');

        let write_err = |source: std::io::Error| RegistryError::Write {
            path: self.path.clone(),
            source,
        };

        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).map_err(write_err)?;

        let backup = if self.path.exists() {
            let backup = self.backup_path();
            fs::copy(&self.path, &backup).map_err(write_err)?;
            info!("Created registry backup: {}", backup.display());
            Some(backup)
        } else {
            None
        };

        let mut temp_file = NamedTempFile::new_in(parent).map_err(write_err)?;
        temp_file.write_all(document.as_bytes()).map_err(write_err)?;
        temp_file.as_file().sync_all().map_err(write_err)?;
        temp_file.persist(&self.path).map_err(|e| write_err(e.error))?;

        info!(
            "Saved registry to {} ({} new lemmas)",
            self.path.display(),
            registry.total_len() - original.total_len()
        );
        Ok(SaveOutcome::Written { backup })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexis_protocol::LemmaId;

    #[test]
    fn test_missing_file_gives_fresh_registry() {
        let dir = tempfile::tempdir().unwrap();
        let file = RegistryFile::new(dir.path().join("lemma_registry.json"));
        let registry = file.load().unwrap();
        assert!(registry.is_empty());
        assert_eq!(registry.next_id(PosFamily::Noun), 10_001);
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let file = RegistryFile::new(dir.path().join("lemma_registry.json"));

        let original = file.load().unwrap();
        let mut registry = original.clone();
        registry.get_or_assign(PosFamily::Noun, "dhamma").unwrap();
        registry.get_or_assign(PosFamily::Verb, "gacchati").unwrap();

        let outcome = file.save(&registry, &original).unwrap();
        assert_eq!(outcome, SaveOutcome::Written { backup: None });

        let reloaded = file.load().unwrap();
        assert_eq!(reloaded, registry);
        assert_eq!(reloaded.get(PosFamily::Verb, "gacchati"), Some(LemmaId(70_001)));
    }

    #[test]
    fn test_document_shape() {
        let dir = tempfile::tempdir().unwrap();
        let file = RegistryFile::new(dir.path().join("lemma_registry.json"));

        let original = LemmaRegistry::default();
        let mut registry = original.clone();
        registry.get_or_assign(PosFamily::Noun, "saṅgha").unwrap();
        file.save(&registry, &original).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(file.path()).unwrap()).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["next_noun_id"], 10_002);
        assert_eq!(value["next_verb_id"], 70_001);
        assert_eq!(value["nouns"]["saṅgha"], 10_001);
        assert!(value["verbs"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_second_save_writes_backup_and_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let file = RegistryFile::new(dir.path().join("lemma_registry.json"));

        let empty = file.load().unwrap();
        let mut first = empty.clone();
        first.populate(PosFamily::Noun, [("dhamma", 900), ("buddha", 500)]).unwrap();
        file.save(&first, &empty).unwrap();
        let first_bytes = fs::read(file.path()).unwrap();

        let loaded = file.load().unwrap();
        let mut second = loaded.clone();
        second.populate(PosFamily::Noun, [("dhamma", 900), ("buddha", 500)]).unwrap();
        assert_eq!(file.save(&second, &loaded).unwrap(), SaveOutcome::Unchanged);
        assert_eq!(fs::read(file.path()).unwrap(), first_bytes);

        second.get_or_assign(PosFamily::Noun, "citta").unwrap();
        let outcome = file.save(&second, &loaded).unwrap();
        assert_eq!(
            outcome,
            SaveOutcome::Written {
                backup: Some(dir.path().join("lemma_registry.backup.json"))
            }
        );
        assert_eq!(fs::read(file.backup_path()).unwrap(), first_bytes);
    }

    #[test]
    fn test_rejected_save_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let file = RegistryFile::new(dir.path().join("lemma_registry.json"));

        let empty = file.load().unwrap();
        let mut original = empty.clone();
        original.get_or_assign(PosFamily::Noun, "dhamma").unwrap();
        file.save(&original, &empty).unwrap();
        let before = fs::read(file.path()).unwrap();

        // Built from scratch, so "dhamma" is missing
        let mut rebuilt = LemmaRegistry::default();
        rebuilt.get_or_assign(PosFamily::Noun, "buddha").unwrap();
        rebuilt.get_or_assign(PosFamily::Noun, "citta").unwrap();
        let err = file.save(&rebuilt, &original).unwrap_err();
        assert!(matches!(err, RegistryError::Removed { .. }));

        assert_eq!(fs::read(file.path()).unwrap(), before);
        assert!(!file.backup_path().exists());
    }

    #[test]
    fn test_corrupt_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lemma_registry.json");
        fs::write(
            &path,
            r#"{"version": 1, "next_noun_id": 10001, "next_verb_id": 70001, "nouns": {"dhamma": 10001}, "verbs": {}}"#,
        )
        .unwrap();
        assert!(matches!(
            RegistryFile::new(&path).load(),
            Err(RegistryError::Watermark { family: PosFamily::Noun, .. })
        ));

        fs::write(&path, "{").unwrap();
        assert!(matches!(RegistryFile::new(&path).load(), Err(RegistryError::Parse { .. })));
    }
}
