//! Corpus attestation: which generated forms occur in the reference texts.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::expander::GeneratedForm;

#[derive(Debug, Error)]
pub enum WordlistError {
    #[error("failed to read wordlist {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("wordlist {path} is not a JSON list of strings: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Outcome of loading the configured wordlists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordlistLoad {
    pub loaded: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttestationCounts {
    pub attested: usize,
    pub theoretical: usize,
}

impl std::ops::AddAssign for AttestationCounts {
    fn add_assign(&mut self, other: Self) {
        self.attested += other.attested;
        self.theoretical += other.theoretical;
    }
}

/// Set of every surface form observed in the reference corpus.
#[derive(Debug, Clone, Default)]
pub struct AttestedWords {
    words: HashSet<String>,
}

impl AttestedWords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `files` (JSON arrays of strings) from `dir`.
    ///
    /// A missing file is only warned about and leaves a smaller set; an
    /// unreadable or malformed file is an error.
    pub fn load(dir: &Path, files: &[String]) -> Result<(Self, WordlistLoad), WordlistError> {
        let mut words = HashSet::new();
        let mut report = WordlistLoad::default();

        for file in files {
            let path = dir.join(file);
            if !path.exists() {
                warn!("Wordlist {} not found, skipping", path.display());
                report.missing.push(path);
                continue;
            }

            let text = fs::read_to_string(&path).map_err(|source| WordlistError::Read {
                path: path.clone(),
                source,
            })?;
            let list: Vec<String> = serde_json::from_str(&text).map_err(|source| WordlistError::Parse {
                path: path.clone(),
                source,
            })?;

            info!("Loaded {} words from {}", list.len(), file);
            words.extend(list);
            report.loaded.push(path);
        }

        info!("Attested corpus holds {} distinct words", words.len());
        Ok((Self { words }, report))
    }

    pub fn contains(&self, surface: &str) -> bool {
        self.words.contains(surface)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Sets the `attested` flag of every form by set membership.
    pub fn annotate(&self, forms: &mut [GeneratedForm]) -> AttestationCounts {
        let mut counts = AttestationCounts::default();
        for form in forms.iter_mut() {
            form.attested = self.contains(&form.surface);
            if form.attested {
                counts.attested += 1;
            } else {
                counts.theoretical += 1;
            }
        }
        counts
    }

    /// Annotates and splits into `(attested, theoretical)`.
    pub fn partition(&self, mut forms: Vec<GeneratedForm>) -> (Vec<GeneratedForm>, Vec<GeneratedForm>) {
        self.annotate(&mut forms);
        forms.into_iter().partition(|form| form.attested)
    }
}

impl<S: Into<String>> FromIterator<S> for AttestedWords {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            words: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{Grammar, NominalGrammar};

    fn form(surface: &str) -> GeneratedForm {
        GeneratedForm {
            surface: surface.to_string(),
            grammar: Grammar::Nominal(NominalGrammar::default()),
            ordinal: 0,
            attested: false,
        }
    }

    #[test]
    fn test_partition_is_complete_and_disjoint() {
        let words: AttestedWords = ["buddho", "buddhā"].into_iter().collect();
        let forms = vec![form("buddho"), form("buddhaṃ"), form("buddhā"), form("buddhe")];

        let (attested, theoretical) = words.partition(forms.clone());
        assert_eq!(attested.len() + theoretical.len(), forms.len());
        assert!(attested.iter().all(|f| f.attested && words.contains(&f.surface)));
        assert!(theoretical.iter().all(|f| !f.attested && !words.contains(&f.surface)));

        let mut surfaces: Vec<_> = attested
            .iter()
            .chain(theoretical.iter())
            .map(|f| f.surface.clone())
            .collect();
        surfaces.sort();
        let mut expected: Vec<_> = forms.iter().map(|f| f.surface.clone()).collect();
        expected.sort();
        assert_eq!(surfaces, expected);
    }

    #[test]
    fn test_annotate_counts() {
        let words: AttestedWords = ["gacchati"].into_iter().collect();
        let mut forms = vec![form("gacchati"), form("gacchasi")];
        let counts = words.annotate(&mut forms);
        assert_eq!(counts, AttestationCounts { attested: 1, theoretical: 1 });
    }

    #[test]
    fn test_missing_wordlist_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("cst_wordlist.json"), r#"["dhammo", "dhammā"]"#).unwrap();

        let files = vec!["cst_wordlist.json".to_string(), "bjt_wordlist.json".to_string()];
        let (words, report) = AttestedWords::load(dir.path(), &files).unwrap();

        assert_eq!(words.len(), 2);
        assert!(words.contains("dhammā"));
        assert_eq!(report.loaded.len(), 1);
        assert_eq!(report.missing, vec![dir.path().join("bjt_wordlist.json")]);
    }

    #[test]
    fn test_malformed_wordlist_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("sc_wordlist.json"), r#"{"dhammo": 3}"#).unwrap();

        let result = AttestedWords::load(dir.path(), &["sc_wordlist.json".to_string()]);
        assert!(matches!(result, Err(WordlistError::Parse { .. })));
    }
}
