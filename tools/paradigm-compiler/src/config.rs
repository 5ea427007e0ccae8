//! `paradigm.toml`: every field has a default, so an empty file is valid.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use lexis_protocol::PosFamily;
use lexis_registry::{PartitionRange, RegistryRanges};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub selection: SelectionConfig,
    pub patterns: PatternConfig,
    pub registry: RangesConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// JSON-Lines headword dump.
    pub source: PathBuf,
    pub registry: PathBuf,
    pub output: PathBuf,
    pub report_dir: PathBuf,
    pub wordlist_dir: PathBuf,
    pub wordlists: Vec<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("data/headwords.jsonl"),
            registry: PathBuf::from("data/lemma_registry.json"),
            output: PathBuf::from("build/training.rkyv"),
            report_dir: PathBuf::from("build"),
            wordlist_dir: PathBuf::from("data/frequency"),
            wordlists: ["cst_wordlist.json", "bjt_wordlist.json", "sya_wordlist.json", "sc_wordlist.json"]
                .map(String::from)
                .to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Distinct noun lemmas kept for training.
    pub noun_limit: usize,
    pub verb_limit: usize,
    /// Longer compounds break the trainer's layout.
    pub max_lemma_length: usize,
    pub noun_pos: Vec<String>,
    pub verb_pos: Vec<String>,
    /// Tags registered by `populate-registry`; wider than the training set.
    pub registry_noun_pos: Vec<String>,
    pub registry_verb_pos: Vec<String>,
    /// Glosses containing any of these are not trainable.
    pub noun_excluded_glosses: Vec<String>,
    pub verb_excluded_glosses: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            noun_limit: 3000,
            verb_limit: 2000,
            max_lemma_length: 18,
            noun_pos: strings(&["masc", "fem", "nt"]),
            verb_pos: strings(&["pr"]),
            registry_noun_pos: strings(&["noun", "masc", "fem", "neut", "nt", "abstr", "act", "agent", "dimin"]),
            registry_verb_pos: strings(&[
                "vb", "pr", "aor", "fut", "opt", "imp", "cond", "caus", "pass", "reflx", "deno", "desid", "intens",
                "trans", "intrans", "ditrans", "impers", "inf", "abs", "ger", "comp vb",
            ]),
            noun_excluded_glosses: strings(&[
                "(gram)",
                "(abhi)",
                "(comm)",
                "in reference to",
                "people of",
                "name of",
                "family name",
            ]),
            verb_excluded_glosses: strings(&[
                "(gram)",
                "(abhi)",
                "(comm)",
                "in reference to",
                "name of",
                "names of",
                "family name",
            ]),
        }
    }
}

impl SelectionConfig {
    pub fn training_pos(&self, family: PosFamily) -> &[String] {
        match family {
            PosFamily::Noun => &self.noun_pos,
            PosFamily::Verb => &self.verb_pos,
        }
    }

    pub fn registry_pos(&self, family: PosFamily) -> &[String] {
        match family {
            PosFamily::Noun => &self.registry_noun_pos,
            PosFamily::Verb => &self.registry_verb_pos,
        }
    }

    pub fn excluded_glosses(&self, family: PosFamily) -> &[String] {
        match family {
            PosFamily::Noun => &self.noun_excluded_glosses,
            PosFamily::Verb => &self.verb_excluded_glosses,
        }
    }

    pub fn limit(&self, family: PosFamily) -> usize {
        match family {
            PosFamily::Noun => self.noun_limit,
            PosFamily::Verb => self.verb_limit,
        }
    }
}

/// Patterns whose forms are also read from the pre-rendered markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    pub irregular_nouns: BTreeSet<String>,
    pub irregular_verbs: BTreeSet<String>,
}

impl Default for PatternConfig {
    fn default() -> Self {
        let set = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            irregular_nouns: set(&[
                "rāja masc",
                "brahma masc",
                "kamma nt",
                "addha masc",
                "a masc east",
                "a masc pl",
                "a2 masc",
                "go masc",
                "yuva masc",
                "ī masc pl",
                "jantu masc",
                "u masc pl",
                "ar2 masc",
                "anta masc",
                "arahant masc",
                "bhavant masc",
                "santa masc",
                "parisā fem",
                "jāti fem",
                "ratti fem",
                "nadī fem",
                "pokkharaṇī fem",
                "mātar fem",
                "a nt east",
                "a nt irreg",
                "a nt pl",
            ]),
            irregular_verbs: set(&[
                "hoti pr",
                "atthi pr",
                "karoti pr",
                "brūti pr",
                "dakkhati pr",
                "dammi pr",
                "hanati pr",
                "kubbati pr",
                "natthi pr",
                "eti pr 2",
            ]),
        }
    }
}

impl PatternConfig {
    pub fn is_irregular(&self, family: PosFamily, pattern: &str) -> bool {
        match family {
            PosFamily::Noun => self.irregular_nouns.contains(pattern),
            PosFamily::Verb => self.irregular_verbs.contains(pattern),
        }
    }
}

/// Identity partitions of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangesConfig {
    pub noun_start: u32,
    pub noun_max: u32,
    pub verb_start: u32,
    pub verb_max: u32,
}

impl Default for RangesConfig {
    fn default() -> Self {
        let ranges = RegistryRanges::default();
        Self {
            noun_start: ranges.nouns.start,
            noun_max: ranges.nouns.max,
            verb_start: ranges.verbs.start,
            verb_max: ranges.verbs.max,
        }
    }
}

impl From<RangesConfig> for RegistryRanges {
    fn from(config: RangesConfig) -> Self {
        RegistryRanges {
            nouns: PartitionRange::new(config.noun_start, config.noun_max),
            verbs: PartitionRange::new(config.verb_start, config.verb_max),
        }
    }
}

impl Config {
    /// Reads `path`, or returns the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents =
            fs::read_to_string(path).with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("failed to parse config {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str::<Config>(contents)?)
    }

    pub fn ranges(&self) -> RegistryRanges {
        self.registry.into()
    }
}
