use std::path::PathBuf;

use lexis_protocol::PosFamily;
use thiserror::Error;

/// Registry integrity and persistence failures. All of them are fatal to a
/// rebuild: nothing may be written once one is raised.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read registry {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse registry {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write registry {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize registry: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("unsupported registry version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("invalid registry ranges: {0}")]
    InvalidRanges(String),
    #[error("invalid {family} id {id} for '{lemma}' (must be {start}-{max})")]
    IdOutOfRange {
        family: PosFamily,
        lemma: String,
        id: u32,
        start: u32,
        max: u32,
    },
    #[error("next_{family}_id ({next}) must be in {start}-{limit} and greater than the largest issued id ({max_issued})")]
    Watermark {
        family: PosFamily,
        next: u32,
        start: u32,
        limit: u32,
        max_issued: u32,
    },
    #[error("duplicate {family} id {id} shared by '{first}' and '{second}'")]
    Collision {
        family: PosFamily,
        id: u32,
        first: String,
        second: String,
    },
    #[error("{family} id overflow: max is {max}, tried to assign {next} to '{lemma}'")]
    Overflow {
        family: PosFamily,
        lemma: String,
        next: u32,
        max: u32,
    },
    #[error("{family} '{lemma}' was removed from the registry")]
    Removed { family: PosFamily, lemma: String },
    #[error("{family} '{lemma}' id changed from {original} to {current}")]
    Changed {
        family: PosFamily,
        lemma: String,
        original: u32,
        current: u32,
    },
}
