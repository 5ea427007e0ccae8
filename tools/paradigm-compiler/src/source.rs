//! Read-only access to the lexical source.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use lexis_protocol::HeadwordRecord;
use tracing::info;

pub trait HeadwordSource {
    /// Every headword row, in source order.
    fn headwords(&self) -> anyhow::Result<Vec<HeadwordRecord>>;
}

/// One JSON headword object per line; blank lines are ignored.
#[derive(Debug, Clone)]
pub struct JsonLinesSource {
    path: PathBuf,
}

impl JsonLinesSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HeadwordSource for JsonLinesSource {
    fn headwords(&self) -> anyhow::Result<Vec<HeadwordRecord>> {
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read headword source {}", self.path.display()))?;

        let records = parse_json_lines(&text).with_context(|| format!("in {}", self.path.display()))?;
        info!("Read {} headwords from {}", records.len(), self.path.display());
        Ok(records)
    }
}

impl HeadwordSource for [HeadwordRecord] {
    fn headwords(&self) -> anyhow::Result<Vec<HeadwordRecord>> {
        Ok(self.to_vec())
    }
}

pub fn parse_json_lines(text: &str) -> anyhow::Result<Vec<HeadwordRecord>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str::<HeadwordRecord>(line)
                .with_context(|| format!("malformed headword on line {}", index + 1))
        })
        .collect()
}
