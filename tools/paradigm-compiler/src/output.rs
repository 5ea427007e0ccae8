//! rkyv archive of the training dataset.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, Context};
use lexis_protocol::TrainingDataset;
use rkyv::AlignedVec;
use tempfile::NamedTempFile;

/// Archives `dataset` and atomically replaces `path`. Returns the byte size.
pub fn write_dataset(path: &Path, dataset: &TrainingDataset) -> anyhow::Result<usize> {
    let bytes = rkyv::to_bytes::<_, 4096>(dataset).map_err(|e| anyhow!("failed to archive dataset: {e}"))?;

    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;

    let mut temp_file = NamedTempFile::new_in(parent).context("failed to create temporary dataset file")?;
    temp_file.write_all(&bytes)?;
    temp_file.as_file().sync_all()?;
    temp_file
        .persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("failed to replace {}", path.display()))?;

    Ok(bytes.len())
}

/// Reads and validates an archive written by [`write_dataset`].
pub fn read_dataset(path: &Path) -> anyhow::Result<TrainingDataset> {
    let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;

    // The archive must start on an aligned address
    let mut aligned = AlignedVec::with_capacity(data.len());
    aligned.extend_from_slice(&data);

    rkyv::from_bytes::<TrainingDataset>(&aligned).map_err(|e| anyhow!("invalid dataset archive {}: {e}", path.display()))
}
