//! Orchestrates one rebuild of the training dataset.
//!
//! source -> selection -> registry ids -> expansion + attestation ->
//! validation -> form ids -> registry save -> rkyv dataset + report

pub mod commands;
pub mod config;
pub mod output;
pub mod pipeline;
pub mod selection;
pub mod source;

pub use commands::{build, build_from, describe_form_id, populate_registry, populate_registry_from, BuildOutcome};
pub use config::Config;
pub use output::{read_dataset, write_dataset};
pub use pipeline::{is_trainable_noun, Compilation, FamilyStats, ParadigmCompiler};
pub use selection::{Selection, Selector};
pub use source::{HeadwordSource, JsonLinesSource};
