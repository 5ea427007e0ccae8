//! Paradigm-level analysis over expanded forms: plural-only deduplication
//! and completeness validation with its review report.

pub mod dedup;
pub mod report;
pub mod validate;

pub use dedup::{DedupDecision, DedupStats, PluralMatch, PluralOnlyDeduplicator, REDUNDANCY_THRESHOLD};
pub use report::{ReportError, ValidationReport};
pub use validate::{validate_noun, validate_verb, InflectionValidator, NounFinding, VerbFinding};
