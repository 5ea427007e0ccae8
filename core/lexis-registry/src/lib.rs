//! Stable lemma identities.
//!
//! A [`LemmaRegistry`] maps normalized lemma text to a numeric identity in a
//! range reserved for its part-of-speech family. Identities are appended,
//! never edited; [`RegistryFile::save`] refuses any document that drops or
//! renumbers an existing entry.

pub mod error;
pub mod registry;
pub mod store;

pub use error::RegistryError;
pub use registry::{rank_by_frequency, LemmaRegistry, PartitionRange, RegistryRanges, REGISTRY_VERSION};
pub use store::{RegistryFile, SaveOutcome};
