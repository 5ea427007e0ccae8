pub mod attestation;
pub mod classifier;
pub mod codec;
pub mod expander;
pub mod template;

pub use attestation::{AttestationCounts, AttestedWords, WordlistError, WordlistLoad};
pub use classifier::{classify, classify_nominal, classify_verbal, Grammar, NominalGrammar, VerbalGrammar};
pub use codec::{CodecError, NominalKey, VerbalKey, FORM_ID_LAYOUT_VERSION};
pub use expander::{clean_stem, Expansion, ExpansionStats, GeneratedForm, TemplateExpander};
pub use template::{InflectionTemplate, TemplateCell, TemplateError, TemplateRow};
