use rkyv::{Archive, Deserialize, Serialize};
use crate::ids::{FormId, LemmaId, SourceId};
use crate::morphology::Gender;
use alloc::string::String;
use alloc::vec::Vec;
use bitflags::bitflags;

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// Version of the archived dataset document.
pub const DATASET_VERSION: u32 = 1;

/// Reads `null` as the field's default, like a missing key.
#[cfg(feature = "serde")]
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + SerdeDeserialize<'de>,
{
    Ok(<Option<T> as SerdeDeserialize<'de>>::deserialize(deserializer)?.unwrap_or_default())
}

/// One headword row as provided by the lexical source.
///
/// A citation form may have several rows (senses); they share the
/// normalized `lemma_clean` and therefore one registry identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HeadwordRecord {
    pub id: u32,
    /// Citation form including its sense number, e.g. `"dhamma 1"`.
    pub lemma_1: String,
    /// Normalized citation form, the identity key.
    pub lemma_clean: String,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "null_as_default"))]
    pub pos: String,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "null_as_default"))]
    pub grammar: String,
    pub stem: Option<String>,
    pub pattern: Option<String>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "null_as_default"))]
    pub ebt_count: u32,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "null_as_default"))]
    pub meaning: String,
    /// Paradigm template as raw JSON text.
    pub template: Option<String>,
    /// Pre-rendered inflection table, only consulted for irregular patterns.
    pub inflections_html: Option<String>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "null_as_default"))]
    pub source_1: String,
    /// First canonical citation; rows without one are not trained.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "null_as_default"))]
    pub sutta_1: String,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "null_as_default"))]
    pub example_1: String,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "null_as_default"))]
    pub source_2: String,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "null_as_default"))]
    pub sutta_2: String,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "null_as_default"))]
    pub example_2: String,
    /// Verb class of the source, e.g. `"caus"` or `"pass"`.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "null_as_default"))]
    pub verb_type: String,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "null_as_default"))]
    pub trans: String,
}

impl HeadwordRecord {
    pub fn source_id(&self) -> SourceId {
        SourceId(self.id)
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_deref().unwrap_or("")
    }

    pub fn raw_stem(&self) -> &str {
        self.stem.as_deref().unwrap_or("")
    }

    /// Whether the row carries a pattern and a real stem (`-` marks "no stem").
    pub fn has_paradigm(&self) -> bool {
        let stem = self.raw_stem();
        !self.pattern().is_empty() && !stem.is_empty() && stem != "-"
    }

    pub fn has_citation(&self) -> bool {
        !self.sutta_1.trim().is_empty()
    }

    /// Both citation slots, skipping the ones left blank.
    pub fn citations(&self) -> Vec<Citation> {
        [
            (&self.source_1, &self.sutta_1, &self.example_1),
            (&self.source_2, &self.sutta_2, &self.example_2),
        ]
        .into_iter()
        .filter(|(source, sutta, example)| !(source.is_empty() && sutta.is_empty() && example.is_empty()))
        .map(|(source, sutta, example)| Citation {
            source: source.clone(),
            sutta: sutta.clone(),
            example: example.clone(),
        })
        .collect()
    }

    /// Sense suffix of `lemma_1` after the normalized lemma.
    ///
    /// `"dhamma"` -> `""`, `"dhamma 1"` -> `"1"`, `"annati 1.1"` -> `"1.1"`.
    pub fn sense_variant(&self) -> &str {
        if self.lemma_1 == self.lemma_clean {
            return "";
        }
        if let Some(rest) = self
            .lemma_1
            .strip_prefix(self.lemma_clean.as_str())
            .and_then(|rest| rest.strip_prefix(' '))
        {
            return rest;
        }
        match self.lemma_1.rsplit_once(' ') {
            Some((_, variant)) => variant,
            None => "",
        }
    }
}

/// Plural-only (pluralia tantum) paradigms are tagged with a trailing ` pl`.
pub fn is_plural_only_pattern(pattern: &str) -> bool {
    pattern.trim().ends_with(" pl")
}

/// A canonical passage showing a sense in use.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct Citation {
    pub source: String,
    pub sutta: String,
    pub example: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct NounRow {
    pub source_id: SourceId,
    pub lemma_id: LemmaId,
    pub lemma: String,
    pub variant: String,
    pub gender: Gender,
    pub stem: String,
    pub pattern: String,
    pub frequency: u32,
    pub meaning: String,
    pub plural_only: bool,
    pub citations: Vec<Citation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct VerbRow {
    pub source_id: SourceId,
    pub lemma_id: LemmaId,
    pub lemma: String,
    pub variant: String,
    pub stem: String,
    pub pattern: String,
    pub frequency: u32,
    pub meaning: String,
    pub verb_type: String,
    pub transitivity: String,
    pub citations: Vec<Citation>,
}

/// A form read verbatim from the source's irregular-forms markup.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct IrregularForm {
    pub form_id: FormId,
    pub form: String,
}

/// The compiled training dataset consumed by the client.
///
/// Attested forms are stored only as packed ids; their grammar is always
/// re-derived by decoding with the layout named in `form_id_layout`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct TrainingDataset {
    pub version: u32,
    pub form_id_layout: u32,
    pub nouns: Vec<NounRow>,
    pub verbs: Vec<VerbRow>,
    pub noun_forms: Vec<FormId>,
    pub verb_forms: Vec<FormId>,
    pub noun_irregular_forms: Vec<IrregularForm>,
    pub verb_irregular_forms: Vec<IrregularForm>,
    /// Verb lemmas without any reflexive form.
    pub nonreflexive_verbs: Vec<LemmaId>,
}

bitflags! {
    /// Kinds of paradigm irregularity surfaced for manual review.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
    pub struct Irregularity: u16 {
        // Nominal
        const PLURAL_ONLY = 1;
        const SINGULAR_ONLY = 1 << 1;
        const MISSING_FORMS = 1 << 2;

        // Verbal
        const UNUSUAL_TENSE = 1 << 3;
        const MISSING_TENSE = 1 << 4;
        const IMPERSONAL = 1 << 5;
        const DEFECTIVE_PERSONS = 1 << 6;
        const INCOMPLETE = 1 << 7;
    }
}
