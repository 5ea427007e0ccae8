//! One rebuild: selection, identity assignment, expansion, encoding.
//!
//! Registry identities are handed out sequentially in frequency order
//! before any parallel work starts; template expansion and attestation then
//! run per lemma on the rayon pool, and the results are folded back in the
//! same order so the output does not depend on scheduling.

use std::collections::{BTreeMap, BTreeSet};

use lexis_markup::{nominal_forms, verbal_forms};
use lexis_morph::attestation::{AttestationCounts, AttestedWords};
use lexis_morph::classifier::{NominalGrammar, VerbalGrammar};
use lexis_morph::codec::{CodecError, NominalKey, VerbalKey, FORM_ID_LAYOUT_VERSION};
use lexis_morph::expander::{clean_stem, ExpansionStats, GeneratedForm};
use lexis_paradigm::{DedupStats, InflectionValidator, PluralOnlyDeduplicator};
use lexis_protocol::{
    gender_from_pos, is_plural_only_pattern, Case, FormId, Gender, HeadwordRecord, IrregularForm, LemmaId, NounRow,
    Number, PosFamily, TrainingDataset, VerbRow, DATASET_VERSION,
};
use lexis_registry::{LemmaRegistry, RegistryError};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::selection::{expand_headword, Selector};

/// Whether a nominal paradigm is complete enough to train on.
///
/// It needs a nominative singular, unless the pattern is plural-only.
pub fn is_trainable_noun(pattern: &str, forms: &[GeneratedForm]) -> bool {
    if forms.is_empty() {
        return false;
    }
    is_plural_only_pattern(pattern)
        || forms.iter().any(|form| {
            form.grammar
                .as_nominal()
                .is_some_and(|g| g.case == Case::Nominative && g.number == Number::Singular)
        })
}

/// Counters of one family, aggregated over the run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FamilyStats {
    pub selected_rows: usize,
    pub selected_lemmas: usize,
    pub processed: usize,
    pub discarded: Vec<String>,
    pub expansion: ExpansionStats,
    pub attestation: AttestationCounts,
    pub template_errors: usize,
    /// Attested forms whose variant ordinal does not fit the layout.
    pub unencodable: usize,
    /// Same form id reached twice; the later one is ignored.
    pub duplicates: usize,
}

impl FamilyStats {
    fn log(&self, family: PosFamily) {
        info!(
            "{}s processed: {}/{} rows ({} lemmas)",
            family, self.processed, self.selected_rows, self.selected_lemmas
        );
        if !self.discarded.is_empty() {
            info!("  Discarded {} {} rows without a usable paradigm", self.discarded.len(), family);
            debug!("  Discarded: {}", self.discarded.join(", "));
        }
        let generated = self.expansion.generated;
        let theoretical = self.attestation.theoretical;
        let share = if generated > 0 {
            theoretical as f64 / generated as f64 * 100.0
        } else {
            0.0
        };
        info!(
            "{} forms: {} total, {} in corpus, {} theoretical ({:.1}%), {} unclassified",
            family, generated, self.attestation.attested, theoretical, share, self.expansion.unclassified
        );
        if self.template_errors > 0 {
            warn!("{} {} templates could not be read", self.template_errors, family);
        }
        if self.unencodable > 0 {
            warn!("{} attested {} forms exceed the variant slot", self.unencodable, family);
        }
        if self.duplicates > 0 {
            debug!("{} duplicate {} form ids ignored", self.duplicates, family);
        }
    }
}

#[derive(Debug, Clone)]
pub struct Compilation {
    pub dataset: TrainingDataset,
    pub nouns: FamilyStats,
    pub verbs: FamilyStats,
    pub validator: InflectionValidator,
    pub dedup: DedupStats,
}

impl Compilation {
    pub fn log_summary(&self) {
        self.nouns.log(PosFamily::Noun);
        self.verbs.log(PosFamily::Verb);

        let dataset = &self.dataset;
        info!(
            "Dataset: {} noun rows, {} verb rows, {} noun forms, {} verb forms",
            dataset.nouns.len(),
            dataset.verbs.len(),
            dataset.noun_forms.len(),
            dataset.verb_forms.len()
        );
        info!(
            "Irregular forms: {} noun, {} verb; {} of {} verb lemmas are active only",
            dataset.noun_irregular_forms.len(),
            dataset.verb_irregular_forms.len(),
            dataset.nonreflexive_verbs.len(),
            dataset.verbs.iter().map(|v| v.lemma_id).collect::<BTreeSet<_>>().len()
        );
        info!(
            redundant = self.dedup.redundant,
            genuine = self.dedup.genuine,
            "Plural-only deduplication"
        );
        self.validator.log_summary();
    }
}

/// A selected row after expansion and attestation.
struct Expanded<'r> {
    record: &'r HeadwordRecord,
    lemma_id: LemmaId,
    forms: Vec<GeneratedForm>,
    stats: ExpansionStats,
    counts: AttestationCounts,
    failed: bool,
}

/// Attested and irregular forms of one family.
#[derive(Default)]
struct FormTables {
    attested: BTreeSet<FormId>,
    irregular: BTreeMap<FormId, String>,
}

impl FormTables {
    fn add_attested(&mut self, encoded: Result<FormId, CodecError>, stats: &mut FamilyStats) {
        match encoded {
            Ok(id) => {
                if !self.attested.insert(id) {
                    stats.duplicates += 1;
                }
            }
            Err(err) => {
                debug!("Skipping form: {err}");
                stats.unencodable += 1;
            }
        }
    }

    /// First text for an id wins.
    fn add_irregular(&mut self, encoded: Result<FormId, CodecError>, form: String, stats: &mut FamilyStats) {
        match encoded {
            Ok(id) => {
                self.irregular.entry(id).or_insert(form);
            }
            Err(err) => {
                debug!("Skipping irregular form {form}: {err}");
                stats.unencodable += 1;
            }
        }
    }

    fn into_parts(self) -> (Vec<FormId>, Vec<IrregularForm>) {
        let irregular = self
            .irregular
            .into_iter()
            .map(|(form_id, form)| IrregularForm { form_id, form })
            .collect();
        (self.attested.into_iter().collect(), irregular)
    }
}

/// The POS tag decides a noun's gender; the form's own reading is the fallback.
fn resolve_gender(pos_gender: Gender, form_gender: Gender) -> Gender {
    if pos_gender.is_none() {
        form_gender
    } else {
        pos_gender
    }
}

fn nominal_key(lemma_id: LemmaId, pos_gender: Gender, grammar: &NominalGrammar, ordinal: usize) -> NominalKey {
    NominalKey {
        lemma_id,
        case: grammar.case,
        gender: resolve_gender(pos_gender, grammar.gender),
        number: grammar.number,
        ordinal,
    }
}

fn verbal_key(lemma_id: LemmaId, grammar: &VerbalGrammar, ordinal: usize) -> VerbalKey {
    VerbalKey {
        lemma_id,
        tense: grammar.tense,
        person: grammar.person,
        number: grammar.number,
        reflexive: grammar.reflexive,
        ordinal,
    }
}

pub struct ParadigmCompiler<'a> {
    config: &'a Config,
    words: &'a AttestedWords,
}

impl<'a> ParadigmCompiler<'a> {
    pub fn new(config: &'a Config, words: &'a AttestedWords) -> Self {
        Self { config, words }
    }

    /// Compiles `records` into a dataset, appending unseen lemmas to
    /// `registry`. Only registry errors abort the run.
    pub fn compile(
        &self,
        records: &[HeadwordRecord],
        registry: &mut LemmaRegistry,
    ) -> Result<Compilation, RegistryError> {
        let selector = Selector::new(&self.config.selection);
        let mut dedup = selector.plural_index(records);

        let nouns = selector.select_nouns(records, &mut dedup);
        let verbs = selector.select_verbs(records);

        // Sequential, frequency-ordered: later rows never shift earlier ids
        let noun_ids = assign_ids(registry, PosFamily::Noun, &nouns.rows)?;
        let verb_ids = assign_ids(registry, PosFamily::Verb, &verbs.rows)?;

        let mut noun_stats = FamilyStats {
            selected_rows: nouns.rows.len(),
            selected_lemmas: nouns.lemmas,
            ..FamilyStats::default()
        };
        let mut verb_stats = FamilyStats {
            selected_rows: verbs.rows.len(),
            selected_lemmas: verbs.lemmas,
            ..FamilyStats::default()
        };

        let mut validator = InflectionValidator::new();
        let mut dataset = TrainingDataset {
            version: DATASET_VERSION,
            form_id_layout: FORM_ID_LAYOUT_VERSION,
            ..TrainingDataset::default()
        };

        info!("Processing {} noun rows...", noun_ids.len());
        let expanded = self.expand_all(PosFamily::Noun, noun_ids);
        let (noun_forms, noun_irregular) =
            self.compile_nouns(expanded, &dedup, &mut validator, &mut dataset, &mut noun_stats);
        dataset.noun_forms = noun_forms;
        dataset.noun_irregular_forms = noun_irregular;

        info!("Processing {} verb rows...", verb_ids.len());
        let expanded = self.expand_all(PosFamily::Verb, verb_ids);
        let (verb_forms, verb_irregular) = self.compile_verbs(expanded, &mut validator, &mut dataset, &mut verb_stats);
        dataset.verb_forms = verb_forms;
        dataset.verb_irregular_forms = verb_irregular;

        Ok(Compilation {
            dataset,
            nouns: noun_stats,
            verbs: verb_stats,
            validator,
            dedup: dedup.stats(),
        })
    }

    fn expand_all<'r>(&self, family: PosFamily, rows: Vec<(&'r HeadwordRecord, LemmaId)>) -> Vec<Expanded<'r>> {
        rows.into_par_iter()
            .map(|(record, lemma_id)| match expand_headword(record, family) {
                Ok(mut expansion) => {
                    let counts = self.words.annotate(&mut expansion.forms);
                    Expanded {
                        record,
                        lemma_id,
                        forms: expansion.forms,
                        stats: expansion.stats,
                        counts,
                        failed: false,
                    }
                }
                Err(err) => {
                    debug!("Template of {} is unreadable: {err}", record.lemma_1);
                    Expanded {
                        record,
                        lemma_id,
                        forms: Vec::new(),
                        stats: ExpansionStats::default(),
                        counts: AttestationCounts::default(),
                        failed: true,
                    }
                }
            })
            .collect()
    }

    fn compile_nouns(
        &self,
        expanded: Vec<Expanded<'_>>,
        dedup: &PluralOnlyDeduplicator,
        validator: &mut InflectionValidator,
        dataset: &mut TrainingDataset,
        stats: &mut FamilyStats,
    ) -> (Vec<FormId>, Vec<IrregularForm>) {
        let mut tables = FormTables::default();

        for item in expanded {
            let record = item.record;
            let pattern = record.pattern();
            let stem = clean_stem(record.raw_stem());
            let plural_only = is_plural_only_pattern(pattern);

            stats.expansion += item.stats;
            stats.attestation += item.counts;
            stats.template_errors += usize::from(item.failed);

            let matches = if plural_only {
                dedup.all_matches(&stem, &item.forms)
            } else {
                Vec::new()
            };
            validator.validate_noun(&record.lemma_clean, pattern, &item.forms, matches);

            if !is_trainable_noun(pattern, &item.forms) {
                stats.discarded.push(record.lemma_1.clone());
                continue;
            }
            stats.processed += 1;

            let pos_gender = gender_from_pos(&record.pos);
            for form in item.forms.iter().filter(|form| form.attested) {
                if let Some(grammar) = form.grammar.as_nominal() {
                    let key = nominal_key(item.lemma_id, pos_gender, grammar, form.ordinal);
                    tables.add_attested(key.encode(), stats);
                }
            }

            if self.config.patterns.is_irregular(PosFamily::Noun, pattern) {
                if let Some(markup) = record.inflections_html.as_deref() {
                    for markup_form in nominal_forms(markup) {
                        let key = nominal_key(item.lemma_id, pos_gender, &markup_form.grammar, markup_form.ordinal);
                        tables.add_irregular(key.encode(), markup_form.form, stats);
                    }
                }
            }

            dataset.nouns.push(NounRow {
                source_id: record.source_id(),
                lemma_id: item.lemma_id,
                lemma: record.lemma_clean.clone(),
                variant: record.sense_variant().to_string(),
                gender: pos_gender,
                stem,
                pattern: pattern.to_string(),
                frequency: record.ebt_count,
                meaning: record.meaning.clone(),
                plural_only,
                citations: record.citations(),
            });
        }

        tables.into_parts()
    }

    fn compile_verbs(
        &self,
        expanded: Vec<Expanded<'_>>,
        validator: &mut InflectionValidator,
        dataset: &mut TrainingDataset,
        stats: &mut FamilyStats,
    ) -> (Vec<FormId>, Vec<IrregularForm>) {
        let mut tables = FormTables::default();
        let mut lemma_ids = BTreeSet::new();
        let mut reflexive_ids = BTreeSet::new();

        for item in expanded {
            let record = item.record;
            let pattern = record.pattern();

            stats.expansion += item.stats;
            stats.attestation += item.counts;
            stats.template_errors += usize::from(item.failed);

            validator.validate_verb(&record.lemma_clean, pattern, &item.forms);

            // Every selected lemma is listed, even when its row yields no forms
            lemma_ids.insert(item.lemma_id);
            if item.forms.is_empty() {
                stats.discarded.push(record.lemma_1.clone());
                continue;
            }
            stats.processed += 1;

            let has_reflexive = item
                .forms
                .iter()
                .filter_map(|form| form.grammar.as_verbal())
                .any(|g| g.reflexive.is_reflexive());
            if has_reflexive {
                reflexive_ids.insert(item.lemma_id);
            }

            for form in item.forms.iter().filter(|form| form.attested) {
                if let Some(grammar) = form.grammar.as_verbal() {
                    tables.add_attested(verbal_key(item.lemma_id, grammar, form.ordinal).encode(), stats);
                }
            }

            if self.config.patterns.is_irregular(PosFamily::Verb, pattern) {
                if let Some(markup) = record.inflections_html.as_deref() {
                    for markup_form in verbal_forms(markup) {
                        let key = verbal_key(item.lemma_id, &markup_form.grammar, markup_form.ordinal);
                        tables.add_irregular(key.encode(), markup_form.form, stats);
                    }
                }
            }

            dataset.verbs.push(VerbRow {
                source_id: record.source_id(),
                lemma_id: item.lemma_id,
                lemma: record.lemma_clean.clone(),
                variant: record.sense_variant().to_string(),
                stem: clean_stem(record.raw_stem()),
                pattern: pattern.to_string(),
                frequency: record.ebt_count,
                meaning: record.meaning.clone(),
                verb_type: record.verb_type.clone(),
                transitivity: record.trans.clone(),
                citations: record.citations(),
            });
        }

        dataset.nonreflexive_verbs = lemma_ids.difference(&reflexive_ids).copied().collect();
        tables.into_parts()
    }
}

fn assign_ids<'r>(
    registry: &mut LemmaRegistry,
    family: PosFamily,
    rows: &[&'r HeadwordRecord],
) -> Result<Vec<(&'r HeadwordRecord, LemmaId)>, RegistryError> {
    rows.iter()
        .map(|record| Ok((*record, registry.get_or_assign(family, &record.lemma_clean)?)))
        .collect()
}
