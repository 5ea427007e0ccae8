//! Which source rows become training items.

use std::collections::{BTreeMap, HashSet};

use lexis_morph::expander::{clean_stem, Expansion, TemplateExpander};
use lexis_morph::template::{InflectionTemplate, TemplateError};
use lexis_paradigm::PluralOnlyDeduplicator;
use lexis_protocol::{is_plural_only_pattern, HeadwordRecord, PosFamily};
use lexis_registry::rank_by_frequency;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::SelectionConfig;

/// Redundant plural-only rows listed in the log before the rest is counted.
const MAX_LOGGED_SKIPS: usize = 10;

/// Expands a row's template with its cleaned stem; a row without a template
/// yields no forms.
pub fn expand_headword(record: &HeadwordRecord, family: PosFamily) -> Result<Expansion, TemplateError> {
    let Some(raw) = record.template.as_deref() else {
        return Ok(Expansion::default());
    };
    let template = InflectionTemplate::parse(raw)?;
    let stem = clean_stem(record.raw_stem());
    Ok(TemplateExpander::new(family, &record.pos).expand(&template, &stem))
}

/// Nominal patterns name their gender; it has to agree with the POS tag.
pub fn pattern_agrees_with_pos(pos: &str, pattern: &str) -> bool {
    let pos = pos.to_lowercase();
    match pos.as_str() {
        "masc" | "fem" | "nt" => pattern.to_lowercase().contains(pos.as_str()),
        _ => true,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rejection {
    PartOfSpeech,
    NoParadigm,
    NoTemplate,
    Unused,
    Gloss,
    NoCitation,
    Reflexive,
    GenderMismatch,
    TooLong,
    RedundantPluralOnly,
}

/// A plural-only row dropped because another lemma already covers its forms.
#[derive(Debug, Clone, PartialEq)]
pub struct RedundantRow {
    pub lemma: String,
    pub pattern: String,
    pub matched: String,
    pub ratio: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Selection<'r> {
    /// Every sense row of the selected lemmas, most frequent first.
    pub rows: Vec<&'r HeadwordRecord>,
    pub lemmas: usize,
    pub rejected: BTreeMap<Rejection, usize>,
    pub redundant: Vec<RedundantRow>,
}

impl Selection<'_> {
    pub fn rejected(&self, reason: Rejection) -> usize {
        self.rejected.get(&reason).copied().unwrap_or(0)
    }
}

pub struct Selector<'a> {
    config: &'a SelectionConfig,
}

impl<'a> Selector<'a> {
    pub fn new(config: &'a SelectionConfig) -> Self {
        Self { config }
    }

    fn has_pos(pos_list: &[String], record: &HeadwordRecord) -> bool {
        pos_list.iter().any(|pos| *pos == record.pos)
    }

    /// Filters shared by both families, then the family-specific ones.
    pub fn check(&self, family: PosFamily, record: &HeadwordRecord) -> Result<(), Rejection> {
        if !Self::has_pos(self.config.training_pos(family), record) {
            return Err(Rejection::PartOfSpeech);
        }
        if !record.has_paradigm() {
            return Err(Rejection::NoParadigm);
        }
        if record.ebt_count == 0 {
            return Err(Rejection::Unused);
        }
        let meaning = record.meaning.trim();
        if meaning.is_empty()
            || self
                .config
                .excluded_glosses(family)
                .iter()
                .any(|marker| meaning.contains(marker.as_str()))
        {
            return Err(Rejection::Gloss);
        }
        if !record.has_citation() {
            return Err(Rejection::NoCitation);
        }
        if family == PosFamily::Verb && record.grammar.contains("reflx") {
            return Err(Rejection::Reflexive);
        }
        if record.template.is_none() {
            return Err(Rejection::NoTemplate);
        }
        if family == PosFamily::Noun && !pattern_agrees_with_pos(&record.pos, record.pattern()) {
            debug!("Pattern-POS mismatch: {} pos={} pattern={}", record.lemma_1, record.pos, record.pattern());
            return Err(Rejection::GenderMismatch);
        }
        if record.lemma_clean.chars().count() > self.config.max_lemma_length {
            return Err(Rejection::TooLong);
        }
        Ok(())
    }

    /// Indexes the plural forms of every templated noun of the source.
    ///
    /// The index deliberately covers rows that are not trainable themselves,
    /// so a plural-only row still finds its ordinary counterpart.
    pub fn plural_index(&self, records: &[HeadwordRecord]) -> PluralOnlyDeduplicator {
        let expanded: Vec<(&HeadwordRecord, Expansion)> = records
            .par_iter()
            .filter(|record| {
                Self::has_pos(&self.config.noun_pos, record) && record.has_paradigm() && record.template.is_some()
            })
            .filter_map(|record| expand_headword(record, PosFamily::Noun).ok().map(|e| (record, e)))
            .collect();

        let mut dedup = PluralOnlyDeduplicator::new();
        for (record, expansion) in &expanded {
            dedup.insert(
                &record.lemma_1,
                record.pattern(),
                &clean_stem(record.raw_stem()),
                &expansion.forms,
            );
        }

        let stats = dedup.stats();
        info!(
            "Indexed plural forms of {} lemmas under {} stems",
            stats.indexed_lemmas, stats.indexed_stems
        );
        dedup
    }

    pub fn select_nouns<'r>(
        &self,
        records: &'r [HeadwordRecord],
        dedup: &mut PluralOnlyDeduplicator,
    ) -> Selection<'r> {
        let mut selection = Selection::default();
        let mut candidates = Vec::new();

        for record in records {
            if let Err(reason) = self.check(PosFamily::Noun, record) {
                *selection.rejected.entry(reason).or_default() += 1;
                continue;
            }

            if is_plural_only_pattern(record.pattern()) {
                let forms = expand_headword(record, PosFamily::Noun)
                    .map(|e| e.forms)
                    .unwrap_or_default();
                let decision = dedup.check(record.pattern(), &clean_stem(record.raw_stem()), &forms);
                if decision.redundant {
                    *selection.rejected.entry(Rejection::RedundantPluralOnly).or_default() += 1;
                    selection.redundant.push(RedundantRow {
                        lemma: record.lemma_1.clone(),
                        pattern: record.pattern().to_string(),
                        matched: decision.best.map(|m| m.lemma).unwrap_or_default(),
                        ratio: decision.ratio,
                    });
                    continue;
                }
            }

            candidates.push(record);
        }

        if !selection.redundant.is_empty() {
            info!("Skipped {} redundant plural-only lemmas", selection.redundant.len());
            for row in selection.redundant.iter().take(MAX_LOGGED_SKIPS) {
                info!("  {} ({}) -> matches {}", row.lemma, row.pattern, row.matched);
            }
        }

        self.take_top(PosFamily::Noun, candidates, &mut selection);
        selection
    }

    pub fn select_verbs<'r>(&self, records: &'r [HeadwordRecord]) -> Selection<'r> {
        let mut selection = Selection::default();
        let mut candidates = Vec::new();

        for record in records {
            match self.check(PosFamily::Verb, record) {
                Ok(()) => candidates.push(record),
                Err(reason) => *selection.rejected.entry(reason).or_default() += 1,
            }
        }

        self.take_top(PosFamily::Verb, candidates, &mut selection);
        selection
    }

    /// Keeps every row of the `limit` lemmas with the highest sense frequency.
    fn take_top<'r>(&self, family: PosFamily, candidates: Vec<&'r HeadwordRecord>, selection: &mut Selection<'r>) {
        let ranked = rank_by_frequency(
            candidates
                .iter()
                .copied()
                .map(|record| (record.lemma_clean.as_str(), record.ebt_count)),
        );
        let top = &ranked[..ranked.len().min(self.config.limit(family))];
        let chosen: HashSet<&str> = top.iter().map(|(lemma, _)| *lemma).collect();

        let mut rows: Vec<&'r HeadwordRecord> = candidates
            .into_iter()
            .filter(|record| chosen.contains(record.lemma_clean.as_str()))
            .collect();
        rows.sort_by(|a, b| b.ebt_count.cmp(&a.ebt_count).then_with(|| a.id.cmp(&b.id)));

        if let (Some((highest, high)), Some((lowest, low))) = (top.first(), top.last()) {
            info!(
                "Selected {} {} lemmas ({} rows), frequency {} ({}) to {} ({})",
                top.len(),
                family,
                rows.len(),
                high,
                highest,
                low,
                lowest
            );
        }

        selection.lemmas = top.len();
        selection.rows = rows;
    }

    /// `(lemma, frequency)` of every row registered by the population pass.
    pub fn registry_candidates<'r>(&self, family: PosFamily, records: &'r [HeadwordRecord]) -> Vec<(&'r str, u32)> {
        let pos_list = self.config.registry_pos(family);
        records
            .iter()
            .filter(|record| Self::has_pos(pos_list, record) && record.has_paradigm())
            .map(|record| (record.lemma_clean.as_str(), record.ebt_count))
            .collect()
    }
}
