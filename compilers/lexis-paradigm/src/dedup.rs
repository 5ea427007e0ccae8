//! Detection of plural-only headwords that merely repeat the plural column
//! of an ordinary headword with the same stem.
//!
//! The source sometimes lists a plural-only entry (`a masc pl`) next to an
//! ordinary one (`a masc`) whose plurals are the very same words. Such an
//! entry is redundant. A plural-only entry whose forms are not covered is a
//! genuine plurale tantum and is kept.

use std::collections::{HashMap, HashSet};

use lexis_morph::expander::GeneratedForm;
use lexis_protocol::{is_plural_only_pattern, Number};
use tracing::info;

/// Overlap above which a plural-only lemma is considered redundant.
pub const REDUNDANCY_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone)]
struct IndexedLemma {
    lemma: String,
    pattern: String,
    plural_forms: HashSet<String>,
}

/// One ordinary lemma compared against a plural-only lemma.
#[derive(Debug, Clone, PartialEq)]
pub struct PluralMatch {
    pub lemma: String,
    pub pattern: String,
    /// `|shared| / |plural-only forms|`, in `0.0..=1.0`.
    pub ratio: f64,
    pub matching: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DedupDecision {
    pub redundant: bool,
    /// Best candidate with a non-zero overlap.
    pub best: Option<PluralMatch>,
    pub ratio: f64,
    /// Number of distinct forms of the plural-only lemma.
    pub forms: usize,
}

impl DedupDecision {
    fn keep(forms: usize) -> Self {
        Self {
            redundant: false,
            best: None,
            ratio: 0.0,
            forms,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupStats {
    pub indexed_lemmas: usize,
    pub indexed_stems: usize,
    pub redundant: usize,
    pub genuine: usize,
}

/// Stem-keyed index of the plural forms of ordinary nominal lemmas.
#[derive(Debug, Clone, Default)]
pub struct PluralOnlyDeduplicator {
    index: HashMap<String, Vec<IndexedLemma>>,
    redundant: usize,
    genuine: usize,
}

/// Distinct surfaces, leaving out the bare stem.
fn inflected_surfaces<'a, I>(forms: I, stem: &str) -> HashSet<String>
where
    I: IntoIterator<Item = &'a GeneratedForm>,
{
    forms
        .into_iter()
        .filter(|form| form.surface != stem)
        .map(|form| form.surface.clone())
        .collect()
}

impl PluralOnlyDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes an ordinary lemma by its clean stem.
    ///
    /// Plural-only patterns and lemmas without plural forms are ignored.
    pub fn insert(&mut self, lemma: &str, pattern: &str, stem: &str, forms: &[GeneratedForm]) {
        if is_plural_only_pattern(pattern) {
            return;
        }

        let plural_forms = inflected_surfaces(
            forms.iter().filter(|form| form.grammar.number() == Number::Plural),
            stem,
        );
        if plural_forms.is_empty() {
            return;
        }

        self.index.entry(stem.to_string()).or_default().push(IndexedLemma {
            lemma: lemma.to_string(),
            pattern: pattern.to_string(),
            plural_forms,
        });
    }

    /// Every indexed lemma sharing `stem` with a non-zero overlap, best first.
    pub fn all_matches(&self, stem: &str, forms: &[GeneratedForm]) -> Vec<PluralMatch> {
        let own = inflected_surfaces(forms, stem);
        if own.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<PluralMatch> = self
            .candidates(stem)
            .iter()
            .map(|candidate| overlap(candidate, &own))
            .filter(|m| m.matching > 0)
            .collect();
        matches.sort_by(|a, b| b.ratio.total_cmp(&a.ratio).then_with(|| a.lemma.cmp(&b.lemma)));
        matches
    }

    /// Decides whether a plural-only lemma duplicates an indexed lemma.
    ///
    /// The first candidate with a strictly higher ratio becomes the best;
    /// a full match ends the search.
    pub fn check(&mut self, pattern: &str, stem: &str, forms: &[GeneratedForm]) -> DedupDecision {
        if !is_plural_only_pattern(pattern) {
            return DedupDecision::keep(0);
        }

        let own = inflected_surfaces(forms, stem);
        let mut decision = DedupDecision::keep(own.len());

        if !own.is_empty() {
            for candidate in self.candidates(stem) {
                let current = overlap(candidate, &own);
                if current.ratio > decision.ratio {
                    decision.ratio = current.ratio;
                    decision.best = Some(current);
                }
                if decision.ratio >= 1.0 {
                    break;
                }
            }
        }

        decision.redundant = decision.ratio > REDUNDANCY_THRESHOLD;
        if decision.redundant {
            self.redundant += 1;
        } else {
            self.genuine += 1;
        }
        decision
    }

    fn candidates(&self, stem: &str) -> &[IndexedLemma] {
        self.index.get(stem).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn stats(&self) -> DedupStats {
        DedupStats {
            indexed_lemmas: self.index.values().map(Vec::len).sum(),
            indexed_stems: self.index.len(),
            redundant: self.redundant,
            genuine: self.genuine,
        }
    }

    pub fn log_summary(&self) {
        let stats = self.stats();
        info!(
            indexed_lemmas = stats.indexed_lemmas,
            indexed_stems = stats.indexed_stems,
            redundant = stats.redundant,
            genuine = stats.genuine,
            "Plural-only deduplication"
        );
    }
}

fn overlap(candidate: &IndexedLemma, own: &HashSet<String>) -> PluralMatch {
    let matching = own.intersection(&candidate.plural_forms).count();
    PluralMatch {
        lemma: candidate.lemma.clone(),
        pattern: candidate.pattern.clone(),
        ratio: matching as f64 / own.len() as f64,
        matching,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexis_morph::classifier::{Grammar, NominalGrammar};
    use lexis_protocol::Case;

    fn form(surface: &str, number: Number) -> GeneratedForm {
        GeneratedForm {
            surface: surface.to_string(),
            grammar: Grammar::Nominal(NominalGrammar {
                case: Case::Nominative,
                number,
                ..NominalGrammar::default()
            }),
            ordinal: 0,
            attested: false,
        }
    }

    fn plurals(surfaces: &[&str]) -> Vec<GeneratedForm> {
        surfaces.iter().map(|s| form(s, Number::Plural)).collect()
    }

    fn kusala_index() -> PluralOnlyDeduplicator {
        let mut dedup = PluralOnlyDeduplicator::new();
        let mut forms = vec![form("kusalo", Number::Singular), form("kusalaṃ", Number::Singular)];
        forms.extend(plurals(&["kusalā", "kusale", "kusalehi", "kusalānaṃ"]));
        dedup.insert("kusala 3", "a masc", "kusal", &forms);
        dedup
    }

    #[test]
    fn test_full_subset_is_redundant() {
        let mut dedup = kusala_index();
        let decision = dedup.check("a masc pl", "kusal", &plurals(&["kusalā", "kusale", "kusalehi"]));

        assert!(decision.redundant);
        assert_eq!(decision.ratio, 1.0);
        assert_eq!(decision.forms, 3);
        let best = decision.best.unwrap();
        assert_eq!(best.lemma, "kusala 3");
        assert_eq!(best.matching, 3);
        assert_eq!(dedup.stats().redundant, 1);
    }

    #[test]
    fn test_empty_overlap_is_kept() {
        let mut dedup = kusala_index();
        let decision = dedup.check("ā fem pl", "kusal", &plurals(&["kusalāyo", "kusalāsu"]));

        assert!(!decision.redundant);
        assert_eq!(decision.ratio, 0.0);
        assert!(decision.best.is_none());
        assert_eq!(dedup.stats().genuine, 1);
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut dedup = kusala_index();

        // 2 of 4 shared: exactly half is not enough
        let half = plurals(&["kusalā", "kusale", "kusalāyo", "kusalāsu"]);
        let decision = dedup.check("a masc pl", "kusal", &half);
        assert_eq!(decision.ratio, 0.5);
        assert!(!decision.redundant);

        // 2 of 3 shared
        let most = plurals(&["kusalā", "kusale", "kusalāyo"]);
        assert!(dedup.check("a masc pl", "kusal", &most).redundant);
    }

    #[test]
    fn test_index_is_gender_agnostic_and_stem_keyed() {
        let mut dedup = kusala_index();
        // Neuter plural-only lemma still meets the masculine candidate
        assert!(dedup.check("a nt pl", "kusal", &plurals(&["kusalā", "kusale"])).redundant);
        // Another stem has no candidates
        assert!(!dedup.check("a masc pl", "akusal", &plurals(&["akusalā"])).redundant);
    }

    #[test]
    fn test_best_candidate_wins() {
        let mut dedup = kusala_index();
        dedup.insert("kusala 4", "a nt", "kusal", &plurals(&["kusalāni", "kusalā"]));

        let own = plurals(&["kusalāni", "kusalā", "kusale"]);
        let decision = dedup.check("a masc pl", "kusal", &own);
        // "kusala 3" shares 2/3 first; "kusala 4" also 2/3, not strictly better
        assert_eq!(decision.best.unwrap().lemma, "kusala 3");

        let matches = dedup.all_matches("kusal", &own);
        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|m| m.matching == 2));
    }

    #[test]
    fn test_insert_ignores_singular_only_and_plural_only() {
        let mut dedup = PluralOnlyDeduplicator::new();
        dedup.insert("nibbāna", "a nt", "nibbān", &[form("nibbānaṃ", Number::Singular)]);
        dedup.insert("kusala", "a masc pl", "kusal", &plurals(&["kusalā"]));
        // Bare stem alone does not count as a plural form
        dedup.insert("go", "go masc", "go", &plurals(&["go"]));
        assert_eq!(dedup.stats().indexed_lemmas, 0);
    }

    #[test]
    fn test_ordinary_pattern_is_never_checked() {
        let mut dedup = kusala_index();
        let decision = dedup.check("a masc", "kusal", &plurals(&["kusalā"]));
        assert!(!decision.redundant);
        assert_eq!(dedup.stats(), DedupStats { indexed_lemmas: 1, indexed_stems: 1, redundant: 0, genuine: 0 });
    }
}
