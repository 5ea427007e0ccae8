use std::collections::{BTreeMap, BTreeSet};

use lexis_morph::classifier::Grammar;
use lexis_morph::expander::GeneratedForm;
use lexis_protocol::{is_plural_only_pattern, Case, Irregularity, Number, Person, Reflexive, Tense};
use tracing::info;

use crate::dedup::PluralMatch;

/// Tenses a present-stem verb is expected to realise. The aorist is not.
pub const EXPECTED_TENSES: &[Tense] = &[Tense::Present, Tense::Imperative, Tense::Optative, Tense::Future];

pub const EXPECTED_NUMBERS: &[Number] = &[Number::Singular, Number::Plural];

#[derive(Debug, Clone, PartialEq)]
pub struct NounFinding {
    pub lemma: String,
    pub pattern: String,
    pub flags: Irregularity,
    pub missing_combos: Vec<(Case, Number)>,
    pub missing_numbers: Vec<Number>,
    /// Ordinary lemmas sharing the stem, for plural-only patterns.
    pub plural_matches: Vec<PluralMatch>,
}

impl NounFinding {
    /// Missing combinations of a paradigm that is neither plural- nor singular-only.
    pub fn has_missing_forms(&self) -> bool {
        !self.flags.intersects(Irregularity::PLURAL_ONLY | Irregularity::SINGULAR_ONLY)
            && !self.missing_combos.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerbFinding {
    pub lemma: String,
    pub pattern: String,
    pub flags: Irregularity,
    pub unusual_tenses: Vec<Tense>,
    pub missing_tenses: Vec<Tense>,
    /// Missing active (non-reflexive) tense/person/number combinations.
    pub missing_combos: Vec<(Tense, Person, Number)>,
    /// Per expected tense with some persons: the persons it lacks.
    pub defective_persons: Vec<(Tense, Vec<Person>)>,
    pub has_reflexive: bool,
}

impl VerbFinding {
    /// Missing combinations not already explained by a missing tense or by
    /// the verb being impersonal.
    pub fn is_incomplete(&self) -> bool {
        !self.missing_combos.is_empty()
            && !self.flags.intersects(Irregularity::MISSING_TENSE | Irregularity::IMPERSONAL)
    }
}

/// Compares one noun paradigm against the 8 cases x 2 numbers space.
///
/// Returns `None` for a complete, ordinary paradigm.
pub fn validate_noun(
    lemma: &str,
    pattern: &str,
    forms: &[GeneratedForm],
    plural_matches: Vec<PluralMatch>,
) -> Option<NounFinding> {
    let mut found_numbers = BTreeSet::new();
    let mut found_combos = BTreeSet::new();

    for form in forms {
        let Grammar::Nominal(grammar) = form.grammar else {
            continue;
        };
        if !grammar.number.is_none() {
            found_numbers.insert(grammar.number);
        }
        if !grammar.case.is_none() && !grammar.number.is_none() {
            found_combos.insert((grammar.case, grammar.number));
        }
    }

    let plural_only = is_plural_only_pattern(pattern);
    let singular_only = !plural_only
        && found_numbers.contains(&Number::Singular)
        && !found_numbers.contains(&Number::Plural);

    let expected_numbers: &[Number] = if plural_only {
        &[Number::Plural]
    } else if singular_only {
        &[Number::Singular]
    } else {
        EXPECTED_NUMBERS
    };

    let missing_numbers: Vec<Number> = expected_numbers
        .iter()
        .copied()
        .filter(|number| !found_numbers.contains(number))
        .collect();

    let missing_combos: Vec<(Case, Number)> = Case::REALISED
        .iter()
        .flat_map(|&case| expected_numbers.iter().map(move |&number| (case, number)))
        .filter(|combo| !found_combos.contains(combo))
        .collect();

    let mut flags = Irregularity::empty();
    flags.set(Irregularity::PLURAL_ONLY, plural_only);
    flags.set(Irregularity::SINGULAR_ONLY, singular_only);
    flags.set(Irregularity::MISSING_FORMS, !missing_combos.is_empty());

    if flags.is_empty() {
        return None;
    }

    Some(NounFinding {
        lemma: lemma.to_string(),
        pattern: pattern.to_string(),
        flags,
        missing_combos,
        missing_numbers,
        plural_matches,
    })
}

/// Compares one verb paradigm against the expected tense x person x number space.
pub fn validate_verb(lemma: &str, pattern: &str, forms: &[GeneratedForm]) -> Option<VerbFinding> {
    let mut found_tenses = BTreeSet::new();
    let mut found_persons = BTreeSet::new();
    let mut persons_by_tense: BTreeMap<Tense, BTreeSet<Person>> = BTreeMap::new();
    let mut active_combos = BTreeSet::new();
    let mut has_reflexive = false;

    for form in forms {
        let Grammar::Verbal(grammar) = form.grammar else {
            continue;
        };
        if !grammar.tense.is_none() {
            found_tenses.insert(grammar.tense);
        }
        if !grammar.person.is_none() {
            found_persons.insert(grammar.person);
            if !grammar.tense.is_none() {
                persons_by_tense.entry(grammar.tense).or_default().insert(grammar.person);
            }
        }
        if grammar.is_complete() {
            let combo = (grammar.tense, grammar.person, grammar.number);
            match grammar.reflexive {
                Reflexive::Yes => has_reflexive = true,
                Reflexive::No => {
                    active_combos.insert(combo);
                }
            }
        }
    }

    let unusual_tenses: Vec<Tense> = found_tenses
        .iter()
        .copied()
        .filter(|tense| !EXPECTED_TENSES.contains(tense))
        .collect();
    let missing_tenses: Vec<Tense> = EXPECTED_TENSES
        .iter()
        .copied()
        .filter(|tense| !found_tenses.contains(tense))
        .collect();

    let impersonal = found_persons.len() == 1 && found_persons.contains(&Person::Third);

    let defective_persons: Vec<(Tense, Vec<Person>)> = if impersonal {
        Vec::new()
    } else {
        EXPECTED_TENSES
            .iter()
            .filter_map(|tense| {
                let present = persons_by_tense.get(tense)?;
                let missing: Vec<Person> = Person::REALISED
                    .iter()
                    .copied()
                    .filter(|person| !present.contains(person))
                    .collect();
                (!missing.is_empty()).then_some((*tense, missing))
            })
            .collect()
    };

    let missing_combos: Vec<(Tense, Person, Number)> = EXPECTED_TENSES
        .iter()
        .flat_map(|&tense| {
            Person::REALISED.iter().flat_map(move |&person| {
                EXPECTED_NUMBERS.iter().map(move |&number| (tense, person, number))
            })
        })
        .filter(|combo| !active_combos.contains(combo))
        .collect();

    let mut flags = Irregularity::empty();
    flags.set(Irregularity::UNUSUAL_TENSE, !unusual_tenses.is_empty());
    flags.set(Irregularity::MISSING_TENSE, !missing_tenses.is_empty());
    flags.set(Irregularity::IMPERSONAL, impersonal);
    flags.set(Irregularity::DEFECTIVE_PERSONS, !defective_persons.is_empty());
    flags.set(Irregularity::INCOMPLETE, !missing_combos.is_empty());

    if flags.is_empty() {
        return None;
    }

    Some(VerbFinding {
        lemma: lemma.to_string(),
        pattern: pattern.to_string(),
        flags,
        unusual_tenses,
        missing_tenses,
        missing_combos,
        defective_persons,
        has_reflexive,
    })
}

/// Collects findings over a whole run. Informational only: nothing here
/// decides whether a lemma is kept.
#[derive(Debug, Clone, Default)]
pub struct InflectionValidator {
    pub nouns_validated: usize,
    pub verbs_validated: usize,
    pub noun_findings: Vec<NounFinding>,
    pub verb_findings: Vec<VerbFinding>,
}

impl InflectionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate_noun(&mut self, lemma: &str, pattern: &str, forms: &[GeneratedForm], plural_matches: Vec<PluralMatch>) {
        self.nouns_validated += 1;
        self.noun_findings
            .extend(validate_noun(lemma, pattern, forms, plural_matches));
    }

    pub fn validate_verb(&mut self, lemma: &str, pattern: &str, forms: &[GeneratedForm]) {
        self.verbs_validated += 1;
        self.verb_findings.extend(validate_verb(lemma, pattern, forms));
    }

    pub fn count_nouns(&self, flag: Irregularity) -> usize {
        self.noun_findings.iter().filter(|f| f.flags.contains(flag)).count()
    }

    pub fn count_verbs(&self, flag: Irregularity) -> usize {
        self.verb_findings.iter().filter(|f| f.flags.contains(flag)).count()
    }

    pub fn log_summary(&self) {
        info!(
            validated = self.nouns_validated,
            irregular = self.noun_findings.len(),
            plural_only = self.count_nouns(Irregularity::PLURAL_ONLY),
            singular_only = self.count_nouns(Irregularity::SINGULAR_ONLY),
            missing_forms = self.noun_findings.iter().filter(|f| f.has_missing_forms()).count(),
            "Noun inflection validation"
        );
        info!(
            validated = self.verbs_validated,
            irregular = self.verb_findings.len(),
            unusual_tenses = self.count_verbs(Irregularity::UNUSUAL_TENSE),
            missing_tenses = self.count_verbs(Irregularity::MISSING_TENSE),
            impersonal = self.count_verbs(Irregularity::IMPERSONAL),
            defective = self.count_verbs(Irregularity::DEFECTIVE_PERSONS),
            incomplete = self.verb_findings.iter().filter(|f| f.is_incomplete()).count(),
            "Verb inflection validation"
        );
    }
}
