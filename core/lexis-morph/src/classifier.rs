//! Token-rule classification of template grammar descriptors.
//!
//! Every dimension has an ordered rule table. The descriptor is lowercased
//! and split on whitespace; the first rule owning one of the tokens wins, so
//! a descriptor carrying both `opt` and `pr` resolves to the optative.

use lexis_protocol::{gender_from_pos, Case, Gender, Number, Person, PosFamily, Reflexive, Tense};

/// A single classification rule: any alias token selects `value`.
#[derive(Debug, Clone, Copy)]
pub struct Rule<T> {
    pub aliases: &'static [&'static str],
    pub value: T,
}

const fn rule<T>(aliases: &'static [&'static str], value: T) -> Rule<T> {
    Rule { aliases, value }
}

pub const GENDER_RULES: &[Rule<Gender>] = &[
    rule(&["masc", "masculine"], Gender::Masculine),
    rule(&["fem", "feminine"], Gender::Feminine),
    rule(&["nt", "neut", "neuter"], Gender::Neuter),
];

pub const NUMBER_RULES: &[Rule<Number>] = &[
    rule(&["sg", "singular"], Number::Singular),
    rule(&["pl", "plural"], Number::Plural),
];

pub const CASE_RULES: &[Rule<Case>] = &[
    rule(&["nom", "nominative"], Case::Nominative),
    rule(&["acc", "accusative"], Case::Accusative),
    rule(&["instr", "instrumental"], Case::Instrumental),
    rule(&["dat", "dative"], Case::Dative),
    rule(&["abl", "ablative"], Case::Ablative),
    rule(&["gen", "genitive"], Case::Genitive),
    rule(&["loc", "locative"], Case::Locative),
    rule(&["voc", "vocative"], Case::Vocative),
];

pub const PERSON_RULES: &[Rule<Person>] = &[
    rule(&["1st", "first"], Person::First),
    rule(&["2nd", "second"], Person::Second),
    rule(&["3rd", "third"], Person::Third),
];

/// Moods outrank the present: `opt` > `imp` > `fut` > `aor` > `pr`.
pub const TENSE_RULES: &[Rule<Tense>] = &[
    rule(&["opt", "optative"], Tense::Optative),
    rule(&["imp", "imperative"], Tense::Imperative),
    rule(&["fut", "future"], Tense::Future),
    rule(&["aor", "aorist"], Tense::Aorist),
    rule(&["pr", "pres", "present"], Tense::Present),
];

pub const REFLEXIVE_RULES: &[Rule<Reflexive>] = &[rule(&["reflx", "reflexive"], Reflexive::Yes)];

/// Returns the value of the first rule (in table order) matching any token.
pub fn first_match<T: Copy>(rules: &[Rule<T>], tokens: &[&str]) -> Option<T> {
    rules
        .iter()
        .find(|rule| {
            tokens
                .iter()
                .any(|token| rule.aliases.iter().any(|alias| *alias == *token))
        })
        .map(|rule| rule.value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NominalGrammar {
    pub case: Case,
    pub gender: Gender,
    pub number: Number,
}

impl NominalGrammar {
    pub fn is_complete(&self) -> bool {
        !self.case.is_none() && !self.number.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VerbalGrammar {
    pub tense: Tense,
    pub person: Person,
    pub number: Number,
    pub reflexive: Reflexive,
}

impl VerbalGrammar {
    pub fn is_complete(&self) -> bool {
        !self.tense.is_none() && !self.person.is_none() && !self.number.is_none()
    }
}

/// Classified grammar of one generated form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grammar {
    Nominal(NominalGrammar),
    Verbal(VerbalGrammar),
}

impl Grammar {
    pub fn number(&self) -> Number {
        match self {
            Grammar::Nominal(g) => g.number,
            Grammar::Verbal(g) => g.number,
        }
    }

    /// Whether every dimension the family needs was determined.
    pub fn is_complete(&self) -> bool {
        match self {
            Grammar::Nominal(g) => g.is_complete(),
            Grammar::Verbal(g) => g.is_complete(),
        }
    }

    pub fn as_nominal(&self) -> Option<&NominalGrammar> {
        match self {
            Grammar::Nominal(g) => Some(g),
            Grammar::Verbal(_) => None,
        }
    }

    pub fn as_verbal(&self) -> Option<&VerbalGrammar> {
        match self {
            Grammar::Verbal(g) => Some(g),
            Grammar::Nominal(_) => None,
        }
    }
}

/// Classifies a nominal descriptor such as `"masc nom sg"`.
///
/// Case falls back to the row label when the descriptor names none; gender
/// falls back to the headword's part-of-speech tag.
pub fn classify_nominal(descriptor: &str, label: &str, pos: &str) -> NominalGrammar {
    let descriptor = descriptor.to_lowercase();
    let tokens: Vec<&str> = descriptor.split_whitespace().collect();

    let case = first_match(CASE_RULES, &tokens).or_else(|| {
        let label = label.to_lowercase();
        let label_tokens: Vec<&str> = label.split_whitespace().collect();
        first_match(CASE_RULES, &label_tokens)
    });

    NominalGrammar {
        case: case.unwrap_or_default(),
        gender: first_match(GENDER_RULES, &tokens).unwrap_or_else(|| gender_from_pos(pos)),
        number: first_match(NUMBER_RULES, &tokens).unwrap_or_default(),
    }
}

/// Classifies a verbal descriptor such as `"reflx opt 3rd pl"`.
pub fn classify_verbal(descriptor: &str) -> VerbalGrammar {
    let descriptor = descriptor.to_lowercase();
    let tokens: Vec<&str> = descriptor.split_whitespace().collect();

    VerbalGrammar {
        tense: first_match(TENSE_RULES, &tokens).unwrap_or_default(),
        person: first_match(PERSON_RULES, &tokens).unwrap_or_default(),
        number: first_match(NUMBER_RULES, &tokens).unwrap_or_default(),
        reflexive: first_match(REFLEXIVE_RULES, &tokens).unwrap_or_default(),
    }
}

/// Dispatches on the part-of-speech family.
pub fn classify(family: PosFamily, descriptor: &str, label: &str, pos: &str) -> Grammar {
    match family {
        PosFamily::Noun => Grammar::Nominal(classify_nominal(descriptor, label, pos)),
        PosFamily::Verb => Grammar::Verbal(classify_verbal(descriptor)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_nominal_descriptor() {
        let g = classify_nominal("masc nom sg", "nom", "masc");
        assert_eq!(g.case, Case::Nominative);
        assert_eq!(g.gender, Gender::Masculine);
        assert_eq!(g.number, Number::Singular);
        assert!(g.is_complete());
    }

    #[test]
    fn test_case_falls_back_to_label() {
        let g = classify_nominal("fem pl", "instr", "fem");
        assert_eq!(g.case, Case::Instrumental);
        assert_eq!(g.number, Number::Plural);

        let g = classify_nominal("fem pl", "", "fem");
        assert_eq!(g.case, Case::None);
        assert!(!g.is_complete());
    }

    #[test]
    fn test_gender_falls_back_to_pos() {
        assert_eq!(classify_nominal("acc sg", "", "nt").gender, Gender::Neuter);
        assert_eq!(classify_nominal("acc sg", "", "abstr").gender, Gender::None);
        // The descriptor wins over the pos tag
        assert_eq!(classify_nominal("fem acc sg", "", "masc").gender, Gender::Feminine);
    }

    #[test]
    fn test_tokens_are_whole_words() {
        let g = classify_nominal("masc gender-neutral plurals", "", "");
        assert_eq!(g.case, Case::None);
        assert_eq!(g.number, Number::None);
    }

    #[test]
    fn test_ambiguous_tense_priority() {
        assert_eq!(classify_verbal("opt pr 3rd sg").tense, Tense::Optative);
        assert_eq!(classify_verbal("pr opt 3rd sg").tense, Tense::Optative);
        assert_eq!(classify_verbal("imp pr 2nd sg").tense, Tense::Imperative);
        assert_eq!(classify_verbal("opt imp 2nd sg").tense, Tense::Optative);
        assert_eq!(classify_verbal("aor fut 3rd pl").tense, Tense::Future);
        assert_eq!(classify_verbal("pr aor 3rd pl").tense, Tense::Aorist);
    }

    #[test]
    fn test_ambiguous_number_priority() {
        assert_eq!(classify_verbal("pr 3rd pl sg").number, Number::Singular);
    }

    #[test]
    fn test_verbal_descriptor() {
        let g = classify_verbal("REFLX Pr 1st Pl");
        assert_eq!(g.tense, Tense::Present);
        assert_eq!(g.person, Person::First);
        assert_eq!(g.number, Number::Plural);
        assert_eq!(g.reflexive, Reflexive::Yes);

        let g = classify_verbal("");
        assert_eq!(g, VerbalGrammar::default());
    }

    #[test]
    fn test_dispatch() {
        match classify(PosFamily::Verb, "fut 2nd sg", "", "pr") {
            Grammar::Verbal(g) => assert_eq!(g.tense, Tense::Future),
            other => panic!("expected verbal grammar, got {:?}", other),
        }
        assert!(classify(PosFamily::Noun, "nt loc pl", "", "nt").as_nominal().is_some());
    }

    proptest! {
        #[test]
        fn test_classification_is_deterministic(descriptor in "[a-z0-9 ]{0,24}", label in "[a-z ]{0,8}") {
            let first = classify_nominal(&descriptor, &label, "masc");
            let second = classify_nominal(&descriptor, &label, "masc");
            prop_assert_eq!(first, second);
            prop_assert_eq!(classify_verbal(&descriptor), classify_verbal(&descriptor));
        }
    }
}
