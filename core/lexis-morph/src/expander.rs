use lexis_protocol::PosFamily;

use crate::classifier::{classify, Grammar};
use crate::template::InflectionTemplate;

/// Ending value standing for the bare stem.
pub const BARE_STEM: &str = "-";

/// A candidate surface form produced from one template cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedForm {
    pub surface: String,
    pub grammar: Grammar,
    /// 0-based position of the ending inside its cell.
    pub ordinal: usize,
    pub attested: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpansionStats {
    pub generated: usize,
    /// Forms whose grammar could not be fully determined.
    pub unclassified: usize,
}

impl std::ops::AddAssign for ExpansionStats {
    fn add_assign(&mut self, other: Self) {
        self.generated += other.generated;
        self.unclassified += other.unclassified;
    }
}

#[derive(Debug, Clone, Default)]
pub struct Expansion {
    pub forms: Vec<GeneratedForm>,
    pub stats: ExpansionStats,
}

/// Expands templates of one part-of-speech family.
#[derive(Debug, Clone, Copy)]
pub struct TemplateExpander<'a> {
    family: PosFamily,
    pos: &'a str,
}

impl<'a> TemplateExpander<'a> {
    /// `pos` is the headword's source tag; nominal gender falls back to it.
    pub fn new(family: PosFamily, pos: &'a str) -> Self {
        Self { family, pos }
    }

    pub fn expand(&self, template: &InflectionTemplate, stem: &str) -> Expansion {
        let mut expansion = Expansion::default();

        for (label, cells) in template.paradigm_rows() {
            for cell in cells {
                let grammar = classify(self.family, &cell.descriptor, label, self.pos);

                for (ordinal, ending) in cell.endings.iter().enumerate() {
                    if ending.is_empty() {
                        continue;
                    }

                    let surface = if ending == BARE_STEM {
                        stem.to_string()
                    } else {
                        format!("{}{}", stem, ending)
                    };

                    expansion.stats.generated += 1;
                    if !grammar.is_complete() {
                        expansion.stats.unclassified += 1;
                    }

                    expansion.forms.push(GeneratedForm {
                        surface,
                        grammar,
                        ordinal,
                        attested: false,
                    });
                }
            }
        }

        expansion
    }
}

/// Strips the source's marker characters (`!`, `*`) from a raw stem.
pub fn clean_stem(stem: &str) -> String {
    stem.chars().filter(|c| !matches!(c, '!' | '*')).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{TemplateCell, TemplateRow};
    use lexis_protocol::{Case, Gender, Number, Person, Tense};

    fn cell(endings: &[&str], descriptor: &str) -> TemplateCell {
        TemplateCell {
            endings: endings.iter().map(|e| e.to_string()).collect(),
            descriptor: descriptor.to_string(),
        }
    }

    #[test]
    fn test_buddho() {
        let template = InflectionTemplate::new(vec![TemplateRow::Paradigm {
            label: "nom sg".to_string(),
            cells: vec![cell(&["o"], "masc nom sg")],
        }]);

        let expansion = TemplateExpander::new(PosFamily::Noun, "masc").expand(&template, "buddh");
        assert_eq!(expansion.forms.len(), 1);

        let form = &expansion.forms[0];
        assert_eq!(form.surface, "buddho");
        assert_eq!(form.ordinal, 0);
        let g = form.grammar.as_nominal().unwrap();
        assert_eq!(g.case, Case::Nominative);
        assert_eq!(g.gender, Gender::Masculine);
        assert_eq!(g.number, Number::Singular);
    }

    #[test]
    fn test_variant_ordinals_and_bare_stem() {
        let template = InflectionTemplate::new(vec![TemplateRow::Paradigm {
            label: "voc".to_string(),
            cells: vec![cell(&["-", "", "e"], "masc voc sg")],
        }]);

        let expansion = TemplateExpander::new(PosFamily::Noun, "masc").expand(&template, "bhikkhu");
        let forms: Vec<_> = expansion
            .forms
            .iter()
            .map(|f| (f.surface.as_str(), f.ordinal))
            .collect();
        // The empty alternative keeps its position
        assert_eq!(forms, vec![("bhikkhu", 0), ("bhikkhue", 2)]);
        assert_eq!(expansion.stats.generated, 2);
        assert_eq!(expansion.stats.unclassified, 0);
    }

    #[test]
    fn test_non_paradigmatic_rows_are_excluded() {
        let template = InflectionTemplate::new(vec![
            TemplateRow::Paradigm {
                label: "nom".to_string(),
                cells: vec![cell(&["aṃ"], "nt nom sg")],
            },
            TemplateRow::NonParadigmatic {
                label: "in comps".to_string(),
            },
        ]);

        let expansion = TemplateExpander::new(PosFamily::Noun, "nt").expand(&template, "citt");
        assert_eq!(expansion.forms.len(), 1);
    }

    #[test]
    fn test_verbal_expansion_tracks_unclassified() {
        let template = InflectionTemplate::new(vec![TemplateRow::Paradigm {
            label: "pr".to_string(),
            cells: vec![cell(&["ati"], "pr 3rd sg"), cell(&["anti"], "3rd pl")],
        }]);

        let expansion = TemplateExpander::new(PosFamily::Verb, "pr").expand(&template, "gacch");
        assert_eq!(expansion.stats.generated, 2);
        assert_eq!(expansion.stats.unclassified, 1);

        let g = expansion.forms[0].grammar.as_verbal().unwrap();
        assert_eq!(g.tense, Tense::Present);
        assert_eq!(g.person, Person::Third);
    }

    #[test]
    fn test_clean_stem() {
        assert_eq!(clean_stem("buddh!"), "buddh");
        assert_eq!(clean_stem("*gacch"), "gacch");
        assert_eq!(clean_stem(""), "");
    }
}
