//! Reader for the source's pre-rendered inflection tables.
//!
//! Irregular paradigms are not expressible as stem + ending templates, so
//! their forms are read verbatim from the markup. Each `<td title='...'>`
//! cell names its grammar in the title; each line of the cell holds one
//! variant as `stem<b>ending</b>`. Gray lines are forms the corpus does not
//! attest and are dropped.
//!
//! The reader is total: anything it cannot read is skipped.

pub mod parser;

use lexis_morph::classifier::{classify_nominal, classify_verbal, NominalGrammar, VerbalGrammar};
use lexis_protocol::{Case, Person, Tense};

use crate::parser::{line_form, parse_cells, split_lines};

/// Title of the compounding-only cell.
pub const IN_COMPS_TITLE: &str = "in comps";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupCell {
    pub title: String,
    /// Variants in display order; the index is the variant ordinal.
    pub forms: Vec<String>,
}

/// One readable form with the grammar of its cell title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupForm<G> {
    pub grammar: G,
    pub ordinal: usize,
    pub form: String,
}

/// Extracts every cell that yields at least one form.
///
/// A title seen twice keeps its first position but takes the later forms.
pub fn parse_inflection_markup(markup: &str) -> Vec<MarkupCell> {
    let mut cells: Vec<MarkupCell> = Vec::new();

    for raw in parse_cells(markup) {
        if raw.content.trim().is_empty() || raw.title == IN_COMPS_TITLE {
            continue;
        }

        let forms: Vec<String> = split_lines(raw.content)
            .into_iter()
            .filter_map(line_form)
            .collect();
        if forms.is_empty() {
            continue;
        }

        match cells.iter_mut().find(|cell| cell.title == raw.title) {
            Some(existing) => existing.forms = forms,
            None => cells.push(MarkupCell {
                title: raw.title.to_string(),
                forms,
            }),
        }
    }

    cells
}

/// Nominal forms of the markup; cells whose title names no case are dropped.
pub fn nominal_forms(markup: &str) -> Vec<MarkupForm<NominalGrammar>> {
    let mut out = Vec::new();
    for cell in parse_inflection_markup(markup) {
        let grammar = classify_nominal(&cell.title, "", "");
        if grammar.case == Case::None {
            continue;
        }
        out.extend(cell.forms.into_iter().enumerate().map(|(ordinal, form)| MarkupForm {
            grammar,
            ordinal,
            form,
        }));
    }
    out
}

/// Verbal forms of the markup; cells without tense or person are dropped.
///
/// Titles go through the template rule tables, so a title naming two tenses
/// resolves to the higher of opt > imp > fut > aor > pr.
pub fn verbal_forms(markup: &str) -> Vec<MarkupForm<VerbalGrammar>> {
    let mut out = Vec::new();
    for cell in parse_inflection_markup(markup) {
        let grammar = classify_verbal(&cell.title);
        if grammar.tense == Tense::None || grammar.person == Person::None {
            continue;
        }
        out.extend(cell.forms.into_iter().enumerate().map(|(ordinal, form)| MarkupForm {
            grammar,
            ordinal,
            form,
        }));
    }
    out
}
