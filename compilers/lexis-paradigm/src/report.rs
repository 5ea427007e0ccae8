//! Plain-text irregularity report for manual review.

use std::fmt::{self, Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use lexis_protocol::Irregularity;
use thiserror::Error;

use crate::validate::{InflectionValidator, NounFinding, VerbFinding};

/// Missing combinations listed per lemma before the rest is summarised.
const MAX_LISTED: usize = 10;

#[derive(Debug, Error)]
#[error("failed to write validation report {path}: {source}")]
pub struct ReportError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

pub struct ValidationReport<'a> {
    validator: &'a InflectionValidator,
    /// Seconds since the Unix epoch.
    generated_at: u64,
}

impl<'a> ValidationReport<'a> {
    pub fn new(validator: &'a InflectionValidator, generated_at: u64) -> Self {
        Self {
            validator,
            generated_at,
        }
    }

    /// Report stamped with the current time.
    pub fn now(validator: &'a InflectionValidator) -> Self {
        let generated_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self::new(validator, generated_at)
    }

    pub fn file_name(&self) -> String {
        format!("inflection_validation_{}.log", self.generated_at)
    }

    /// Writes the report into `dir`, creating it if needed.
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf, ReportError> {
        let path = dir.join(self.file_name());
        fs::create_dir_all(dir)
            .and_then(|()| fs::write(&path, self.to_string()))
            .map_err(|source| ReportError {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}

fn rule(f: &mut Formatter<'_>, ch: char, width: usize) -> fmt::Result {
    writeln!(f, "{}", ch.to_string().repeat(width))
}

fn banner(f: &mut Formatter<'_>, title: &str) -> fmt::Result {
    rule(f, '=', 60)?;
    writeln!(f, "{title}")?;
    rule(f, '=', 60)?;
    writeln!(f)
}

fn heading(f: &mut Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "{title}")?;
    rule(f, '-', 40)
}

fn truncated(items: &[String]) -> String {
    let mut listed = items.iter().take(MAX_LISTED).cloned().collect::<Vec<_>>().join(", ");
    if items.len() > MAX_LISTED {
        listed.push_str(&format!(" ... (+{} more)", items.len() - MAX_LISTED));
    }
    listed
}

fn noun_combos(finding: &NounFinding) -> Vec<String> {
    finding
        .missing_combos
        .iter()
        .map(|(case, number)| format!("{}_{}", case.abbreviation(), number.abbreviation()))
        .collect()
}

fn verb_combos(finding: &VerbFinding) -> Vec<String> {
    finding
        .missing_combos
        .iter()
        .map(|(tense, person, number)| {
            format!("{}_{}_{}", tense.abbreviation(), person.abbreviation(), number.abbreviation())
        })
        .collect()
}

impl ValidationReport<'_> {
    fn write_nouns(&self, f: &mut Formatter<'_>) -> fmt::Result {
        banner(f, "=== NOUN IRREGULARITIES ===")?;
        let findings = &self.validator.noun_findings;

        let plural_only: Vec<_> = findings
            .iter()
            .filter(|i| i.flags.contains(Irregularity::PLURAL_ONLY))
            .collect();
        let singular_only: Vec<_> = findings
            .iter()
            .filter(|i| i.flags.contains(Irregularity::SINGULAR_ONLY))
            .collect();
        let missing: Vec<_> = findings.iter().filter(|i| i.has_missing_forms()).collect();

        if !plural_only.is_empty() {
            heading(f, "PLURAL-ONLY (pattern ends in 'pl'):")?;
            for irr in &plural_only {
                if irr.plural_matches.is_empty() {
                    writeln!(f, "  {} - \"{}\" - no other forms with same stem", irr.lemma, irr.pattern)?;
                } else {
                    let matches = irr
                        .plural_matches
                        .iter()
                        .map(|m| format!("{} ({:.0}%)", m.lemma, m.ratio * 100.0))
                        .collect::<Vec<_>>()
                        .join(", ");
                    writeln!(f, "  {} - \"{}\" - {}", irr.lemma, irr.pattern, matches)?;
                }
            }
            writeln!(f, "\nTotal: {} nouns\n", plural_only.len())?;
        }

        if !singular_only.is_empty() {
            heading(f, "SINGULAR-ONLY (no plural forms in template):")?;
            for irr in &singular_only {
                writeln!(f, "  {} - \"{}\" - lacks plural declensions", irr.lemma, irr.pattern)?;
            }
            writeln!(f, "\nTotal: {} nouns\n", singular_only.len())?;
        }

        if !missing.is_empty() {
            heading(f, "MISSING FORMS:")?;
            for irr in &missing {
                writeln!(
                    f,
                    "  {} - \"{}\" - missing: [{}]",
                    irr.lemma,
                    irr.pattern,
                    truncated(&noun_combos(irr))
                )?;
            }
            writeln!(f, "\nTotal: {} nouns with missing forms\n", missing.len())?;
        }

        if plural_only.is_empty() && singular_only.is_empty() && missing.is_empty() {
            writeln!(f, "No noun irregularities found.\n")?;
        }
        Ok(())
    }

    fn write_verbs(&self, f: &mut Formatter<'_>) -> fmt::Result {
        banner(f, "=== VERB IRREGULARITIES ===")?;
        let findings = &self.validator.verb_findings;
        let with = |flag: Irregularity| {
            findings
                .iter()
                .filter(|i| i.flags.contains(flag))
                .collect::<Vec<_>>()
        };

        let unusual = with(Irregularity::UNUSUAL_TENSE);
        let missing_tenses = with(Irregularity::MISSING_TENSE);
        let impersonal = with(Irregularity::IMPERSONAL);
        let defective = with(Irregularity::DEFECTIVE_PERSONS);
        let incomplete: Vec<_> = findings.iter().filter(|i| i.is_incomplete()).collect();

        if !unusual.is_empty() {
            heading(f, "UNUSUAL TENSES:")?;
            for irr in &unusual {
                let tenses: Vec<_> = irr.unusual_tenses.iter().map(|t| t.abbreviation()).collect();
                writeln!(
                    f,
                    "  {} - \"{}\" - has {} tense (unexpected for pr pattern)",
                    irr.lemma,
                    irr.pattern,
                    tenses.join(", ")
                )?;
            }
            writeln!(f, "\nTotal: {} verbs with unusual tenses\n", unusual.len())?;
        }

        if !missing_tenses.is_empty() {
            heading(f, "MISSING TENSES:")?;
            for irr in &missing_tenses {
                let tenses: Vec<_> = irr.missing_tenses.iter().map(|t| t.abbreviation()).collect();
                writeln!(f, "  {} - \"{}\" - missing tenses: [{}]", irr.lemma, irr.pattern, tenses.join(", "))?;
            }
            writeln!(f, "\nTotal: {} verbs with missing tenses\n", missing_tenses.len())?;
        }

        if !impersonal.is_empty() {
            heading(f, "IMPERSONAL (3rd person only):")?;
            for irr in &impersonal {
                writeln!(f, "  {} - \"{}\" - only has 3rd person forms", irr.lemma, irr.pattern)?;
            }
            writeln!(f, "\nTotal: {} impersonal verbs\n", impersonal.len())?;
        }

        if !defective.is_empty() {
            heading(f, "DEFECTIVE PERSONS (missing some persons in certain tenses):")?;
            for irr in &defective {
                for (tense, persons) in &irr.defective_persons {
                    let persons: Vec<_> = persons.iter().map(|p| p.abbreviation()).collect();
                    writeln!(
                        f,
                        "  {} - \"{}\" - {}: missing [{}]",
                        irr.lemma,
                        irr.pattern,
                        tense.abbreviation(),
                        persons.join(", ")
                    )?;
                }
            }
            writeln!(f, "\nTotal: {} verbs with defective persons\n", defective.len())?;
        }

        if !incomplete.is_empty() {
            heading(f, "INCOMPLETE CONJUGATIONS:")?;
            for irr in &incomplete {
                writeln!(
                    f,
                    "  {} - \"{}\" - missing: [{}]",
                    irr.lemma,
                    irr.pattern,
                    truncated(&verb_combos(irr))
                )?;
            }
            writeln!(f, "\nTotal: {} verbs with incomplete conjugations\n", incomplete.len())?;
        }

        if unusual.is_empty()
            && missing_tenses.is_empty()
            && impersonal.is_empty()
            && defective.is_empty()
            && incomplete.is_empty()
        {
            writeln!(f, "No verb irregularities found.\n")?;
        }
        Ok(())
    }
}

impl Display for ValidationReport<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        rule(f, '=', 60)?;
        writeln!(f, "INFLECTION VALIDATION REPORT")?;
        writeln!(f, "Generated: {} (unix seconds)", self.generated_at)?;
        rule(f, '=', 60)?;
        writeln!(f)?;

        let v = self.validator;
        writeln!(f, "=== SUMMARY ===")?;
        writeln!(f, "Nouns validated: {}", v.nouns_validated)?;
        writeln!(f, "Nouns with irregularities: {}", v.noun_findings.len())?;
        writeln!(f, "Verbs validated: {}", v.verbs_validated)?;
        writeln!(f, "Verbs with irregularities: {}\n", v.verb_findings.len())?;

        self.write_nouns(f)?;
        self.write_verbs(f)
    }
}
