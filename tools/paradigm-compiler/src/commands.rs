//! Subcommand bodies, kept out of `main` so the integration tests can drive them.

use std::path::PathBuf;

use anyhow::Context;
use lexis_morph::attestation::AttestedWords;
use lexis_morph::codec::{CodecError, NominalKey, VerbalKey};
use lexis_paradigm::ValidationReport;
use lexis_protocol::{FormId, HeadwordRecord, LemmaId, PosFamily};
use lexis_registry::{LemmaRegistry, RegistryFile, SaveOutcome};
use tracing::{info, warn};

use crate::config::Config;
use crate::output::write_dataset;
use crate::pipeline::{Compilation, ParadigmCompiler};
use crate::selection::Selector;
use crate::source::{HeadwordSource, JsonLinesSource};

/// What a `build` run left on disk.
#[derive(Debug)]
pub struct BuildOutcome {
    pub compilation: Compilation,
    pub registry: SaveOutcome,
    pub dataset_bytes: usize,
    pub report: PathBuf,
}

fn registry_file(config: &Config) -> RegistryFile {
    RegistryFile::new(&config.paths.registry).with_ranges(config.ranges())
}

fn log_registry_growth(registry: &LemmaRegistry, original: &LemmaRegistry) {
    for family in [PosFamily::Noun, PosFamily::Verb] {
        info!(
            "Registry {}s: {} (+{})",
            family,
            registry.len(family),
            registry.len(family) - original.len(family)
        );
    }
}

/// Assigns identities to every registrable lemma of the source, most
/// frequent first. Existing identities are never touched.
pub fn populate_registry(config: &Config) -> anyhow::Result<SaveOutcome> {
    let records = JsonLinesSource::new(&config.paths.source).headwords()?;
    populate_registry_from(config, &records)
}

pub fn populate_registry_from(config: &Config, records: &[HeadwordRecord]) -> anyhow::Result<SaveOutcome> {
    let file = registry_file(config);
    let mut registry = file.load()?;
    let original = registry.clone();

    if !registry.is_empty() {
        warn!(
            "Registry already holds {} nouns and {} verbs; only new lemmas are added",
            registry.len(PosFamily::Noun),
            registry.len(PosFamily::Verb)
        );
    }

    let selector = Selector::new(&config.selection);
    for family in [PosFamily::Noun, PosFamily::Verb] {
        let candidates = selector.registry_candidates(family, records);
        let added = registry.populate(family, candidates)?;
        info!("Added {} new {} lemmas", added, family);
    }

    let outcome = file.save(&registry, &original)?;
    log_registry_growth(&registry, &original);
    Ok(outcome)
}

/// Full rebuild from the configured source.
pub fn build(config: &Config) -> anyhow::Result<BuildOutcome> {
    let records = JsonLinesSource::new(&config.paths.source).headwords()?;
    build_from(config, &records)
}

/// The registry is persisted before the dataset, so a dataset on disk never
/// references identities the registry does not know.
pub fn build_from(config: &Config, records: &[HeadwordRecord]) -> anyhow::Result<BuildOutcome> {
    let (words, load) = AttestedWords::load(&config.paths.wordlist_dir, &config.paths.wordlists)?;
    if !load.missing.is_empty() {
        warn!("{} wordlists missing, attestation uses a smaller corpus", load.missing.len());
    }

    let file = registry_file(config);
    let mut registry = file.load()?;
    let original = registry.clone();

    let compilation = ParadigmCompiler::new(config, &words).compile(records, &mut registry)?;

    let registry_outcome = file.save(&registry, &original)?;
    match &registry_outcome {
        SaveOutcome::Unchanged => info!("No new lemmas added to registry (unchanged)"),
        SaveOutcome::Written { .. } => log_registry_growth(&registry, &original),
    }

    let dataset_bytes = write_dataset(&config.paths.output, &compilation.dataset)
        .with_context(|| format!("failed to write dataset {}", config.paths.output.display()))?;
    info!("Dataset written to {} ({} bytes)", config.paths.output.display(), dataset_bytes);

    let report = ValidationReport::now(&compilation.validator).write_to_dir(&config.paths.report_dir)?;
    info!("Inflection validation report: {}", report.display());

    compilation.log_summary();

    Ok(BuildOutcome {
        compilation,
        registry: registry_outcome,
        dataset_bytes,
        report,
    })
}

/// Human-readable reading of a form id, e.g.
/// `lemma 12345 (buddha): nom masc sg, variant 1`.
pub fn describe_form_id(
    family: PosFamily,
    form_id: FormId,
    registry: Option<&LemmaRegistry>,
) -> Result<String, CodecError> {
    let (lemma_id, grammar, ordinal) = match family {
        PosFamily::Noun => {
            let key = NominalKey::decode(form_id)?;
            let grammar = format!(
                "{} {} {}",
                key.case.abbreviation(),
                key.gender.abbreviation(),
                key.number.abbreviation()
            );
            (key.lemma_id, grammar, key.ordinal)
        }
        PosFamily::Verb => {
            let key = VerbalKey::decode(form_id)?;
            let mut grammar = format!(
                "{} {} {}",
                key.tense.abbreviation(),
                key.person.abbreviation(),
                key.number.abbreviation()
            );
            if key.reflexive.is_reflexive() {
                grammar.insert_str(0, "reflx ");
            }
            (key.lemma_id, grammar, key.ordinal)
        }
    };

    let lemma = registry
        .and_then(|registry| lemma_text(registry, family, lemma_id))
        .map(|text| format!(" ({text})"))
        .unwrap_or_default();
    Ok(format!("lemma {lemma_id}{lemma}: {grammar}, variant {}", ordinal + 1))
}

fn lemma_text(registry: &LemmaRegistry, family: PosFamily, lemma_id: LemmaId) -> Option<String> {
    registry
        .entries(family)
        .find(|(_, id)| *id == lemma_id)
        .map(|(text, _)| text.to_string())
}

/// Registry used to name lemmas in `decode`; absent or unreadable is fine.
pub fn load_registry_for_lookup(config: &Config) -> Option<LemmaRegistry> {
    if !config.paths.registry.exists() {
        return None;
    }
    match registry_file(config).load() {
        Ok(registry) => Some(registry),
        Err(err) => {
            warn!("Cannot read registry for lemma names: {err}");
            None
        }
    }
}
