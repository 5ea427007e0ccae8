use std::fs;
use std::path::Path;

use lexis_morph::codec::NominalKey;
use lexis_protocol::{Case, HeadwordRecord, LemmaId, Number, PosFamily};
use lexis_registry::{RegistryFile, SaveOutcome};
use paradigm_compiler::{build_from, populate_registry_from, read_dataset, Config};
use tempfile::TempDir;

const A_MASC: &str = r#"[["", "masc sg", "", "masc pl", ""],
    ["nom", ["o"], "masc nom sg", ["ā"], "masc nom pl"],
    ["acc", ["aṃ"], "masc acc sg", ["e"], "masc acc pl"],
    ["in comps", ["a"], "", [], ""]]"#;

// No nominative singular row
const DEFECTIVE: &str = r#"[["", "masc sg", ""],
    ["acc", ["aṃ"], "masc acc sg"]]"#;

const A_MASC_PL: &str = r#"[["", "masc pl", ""],
    ["nom", ["ā"], "masc nom pl"],
    ["acc", ["e"], "masc acc pl"]]"#;

const ATI_PR: &str = r#"[["", "sg", "", "pl", ""],
    ["pr 3rd", ["ati"], "pr 3rd sg", ["anti"], "pr 3rd pl"],
    ["opt 3rd", ["eyya"], "opt 3rd sg", ["eyyuṃ"], "opt 3rd pl"]]"#;

fn noun(id: u32, lemma: &str, stem: &str, pattern: &str, frequency: u32, template: &str) -> HeadwordRecord {
    HeadwordRecord {
        id,
        lemma_1: lemma.to_string(),
        lemma_clean: lemma.split(' ').next().unwrap_or(lemma).to_string(),
        pos: "masc".to_string(),
        stem: Some(stem.to_string()),
        pattern: Some(pattern.to_string()),
        ebt_count: frequency,
        meaning: "a gloss".to_string(),
        template: Some(template.to_string()),
        source_1: "SN56.11".to_string(),
        sutta_1: "dhammacakkappavattanasutta".to_string(),
        ..HeadwordRecord::default()
    }
}

fn verb(id: u32, lemma: &str, stem: &str, frequency: u32) -> HeadwordRecord {
    HeadwordRecord {
        pos: "pr".to_string(),
        ..noun(id, lemma, stem, "ati pr", frequency, ATI_PR)
    }
}

fn source() -> Vec<HeadwordRecord> {
    vec![
        noun(1, "buddha", "buddh", "a masc", 500, A_MASC),
        noun(2, "dhamma 1", "dhamm", "a masc", 400, A_MASC),
        noun(3, "dhamma 2", "dhamm", "a masc", 10, A_MASC),
        noun(4, "kāma", "kām", "a masc", 300, DEFECTIVE),
        noun(5, "manussa", "manuss", "a masc pl", 200, A_MASC_PL),
        verb(6, "bhavati", "bhav", 900),
        verb(7, "gacchati", "gacch", 800),
    ]
}

fn setup(dir: &Path) -> Config {
    let wordlists = dir.join("frequency");
    fs::create_dir_all(&wordlists).unwrap();
    fs::write(
        wordlists.join("cst_wordlist.json"),
        r#"["buddho", "buddhā", "dhammo", "dhamme", "manussā", "bhavati", "bhaveyya", "gacchanti"]"#,
    )
    .unwrap();

    let mut config = Config::default();
    config.paths.registry = dir.join("lemma_registry.json");
    config.paths.output = dir.join("out").join("training.rkyv");
    config.paths.report_dir = dir.join("out");
    config.paths.wordlist_dir = wordlists;
    config
}

#[test]
fn test_build_end_to_end() {
    let dir = TempDir::new().unwrap();
    let config = setup(dir.path());

    let outcome = build_from(&config, &source()).unwrap();
    assert!(matches!(outcome.registry, SaveOutcome::Written { backup: None }));
    assert!(outcome.report.exists());

    let dataset = read_dataset(&config.paths.output).unwrap();
    assert_eq!(dataset, outcome.compilation.dataset);

    // kāma lacks a nominative singular; manussa is plural-only and kept
    let lemmas: Vec<&str> = dataset.nouns.iter().map(|n| n.lemma.as_str()).collect();
    assert_eq!(lemmas, vec!["buddha", "dhamma", "manussa", "dhamma"]);
    assert_eq!(outcome.compilation.nouns.discarded, vec!["kāma".to_string()]);
    assert!(dataset.nouns.iter().find(|n| n.lemma == "manussa").unwrap().plural_only);

    assert_eq!(dataset.nouns[0].citations[0].source, "SN56.11");

    // Both senses of dhamma share one identity
    assert_eq!(dataset.nouns[1].lemma_id, dataset.nouns[3].lemma_id);
    assert_eq!(dataset.nouns[1].variant, "1");

    // Only attested surfaces are encoded: buddho, buddhā, dhammo, dhamme, manussā
    assert_eq!(dataset.noun_forms.len(), 5);
    let buddho = NominalKey::decode(dataset.noun_forms[0]).unwrap();
    assert_eq!(buddho.lemma_id, LemmaId(10_001));
    assert_eq!((buddho.case, buddho.number), (Case::Nominative, Number::Singular));

    // bhavati, bhaveyya, gacchanti
    assert_eq!(dataset.verb_forms.len(), 3);
    assert_eq!(dataset.nonreflexive_verbs, vec![LemmaId(70_001), LemmaId(70_002)]);
}

#[test]
fn test_rebuild_keeps_identities() {
    let dir = TempDir::new().unwrap();
    let config = setup(dir.path());

    build_from(&config, &source()).unwrap();
    let first = fs::read(&config.paths.registry).unwrap();

    let second = build_from(&config, &source()).unwrap();
    assert_eq!(second.registry, SaveOutcome::Unchanged);
    assert_eq!(fs::read(&config.paths.registry).unwrap(), first);

    // A new, more frequent lemma still gets the next watermark
    let mut grown = source();
    grown.push(noun(8, "citta", "citt", "a masc", 10_000, A_MASC));
    let third = build_from(&config, &grown).unwrap();
    assert!(matches!(third.registry, SaveOutcome::Written { backup: Some(_) }));

    let registry = RegistryFile::new(&config.paths.registry).load().unwrap();
    assert_eq!(registry.get(PosFamily::Noun, "buddha"), Some(LemmaId(10_001)));
    assert_eq!(registry.get(PosFamily::Noun, "citta"), Some(LemmaId(10_005)));
}

#[test]
fn test_populate_then_build() {
    let dir = TempDir::new().unwrap();
    let config = setup(dir.path());

    let mut records = source();
    // Registered by the population pass, never selected for training
    let mut abstract_noun = noun(9, "sukha", "sukh", "a nt", 1_000, A_MASC);
    abstract_noun.pos = "abstr".to_string();
    records.push(abstract_noun);

    populate_registry_from(&config, &records).unwrap();
    let registry = RegistryFile::new(&config.paths.registry).load().unwrap();
    assert_eq!(registry.get(PosFamily::Noun, "sukha"), Some(LemmaId(10_001)));
    assert_eq!(registry.get(PosFamily::Noun, "buddha"), Some(LemmaId(10_002)));
    assert_eq!(registry.get(PosFamily::Verb, "bhavati"), Some(LemmaId(70_001)));

    // Population is idempotent
    assert_eq!(populate_registry_from(&config, &records).unwrap(), SaveOutcome::Unchanged);

    let outcome = build_from(&config, &records).unwrap();
    assert_eq!(outcome.registry, SaveOutcome::Unchanged);
    assert_eq!(outcome.compilation.dataset.nouns[0].lemma_id, LemmaId(10_002));
}
