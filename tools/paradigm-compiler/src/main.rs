use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use lexis_protocol::{FormId, PosFamily};
use paradigm_compiler::commands::load_registry_for_lookup;
use paradigm_compiler::{build, describe_form_id, populate_registry, Config};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Compiles headword paradigms into the rkyv training dataset")]
struct Cli {
    /// TOML configuration; built-in defaults when omitted
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register every lemma of the source, most frequent first (run once, commit the result)
    PopulateRegistry {
        #[arg(long, value_name = "FILE")]
        source: Option<PathBuf>,
        #[arg(long, value_name = "FILE")]
        registry: Option<PathBuf>,
    },
    /// Rebuild the dataset from the top noun and verb lemmas
    Build {
        #[arg(long, value_name = "FILE")]
        source: Option<PathBuf>,
        #[arg(long, value_name = "FILE")]
        registry: Option<PathBuf>,
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Number of distinct noun lemmas
        #[arg(long)]
        nouns: Option<usize>,
        /// Number of distinct verb lemmas
        #[arg(long)]
        verbs: Option<usize>,
    },
    /// Print the grammatical reading of a form id
    Decode {
        form_id: u64,
        #[arg(long, value_enum)]
        family: Family,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Family {
    Noun,
    Verb,
}

impl From<Family> for PosFamily {
    fn from(family: Family) -> Self {
        match family {
            Family::Noun => PosFamily::Noun,
            Family::Verb => PosFamily::Verb,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::PopulateRegistry { source, registry } => {
            if let Some(source) = source {
                config.paths.source = source;
            }
            if let Some(registry) = registry {
                config.paths.registry = registry;
            }
            populate_registry(&config)?;
        }
        Command::Build {
            source,
            registry,
            output,
            nouns,
            verbs,
        } => {
            if let Some(source) = source {
                config.paths.source = source;
            }
            if let Some(registry) = registry {
                config.paths.registry = registry;
            }
            if let Some(output) = output {
                config.paths.output = output;
            }
            if let Some(nouns) = nouns {
                config.selection.noun_limit = nouns;
            }
            if let Some(verbs) = verbs {
                config.selection.verb_limit = verbs;
            }
            build(&config)?;
        }
        Command::Decode { form_id, family } => {
            let registry = load_registry_for_lookup(&config);
            let reading = describe_form_id(family.into(), FormId(form_id), registry.as_ref())?;
            println!("{reading}");
        }
    }

    Ok(())
}
