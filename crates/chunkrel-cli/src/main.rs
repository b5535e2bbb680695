//! chunkrel CLI - Command-line interface
//!
//! Usage:
//!   chunkrel chunk <corpus.jsonl>
//!   chunkrel extract <corpus.jsonl>
//!   chunkrel evaluate <corpus.jsonl> [--ignore-case] [--holdout 0.2]
//!   chunkrel word-at <corpus.jsonl> --offset 12 [--tolerance 2]
//!   chunkrel check-grammar

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use chunkrel_core::{AppConfig, LoggingConfig};
use chunkrel_extractor::metrics::{AggregateMetrics, Evaluator};
use chunkrel_extractor::{corpus, navigator};
use chunkrel_extractor::{ExtractionPipeline, Grammar};

#[derive(Parser)]
#[command(name = "chunkrel")]
#[command(about = "Grammar-driven phrase chunking and relation extraction")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true, default_value = "config/chunkrel.toml")]
    config: PathBuf,

    /// Override the number of grammar passes
    #[arg(long, global = true)]
    passes: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the chunk tree of every sentence
    Chunk {
        /// Pre-tagged corpus (JSON Lines)
        input: PathBuf,
    },
    /// Print extracted relations, one JSON object per sentence
    Extract {
        /// Pre-tagged corpus (JSON Lines)
        input: PathBuf,
    },
    /// Score extracted relations against gold annotations
    Evaluate {
        /// Annotated corpus (JSON Lines)
        input: PathBuf,

        /// Compare case-insensitively
        #[arg(long)]
        ignore_case: bool,

        /// Only score the trailing fraction of the corpus
        #[arg(long)]
        holdout: Option<f32>,
    },
    /// Map a character offset to a word index and tree path per sentence
    WordAt {
        /// Pre-tagged corpus (JSON Lines)
        input: PathBuf,

        /// Character offset into the reconstructed sentence text
        #[arg(long)]
        offset: usize,

        /// Accepted distance between the offset and a word start
        #[arg(long, default_value_t = 0)]
        tolerance: usize,
    },
    /// Compile the configured grammar and print its rules
    CheckGrammar,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)?;
    if let Some(passes) = cli.passes {
        config.grammar.passes = passes;
    }
    init_tracing(&config.logging);

    match cli.command {
        Commands::Chunk { input } => {
            let pipeline = ExtractionPipeline::from_config(&config)?;
            for sentence in corpus::load_jsonl(&input)? {
                let tree = pipeline.chunk(&sentence.tokens)?;
                println!("{}", tree);
            }
        }
        Commands::Extract { input } => {
            let pipeline = ExtractionPipeline::from_config(&config)?;
            let sentences = corpus::load_jsonl(&input)?;
            tracing::info!(sentences = sentences.len(), "Extracting relations");
            for sentence in sentences {
                let analysis = pipeline.analyze(&sentence.tokens)?;
                let line = serde_json::json!({
                    "text": sentence.text,
                    "relations": analysis.relations,
                });
                println!("{}", line);
            }
        }
        Commands::Evaluate {
            input,
            ignore_case,
            holdout,
        } => {
            let pipeline = ExtractionPipeline::from_config(&config)?;
            let mut sentences = corpus::load_jsonl(&input)?;
            if let Some(fraction) = holdout {
                let (_, test) = corpus::split(sentences, 1.0 - fraction);
                sentences = test;
            }
            tracing::info!(sentences = sentences.len(), "Evaluating relations");

            let evaluator = if ignore_case {
                Evaluator::new().ignore_case().normalize_whitespace()
            } else {
                Evaluator::new().normalize_whitespace()
            };
            let mut aggregate = AggregateMetrics::default();
            for sentence in &sentences {
                let analysis = pipeline.analyze(&sentence.tokens)?;
                aggregate.add_relation_metrics(
                    &evaluator.evaluate_relations(&analysis.relations, &sentence.relations),
                );
                aggregate
                    .count_unresolved(&analysis.relations, &config.extractor.relative_pronoun);
            }
            print!("{}", aggregate.report());
        }
        Commands::WordAt {
            input,
            offset,
            tolerance,
        } => {
            let pipeline = ExtractionPipeline::from_config(&config)?;
            for sentence in corpus::load_jsonl(&input)? {
                let tree = pipeline.chunk(&sentence.tokens)?;
                let line = match navigator::word_at_offset(&tree, offset, tolerance) {
                    Some(index) => {
                        let path = navigator::locate(&tree, index)?;
                        let word = tree.leaves()[index].word.clone();
                        serde_json::json!({ "index": index, "word": word, "path": path })
                    }
                    None => serde_json::json!({ "index": null }),
                };
                println!("{}", line);
            }
        }
        Commands::CheckGrammar => {
            let grammar = Grammar::from_config(&config.grammar)?;
            print!("{}", grammar);
            println!(
                "# {} rules, {} passes, root {}",
                grammar.rules().len(),
                grammar.passes(),
                grammar.root_label()
            );
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    let config = if path.exists() {
        AppConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?
    } else {
        AppConfig::default()
    };
    Ok(config.with_env_override()?)
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_file(logging.include_location)
        .with_line_number(logging.include_location);

    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}
