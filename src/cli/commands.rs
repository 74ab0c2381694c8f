//! Command implementations for the urgency CLI.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;

use crate::analysis::analyzer::tokenize;
use crate::analysis::keywords::extract_keywords;
use crate::analysis::language::detect_language;
use crate::analysis::normalizer::normalize;
use crate::classification::keyword_scorer::score_text;
use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::EngineConfig;
use crate::corpus::file::{JsonlCorpusStore, read_examples};
use crate::corpus::memory::MemoryCorpusStore;
use crate::corpus::seed::seed_if_empty;
use crate::corpus::store::CorpusStore;
use crate::corpus::types::Priority;
use crate::engine::{Prediction, PredictionSource, PriorityEngine};
use crate::error::{Result, UrgencyError};
use crate::scheduler::RetrainScheduler;

/// Execute a CLI command, naming the subcommand in any error.
pub fn run(args: UrgencyArgs) -> anyhow::Result<()> {
    let name = args.command.name();
    execute_command(args).with_context(|| format!("{name} failed"))
}

/// Execute a CLI command.
pub fn execute_command(args: UrgencyArgs) -> Result<()> {
    match &args.command {
        Command::Predict(predict_args) => predict(predict_args.clone(), &args),
        Command::Add(add_args) => add_example(add_args.clone(), &args),
        Command::Import(import_args) => import_examples(import_args.clone(), &args),
        Command::Train(train_args) => train(train_args.clone(), &args),
        Command::Stats(stats_args) => show_stats(stats_args.clone(), &args),
        Command::Tokenize(tokenize_args) => tokenize_text(tokenize_args.clone(), &args),
        Command::Keywords(keywords_args) => show_keywords(keywords_args.clone(), &args),
        Command::Schedule(schedule_args) => run_schedule(schedule_args.clone(), &args),
    }
}

/// Load the configuration named on the command line, or the defaults.
pub fn load_config(cli_args: &UrgencyArgs) -> Result<EngineConfig> {
    let mut config = match &cli_args.config {
        Some(path) => {
            log::info!("loading configuration from {}", path.display());
            EngineConfig::from_file(path)?
        }
        None => EngineConfig::default(),
    };

    if let Some(choice) = cli_args.classifier {
        config.classifier.kind = choice.into();
    }
    config.validate()?;
    Ok(config)
}

/// Open the corpus named on the command line, or an empty in-memory one.
pub fn open_store(cli_args: &UrgencyArgs) -> Result<Arc<dyn CorpusStore>> {
    match &cli_args.corpus {
        Some(path) => Ok(Arc::new(JsonlCorpusStore::open(path)?)),
        None => {
            log::debug!("no corpus file given, using an in-memory corpus");
            Ok(Arc::new(MemoryCorpusStore::new()))
        }
    }
}

fn open_engine(cli_args: &UrgencyArgs) -> Result<PriorityEngine> {
    let config = load_config(cli_args)?;
    let store = open_store(cli_args)?;
    PriorityEngine::new(config, store)
}

/// Classify a complaint.
fn predict(args: PredictArgs, cli_args: &UrgencyArgs) -> Result<()> {
    let text = [&args.title, &args.description, &args.category]
        .iter()
        .map(|field| field.trim())
        .filter(|field| !field.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let prediction = if args.keywords_only {
        Prediction {
            priority: score_text(&text),
            source: PredictionSource::Fallback,
            model_version: None,
        }
    } else {
        let engine = open_engine(cli_args)?;
        if let Err(e) = engine.initialize() {
            log::warn!("could not train a model, answering from keywords: {e}");
        }
        engine.predict_detailed(&args.title, &args.description, &args.category)
    };

    output_result(
        "Prediction",
        &PredictionResult {
            priority: prediction.priority,
            label: prediction.priority.label().to_string(),
            source: prediction.source,
            model_version: prediction.model_version,
            language: detect_language(&text),
        },
        cli_args,
    )
}

/// Append one labeled example.
fn add_example(args: AddArgs, cli_args: &UrgencyArgs) -> Result<()> {
    if cli_args.corpus.is_none() {
        log::warn!("no --corpus given, the example will not be persisted");
    }

    let priority = Priority::try_from(args.priority)?;
    let engine = open_engine(cli_args)?;
    let outcome = engine.add_training_example(&args.text, args.category.as_deref(), priority)?;
    if args.wait {
        engine.join_background();
    }

    output_result(
        "Example added",
        &AdditionResult {
            corpus_size: outcome.corpus_size,
            keywords: extract_keywords(&args.text, engine.config().keyword_count),
            retrain_triggered: outcome.retrain_triggered,
        },
        cli_args,
    )
}

/// Append labeled examples from a JSON lines file.
fn import_examples(args: ImportArgs, cli_args: &UrgencyArgs) -> Result<()> {
    if !args.examples_file.is_file() {
        return Err(UrgencyError::validation(format!(
            "{} is not a file",
            args.examples_file.display()
        )));
    }

    let start_time = Instant::now();
    let examples = read_examples(&args.examples_file)?;
    let imported = examples.len();
    if cli_args.verbosity() > 1 {
        println!(
            "Read {imported} examples from {}",
            args.examples_file.display()
        );
    }

    let engine = open_engine(cli_args)?;
    let outcome = engine.add_training_examples(examples)?;
    engine.join_background();
    if args.train {
        engine.train_model()?;
    }

    output_result(
        "Examples imported",
        &ImportResult {
            examples_imported: imported,
            corpus_size: outcome.corpus_size,
            retrain_triggered: outcome.retrain_triggered,
            duration_ms: start_time.elapsed().as_millis() as u64,
        },
        cli_args,
    )
}

/// Train on the corpus and report the published model.
fn train(args: TrainArgs, cli_args: &UrgencyArgs) -> Result<()> {
    let engine = open_engine(cli_args)?;
    let seed = args.seed || cli_args.corpus.is_none();
    let report = if seed {
        engine.initialize()?
    } else {
        engine.train_model()?
    };

    output_result("Model trained", &report, cli_args)
}

/// Show corpus and model statistics.
fn show_stats(args: StatsArgs, cli_args: &UrgencyArgs) -> Result<()> {
    let engine = open_engine(cli_args)?;
    if args.train {
        engine.initialize()?;
    }
    let stats = engine.model_statistics()?;

    output_result("Model statistics", &stats, cli_args)
}

/// Show normalized text, tokens and language.
fn tokenize_text(args: TokenizeArgs, cli_args: &UrgencyArgs) -> Result<()> {
    output_result(
        "Tokens",
        &TokenizationResult {
            normalized: normalize(&args.text),
            tokens: tokenize(&args.text),
            language: detect_language(&args.text),
        },
        cli_args,
    )
}

/// Show the top keywords of a text.
fn show_keywords(args: KeywordsArgs, cli_args: &UrgencyArgs) -> Result<()> {
    output_result(
        "Keywords",
        &KeywordsResult {
            keywords: extract_keywords(&args.text, args.count),
        },
        cli_args,
    )
}

/// Train once, then retrain on a schedule until enough ticks have passed.
fn run_schedule(args: ScheduleArgs, cli_args: &UrgencyArgs) -> Result<()> {
    let engine = open_engine(cli_args)?;
    seed_if_empty(engine.store().as_ref(), engine.config().keyword_count)?;
    if let Err(e) = engine.train_model() {
        log::warn!("initial training failed, waiting for the first tick: {e}");
    }

    let scheduler_config = &engine.config().scheduler;
    let interval = args
        .interval
        .map(Duration::from_secs)
        .unwrap_or_else(|| scheduler_config.retrain_interval());
    let stats_interval = args
        .stats_interval
        .map(Duration::from_secs)
        .or_else(|| scheduler_config.statistics_interval());

    if cli_args.verbosity() > 0 {
        println!("Retraining every {}s", interval.as_secs());
    }

    let scheduler =
        RetrainScheduler::start_with_intervals(engine.clone(), interval, stats_interval)?;
    while scheduler.is_running() && args.ticks.is_none_or(|limit| scheduler.ticks() < limit) {
        thread::sleep(Duration::from_millis(200));
    }
    let stats = scheduler.stop()?;

    output_result(
        "Scheduler stopped",
        &ScheduleResult {
            ticks: stats.ticks,
            retrains: stats.retrains,
            model_version: engine.model_version(),
        },
        cli_args,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::tempdir;

    fn parse(argv: &[&str]) -> UrgencyArgs {
        UrgencyArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_load_config_with_classifier_override() {
        let args = parse(&["urgency", "--classifier", "naive-bayes", "stats"]);
        let config = load_config(&args).unwrap();
        assert_eq!(
            config.classifier.kind,
            crate::classification::classifier::ClassifierKind::NaiveBayes
        );
    }

    #[test]
    fn test_run_names_failed_subcommand() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.json");

        let err = run(parse(&[
            "urgency",
            "-q",
            "--config",
            missing.to_str().unwrap(),
            "stats",
        ]))
        .unwrap_err();
        assert_eq!(err.to_string(), "stats failed");
        assert!(matches!(
            err.downcast_ref::<UrgencyError>(),
            Some(UrgencyError::Io(_))
        ));
    }

    #[test]
    fn test_add_then_stats_on_file_corpus() {
        let dir = tempdir().unwrap();
        let corpus = dir.path().join("corpus.jsonl");
        let corpus = corpus.to_str().unwrap();

        execute_command(parse(&[
            "urgency", "-q", "--corpus", corpus, "add", "fuite de gaz", "-p", "1",
        ]))
        .unwrap();
        execute_command(parse(&[
            "urgency", "-q", "--corpus", corpus, "add", "banc cassé", "-p", "3",
        ]))
        .unwrap();

        let args = parse(&["urgency", "--corpus", corpus, "stats"]);
        let store = open_store(&args).unwrap();
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_import_rejects_missing_file() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.jsonl");
        let args = parse(&["urgency", "-q", "import", missing.to_str().unwrap()]);
        let err = execute_command(args).unwrap_err();
        assert!(matches!(err, UrgencyError::Validation(_)));
    }

    #[test]
    fn test_import_appends_examples() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("import.jsonl");
        std::fs::write(
            &source,
            "{\"text\":\"fuite de gaz\",\"priority\":1}\n\n{\"text\":\"graffiti sur le mur\",\"priority\":3}\n",
        )
        .unwrap();
        let corpus = dir.path().join("corpus.jsonl");

        execute_command(parse(&[
            "urgency",
            "-q",
            "--corpus",
            corpus.to_str().unwrap(),
            "import",
            source.to_str().unwrap(),
        ]))
        .unwrap();

        let examples = read_examples(&corpus).unwrap();
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].keywords, vec!["fuite", "gaz"]);
        assert_eq!(examples[1].priority, Priority::Low);
    }
}
