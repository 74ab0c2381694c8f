//! Command line argument parsing for the urgency CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::classification::classifier::ClassifierKind;

/// Urgency - complaint priority classification
#[derive(Parser, Debug, Clone)]
#[command(name = "urgency")]
#[command(about = "Classify citizen complaints into urgency tiers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct UrgencyArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Training corpus (JSON lines). Without it an in-memory corpus is used.
    #[arg(long, env = "URGENCY_CORPUS", value_name = "CORPUS_FILE", global = true)]
    pub corpus: Option<PathBuf>,

    /// Engine configuration file (JSON)
    #[arg(long, env = "URGENCY_CONFIG", value_name = "CONFIG_FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured classifier
    #[arg(long, value_enum, global = true)]
    pub classifier: Option<ClassifierChoice>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl UrgencyArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Classify a complaint
    Predict(PredictArgs),

    /// Append a labeled example to the corpus
    Add(AddArgs),

    /// Append labeled examples from a JSON lines file
    Import(ImportArgs),

    /// Train a model on the corpus and report it
    Train(TrainArgs),

    /// Show corpus and model statistics
    Stats(StatsArgs),

    /// Show the tokens and detected language of a text
    Tokenize(TokenizeArgs),

    /// Show the top keywords of a text
    Keywords(KeywordsArgs),

    /// Run the retrain scheduler in the foreground
    Schedule(ScheduleArgs),
}

impl Command {
    /// Subcommand name as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Predict(_) => "predict",
            Command::Add(_) => "add",
            Command::Import(_) => "import",
            Command::Train(_) => "train",
            Command::Stats(_) => "stats",
            Command::Tokenize(_) => "tokenize",
            Command::Keywords(_) => "keywords",
            Command::Schedule(_) => "schedule",
        }
    }
}

/// Arguments for predicting a priority
#[derive(Parser, Debug, Clone)]
pub struct PredictArgs {
    /// Complaint title
    #[arg(value_name = "TITLE")]
    pub title: String,

    /// Complaint description
    #[arg(short, long, default_value = "")]
    pub description: String,

    /// Complaint category
    #[arg(short, long, default_value = "")]
    pub category: String,

    /// Use only the keyword scorer, without training
    #[arg(long)]
    pub keywords_only: bool,
}

/// Arguments for adding a training example
#[derive(Parser, Debug, Clone)]
pub struct AddArgs {
    /// Complaint text
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Priority tier (1=high, 2=medium, 3=low)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=3))]
    pub priority: u8,

    /// Complaint category
    #[arg(short, long)]
    pub category: Option<String>,

    /// Wait for a triggered background retrain to finish
    #[arg(long)]
    pub wait: bool,
}

/// Arguments for importing training examples
#[derive(Parser, Debug, Clone)]
pub struct ImportArgs {
    /// JSON lines file, one example per line
    #[arg(value_name = "EXAMPLES_FILE")]
    pub examples_file: PathBuf,

    /// Train explicitly after importing
    #[arg(long)]
    pub train: bool,
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// Seed an empty corpus with the bootstrap dataset first
    #[arg(long)]
    pub seed: bool,
}

/// Arguments for statistics
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    /// Train before collecting, so model fields are filled
    #[arg(long)]
    pub train: bool,
}

/// Arguments for tokenizing
#[derive(Parser, Debug, Clone)]
pub struct TokenizeArgs {
    /// Text to analyze
    #[arg(value_name = "TEXT")]
    pub text: String,
}

/// Arguments for keyword extraction
#[derive(Parser, Debug, Clone)]
pub struct KeywordsArgs {
    /// Text to analyze
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Number of keywords to return
    #[arg(short = 'k', long, default_value = "5")]
    pub count: usize,
}

/// Arguments for the foreground scheduler
#[derive(Parser, Debug, Clone)]
pub struct ScheduleArgs {
    /// Seconds between scheduled retrains (default: from config)
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Stop after this many ticks (default: run until interrupted)
    #[arg(short, long)]
    pub ticks: Option<u64>,

    /// Seconds between statistics log lines (default: from config)
    #[arg(long)]
    pub stats_interval: Option<u64>,
}

/// Classifiers selectable from the command line
#[derive(ValueEnum, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierChoice {
    /// One-vs-one linear SVM
    LinearSvm,
    /// Multinomial naive Bayes
    NaiveBayes,
}

impl From<ClassifierChoice> for ClassifierKind {
    fn from(choice: ClassifierChoice) -> Self {
        match choice {
            ClassifierChoice::LinearSvm => ClassifierKind::LinearSvm,
            ClassifierChoice::NaiveBayes => ClassifierKind::NaiveBayes,
        }
    }
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_predict() {
        let args = UrgencyArgs::try_parse_from([
            "urgency",
            "predict",
            "Fuite de gaz",
            "-d",
            "odeur forte",
            "-c",
            "Sécurité",
        ])
        .unwrap();

        match args.command {
            Command::Predict(predict) => {
                assert_eq!(predict.title, "Fuite de gaz");
                assert_eq!(predict.description, "odeur forte");
                assert_eq!(predict.category, "Sécurité");
                assert!(!predict.keywords_only);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_verbosity() {
        let args = UrgencyArgs::try_parse_from(["urgency", "tokenize", "x"]).unwrap();
        assert_eq!(args.verbosity(), 1);

        let args = UrgencyArgs::try_parse_from(["urgency", "-vv", "tokenize", "x"]).unwrap();
        assert_eq!(args.verbosity(), 2);

        let args = UrgencyArgs::try_parse_from(["urgency", "tokenize", "x", "-q", "-vvv"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_add_rejects_out_of_range_priority() {
        assert!(UrgencyArgs::try_parse_from(["urgency", "add", "texte", "-p", "4"]).is_err());
        assert!(UrgencyArgs::try_parse_from(["urgency", "add", "texte", "-p", "0"]).is_err());

        let args = UrgencyArgs::try_parse_from(["urgency", "add", "texte", "-p", "3"]).unwrap();
        match args.command {
            Command::Add(add) => assert_eq!(add.priority, 3),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = UrgencyArgs::try_parse_from([
            "urgency",
            "stats",
            "--format",
            "json",
            "--classifier",
            "naive-bayes",
        ])
        .unwrap();
        assert!(matches!(args.output_format, OutputFormat::Json));
        assert!(matches!(args.classifier, Some(ClassifierChoice::NaiveBayes)));
    }
}
