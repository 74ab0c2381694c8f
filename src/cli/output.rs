//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::analysis::language::Language;
use crate::cli::args::{OutputFormat, UrgencyArgs};
use crate::corpus::types::Priority;
use crate::engine::PredictionSource;
use crate::error::Result;

/// Result structure for predictions.
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionResult {
    pub priority: Priority,
    pub label: String,
    pub source: PredictionSource,
    pub model_version: Option<u64>,
    pub language: Language,
}

/// Result structure for a single added example.
#[derive(Debug, Serialize, Deserialize)]
pub struct AdditionResult {
    pub corpus_size: usize,
    pub keywords: Vec<String>,
    pub retrain_triggered: bool,
}

/// Result structure for imports.
#[derive(Debug, Serialize, Deserialize)]
pub struct ImportResult {
    pub examples_imported: usize,
    pub corpus_size: usize,
    pub retrain_triggered: bool,
    pub duration_ms: u64,
}

/// Result structure for tokenization.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenizationResult {
    pub normalized: String,
    pub tokens: Vec<String>,
    pub language: Language,
}

/// Result structure for keyword extraction.
#[derive(Debug, Serialize, Deserialize)]
pub struct KeywordsResult {
    pub keywords: Vec<String>,
}

/// Result structure for a foreground scheduler run.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub ticks: u64,
    pub retrains: u64,
    pub model_version: Option<u64>,
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &UrgencyArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in human-readable format.
fn output_human<T: Serialize>(message: &str, result: &T, args: &UrgencyArgs) -> Result<()> {
    if args.verbosity() > 0 {
        println!("{message}");
        println!();
    }

    let value = serde_json::to_value(result)?;
    for line in human_lines(&value) {
        println!("{line}");
    }
    Ok(())
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &UrgencyArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{json}");
    Ok(())
}

/// Render a JSON object as `key: value` lines, nesting maps by indentation.
fn human_lines(value: &serde_json::Value) -> Vec<String> {
    let mut lines = Vec::new();
    push_lines(value, 0, &mut lines);
    lines
}

fn push_lines(value: &serde_json::Value, indent: usize, lines: &mut Vec<String>) {
    let spaces = "  ".repeat(indent);

    match value {
        serde_json::Value::Object(obj) => {
            for (key, val) in obj {
                let label = format_key(key);
                match val {
                    serde_json::Value::Object(inner) if !inner.is_empty() => {
                        lines.push(format!("{spaces}{label}:"));
                        push_lines(val, indent + 1, lines);
                    }
                    _ => lines.push(format!("{spaces}{label}: {}", format_value(val))),
                }
            }
        }
        _ => lines.push(format!("{spaces}{}", format_value(value))),
    }
}

/// `model_version` -> `Model version`
fn format_key(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Format a JSON value for display.
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => (if *b { "yes" } else { "no" }).to_string(),
        serde_json::Value::Array(arr) => {
            let formatted_values = arr.iter().map(format_value).collect::<Vec<_>>().join(", ");
            format!("[{formatted_values}]")
        }
        serde_json::Value::Object(_) => "{}".to_string(),
        serde_json::Value::Null => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_key() {
        assert_eq!(format_key("model_version"), "Model version");
        assert_eq!(format_key("trained"), "Trained");
        assert_eq!(format_key(""), "");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&json!("fr")), "fr");
        assert_eq!(format_value(&json!(42)), "42");
        assert_eq!(format_value(&json!(true)), "yes");
        assert_eq!(format_value(&serde_json::Value::Null), "-");
        assert_eq!(format_value(&json!(["gaz", "fuite"])), "[gaz, fuite]");
    }

    #[test]
    fn test_human_lines_nest_maps() {
        let value = json!({
            "example_count": 3,
            "model_version": null,
            "priority_distribution": {"1": 2, "3": 1},
        });

        let lines = human_lines(&value);
        assert_eq!(
            lines,
            vec![
                "Example count: 3",
                "Model version: -",
                "Priority distribution:",
                "  1: 2",
                "  3: 1",
            ]
        );
    }
}
