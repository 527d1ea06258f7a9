//! Output formatting for CLI commands.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::cli::args::{NewsfindArgs, OutputFormat};
use crate::error::Result;
use crate::search::result::SearchResponse;
use crate::spelling::corrector::CorrectionResult;

/// Result structure for article ingestion.
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexingSummary {
    pub file: String,
    pub articles_read: usize,
    pub indexed: usize,
    pub rejected: usize,
    pub duration_ms: u64,
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &NewsfindArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 0 {
                println!("{message}");
                println!();
            }
            let value = serde_json::to_value(result)?;
            print!("{}", render_generic(&value));
            Ok(())
        }
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output a search response.
pub fn output_search_response(response: &SearchResponse, args: &NewsfindArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            print!("{}", render_search_response(response, args.verbosity()));
            Ok(())
        }
        OutputFormat::Json => output_json(response, args),
    }
}

/// Output a query correction.
pub fn output_correction(correction: &CorrectionResult, args: &NewsfindArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            print!("{}", render_correction(correction));
            Ok(())
        }
        OutputFormat::Json => output_json(correction, args),
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &NewsfindArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// Render search results in human format.
fn render_search_response(response: &SearchResponse, verbosity: u8) -> String {
    let mut out = String::new();

    if let Some(corrected) = &response.corrected_query {
        let _ = writeln!(out, "Showing results for: {corrected}");
        let _ = writeln!(out);
    }

    if response.results.is_empty() {
        if response.degraded {
            let _ = writeln!(out, "No results: every search tier was unavailable.");
        } else {
            let _ = writeln!(out, "No results.");
        }
    } else {
        let _ = writeln!(out, "Search Results:");
        let _ = writeln!(out, "═══════════════");
    }

    for (i, result) in response.results.iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Result {}: (Score: {:.3}, Tier: {})",
            i + 1,
            result.score,
            result.tier
        );
        let _ = writeln!(out, "─────────────");
        let title = result
            .highlighted_title
            .as_deref()
            .unwrap_or(&result.article.title);
        let _ = writeln!(out, "title: {title}");
        if !result.article.category.is_empty() {
            let _ = writeln!(out, "category: {}", result.article.category);
        }
        if !result.article.source_url.is_empty() {
            let _ = writeln!(out, "url: {}", result.article.source_url);
        }
        if verbosity > 1 {
            let description = result
                .highlighted_description
                .as_deref()
                .unwrap_or(&result.article.description);
            if !description.is_empty() {
                let _ = writeln!(out, "description: {description}");
            }
        }
    }

    let spelling = response.suggestions.spelling_texts();
    if !spelling.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Did you mean: {}", spelling.join(", "));
    }
    if !response.suggestions.autocomplete.is_empty() {
        let _ = writeln!(
            out,
            "Completions: {}",
            response.suggestions.autocomplete.join(", ")
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Total hits: {}", response.total);
    let _ = writeln!(out, "Search time: {}ms", response.took_ms);
    out
}

/// Render a correction in human format.
fn render_correction(correction: &CorrectionResult) -> String {
    let mut out = String::new();
    match correction.corrected_query() {
        Some(corrected) => {
            let _ = writeln!(out, "{corrected}");
            for replacement in &correction.replacements {
                let _ = writeln!(
                    out,
                    "  {} -> {} (similarity {:.2}, distance {})",
                    replacement.original,
                    replacement.replacement,
                    replacement.similarity,
                    replacement.distance
                );
            }
        }
        None => {
            let _ = writeln!(out, "{} (no correction)", correction.corrected);
        }
    }
    out
}

/// Render generic data in human format.
fn render_generic(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Object(obj) => obj
            .iter()
            .map(|(key, val)| format!("{key}: {}\n", format_value(val)))
            .collect(),
        _ => format!("{}\n", format_value(value)),
    }
}

/// Format a JSON value for display.
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Array(arr) => {
            let formatted_values = arr.iter().map(format_value).collect::<Vec<_>>().join(", ");
            format!("[{formatted_values}]")
        }
        serde_json::Value::Object(_) => "[object]".to_string(),
        serde_json::Value::Null => "null".to_string(),
    }
}
