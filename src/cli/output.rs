use crate::review::{ApplyError, Resolution, SuggestionRecord};
use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonRecord<'a> {
    file: String,
    #[serde(flatten)]
    record: &'a SuggestionRecord,
}

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    documents_checked: usize,
    total_records: usize,
    records: Vec<JsonRecord<'a>>,
}

pub fn print_records(
    file_path: &Path,
    records: &[SuggestionRecord],
    colored_output: bool,
    format: &OutputFormat,
    max_candidates: usize,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            print_text_records(file_path, records, colored_output, max_candidates);
            Ok(())
        }
        OutputFormat::Json => print_json_records(file_path, records),
    }
}

fn print_text_records(
    file_path: &Path,
    records: &[SuggestionRecord],
    colored_output: bool,
    max_candidates: usize,
) {
    if records.is_empty() {
        return;
    }

    let file_name = file_path.display().to_string();
    if colored_output {
        println!("\n{}", file_name.bold().underline());
    } else {
        println!("\n{}", file_name);
    }

    for record in records {
        println!("  {}", format_record(record, colored_output, max_candidates));
    }
}

/// One-line summary: location, offending text, candidates, current choice.
pub fn format_record(record: &SuggestionRecord, colored: bool, max_candidates: usize) -> String {
    let location = format!("{}:{}", record.paragraph_id, record.error_id);
    let candidates = record
        .candidates
        .iter()
        .take(max_candidates)
        .map(|c| if colored { c.green().to_string() } else { c.to_string() })
        .collect::<Vec<_>>()
        .join(", ");
    let choice = describe_resolution(record);

    if colored {
        format!(
            "{} {} {} {} {}",
            location.blue().bold(),
            record.original.red().bold(),
            "→".dimmed(),
            candidates,
            format!("[{}]", choice).dimmed()
        )
    } else {
        format!(
            "{} {} → {} [{}]",
            location, record.original, candidates, choice
        )
    }
}

pub fn describe_resolution(record: &SuggestionRecord) -> String {
    match record.resolution {
        Resolution::None => "unresolved".to_string(),
        Resolution::Original => "keep original".to_string(),
        Resolution::Candidate(_) => match record.selected_candidate() {
            Some(candidate) => format!("use \"{}\"", candidate),
            None => "missing candidate".to_string(),
        },
        Resolution::UserText => format!("typed \"{}\"", record.user_text),
    }
}

fn print_json_records(file_path: &Path, records: &[SuggestionRecord]) -> Result<()> {
    let output = JsonOutput {
        documents_checked: 1,
        total_records: records.len(),
        records: records
            .iter()
            .map(|record| JsonRecord {
                file: file_path.display().to_string(),
                record,
            })
            .collect(),
    };

    let json = serde_json::to_string_pretty(&output).context("Failed to serialize records")?;
    println!("{}", json);
    Ok(())
}

/// Highlight `word` inside `context`.
pub fn format_context(context: &str, word: &str, colored: bool) -> String {
    if colored && !word.is_empty() {
        context.replace(word, &word.red().bold().to_string())
    } else {
        context.to_string()
    }
}

pub fn print_list_summary(total_records: usize, files: &[impl AsRef<Path>], colored: bool) {
    println!();
    if total_records == 0 {
        if colored {
            println!("{}", "✓ No suggestions to review!".green().bold());
        } else {
            println!("✓ No suggestions to review!");
        }
    } else {
        let record_word = if total_records == 1 {
            "suggestion"
        } else {
            "suggestions"
        };
        let file_word = if files.len() == 1 { "document" } else { "documents" };
        if colored {
            println!(
                "{} {} {} to review in {} {}",
                "✗".red().bold(),
                total_records.to_string().red().bold(),
                record_word,
                files.len(),
                file_word
            );
        } else {
            println!(
                "✗ {} {} to review in {} {}",
                total_records, record_word, files.len(), file_word
            );
        }
    }
}

/// Apply summaries go to stderr so stdout can carry the document itself.
pub fn print_apply_summary(replaced: usize, destination: &str, colored: bool) {
    if replaced == 0 {
        if colored {
            eprintln!("{}", "No corrections applied.".green().bold());
        } else {
            eprintln!("No corrections applied.");
        }
        return;
    }

    let fix_word = if replaced == 1 {
        "correction"
    } else {
        "corrections"
    };
    if colored {
        eprintln!(
            "{} {} {} applied to {}",
            "✓".green().bold(),
            replaced.to_string().green().bold(),
            fix_word,
            destination.cyan()
        );
    } else {
        eprintln!("✓ {} {} applied to {}", replaced, fix_word, destination);
    }
}

pub fn print_apply_error(error: &ApplyError, colored: bool) {
    if colored {
        eprintln!("{} {}", "✗ Nothing applied:".red().bold(), error);
    } else {
        eprintln!("✗ Nothing applied: {}", error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SuggestionRecord {
        SuggestionRecord {
            paragraph_id: "p1".to_string(),
            error_id: "e2".to_string(),
            original: "catt".to_string(),
            candidates: vec!["cat".to_string(), "cart".to_string(), "chat".to_string()],
            user_text: String::new(),
            resolution: Resolution::Candidate(1),
        }
    }

    #[test]
    fn test_format_record_plain() {
        assert_eq!(
            format_record(&record(), false, 2),
            "p1:e2 catt → cat, cart [use \"cart\"]"
        );
    }

    #[test]
    fn test_describe_resolution() {
        let mut r = record();
        r.clear();
        assert_eq!(describe_resolution(&r), "unresolved");
        r.choose_original();
        assert_eq!(describe_resolution(&r), "keep original");
        r.set_user_text("kat");
        r.choose_user_text();
        assert_eq!(describe_resolution(&r), "typed \"kat\"");
        r.resolution = Resolution::Candidate(9);
        assert_eq!(describe_resolution(&r), "missing candidate");
    }

    #[test]
    fn test_format_context_plain() {
        assert_eq!(format_context("teh cat", "teh", false), "teh cat");
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("yaml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Text.to_string(), "text");
    }
}
