use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use spellreview::cli::host::{Destination, TerminalHost};
use spellreview::cli::output::{self, OutputFormat};
use spellreview::cli::{prompt, resolutions::ResolutionFile};
use spellreview::review::{self, ExtractOptions, ReviewSession};
use spellreview::{Config, Document};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "spellreview")]
#[command(version, about = "Review spelling suggestions and apply corrections to documents", long_about = None)]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file to load on top of the global and local ones
    #[arg(long, global = true, env = "SPELLREVIEW_CONFIG")]
    config: Option<PathBuf>,

    /// Pattern (regex) for original text that should be kept as is
    #[arg(long, global = true)]
    keep_pattern: Vec<String>,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the suggestions found in documents
    List {
        /// Document files or directories of *.json documents
        #[arg(value_name = "PATHS", required = true)]
        paths: Vec<PathBuf>,

        /// Output format (text, json)
        #[arg(short = 'o', long, default_value = "text")]
        format: OutputFormat,

        /// Exit with code 0 even if suggestions are found
        #[arg(long)]
        no_fail: bool,
    },
    /// Write an editable resolution file for a document
    Export {
        document: PathBuf,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Apply a resolution file to a document
    Apply {
        document: PathBuf,

        /// Resolution file produced by `export`
        #[arg(short, long)]
        records: PathBuf,

        /// Apply even if the records were exported from a different document
        #[arg(long)]
        force: bool,

        #[command(flatten)]
        target: Target,
    },
    /// Review suggestions interactively, then apply them
    Review {
        document: PathBuf,

        #[command(flatten)]
        target: Target,
    },
}

#[derive(Args, Debug)]
struct Target {
    /// Write the updated document to this file instead of stdout
    #[arg(short, long, conflicts_with = "in_place")]
    output: Option<PathBuf>,

    /// Overwrite the input document
    #[arg(short, long)]
    in_place: bool,
}

impl Target {
    fn destination(&self, document: &Path) -> Destination {
        match (&self.output, self.in_place) {
            (_, true) => Destination::File(document.to_path_buf()),
            (Some(path), false) => Destination::File(path.clone()),
            (None, false) => Destination::Stdout,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Handle shell completion generation
    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "spellreview", &mut io::stdout());
        return Ok(());
    }

    let Some(command) = cli.command else {
        anyhow::bail!("No command specified. Use --help for usage information.");
    };

    let config = Config::load(cli.config.as_deref(), cli.keep_pattern.clone())?;
    debug!(?config, "configuration loaded");
    let colored = !cli.no_color;

    let ok = match command {
        Commands::List {
            paths,
            format,
            no_fail,
        } => list(&paths, &format, &config, colored)? == 0 || no_fail,
        Commands::Export { document, output } => {
            export(&document, output.as_deref(), &config)?;
            true
        }
        Commands::Apply {
            document,
            records,
            force,
            target,
        } => apply(&document, &records, force, target.destination(&document), colored)?,
        Commands::Review { document, target } => review(&document, &target, &config, colored)?,
    };

    if !ok {
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("spellreview={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Expand directories into the *.json documents they contain.
fn collect_documents(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
                .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
                .collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    files
}

fn list(paths: &[PathBuf], format: &OutputFormat, config: &Config, colored: bool) -> Result<usize> {
    let options = ExtractOptions::from_config(config);
    let mut loaded = Vec::new();
    let mut total = 0;

    for file_path in collect_documents(paths) {
        if !file_path.exists() {
            eprintln!("Error: File not found: {}", file_path.display());
            continue;
        }

        let document = Document::from_file(&file_path)?;
        let records = review::extract_with(&document, &options);
        output::print_records(&file_path, &records, colored, format, config.max_candidates)?;
        total += records.len();
        loaded.push(file_path);
    }

    if *format == OutputFormat::Text {
        output::print_list_summary(total, &loaded, colored);
    }
    Ok(total)
}

fn export(document_path: &Path, output_path: Option<&Path>, config: &Config) -> Result<()> {
    let document = Document::from_file(document_path)?;
    let records = review::extract_with(&document, &ExtractOptions::from_config(config));
    let json = ResolutionFile::new(&document, records).to_json()?;

    match output_path {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("Failed to write resolution file: {}", path.display()))?,
        None => println!("{}", json),
    }
    Ok(())
}

fn apply(
    document_path: &Path,
    records_path: &Path,
    force: bool,
    destination: Destination,
    colored: bool,
) -> Result<bool> {
    let document = Document::from_file(document_path)?;
    let resolutions = ResolutionFile::from_file(records_path)?;

    if force {
        info!("skipping document digest check");
    } else {
        resolutions.verify(&document)?;
    }

    match review::reconcile(&document, &resolutions.records) {
        Ok(reconciled) => {
            destination.write(&reconciled.document)?;
            output::print_apply_summary(reconciled.replaced, &destination.label(), colored);
            Ok(true)
        }
        Err(e) => {
            output::print_apply_error(&e, colored);
            Ok(false)
        }
    }
}

fn review(document_path: &Path, target: &Target, config: &Config, colored: bool) -> Result<bool> {
    let document = Document::from_file(document_path)?;
    let mut host = TerminalHost::new(&document, target.destination(document_path), colored);
    let mut session = ReviewSession::with_options(document, ExtractOptions::from_config(config));

    if session.records().is_empty() {
        // Nothing to review, but the requested output still gets the document.
        if !target.in_place {
            host.destination().write(session.document())?;
        }
        output::print_apply_summary(0, &host.destination().label(), colored);
        return Ok(true);
    }

    if !prompt::review_records(&mut session, &mut host, config.max_candidates)? {
        eprintln!("Review cancelled, nothing applied.");
        return Ok(true);
    }

    match session.apply(&mut host) {
        Ok(replaced) => {
            let label = host.destination().label();
            host.finish()?;
            output::print_apply_summary(replaced, &label, colored);
            Ok(true)
        }
        Err(e) => {
            output::print_apply_error(&e, colored);
            Ok(false)
        }
    }
}
