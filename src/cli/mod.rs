//! # CLI Module
//!
//! Command-line interface for the file inventory engine.
//!
//! ## Usage
//! ```bash
//! # Scan a directory into the catalog
//! orderly scan ~/Downloads
//!
//! # Find duplicates, then resolve them by renaming
//! orderly dupes
//! orderly dupes --resolve rename
//!
//! # Preview and apply rule-based organization
//! orderly organize ~/Downloads
//! orderly organize ~/Downloads --apply
//!
//! # Rename suggestions
//! orderly rename ~/Downloads/*.pdf --apply
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use orderly::config::{OrganizeMode, Settings};
use orderly::core::catalog::{Catalog, HistoryAction, JsonFileStore};
use orderly::core::dupes::{CompareMethod, DuplicateReport, DuplicateResolver, ResolutionMethod};
use orderly::core::organize::{rules_from_value, NamingConvention, Organizer};
use orderly::core::scanner::{FileScanner, HashAlgorithm};
use orderly::core::task::CancellationToken;
use orderly::error::OrderlyError;
use orderly::events::{
    DuplicateEvent, Event, EventChannel, EventReceiver, OrganizeEvent, ResolveEvent, ScanEvent,
};
use orderly::Result;
use std::path::PathBuf;
use std::thread;

/// Orderly - inventory, deduplicate, and organize file trees
#[derive(Parser, Debug)]
#[command(name = "orderly")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Catalog file (default: ~/.orderly/catalog.json)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Settings file (default: ~/.orderly/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a directory tree into the catalog
    Scan {
        /// Directory to scan
        path: PathBuf,

        /// Fingerprint algorithm
        #[arg(short, long)]
        algorithm: Option<Algorithm>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Find duplicate files, optionally resolving them
    Dupes {
        /// Apply a resolution method to every group found
        #[arg(long)]
        resolve: Option<Method>,

        /// Comparison method
        #[arg(long)]
        compare: Option<Compare>,

        /// Minimum file size to consider, in KiB
        #[arg(long)]
        min_size_kb: Option<u64>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Suggest or apply rule-based organization for a directory
    Organize {
        /// Directory to organize
        path: PathBuf,

        /// Apply moves instead of printing suggestions
        #[arg(long)]
        apply: bool,

        /// Rule document (JSON list); defaults to the built-in rules
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Suggest or apply naming-convention renames
    Rename {
        /// Files to rename (must already be cataloged)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Apply the renames instead of printing them
        #[arg(long)]
        apply: bool,

        /// Naming convention override
        #[arg(long)]
        convention: Option<Convention>,
    },

    /// Analyze naming and folder patterns across the catalog
    Analyze,

    /// Show catalog statistics
    Stats {
        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Show recent history entries
    History {
        /// Maximum entries to show
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Export the catalog as a JSON document
    Export {
        /// Write to this file instead of stdout
        #[arg(long)]
        to: Option<PathBuf>,
    },

    /// Import a catalog document, replacing the current catalog
    Import {
        /// Document to import
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Algorithm {
    Md5,
    Sha1,
    Sha256,
}

impl From<Algorithm> for HashAlgorithm {
    fn from(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Md5 => HashAlgorithm::Md5,
            Algorithm::Sha1 => HashAlgorithm::Sha1,
            Algorithm::Sha256 => HashAlgorithm::Sha256,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Compare {
    Content,
    Name,
    Both,
}

impl From<Compare> for CompareMethod {
    fn from(compare: Compare) -> Self {
        match compare {
            Compare::Content => CompareMethod::Content,
            Compare::Name => CompareMethod::Name,
            Compare::Both => CompareMethod::Both,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Method {
    Delete,
    Move,
    Symlink,
    Hardlink,
    Rename,
}

impl From<Method> for ResolutionMethod {
    fn from(method: Method) -> Self {
        match method {
            Method::Delete => ResolutionMethod::Delete,
            Method::Move => ResolutionMethod::Move,
            Method::Symlink => ResolutionMethod::Symlink,
            Method::Hardlink => ResolutionMethod::Hardlink,
            Method::Rename => ResolutionMethod::Rename,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Convention {
    Camel,
    Snake,
    Kebab,
    Normal,
}

impl From<Convention> for NamingConvention {
    fn from(convention: Convention) -> Self {
        match convention {
            Convention::Camel => NamingConvention::Camel,
            Convention::Snake => NamingConvention::Snake,
            Convention::Kebab => NamingConvention::Kebab,
            Convention::Normal => NamingConvention::Normal,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".orderly")
        .join("config.json")
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(&cli.config.clone().unwrap_or_else(default_config_path))?;
    let store = JsonFileStore::new(
        cli.catalog
            .clone()
            .unwrap_or_else(JsonFileStore::default_path),
    );
    let catalog = Catalog::open(Box::new(store))?;

    match cli.command {
        Commands::Scan {
            path,
            algorithm,
            output,
        } => run_scan(path, algorithm, output, settings, &catalog),
        Commands::Dupes {
            resolve,
            compare,
            min_size_kb,
            output,
        } => run_dupes(resolve, compare, min_size_kb, output, settings, &catalog),
        Commands::Organize {
            path,
            apply,
            rules,
            output,
        } => run_organize(path, apply, rules, output, settings, &catalog),
        Commands::Rename {
            paths,
            apply,
            convention,
        } => run_rename(paths, apply, convention, settings, &catalog),
        Commands::Analyze => run_analyze(settings, &catalog),
        Commands::Stats { output } => run_stats(output, &catalog),
        Commands::History { limit } => run_history(limit, &catalog),
        Commands::Export { to } => run_export(to, &catalog),
        Commands::Import { file } => run_import(file, &catalog),
    }
}

/// Drive a progress bar from the event stream on a listener thread.
fn spawn_progress(receiver: EventReceiver) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let bar = ProgressBar::hidden();
        bar.set_style(
            ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        for event in receiver.iter() {
            match event {
                Event::Scan(ScanEvent::Started { total, .. })
                | Event::Organize(OrganizeEvent::Started { total, .. }) => {
                    bar.set_length(total as u64);
                    bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
                }
                Event::Duplicate(DuplicateEvent::Started { total_partitions }) => {
                    bar.set_length(total_partitions as u64);
                    bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
                }
                Event::Resolve(ResolveEvent::Started { total_groups }) => {
                    bar.set_length(total_groups as u64);
                    bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
                }
                Event::Scan(ScanEvent::Progress(p)) => {
                    bar.set_position(p.processed as u64);
                    if let Some(name) = p.current_path.file_name().and_then(|n| n.to_str()) {
                        bar.set_message(name.to_string());
                    }
                }
                Event::Organize(OrganizeEvent::Progress(p)) => {
                    bar.set_position(p.processed as u64);
                }
                Event::Duplicate(DuplicateEvent::Progress(p)) => {
                    bar.set_position(p.processed as u64);
                    bar.set_message(format!("{} groups", p.groups_found));
                }
                Event::Resolve(ResolveEvent::Progress(p)) => {
                    bar.set_position(p.processed as u64);
                }
                Event::Scan(ScanEvent::Completed { .. })
                | Event::Duplicate(DuplicateEvent::Completed { .. })
                | Event::Resolve(ResolveEvent::Completed { .. })
                | Event::Organize(OrganizeEvent::Completed { .. }) => {
                    bar.finish_and_clear();
                }
                _ => {}
            }
        }
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| OrderlyError::Config(e.to_string()))?;
    println!("{text}");
    Ok(())
}

fn run_scan(
    path: PathBuf,
    algorithm: Option<Algorithm>,
    output: OutputFormat,
    settings: Settings,
    catalog: &Catalog,
) -> Result<()> {
    let algorithm = algorithm
        .map(HashAlgorithm::from)
        .unwrap_or(settings.duplicates.hash_algorithm);
    let scanner = FileScanner::new(settings.scanning, algorithm);

    let (sender, receiver) = EventChannel::new();
    let listener = spawn_progress(receiver);

    let report = scanner.scan_with_events(&path, catalog, &sender, &CancellationToken::new())?;
    drop(sender);
    let _ = listener.join();

    match output {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Pretty => {
            println!(
                "{} {} files cataloged ({} skipped) in {}ms",
                style("Scan complete:").bold().green(),
                report.cataloged,
                report.skipped,
                report.duration_ms
            );
            println!(
                "Catalog now tracks {} files, {} bytes",
                catalog.len(),
                catalog.stats().total_size
            );
        }
    }
    Ok(())
}

fn run_dupes(
    resolve: Option<Method>,
    compare: Option<Compare>,
    min_size_kb: Option<u64>,
    output: OutputFormat,
    settings: Settings,
    catalog: &Catalog,
) -> Result<()> {
    let mut duplicate_settings = settings.duplicates;
    if let Some(compare) = compare {
        duplicate_settings.compare_method = compare.into();
    }
    if let Some(min) = min_size_kb {
        duplicate_settings.min_size_kb = min;
    }

    let resolver =
        DuplicateResolver::new(duplicate_settings, settings.scanning.chunk_size_bytes());

    let (sender, receiver) = EventChannel::new();
    let listener = spawn_progress(receiver);
    let groups = resolver.find_with_events(catalog, &sender, &CancellationToken::new())?;

    let resolution = match resolve {
        Some(method) => Some(resolver.resolve_with_events(
            &groups,
            method.into(),
            None,
            catalog,
            &sender,
            &CancellationToken::new(),
        )?),
        None => None,
    };
    drop(sender);
    let _ = listener.join();

    match output {
        OutputFormat::Json => {
            print_json(&serde_json::json!({
                "report": DuplicateReport::from_groups(&groups, false),
                "groups": groups,
                "resolution": resolution,
            }))?;
        }
        OutputFormat::Pretty => {
            let report = DuplicateReport::from_groups(&groups, false);
            if groups.is_empty() {
                println!("{}", style("No duplicates found").green());
                return Ok(());
            }

            println!(
                "{} {} groups, {} duplicate files, {} bytes reclaimable",
                style("Duplicates:").bold().yellow(),
                report.groups,
                report.duplicates,
                report.wasted_bytes
            );
            for group in &groups {
                println!(
                    "  {} ({} files x {} bytes)",
                    style(&group.key).cyan(),
                    group.paths.len(),
                    group.file_size
                );
                for path in &group.paths {
                    println!("    {}", path.display());
                }
            }

            if let Some(resolution) = resolution {
                println!(
                    "{} {} files resolved, {} failures",
                    style("Resolution:").bold().green(),
                    resolution.files_resolved,
                    resolution.failures
                );
            }
        }
    }
    Ok(())
}

fn run_organize(
    path: PathBuf,
    apply: bool,
    rules: Option<PathBuf>,
    output: OutputFormat,
    settings: Settings,
    catalog: &Catalog,
) -> Result<()> {
    let rules = match rules {
        Some(rules_path) => {
            let text = std::fs::read_to_string(&rules_path)
                .map_err(|e| OrderlyError::Config(format!("cannot read rules: {e}")))?;
            let value = serde_json::from_str(&text)
                .map_err(|e| OrderlyError::Config(format!("rules are not valid JSON: {e}")))?;
            Some(rules_from_value(value)?)
        }
        None => None,
    };

    let apply = apply || settings.organization.default_mode == OrganizeMode::Auto;
    let organizer = Organizer::new(
        settings.organization,
        settings.duplicates.hash_algorithm,
        settings.scanning.chunk_size_bytes(),
    );

    if apply {
        let (sender, receiver) = EventChannel::new();
        let listener = spawn_progress(receiver);
        let report = organizer.auto_organize_with_events(
            &path,
            rules,
            catalog,
            &sender,
            &CancellationToken::new(),
        )?;
        drop(sender);
        let _ = listener.join();

        match output {
            OutputFormat::Json => print_json(&report)?,
            OutputFormat::Pretty => {
                println!(
                    "{} {} of {} files moved, {} failures",
                    style("Organized:").bold().green(),
                    report.moved.len(),
                    report.total,
                    report.failures
                );
                for entry in &report.moved {
                    println!("  {} -> {}", entry.from.display(), entry.to.display());
                }
            }
        }
    } else {
        let suggestions = organizer.suggest(&path, catalog)?;
        match output {
            OutputFormat::Json => print_json(&suggestions)?,
            OutputFormat::Pretty => {
                println!(
                    "{} {} cataloged files under {}",
                    style("Suggestions:").bold().cyan(),
                    suggestions.total_files,
                    path.display()
                );
                println!("  by category:");
                for (category, count) in &suggestions.by_category {
                    println!("    {category}: {count}");
                }
                println!("  by month:");
                for (month, count) in &suggestions.by_month {
                    println!("    {month}: {count}");
                }
                println!("  by name pattern:");
                for (pattern, count) in &suggestions.by_name_pattern {
                    println!("    {pattern}: {count}");
                }
            }
        }
    }
    Ok(())
}

fn run_rename(
    paths: Vec<PathBuf>,
    apply: bool,
    convention: Option<Convention>,
    settings: Settings,
    catalog: &Catalog,
) -> Result<()> {
    let mut organization = settings.organization;
    if let Some(convention) = convention {
        organization.naming_convention = convention.into();
    }

    let organizer = Organizer::new(
        organization,
        settings.duplicates.hash_algorithm,
        settings.scanning.chunk_size_bytes(),
    );

    if apply {
        let report = organizer.auto_rename(&paths, None, catalog)?;
        println!(
            "{} {} renamed, {} skipped, {} failures",
            style("Renamed:").bold().green(),
            report.renamed.len(),
            report.skipped,
            report.failures
        );
        for entry in &report.renamed {
            println!("  {} -> {}", entry.from.display(), entry.to.display());
        }
    } else {
        let suggestions = organizer.suggest_renames(&paths, catalog);
        if suggestions.is_empty() {
            println!("{}", style("Nothing to rename").green());
            return Ok(());
        }
        for suggestion in &suggestions {
            println!(
                "  {} -> {}",
                suggestion.original_name,
                style(&suggestion.suggested_name).cyan()
            );
        }
    }
    Ok(())
}

fn run_analyze(settings: Settings, catalog: &Catalog) -> Result<()> {
    let organizer = Organizer::new(
        settings.organization,
        settings.duplicates.hash_algorithm,
        settings.scanning.chunk_size_bytes(),
    );

    let report = organizer.analyze(catalog)?;
    println!(
        "{} {} files analyzed",
        style("Patterns:").bold().cyan(),
        report.files_analyzed
    );
    println!("  naming:");
    for (pattern, count) in &report.naming {
        println!("    {pattern}: {count}");
    }
    println!("  organization:");
    for (pattern, count) in &report.organization {
        println!("    {pattern}: {count}");
    }
    Ok(())
}

fn run_stats(output: OutputFormat, catalog: &Catalog) -> Result<()> {
    let stats = catalog.stats();
    match output {
        OutputFormat::Json => print_json(&stats)?,
        OutputFormat::Pretty => {
            println!(
                "{} {} files, {} bytes",
                style("Catalog:").bold().cyan(),
                catalog.len(),
                stats.total_size
            );
            for (category, category_stats) in &stats.by_category {
                println!(
                    "  {category}: {} files, {} bytes",
                    category_stats.count, category_stats.size
                );
            }
        }
    }
    Ok(())
}

fn run_export(to: Option<PathBuf>, catalog: &Catalog) -> Result<()> {
    let document = catalog.export_document();
    let text = serde_json::to_string_pretty(&document)
        .map_err(|e| OrderlyError::Config(e.to_string()))?;

    match to {
        Some(path) => {
            std::fs::write(&path, text)
                .map_err(|e| OrderlyError::Config(format!("cannot write {}: {e}", path.display())))?;
            println!(
                "{} {} files to {}",
                style("Exported").bold().green(),
                document.metadata.file_count,
                path.display()
            );
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn run_import(file: PathBuf, catalog: &Catalog) -> Result<()> {
    let text = std::fs::read_to_string(&file)
        .map_err(|e| OrderlyError::Config(format!("cannot read {}: {e}", file.display())))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| OrderlyError::Config(format!("document is not valid JSON: {e}")))?;

    catalog.import_document(value)?;

    let mut details = std::collections::BTreeMap::new();
    details.insert("source".to_string(), file.display().to_string());
    catalog.record_history(HistoryAction::Import, details);
    catalog.save()?;

    println!(
        "{} catalog replaced with {} files",
        style("Imported:").bold().green(),
        catalog.len()
    );
    Ok(())
}

fn run_history(limit: usize, catalog: &Catalog) -> Result<()> {
    let entries = catalog.history(limit);
    if entries.is_empty() {
        println!("{}", style("No history yet").dim());
        return Ok(());
    }

    for entry in entries {
        let details: Vec<String> = entry
            .details
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        println!(
            "{} {} {}",
            style(entry.timestamp).dim(),
            style(entry.action.as_str()).bold(),
            details.join(" ")
        );
    }
    Ok(())
}
