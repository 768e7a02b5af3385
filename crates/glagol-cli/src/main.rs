//! glagol - Inspect, extract and patch dialog text in binary .dlg files
//!
//! This tool finds the editable dialog text inside `.dlg` files, dumps it to a
//! plain text file for editing, and writes the edited text back in place
//! without moving any byte of the surrounding binary structure.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use glagol_core::analysis::{self, find_phrase};
use glagol_core::session::{backup_path, split_editable};
use glagol_core::{
    CodePage, DialogFile, DialogTree, HeuristicConfig, ReconcilePolicy, ScannerConfig,
    WriterConfig,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn, Level};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Inspect, extract and patch dialog text in binary .dlg files
#[derive(Parser, Debug)]
#[command(name = "glagol")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// TOML file overriding the built-in heuristic rules
    #[arg(long, global = true, env = "GLAGOL_RULES")]
    rules: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the text sections found in a file
    List {
        /// Dialog file to scan
        file: PathBuf,
    },

    /// Show the branch and choice structure of a file's dialog
    Tree {
        /// Dialog file to scan
        file: PathBuf,
    },

    /// Write the editable text of a file, one section per line
    Extract {
        /// Dialog file to scan
        file: PathBuf,

        /// Output text file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write edited text back into a dialog file
    Apply {
        /// Original dialog file
        file: PathBuf,

        /// Edited text file, one section per line
        text: PathBuf,

        /// Write to this path instead of overwriting the original
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Refuse to write if the line count differs from the section count
        #[arg(long)]
        strict: bool,

        /// Do not write a .bak copy before overwriting the original
        #[arg(long)]
        no_backup: bool,

        /// Show what would change without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Compare two files byte by byte
    Compare {
        /// Original file
        original: PathBuf,

        /// Modified file
        updated: PathBuf,

        /// Maximum number of differences to print (0 = unlimited)
        #[arg(long, default_value = "50")]
        limit: usize,
    },

    /// Show byte statistics and undecodable bytes
    Analyze {
        /// File to analyze
        file: PathBuf,

        /// Number of entries to print per table
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Search a directory of dialog files for a phrase
    Search {
        /// Directory to walk
        directory: PathBuf,

        /// Phrase to look for
        phrase: String,

        /// File extension to search
        #[arg(long, default_value = "dlg")]
        extension: String,

        /// Bytes of context around each match
        #[arg(long, default_value = "100")]
        context: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let rules = load_rules(cli.rules.as_deref())?;

    match &cli.command {
        Command::List { file } => list(file, &rules),
        Command::Tree { file } => tree(file, &rules),
        Command::Extract { file, output } => extract(file, output.as_deref(), &rules),
        Command::Apply {
            file,
            text,
            output,
            strict,
            no_backup,
            dry_run,
        } => {
            let options = ApplyOptions {
                output: output.as_deref(),
                strict: *strict,
                backup: !no_backup,
                dry_run: *dry_run,
            };
            apply(file, text, &options, &rules)
        }
        Command::Compare {
            original,
            updated,
            limit,
        } => compare(original, updated, *limit, &rules),
        Command::Analyze { file, limit } => analyze(file, *limit, &rules),
        Command::Search {
            directory,
            phrase,
            extension,
            context,
        } => search(directory, phrase, extension, *context, &rules),
    }
}

/// Loads the rules file, or the built-in rules
fn load_rules(path: Option<&Path>) -> Result<HeuristicConfig> {
    match path {
        Some(path) => {
            info!("Loading rules from {}", path.display());
            HeuristicConfig::from_path(path)
                .with_context(|| format!("Failed to load rules: {}", path.display()))
        }
        None => Ok(HeuristicConfig::default()),
    }
}

fn open(file: &Path, rules: &HeuristicConfig, writer: WriterConfig) -> Result<DialogFile> {
    if !file.is_file() {
        bail!("Input path is not a file: {}", file.display());
    }
    DialogFile::open_with(file, ScannerConfig::new().rules(rules.clone()), writer)
        .with_context(|| format!("Failed to load dialog file: {}", file.display()))
}

/// Short content hash (first 16 hex chars of blake3)
fn fingerprint(data: &[u8]) -> String {
    let hash = blake3::hash(data);
    hash.to_hex()[..16].to_string()
}

fn list(file: &Path, rules: &HeuristicConfig) -> Result<()> {
    let dialog = open(file, rules, WriterConfig::default())?;
    let report = dialog.report();

    println!(
        "{}  {} bytes  blake3:{}",
        file.display(),
        dialog.original().len(),
        fingerprint(dialog.original())
    );
    println!(
        "{} sections, {} runs rejected, {} protected bytes{}",
        report.sections,
        report.total_rejected(),
        report.protected_bytes,
        if report.used_fallback { " (fallback scan)" } else { "" }
    );
    for (stage, count) in &report.rejected {
        debug!("{}: {} rejected", stage, count);
    }
    if !report.learned_controls.is_empty() {
        let learned: String = report.learned_controls.iter().collect();
        info!("Learned control characters: {}", learned);
    }

    for (index, section) in dialog.sections().iter().enumerate() {
        let marker = if section.trailing_control.is_empty() {
            String::new()
        } else {
            format!("  [{}]", section.trailing_control)
        };
        println!(
            "{:>4}  {:#07x}..{:#07x}  {:>4}  {}{}",
            index + 1,
            section.start,
            section.end,
            section.capacity(),
            section.text,
            marker
        );
    }
    Ok(())
}

fn tree(file: &Path, rules: &HeuristicConfig) -> Result<()> {
    let dialog = open(file, rules, WriterConfig::default())?;
    let tree = DialogTree::from_sections(dialog.sections());
    if tree.is_empty() {
        println!("No dialog lines found in {}", file.display());
        return Ok(());
    }
    debug!(
        "{} branches, {} lines, {} control codes",
        tree.branches.len(),
        tree.line_count(),
        tree.codes().len()
    );
    print!("{}", tree);
    Ok(())
}

fn extract(file: &Path, output: Option<&Path>, rules: &HeuristicConfig) -> Result<()> {
    let dialog = open(file, rules, WriterConfig::default())?;
    let mut text = dialog.editable_text();
    text.push('\n');

    match output {
        Some(path) => {
            fs::write(path, &text)
                .with_context(|| format!("Failed to write text file: {}", path.display()))?;
            println!(
                "Extracted {} sections to {}",
                dialog.sections().len(),
                path.display()
            );
        }
        None => print!("{}", text),
    }
    Ok(())
}

struct ApplyOptions<'a> {
    output: Option<&'a Path>,
    strict: bool,
    backup: bool,
    dry_run: bool,
}

fn apply(file: &Path, text: &Path, options: &ApplyOptions<'_>, rules: &HeuristicConfig) -> Result<()> {
    let policy = if options.strict {
        ReconcilePolicy::Strict
    } else {
        ReconcilePolicy::BestEffort
    };
    let dialog = open(file, rules, WriterConfig::new().policy(policy))?;
    let edited = fs::read_to_string(text)
        .with_context(|| format!("Failed to read text file: {}", text.display()))?;

    if options.dry_run {
        let outcome = dialog
            .apply_texts(&split_editable(&edited))
            .context("Edited text does not fit the file")?;
        for warning in &outcome.warnings {
            println!("warning: {}", warning);
        }
        for index in &outcome.changed_sections {
            println!("Would rewrite section {}", index + 1);
        }
        return Ok(());
    }

    let overwriting = options.output.map_or(true, |out| out == file);
    if overwriting && options.backup {
        let backup = dialog
            .write_backup()
            .with_context(|| format!("Failed to write backup: {}", backup_path(file).display()))?;
        println!("Backed up to {}", backup.display());
    }

    let saved = dialog
        .save_with_updated_text(&edited, options.output)
        .with_context(|| format!("Failed to save {}", file.display()))?;
    for warning in &saved.write.warnings {
        println!("warning: {}", warning);
    }
    if !saved.unexpected.is_empty() {
        warn!(
            "{} byte(s) changed outside the edited sections",
            saved.unexpected.len()
        );
    }
    println!(
        "Rewrote {} of {} sections in {}",
        saved.write.changed_sections.len(),
        dialog.sections().len(),
        saved.path.display()
    );
    Ok(())
}

fn compare(original: &Path, updated: &Path, limit: usize, rules: &HeuristicConfig) -> Result<()> {
    let codepage = rules.codepage()?;
    let comparison = glagol_core::diff::compare_files(original, updated, &codepage)
        .context("Failed to compare files")?;

    if comparison.is_identical() {
        println!("Files are identical");
        return Ok(());
    }
    if comparison.size_differs() {
        println!(
            "File sizes differ: original={}, new={}",
            comparison.original_len, comparison.updated_len
        );
    }
    println!("{} differing byte(s)", comparison.differences.len());
    let shown = if limit == 0 {
        comparison.differences.len()
    } else {
        limit
    };
    for difference in comparison.differences.iter().take(shown) {
        println!("  {}", difference);
    }
    Ok(())
}

fn analyze(file: &Path, limit: usize, rules: &HeuristicConfig) -> Result<()> {
    let codepage = rules.codepage()?;
    let data = fs::read(file).with_context(|| format!("Failed to read input file: {}", file.display()))?;
    let report = analysis::analyze(&data, &codepage);

    println!("Total bytes: {}", report.total_bytes);
    println!("Distinct byte values: {}", report.distinct_bytes());
    println!("Most common bytes:");
    for (byte, count) in report.most_common(limit) {
        println!("  {:#04x}  {}", byte, count);
    }
    println!(
        "Undecodable in {}: {} position(s)",
        codepage.name(),
        report.undecodable.len()
    );
    for entry in report.undecodable.iter().take(limit) {
        println!("  {:#07x}: {:#04x} (context: {})", entry.offset, entry.byte, entry.context);
    }
    Ok(())
}

/// Returns true for visible files with the wanted extension
fn is_dialog_file(path: &Path, extension: &str) -> bool {
    let hidden = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false);
    !hidden
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

fn search(
    directory: &Path,
    phrase: &str,
    extension: &str,
    context: usize,
    rules: &HeuristicConfig,
) -> Result<()> {
    if !directory.is_dir() {
        bail!("Path is not a directory: {}", directory.display());
    }
    let codepage: CodePage = rules.codepage()?;
    if codepage.encode_strict(phrase).is_none() {
        bail!("Phrase cannot be encoded in {}", codepage.name());
    }

    info!("Searching {} for {:?}", directory.display(), phrase);
    let mut files = 0;
    let mut matches = 0;

    for entry in WalkDir::new(directory)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() || !is_dialog_file(path, extension) {
            continue;
        }
        files += 1;

        trace!("Reading {}", path.display());
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                // Log error but continue with other files
                warn!("Error reading {}: {}", path.display(), e);
                continue;
            }
        };

        for occurrence in find_phrase(&data, phrase, &codepage, context) {
            matches += 1;
            println!("{}:{:#x}", path.display(), occurrence.offset);
            println!("  {}", occurrence.context.replace('\0', " "));
        }
    }

    info!("Searched {} files", files);
    if matches == 0 {
        println!("No matches found.");
    }
    Ok(())
}
