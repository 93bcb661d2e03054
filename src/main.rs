//! Linewise - a line-oriented text file inspector and editor.
//!
//! # Usage
//!
//! ```bash
//! linewise info script.txt
//! linewise find script.txt "echo *"
//! linewise insert script.txt --line 5 --text 'echo "Hello"' --output script.new
//! linewise remove script.txt "echo *" --output script.new
//! ```

use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use linewise::buffer::DEFAULT_MAX_LINE_LEN;
use linewise::config::{
    clear_config_flags, global_config_path, load_config_flags, local_override_path,
    save_config_flags, ConfigFlags,
};
use linewise::pattern::CaseSensitivity;
use linewise::record::FileRecord;

/// A line-oriented text file inspector and editor
#[derive(Parser, Debug)]
#[command(name = "linewise", version, about, long_about = None)]
struct Cli {
    /// Match patterns case-insensitively
    #[arg(short, long, global = true)]
    ignore_case: bool,

    /// Cap on line length in characters; longer lines are truncated at load
    #[arg(long, value_name = "CHARS", global = true)]
    max_line_len: Option<usize>,

    /// Save the current flags as defaults in the config file
    #[arg(long)]
    save_defaults: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear_defaults: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show file information and the full line listing
    Info {
        /// File to inspect
        file: PathBuf,
    },
    /// Find the first line matching a wildcard pattern
    Find {
        /// File to search
        file: PathBuf,
        /// Pattern to match (* and ? wildcards)
        pattern: String,
    },
    /// Insert a line at a position
    Insert {
        /// File to edit
        file: PathBuf,
        /// 1-based position; one past the last line appends
        #[arg(short, long)]
        line: usize,
        /// Text of the new line
        #[arg(short, long)]
        text: String,
        /// Write the result here instead of standard output
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete the line at a position
    Delete {
        /// File to edit
        file: PathBuf,
        /// 1-based position of the line to delete
        #[arg(short, long)]
        line: usize,
        /// Write the result here instead of standard output
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Remove the first line matching a wildcard pattern
    Remove {
        /// File to edit
        file: PathBuf,
        /// Pattern to match (* and ? wildcards)
        pattern: String,
        /// Write the result here instead of standard output
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace a line, addressed by position or by pattern
    Replace {
        /// File to edit
        file: PathBuf,
        /// Replacement text
        #[arg(short, long)]
        text: String,
        /// 1-based position of the line to replace
        #[arg(short, long)]
        line: Option<usize>,
        /// Pattern selecting the line to replace
        #[arg(short, long)]
        pattern: Option<String>,
        /// Write the result here instead of standard output
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Save the file to a new destination
    Save {
        /// File to save
        file: PathBuf,
        /// Destination path
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = ConfigFlags {
        ignore_case: cli.ignore_case,
        max_line_len: cli.max_line_len,
    };

    if cli.clear_defaults {
        clear_config_flags(&global_path)?;
    }
    if cli.save_defaults {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear_defaults {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    let case = CaseSensitivity::from_ignore_case(effective.ignore_case);
    let max_line_len = effective.max_line_len.unwrap_or(DEFAULT_MAX_LINE_LEN);

    run(cli.command, case, max_line_len).context("Command failed")
}

fn run(command: Command, case: CaseSensitivity, max_line_len: usize) -> Result<()> {
    match command {
        Command::Info { file } => {
            let record = load(&file, max_line_len)?;
            print!("{}", record.info());
        }
        Command::Find { file, pattern } => {
            let record = load(&file, max_line_len)?;
            // "Not found" is the answer, not a failure.
            match record.buffer()?.find(&pattern, case) {
                Some((position, line)) => {
                    println!("Found at line {position}: {}", line.text());
                }
                None => println!("Pattern not found"),
            }
        }
        Command::Insert {
            file,
            line,
            text,
            output,
        } => {
            let mut record = load(&file, max_line_len)?;
            record.buffer_mut()?.insert(line, &text)?;
            eprintln!("Line inserted");
            emit(&record, output.as_deref())?;
        }
        Command::Delete { file, line, output } => {
            let mut record = load(&file, max_line_len)?;
            record.buffer_mut()?.delete_at(line)?;
            eprintln!("Line deleted");
            emit(&record, output.as_deref())?;
        }
        Command::Remove {
            file,
            pattern,
            output,
        } => {
            let mut record = load(&file, max_line_len)?;
            let position = record.buffer_mut()?.delete_first_matching(&pattern, case)?;
            eprintln!("Line {position} removed");
            emit(&record, output.as_deref())?;
        }
        Command::Replace {
            file,
            text,
            line,
            pattern,
            output,
        } => {
            let mut record = load(&file, max_line_len)?;
            let buffer = record.buffer_mut()?;
            // --line wins when both are given.
            if let Some(position) = line {
                buffer.replace_at(position, &text)?;
            } else if let Some(pattern) = pattern {
                buffer.replace_first_matching(&pattern, case, &text)?;
            } else {
                anyhow::bail!("replace needs --line or --pattern");
            }
            eprintln!("Line replaced");
            emit(&record, output.as_deref())?;
        }
        Command::Save { file, output } => {
            let record = load(&file, max_line_len)?;
            record
                .save(&output)
                .with_context(|| format!("Failed to save {}", output.display()))?;
            println!("File saved to {}", output.display());
        }
    }
    Ok(())
}

fn load(path: &Path, max_line_len: usize) -> Result<FileRecord> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    FileRecord::load_with_max_line_len(path, max_line_len)
        .with_context(|| format!("Could not analyze file {}", path.display()))
}

/// Write the mutated record to `--output` when given, standard output
/// otherwise. The input file is never modified in place.
fn emit(record: &FileRecord, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            record
                .save(path)
                .with_context(|| format!("Failed to save {}", path.display()))?;
            eprintln!("Saved to {}", path.display());
        }
        None => {
            std::io::stdout()
                .write_all(&record.to_bytes())
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}
