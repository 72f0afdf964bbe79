//! Code to parse the command line using `clap`, and definitions of the parsed
//! result

use clap::{CommandFactory, Parser};
use std::path::PathBuf;

use crate::set::Normalize;

/// Returns the parsed command line: the `Args` return value's `file` field is
/// the target file (if one was given), and the `options` field holds the flags.
#[must_use]
pub fn parsed() -> Args {
    Args::from(CliArgs::parse())
}

/// Prints the usage message shown when no target file is given.
pub fn print_usage() -> std::io::Result<()> {
    CliArgs::command().print_help()
}

/// `Args` contains the parsed command line.
#[derive(Debug)]
pub struct Args {
    /// `file` is the file new lines are appended to
    pub file: Option<PathBuf>,
    /// `options` collects the boolean flags
    pub options: Options,
}

/// The flags controlling what gets printed and whether the file is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Options {
    /// Don't print newly seen lines
    pub quiet: bool,
    /// Don't append anything to the file
    pub dry_run: bool,
    /// Print lines that were already seen
    pub wet_run: bool,
    /// Print lines that were already seen (same as `wet_run`)
    pub repeat: bool,
    /// Strip leading and trailing whitespace before comparing
    pub trim: bool,
}

impl Options {
    /// Should duplicate lines be printed? `wet_run` and `repeat` are aliases.
    #[must_use]
    pub fn shows_duplicates(&self) -> bool {
        self.wet_run || self.repeat
    }

    /// The normalization applied to every line before it's looked up
    #[must_use]
    pub fn normalize(&self) -> Normalize {
        if self.trim {
            Normalize::Trim
        } else {
            Normalize::Exact
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "ain", version, about)]
/// Append lines from standard input to FILE, unless FILE already has them
struct CliArgs {
    /// Quiet mode: don't print the new lines
    #[arg(short, long)]
    quiet: bool,
    /// Don't append anything to the file, just print the new lines
    #[arg(short, long)]
    dry_run: bool,
    /// Print the repeated lines
    #[arg(short = 's', long)]
    wet_run: bool,
    /// Trim leading and trailing whitespace before comparison
    #[arg(short, long)]
    trim: bool,
    /// Show the repeated lines
    #[arg(short, long)]
    repeat: bool,
    /// The file to deduplicate against and append to
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,
}

impl From<CliArgs> for Args {
    fn from(cli: CliArgs) -> Self {
        let CliArgs { quiet, dry_run, wet_run, trim, repeat, file } = cli;
        Args { file, options: Options { quiet, dry_run, wet_run, repeat, trim } }
    }
}
