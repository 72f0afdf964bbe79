//! The `run` function is the kernel of the application: it loads the lines
//! already in the target file, then passes each line of input through a
//! `Deduplicator`, which prints and appends the ones not seen before. The
//! `args` module parses the command line, and the `io` module hides I/O
//! details.
//!
//! Current Limitations:
//! * A "line" is zero or more non-newline bytes followed by a newline (or the
//!   end of the input). UTF-16 input on stdin is translated to UTF-8, but the
//!   target file itself is always treated as UTF-8.
//! * Nothing stops another process from writing the target file while we run.

#![cfg_attr(debug_assertions, allow(dead_code, unused_imports))]
#![deny(unused_must_use)]
#![deny(clippy::all)]
#![allow(clippy::needless_return)]
#![deny(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![deny(missing_docs)]

use anyhow::Result;
use log::debug;
use std::io::{Read, Write};
use std::path::Path;

pub mod args;
pub mod dedup;
pub mod io;
pub mod set;

use crate::args::Options;
use crate::dedup::{Deduplicator, Summary};
use crate::io::{read_target, Appender, Input, Layout};
use crate::set::LineSet;

/// Deduplicates the lines of `input` against the file at `path`, printing to
/// `output` as `options` dictate. Unless `options.dry_run` is set, the file is
/// opened for appending (and created if missing) before any input is read;
/// failing to open it is the only fatal error besides I/O errors during the
/// run itself.
pub fn run(path: &Path, options: Options, input: impl Read, output: impl Write) -> Result<Summary> {
    let contents = read_target(path);
    let layout = Layout::of(&contents);
    let seen = LineSet::from_contents(layout.body(&contents), options.normalize());
    debug!("Loaded {} distinct lines from {}", seen.len(), path.display());
    drop(contents);

    let appender = if options.dry_run { None } else { Some(Appender::open(path, &layout)?) };
    let mut deduplicator = Deduplicator::new(seen, options, &layout);
    deduplicator.run(Input::new(input), output, appender)
}
