//! Houses the `Deduplicator`, which decides for each incoming line whether it's
//! new, and routes it to the output and the target file accordingly.
use anyhow::{Context, Result};
use std::io::{self, Read, Write};

use crate::args::Options;
use crate::io::{Appender, Input, Layout};
use crate::set::LineSet;

/// The classification of one incoming line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Not seen before: it's now in the set and (unless in dry-run) the file
    New,
    /// Already in the file, or earlier in the input
    Duplicate,
}

/// Counts of what happened during a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Lines seen for the first time
    pub new: usize,
    /// Lines that were already present
    pub duplicates: usize,
}

/// A `Deduplicator` owns the set of lines seen so far. Once a normalized line
/// is in the set it's never appended or reported as new again.
pub struct Deduplicator {
    seen: LineSet,
    options: Options,
    line_terminator: &'static [u8],
    summary: Summary,
}

impl Deduplicator {
    /// Creates a `Deduplicator` whose prior lines are `seen`. Printed lines end
    /// with `layout`'s line terminator.
    #[must_use]
    pub fn new(seen: LineSet, options: Options, layout: &Layout) -> Self {
        Deduplicator {
            seen,
            options,
            line_terminator: layout.line_terminator(),
            summary: Summary::default(),
        }
    }

    /// Classifies `line` and acts on the verdict:
    ///
    /// * A `New` line is added to the set, printed to `output` unless
    ///   `quiet`, and appended via `appender` when there is one.
    /// * A `Duplicate` is printed only if `wet_run` or `repeat` is set.
    pub fn feed<O: Write, A: Write>(
        &mut self,
        line: &[u8],
        output: &mut O,
        appender: Option<&mut Appender<A>>,
    ) -> io::Result<Verdict> {
        let line = self.options.normalize().apply(line);

        if !self.seen.insert(line) {
            self.summary.duplicates += 1;
            if self.options.shows_duplicates() {
                self.print(line, output)?;
            }
            return Ok(Verdict::Duplicate);
        }

        self.summary.new += 1;
        if !self.options.quiet {
            self.print(line, output)?;
        }
        if let Some(appender) = appender {
            appender.append(line)?;
        }
        Ok(Verdict::New)
    }

    /// Feeds every line of `input` through `feed`, then flushes `output`.
    /// Pass `None` for `appender` to leave the file alone (dry-run).
    pub fn run<R: Read, O: Write, A: Write>(
        &mut self,
        input: Input<R>,
        mut output: O,
        mut appender: Option<Appender<A>>,
    ) -> Result<Summary> {
        input.for_byte_line(|line| {
            self.feed(line, &mut output, appender.as_mut())?;
            Ok(())
        })?;
        output.flush().context("Error writing output")?;
        Ok(self.summary)
    }

    fn print(&self, line: &[u8], output: &mut impl Write) -> io::Result<()> {
        output.write_all(line)?;
        output.write_all(self.line_terminator)
    }
}
