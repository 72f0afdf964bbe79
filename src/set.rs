//! Provides the `LineSet` structure, initialized from the contents of the
//! target file and grown as new lines arrive.
use bstr::ByteSlice;
use fxhash::FxBuildHasher;
use indexmap::IndexSet;
use memchr::memchr;

/// How a line is transformed before it's compared, stored, and printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Normalize {
    /// Use the line as is
    #[default]
    Exact,
    /// Strip leading and trailing (Unicode) whitespace
    Trim,
}

impl Normalize {
    /// Returns the normalized form of `line`
    #[must_use]
    pub fn apply(self, line: &[u8]) -> &[u8] {
        match self {
            Normalize::Exact => line,
            Normalize::Trim => line.trim(),
        }
    }
}

/// A `LineSet` is the set of (normalized) lines seen so far, from the target
/// file or from earlier in the current run. Only membership matters.
#[derive(Debug, Default)]
pub struct LineSet {
    set: IndexSet<Vec<u8>, FxBuildHasher>,
}

impl LineSet {
    /// Creates a `LineSet` holding every line of `contents`, each normalized
    /// with `normalize`.
    #[must_use]
    pub fn from_contents(contents: &[u8], normalize: Normalize) -> Self {
        let mut lines = LineSet::default();
        for line in lines_of(contents) {
            lines.insert(normalize.apply(line));
        }
        lines
    }

    /// Inserts `line`, returning `true` if it wasn't already present. We look
    /// before inserting so that a duplicate never costs an allocation.
    pub fn insert(&mut self, line: &[u8]) -> bool {
        if self.set.contains(line) {
            return false;
        }
        self.set.insert(line.to_vec())
    }

    /// Is `line` in the set?
    #[must_use]
    pub fn contains(&self, line: &[u8]) -> bool {
        self.set.contains(line)
    }

    /// The number of distinct lines in the set
    #[must_use]
    pub fn len(&self) -> usize {
        self.set.len()
    }

    /// Is the set empty?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    #[cfg(test)]
    fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.set.iter().map(Vec::as_slice)
    }
}

/// Returns an iterator over the lines of `slice`. A line ends with `\n` or
/// `\r\n`, and the terminator isn't part of the line. The last line needn't
/// have a terminator, but a `\r` ending it is still dropped.
pub fn lines_of(slice: &[u8]) -> impl Iterator<Item = &[u8]> {
    Lines { rest: slice }
}

/// Drops one trailing `\r` from `line`. Both the target file and the input
/// split lines with this rule, so a line read back from the file is the same
/// line that was appended.
#[must_use]
pub fn without_cr(line: &[u8]) -> &[u8] {
    match line.last() {
        Some(&b'\r') => &line[..line.len() - 1],
        _ => line,
    }
}

struct Lines<'data> {
    rest: &'data [u8],
}

impl<'data> Iterator for Lines<'data> {
    type Item = &'data [u8];
    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let line = match memchr(b'\n', self.rest) {
            Some(end) => {
                let (line, rest) = self.rest.split_at(end);
                self.rest = &rest[1..];
                line
            }
            None => std::mem::take(&mut self.rest),
        };
        Some(without_cr(line))
    }
}
