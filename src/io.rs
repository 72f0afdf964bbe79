//! Input/Output structs and functions: reading the target file, streaming
//! standard input, and appending to the target file.
use anyhow::{Context, Result};
use bstr::io::BufReadExt;
use encoding_rs_io::{DecodeReaderBytes, DecodeReaderBytesBuilder};
use log::debug;
use memchr::memchr;

use crate::set::without_cr;
use std::{
    fs,
    fs::{File, OpenOptions},
    io,
    io::{BufReader, Read, Write},
    path::Path,
};

/// Returns the contents of the target file at `path`. A file we can't read
/// (most often because it doesn't exist yet) simply has no prior lines.
#[must_use]
pub fn read_target(path: &Path) -> Vec<u8> {
    match fs::read(path) {
        Ok(contents) => contents,
        Err(e) => {
            debug!("Can't read {}, starting with no prior lines: {e}", path.display());
            Vec::new()
        }
    }
}

/// What we need to know about the target file's existing contents in order to
/// read its lines and to append to it in a matching style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    bom: &'static [u8],             // Byte Order Mark or empty
    line_terminator: &'static [u8], // \n or \r\n
    unterminated: bool,             // last line has no line terminator
}

impl Default for Layout {
    fn default() -> Self {
        Layout { bom: b"", line_terminator: b"\n", unterminated: false }
    }
}

impl Layout {
    /// Examines `contents`:
    /// * `bom` is the (UTF-8) Byte Order Mark, or the empty string if
    ///   `contents` has none
    /// * `line_terminator` is `\r\n` if the first line of `contents` ends with
    ///   `\r\n`, and `\n` if the first line ends just with `\n` (or is the only
    ///   line in the file and has no line terminator).
    /// * `unterminated` is true if there is at least one byte after the BOM and
    ///   `contents` doesn't end with `\n`.
    #[must_use]
    pub fn of(contents: &[u8]) -> Self {
        let mut layout = Layout::default();
        if has_bom(contents) {
            layout.bom = BOM_BYTES;
        }
        if let Some(n) = memchr(b'\n', contents) {
            if n > 0 && contents[n - 1] == b'\r' {
                layout.line_terminator = b"\r\n";
            }
        }
        let body = layout.body(contents);
        layout.unterminated = !body.is_empty() && !body.ends_with(b"\n");
        layout
    }

    /// The part of `contents` after the Byte Order Mark, if any
    #[must_use]
    pub fn body<'data>(&self, contents: &'data [u8]) -> &'data [u8] {
        &contents[self.bom.len()..]
    }

    /// The line terminator used when appending and printing
    #[must_use]
    pub fn line_terminator(&self) -> &'static [u8] {
        self.line_terminator
    }
}

const BOM_0: u8 = b'\xEF';
const BOM_1: u8 = b'\xBB';
const BOM_2: u8 = b'\xBF';
const BOM_BYTES: &[u8] = b"\xEF\xBB\xBF";
/// Does `contents` begin with a (UTF-8) Byte Order Mark?
fn has_bom(contents: &[u8]) -> bool {
    contents.len() >= 3 && contents[0] == BOM_0 && contents[1] == BOM_1 && contents[2] == BOM_2
}

/// `Input` is the stream of candidate lines, normally standard input. It's a
/// buffered reader with the ability to decode UTF-16 input.
pub struct Input<R: Read> {
    reader: BufReader<DecodeReaderBytes<R, Vec<u8>>>,
}

impl<R: Read> Input<R> {
    /// Wraps `source` in a buffered, BOM-sniffing reader.
    pub fn new(source: R) -> Self {
        let reader = BufReader::new(
            DecodeReaderBytesBuilder::new()
                .bom_sniffing(true) // Look at the BOM to detect UTF-16 input and convert to UTF-8
                .strip_bom(true) // Remove the BOM before sending data to us
                .utf8_passthru(true) // Don't enforce UTF-8 (BOM or no BOM)
                .build(source),
        );
        Input { reader }
    }

    /// A convenience wrapper around `bstr::for_byte_line`. The closure is
    /// called with each line, minus its terminator, and the first error it
    /// returns stops the iteration. `bstr` leaves a `\r` on an unterminated
    /// last line, so we drop it here the way `set::lines_of` does.
    pub fn for_byte_line<F>(mut self, mut for_each_line: F) -> Result<()>
    where
        F: FnMut(&[u8]) -> io::Result<()>,
    {
        self.reader
            .for_byte_line(|line| {
                for_each_line(without_cr(line))?;
                Ok(true)
            })
            .context("Error processing input")?;
        Ok(())
    }
}

/// An `Appender` writes accepted lines to the target file, one `write_all`
/// call per line, with the file's own line terminator.
pub struct Appender<W: Write> {
    out: W,
    line_terminator: &'static [u8],
    needs_terminator: bool,
    buffer: Vec<u8>,
}

impl Appender<File> {
    /// Opens (creating it if necessary) the file at `path` for appending.
    pub fn open(path: &Path, layout: &Layout) -> Result<Appender<File>> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .with_context(|| format!("failed to open file for writing: {}", path.display()))?;
        Ok(Appender::new(file, layout))
    }
}

impl<W: Write> Appender<W> {
    /// Creates an `Appender` writing to `out`, which should be positioned just
    /// after the contents `layout` describes.
    pub fn new(out: W, layout: &Layout) -> Self {
        Appender {
            out,
            line_terminator: layout.line_terminator,
            needs_terminator: layout.unterminated,
            buffer: Vec::new(),
        }
    }

    /// Appends `line` and a line terminator. If the existing contents ended
    /// without a terminator, the first call supplies the missing one.
    pub fn append(&mut self, line: &[u8]) -> io::Result<()> {
        self.buffer.clear();
        if self.needs_terminator {
            self.buffer.extend_from_slice(self.line_terminator);
        }
        self.buffer.extend_from_slice(line);
        self.buffer.extend_from_slice(self.line_terminator);
        self.out.write_all(&self.buffer)?;
        self.needs_terminator = false;
        Ok(())
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

#[allow(clippy::pedantic)]
#[cfg(test)]
mod test {
    use super::*;
    use assert_fs::{prelude::*, TempDir};

    const UTF8_BOM: &str = "\u{FEFF}";

    #[test]
    fn utf8_bom_is_correct() {
        assert_eq!([BOM_0, BOM_1, BOM_2], UTF8_BOM.as_bytes());
    }

    fn to_utf_16le(source: &str) -> Vec<u8> {
        let mut result = b"\xff\xfe".to_vec();
        for b in source.as_bytes().iter() {
            result.push(*b);
            result.push(0);
        }
        result
    }

    fn to_utf_16be(source: &str) -> Vec<u8> {
        let mut result = b"\xfe\xff".to_vec();
        for b in source.as_bytes().iter() {
            result.push(0);
            result.push(*b);
        }
        result
    }

    fn input_lines(source: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        Input::new(source)
            .for_byte_line(|line| {
                lines.push(String::from_utf8(line.to_vec()).unwrap());
                Ok(())
            })
            .unwrap();
        lines
    }

    #[test]
    fn input_lines_lose_their_terminators() {
        assert_eq!(input_lines(b"a\r\nb\n\nc"), vec!["a", "b", "", "c"]);
    }

    #[test]
    fn a_carriage_return_at_end_of_input_is_a_terminator_too() {
        assert_eq!(input_lines(b"x\r\nx\r"), vec!["x", "x"]);
    }

    #[test]
    fn utf_16le_input_is_translated_to_utf8() {
        let source = to_utf_16le("The cute red crab\n jumps over the lazy blue gopher\n");
        assert_eq!(input_lines(&source), vec!["The cute red crab", " jumps over the lazy blue gopher"]);
    }

    #[test]
    fn utf_16be_input_is_translated_to_utf8() {
        let source = to_utf_16be("crab\ngopher\n");
        assert_eq!(input_lines(&source), vec!["crab", "gopher"]);
    }

    #[test]
    fn utf8_bom_is_stripped_from_input() {
        let source = UTF8_BOM.to_string() + "crab\n";
        assert_eq!(input_lines(source.as_bytes()), vec!["crab"]);
    }

    #[test]
    fn errors_from_the_closure_stop_the_input() {
        let mut seen = 0;
        let result = Input::new(&b"a\nb\nc\n"[..]).for_byte_line(|_| {
            seen += 1;
            Err(io::Error::new(io::ErrorKind::Other, "stop"))
        });
        assert!(result.is_err());
        assert_eq!(seen, 1);
    }

    #[test]
    fn layout_of_plain_contents() {
        let layout = Layout::of(b"a\nb\n");
        assert_eq!(layout, Layout::default());
    }

    #[test]
    fn layout_detects_bom_crlf_and_missing_terminator() {
        let contents = b"\xEF\xBB\xBFa\r\nb";
        let layout = Layout::of(contents);
        assert_eq!(layout.body(contents), b"a\r\nb");
        assert_eq!(layout.line_terminator(), b"\r\n");
        assert!(layout.unterminated);
    }

    #[test]
    fn a_bom_alone_is_not_an_unterminated_line() {
        assert!(!Layout::of(b"\xEF\xBB\xBF").unterminated);
        assert!(!Layout::of(b"").unterminated);
    }

    #[test]
    fn appender_uses_the_file_line_terminator() {
        let mut appender = Appender::new(Vec::new(), &Layout::of(b"a\r\n"));
        appender.append(b"b").unwrap();
        appender.append(b"c").unwrap();
        assert_eq!(appender.into_inner(), b"b\r\nc\r\n");
    }

    #[test]
    fn appender_terminates_an_unterminated_last_line_once() {
        let mut appender = Appender::new(Vec::new(), &Layout::of(b"a"));
        appender.append(b"b").unwrap();
        appender.append(b"c").unwrap();
        assert_eq!(appender.into_inner(), b"\nb\nc\n");
    }

    #[test]
    fn read_target_of_a_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        assert!(read_target(&temp.child("missing.txt").path()).is_empty());
    }

    #[test]
    fn open_creates_a_missing_file_and_appends() {
        let temp = TempDir::new().unwrap();
        let target = temp.child("new.txt");
        let mut appender = Appender::open(target.path(), &Layout::default()).unwrap();
        appender.append(b"x").unwrap();
        drop(appender);
        target.assert("x\n");
    }

    #[test]
    fn open_fails_for_a_directory() {
        let temp = TempDir::new().unwrap();
        let err = Appender::open(temp.path(), &Layout::default()).err().unwrap();
        assert!(err.to_string().starts_with("failed to open file for writing"));
    }
}
