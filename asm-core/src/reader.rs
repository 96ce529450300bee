//! Buffered, case-normalising line source.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Error, Result};

/// Lines buffered ahead of the cursor.
pub const BUFFER_LINES: usize = 100;

/// Reads a source file line by line, lower-casing everything outside quoted
/// spans, and refilling an internal buffer in batches to amortise I/O.
pub struct LineReader {
    path: String,
    inner: BufReader<File>,
    buffer: VecDeque<String>,
    line_no: usize,
    exhausted: bool,
}

impl LineReader {
    pub fn open(path: &str) -> Result<Self> {
        if !Path::new(path).is_file() {
            return Err(Error::NotAFile(path.to_string()));
        }
        let file = File::open(path)?;
        let mut reader = Self {
            path: path.to_string(),
            inner: BufReader::new(file),
            buffer: VecDeque::with_capacity(BUFFER_LINES),
            line_no: 0,
            exhausted: false,
        };
        reader.refill()?;
        Ok(reader)
    }

    fn refill(&mut self) -> Result<()> {
        while self.buffer.len() < BUFFER_LINES && !self.exhausted {
            let mut raw = String::new();
            if self.inner.read_line(&mut raw)? == 0 {
                self.exhausted = true;
                break;
            }
            while raw.ends_with('\n') || raw.ends_with('\r') {
                raw.pop();
            }
            self.buffer.push_back(normalise_case(&raw));
        }
        Ok(())
    }

    /// Next line as owned text. Advances the line counter.
    pub fn read(&mut self) -> Result<String> {
        if self.buffer.is_empty() {
            self.refill()?;
        }
        let line = self
            .buffer
            .pop_front()
            .ok_or(Error::UnexpectedEnd("read past end of file"))?;
        self.line_no += 1;
        // Top up once drained so `eof` stays accurate at batch boundaries.
        if self.buffer.is_empty() {
            self.refill()?;
        }
        Ok(line)
    }

    /// True when the stream is exhausted and the buffer is drained.
    pub fn eof(&self) -> bool {
        self.exhausted && self.buffer.is_empty()
    }

    /// `(filename, line_number)` of the just-read line, 1-based.
    pub fn id(&self) -> (&str, usize) {
        (&self.path, self.line_no)
    }
}

/// Lower-case a line, preserving case inside balanced `'...'`/`"..."` spans.
fn normalise_case(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for ch in line.chars() {
        match quote {
            Some(closing) => {
                out.push(ch);
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == closing {
                    quote = None;
                }
            }
            None => {
                if escaped {
                    escaped = false;
                    out.push(ch.to_ascii_lowercase());
                } else if ch == '\\' {
                    escaped = true;
                    out.push(ch);
                } else if ch == '\'' || ch == '"' {
                    quote = Some(ch);
                    out.push(ch);
                } else {
                    out.push(ch.to_ascii_lowercase());
                }
            }
        }
    }
    out
}

// ----------------------------------------------------------------------------
