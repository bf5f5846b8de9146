//! Stream reader: raw lines in, preamble plus a lazy row sequence out.
//!
//! The row sequence is single pass. Reading stops at the first malformed line;
//! callers that need a second pass reopen their source (see
//! [`VectorSource`](crate::io::VectorSource)).

use crate::error::{Error, Result};
use crate::line::parse_line;
use crate::preamble::Preamble;
use crate::record::Row;
use std::io::{BufRead, Lines};
use std::iter::Peekable;

/// A parsed data line together with its original text.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// 1-based line number in the input, preamble included.
    pub line_no: usize,
    pub text: String,
    pub row: Row,
}

impl Record {
    /// Text after the `#` marker, as written in the input.
    pub fn comment(&self) -> &str {
        crate::line::comment_of(&self.text).unwrap_or_default()
    }
}

/// Reader over one vector file.
pub struct VectorReader<R: BufRead> {
    preamble: Preamble,
    records: Records<R>,
}

impl<R: BufRead> VectorReader<R> {
    /// Read the preamble and position the reader on the first data line.
    pub fn new(reader: R) -> Result<Self> {
        let mut lines = reader.lines().peekable();
        let preamble =
            Preamble::parse(&mut lines).map_err(|e| Error::io("read preamble", e))?;
        let records = Records {
            line_no: preamble.len(),
            lines,
            failed: false,
        };
        Ok(Self { preamble, records })
    }

    pub fn preamble(&self) -> &Preamble {
        &self.preamble
    }

    pub fn into_parts(self) -> (Preamble, Records<R>) {
        (self.preamble, self.records)
    }

    pub fn records(self) -> Records<R> {
        self.records
    }

    pub fn rows(self) -> Rows<R> {
        Rows(self.records)
    }
}

/// Iterator over [`Record`]s. Yields at most one error, then stops.
pub struct Records<R: BufRead> {
    line_no: usize,
    lines: Peekable<Lines<R>>,
    failed: bool,
}

impl<R: BufRead> Records<R> {
    pub fn rows(self) -> Rows<R> {
        Rows(self)
    }

    /// Line number of the last line read.
    pub fn line_no(&self) -> usize {
        self.line_no
    }
}

impl<R: BufRead> Iterator for Records<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            let text = match self.lines.next()? {
                Ok(text) => text,
                Err(e) => {
                    self.failed = true;
                    let line = self.line_no + 1;
                    return Some(Err(Error::io(format!("read line {line}"), e)));
                }
            };
            self.line_no += 1;
            if text.trim().is_empty() {
                continue;
            }
            let parsed = parse_line(&text, self.line_no);
            self.failed = parsed.is_err();
            return Some(parsed.map(|row| Record {
                line_no: self.line_no,
                text,
                row,
            }));
        }
    }
}

/// Iterator over parsed [`Row`]s.
pub struct Rows<R: BufRead>(Records<R>);

impl<R: BufRead> Iterator for Rows<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|r| r.map(|rec| rec.row))
    }
}

/// Read a whole stream into memory.
pub fn read_all<R: BufRead>(reader: R) -> Result<(Preamble, Vec<Row>)> {
    let (preamble, records) = VectorReader::new(reader)?.into_parts();
    let rows = records.rows().collect::<Result<Vec<_>>>()?;
    Ok((preamble, rows))
}
