//! Line codec: one data row in the SVMLight ranking format.
//!
//! ```text
//! <rel> qid:<qid> <id>:<value> ... # docno:<docno> [anything else]
//! ```

use crate::error::{Error, Result};
use crate::record::{FeatureId, Metadata, Row, Vector};
use std::fmt;

const DOCNO_PREFIX: &str = "docno:";

fn malformed(line: usize, reason: &'static str, token: &str) -> Error {
    Error::MalformedRecord {
        line,
        reason,
        token: token.to_string(),
    }
}

/// Parse one data line. `line_no` is 1-based and only used for error reports.
pub fn parse_line(text: &str, line_no: usize) -> Result<Row> {
    let (body, comment) = text
        .split_once('#')
        .ok_or_else(|| malformed(line_no, "missing `#` separator", text))?;
    let mut tokens = body.split_whitespace();

    let label = tokens
        .next()
        .ok_or_else(|| malformed(line_no, "missing relevance label", body))?;
    let rel: i32 = label
        .parse()
        .map_err(|_| malformed(line_no, "relevance label is not an integer", label))?;

    let qid_token = tokens
        .next()
        .ok_or_else(|| malformed(line_no, "missing qid", body))?;
    let qid = qid_token
        .strip_prefix("qid:")
        .filter(|q| !q.is_empty())
        .ok_or_else(|| malformed(line_no, "expected `qid:<id>`", qid_token))?;

    let mut vector = Vector::new();
    for token in tokens {
        let (id, value) = parse_pair(token, line_no)?;
        if vector.insert(id, value).is_some() {
            return Err(Error::DuplicateFeatureId { line: line_no, id });
        }
    }

    let docno = docno_of(comment)
        .ok_or_else(|| malformed(line_no, "expected `docno:<id>` after `#`", comment))?;

    Ok(Row::new(vector, Metadata::new(qid, docno, rel)))
}

fn parse_pair(token: &str, line_no: usize) -> Result<(FeatureId, f64)> {
    let (id, value) = token
        .split_once(':')
        .ok_or_else(|| malformed(line_no, "expected `<id>:<value>`", token))?;
    let id: FeatureId = id
        .parse()
        .ok()
        .filter(|&id| id > 0)
        .ok_or_else(|| malformed(line_no, "feature id is not a positive integer", token))?;
    let value: f64 = value
        .parse()
        .map_err(|_| malformed(line_no, "feature value is not a number", token))?;
    Ok((id, value))
}

fn docno_of(comment: &str) -> Option<&str> {
    comment
        .split_whitespace()
        .next()?
        .strip_prefix(DOCNO_PREFIX)
        .filter(|d| !d.is_empty())
}

/// Everything after the first `#` of a data line, leading whitespace removed.
pub fn comment_of(text: &str) -> Option<&str> {
    text.split_once('#').map(|(_, c)| c.trim_start())
}

/// A row in its canonical text form, without the trailing newline.
///
/// Ids are written in ascending order. Values use their shortest round-trip
/// form, always with a fractional part or exponent (`4.0`, `0.25`, `1e-7`).
pub struct Line<'a> {
    pub rel: i32,
    pub qid: &'a str,
    pub vector: &'a Vector,
    pub docno: &'a str,
}

impl fmt::Display for Line<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} qid:{}", self.rel, self.qid)?;
        for (id, value) in self.vector {
            write!(f, " {id}:{value:?}")?;
        }
        write!(f, " # {DOCNO_PREFIX}{}", self.docno)
    }
}

/// [`Line`] as an owned string.
pub fn serialize(rel: i32, qid: &str, vector: &Vector, docno: &str) -> String {
    Line {
        rel,
        qid,
        vector,
        docno,
    }
    .to_string()
}
