//! Error taxonomy shared by every codec and operation.
//!
//! All variants are fatal for the operation that raised them: nothing in this
//! crate skips a bad row and carries on.

use crate::record::FeatureId;
use std::path::Path;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while reading, transforming, or writing vector files.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A data line violates the row grammar.
    #[error("malformed record at line {line}: {reason} (near `{token}`)")]
    MalformedRecord {
        line: usize,
        reason: &'static str,
        token: String,
    },

    /// The same feature id appears twice within one row.
    #[error("duplicate feature id {id} at line {line}")]
    DuplicateFeatureId { line: usize, id: FeatureId },

    /// A row references a feature id that its input's preamble does not declare.
    #[error("input #{input} line {line}: feature id {id} is not declared in the preamble")]
    UndeclaredFeature {
        input: usize,
        line: usize,
        id: FeatureId,
    },

    /// Columnwise input with inconsistent dimensions.
    #[error("shape mismatch: {what} has length {found}, expected {expected}")]
    ShapeMismatch {
        what: String,
        expected: usize,
        found: usize,
    },

    /// Some `join` inputs ran out of rows before the others.
    #[error("join inputs have different lengths: inputs {exhausted:?} ended at row {step}")]
    StreamLengthMismatch { step: usize, exhausted: Vec<usize> },

    /// Parallel `join` rows disagree on qid, relevance, or docno.
    #[error("join metadata mismatch at row {step}: input #{input} has {found}, expected {expected}")]
    MetadataMismatch {
        step: usize,
        input: usize,
        expected: String,
        found: String,
    },

    /// `cut` was asked to keep nothing.
    #[error("no fields selected")]
    NoFieldsSelected,

    /// A `cut` field list could not be parsed.
    #[error("invalid field list: {0}")]
    InvalidFieldList(String),

    #[error("number of folds must be at least 1, got {0}")]
    InvalidFoldCount(usize),

    #[error("join needs at least two inputs, got {0}")]
    TooFewInputs(usize),

    /// Min-max scaling hit a feature whose values are all equal within a query.
    #[error("feature {id} has a zero value range in qid {qid}")]
    ZeroRange { qid: String, id: FeatureId },

    /// A qid showed up in the second pass that the first pass never saw.
    #[error("qid {qid} at line {line} was not present in the first pass")]
    UnknownQid { qid: String, line: usize },

    /// A feature showed up in the second pass that the first pass never saw
    /// for this qid.
    #[error("feature {id} of qid {qid} at line {line} was not present in the first pass")]
    MissingRange {
        qid: String,
        id: FeatureId,
        line: usize,
    },

    /// I/O failure with the path or step that caused it.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O failure without extra context (e.g. writing to a caller's sink).
    #[error(transparent)]
    Stream(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn at_path(action: &str, path: &Path, source: std::io::Error) -> Self {
        Self::io(format!("{action} {}", path.display()), source)
    }
}
