//! In-memory representation of labelled sparse feature vectors.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 1-based feature identifier.
pub type FeatureId = u32;

/// Sparse vector keyed by feature id.
///
/// A missing key means "no value", not zero. `BTreeMap` keeps ids in ascending
/// order, which is the order rows are serialized in.
pub type Vector = BTreeMap<FeatureId, f64>;

/// Per-row metadata: query id, document id, and relevance label.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Metadata {
    pub qid: String,
    pub docno: String,
    pub rel: i32,
}

impl Metadata {
    pub fn new(qid: impl Into<String>, docno: impl Into<String>, rel: i32) -> Self {
        Self {
            qid: qid.into(),
            docno: docno.into(),
            rel,
        }
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rel={} qid={} docno={}", self.rel, self.qid, self.docno)
    }
}

/// One labelled feature vector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub vector: Vector,
    pub meta: Metadata,
}

impl Row {
    pub fn new(vector: Vector, meta: Metadata) -> Self {
        Self { vector, meta }
    }

    #[inline]
    pub fn qid(&self) -> &str {
        &self.meta.qid
    }

    #[inline]
    pub fn docno(&self) -> &str {
        &self.meta.docno
    }

    #[inline]
    pub fn rel(&self) -> i32 {
        self.meta.rel
    }
}

/// Canonical single-line rendering (without the trailing newline).
impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = crate::line::Line {
            rel: self.meta.rel,
            qid: &self.meta.qid,
            vector: &self.vector,
            docno: &self.meta.docno,
        };
        fmt::Display::fmt(&line, f)
    }
}

/// A relevance judgment, used to drive columnwise output.
///
/// `passage` identifies a sentence or passage inside `docno`; when present the
/// written docno becomes `docno:passage`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Qrel {
    pub qid: String,
    pub docno: String,
    pub rel: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passage: Option<String>,
}

impl Qrel {
    pub fn new(qid: impl Into<String>, docno: impl Into<String>, rel: i32) -> Self {
        Self {
            qid: qid.into(),
            docno: docno.into(),
            rel,
            passage: None,
        }
    }

    #[must_use]
    pub fn with_passage(mut self, passage: impl Into<String>) -> Self {
        self.passage = Some(passage.into());
        self
    }

    /// The docno as it appears in the output comment.
    pub fn output_docno(&self) -> String {
        match &self.passage {
            Some(p) => format!("{}:{}", self.docno, p),
            None => self.docno.clone(),
        }
    }
}
