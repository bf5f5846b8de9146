//! # svmlight-tools
//!
//! Streaming tools for **query-grouped sparse feature vectors** in the SVMLight
//! ranking format, as used to train and evaluate learning-to-rank models.
//!
//! ## File Format
//!
//! ```text
//! # Features in use
//! # 1: SentenceLength()
//! # 2: TermOverlap()
//! 1 qid:701 1:18.0 2:0.25 # docno:GX268-35-11839875-701.1
//! 0 qid:701 1:33.0 # docno:GX268-35-11839875-701.2
//! ```
//!
//! - A leading block of `#` comments (the **preamble**); lines shaped
//!   `# <id>: <name>` declare features, anything else is kept verbatim.
//! - One row per line: relevance label, `qid:`, sparse `id:value` pairs, and a
//!   `# docno:` comment. A missing id means "no value", not zero.
//! - Rows of one query are contiguous.
//!
//! ## Quick Start
//!
//! ```
//! use svmlight_tools::ops::{CutOptions, cut};
//! # fn main() -> svmlight_tools::Result<()> {
//! let input = "# 1: A\n# 2: B\n1 qid:10 1:2.0 2:4.0 # docno:d1\n0 qid:10 1:6.0 # docno:d2\n";
//! let mut out = Vec::new();
//! let options = CutOptions::new("2".parse()?).renumber(true);
//! cut(input.as_bytes(), &mut out, &options, &mut ())?;
//! assert_eq!(
//!     String::from_utf8_lossy(&out),
//!     "# 1: B\n1 qid:10 1:4.0 # docno:d1\n0 qid:10 # docno:d2\n"
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Operations
//!
//! - [`describe`](ops::describe) - print the preamble
//! - [`cut`](ops::cut) - select (and renumber) features
//! - [`join`](ops::join) - merge parallel files feature-wise
//! - [`shuffle`](ops::shuffle) - randomize query order, keeping groups intact
//! - [`split`](ops::split) - query-disjoint cross-validation folds
//! - [`normalize`](ops::normalize) - per-query min-max scaling
//!
//! Vectors computed one feature at a time are written with
//! [`write_columnwise`](writer::write_columnwise).
//!
//! ## I/O
//!
//! Inputs ending in `.gz`, `.bz2`, `.zst` or `.xz` are decompressed
//! transparently (see [`io::compression`]). Two-pass operations take a
//! [`VectorSource`](io::VectorSource) so they can reopen their input; file
//! outputs go through [`AtomicOutput`](io::AtomicOutput) and only appear once
//! complete.
//!
//! ## Module Overview
//!
//! - [`record`] - rows, metadata, qrels
//! - [`preamble`] / [`line`] - the two halves of the text codec
//! - [`reader`] / [`writer`] - streaming input and output
//! - [`ops`] - the transformations
//! - [`observe`] - progress callbacks
//! - [`testing`] - fixtures for tests

pub mod error;
pub mod io;
pub mod line;
pub mod observe;
pub mod ops;
pub mod preamble;
pub mod random;
pub mod reader;
pub mod record;
pub mod testing;
pub mod writer;

pub use error::{Error, Result};
pub use io::{AtomicOutput, VectorSource};
pub use observe::{CountProgress, RowObserver};
pub use preamble::Preamble;
pub use reader::{Record, VectorReader, read_all};
pub use record::{FeatureId, Metadata, Qrel, Row, Vector};
pub use writer::{write_columnwise, write_preamble, write_row};
