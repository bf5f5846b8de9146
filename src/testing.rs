//! Fixtures and helpers for tests of vector file pipelines.
//!
//! ```
//! use svmlight_tools::testing::{SAMPLE, read_str};
//!
//! let (preamble, rows) = read_str(SAMPLE).unwrap();
//! assert_eq!(preamble.features().len(), 6);
//! assert_eq!(rows.len(), 6);
//! ```

use crate::error::Result;
use crate::preamble::Preamble;
use crate::reader::read_all;
use crate::record::{Metadata, Row, Vector};
use std::collections::BTreeMap;

/// Two queries, three sentences each, six features.
pub const SAMPLE: &str = "\
# 1: SentenceLength()
# 2: SentenceLocation()
# 3: ExactMatch()
# 4: TermOverlap()
# 5: SynonymOverlap()
# 6: DirichletLanguageModelScore({'mu': 10.0})
0 qid:701 1:18 2:0.002257 3:0 4:0 5:0.250000 6:-46.200555 # docno:GX268-35-11839875-701.1
0 qid:701 1:33 2:0.004515 3:0 4:0.250000 5:0.500000 6:-40.471454 # docno:GX268-35-11839875-701.2
0 qid:701 1:17 2:0.006772 3:0 4:0.250000 5:0.250000 6:-38.610001 # docno:GX268-35-11839875-701.3
0 qid:702 1:3 2:0.934884 3:0 4:0 5:0 6:-146.533603 # docno:GX267-05-8546339-702.201
0 qid:702 1:3 2:0.939535 3:0 4:0 5:0 6:-146.533603 # docno:GX267-05-8546339-702.202
0 qid:702 1:3 2:0.944186 3:0 4:0 5:0 6:-146.533603 # docno:GX267-05-8546339-702.203
";

/// The feature mapping declared by [`SAMPLE`].
pub fn sample_features() -> BTreeMap<u32, String> {
    [
        "SentenceLength()",
        "SentenceLocation()",
        "ExactMatch()",
        "TermOverlap()",
        "SynonymOverlap()",
        "DirichletLanguageModelScore({'mu': 10.0})",
    ]
    .into_iter()
    .zip(1..)
    .map(|(name, id)| (id, name.to_string()))
    .collect()
}

/// The rows of [`SAMPLE`], as parsed.
pub fn sample_rows() -> Vec<Row> {
    let data: [(&str, &str, [f64; 6]); 6] = [
        ("701", "GX268-35-11839875-701.1", [18.0, 0.002257, 0.0, 0.0, 0.25, -46.200555]),
        ("701", "GX268-35-11839875-701.2", [33.0, 0.004515, 0.0, 0.25, 0.5, -40.471454]),
        ("701", "GX268-35-11839875-701.3", [17.0, 0.006772, 0.0, 0.25, 0.25, -38.610001]),
        ("702", "GX267-05-8546339-702.201", [3.0, 0.934884, 0.0, 0.0, 0.0, -146.533603]),
        ("702", "GX267-05-8546339-702.202", [3.0, 0.939535, 0.0, 0.0, 0.0, -146.533603]),
        ("702", "GX267-05-8546339-702.203", [3.0, 0.944186, 0.0, 0.0, 0.0, -146.533603]),
    ];
    data.into_iter()
        .map(|(qid, docno, values)| {
            let vector: Vector = (1..).zip(values).collect();
            Row::new(vector, Metadata::new(qid, docno, 0))
        })
        .collect()
}

/// Parse a whole file held in memory.
pub fn read_str(text: &str) -> Result<(Preamble, Vec<Row>)> {
    read_all(text.as_bytes())
}

/// Parse a whole file written to a byte buffer.
pub fn read_bytes(bytes: &[u8]) -> Result<(Preamble, Vec<Row>)> {
    read_all(bytes)
}

/// Query ids in output order, consecutive duplicates collapsed.
pub fn qid_runs(rows: &[Row]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for row in rows {
        if out.last().map(String::as_str) != Some(row.qid()) {
            out.push(row.meta.qid.clone());
        }
    }
    out
}
