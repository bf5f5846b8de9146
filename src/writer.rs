//! Row-major and columnwise writers.

use crate::error::{Error, Result};
use crate::line::Line;
use crate::preamble::Preamble;
use crate::record::{FeatureId, Qrel, Row, Vector};
use std::fmt::Display;
use std::io::Write;

/// Write `# Features in use` followed by `# <id>: <name>` for ids `1..=n`.
pub fn write_preamble<W, D>(out: &mut W, features: &[D]) -> Result<()>
where
    W: Write + ?Sized,
    D: Display,
{
    Preamble::from_features(features).write_to(out)?;
    Ok(())
}

/// Write one row followed by `\n`.
pub fn write_row<W: Write + ?Sized>(out: &mut W, row: &Row) -> Result<()> {
    write_parts(out, row.meta.rel, &row.meta.qid, &row.vector, &row.meta.docno)
}

pub(crate) fn write_parts<W: Write + ?Sized>(
    out: &mut W,
    rel: i32,
    qid: &str,
    vector: &Vector,
    docno: &str,
) -> Result<()> {
    let line = Line {
        rel,
        qid,
        vector,
        docno,
    };
    writeln!(out, "{line}")?;
    Ok(())
}

/// Write vectors supplied one feature column at a time.
///
/// `columns[j][i]` is the value of feature `j + 1` for `qrels[i]`. Output rows
/// follow `qrels` order. Dimensions are checked before anything is written.
pub fn write_columnwise<W, D>(
    out: &mut W,
    features: &[D],
    columns: &[Vec<f64>],
    qrels: &[Qrel],
) -> Result<usize>
where
    W: Write + ?Sized,
    D: Display,
{
    if columns.len() != features.len() {
        return Err(Error::ShapeMismatch {
            what: "column list".into(),
            expected: features.len(),
            found: columns.len(),
        });
    }
    if let Some((j, column)) = columns
        .iter()
        .enumerate()
        .find(|(_, c)| c.len() != qrels.len())
    {
        return Err(Error::ShapeMismatch {
            what: format!("column {} ({})", j + 1, features[j]),
            expected: qrels.len(),
            found: column.len(),
        });
    }

    write_preamble(out, features)?;
    let mut vector = Vector::new();
    for (i, qrel) in qrels.iter().enumerate() {
        vector.clear();
        vector.extend(
            columns
                .iter()
                .enumerate()
                .map(|(j, column)| ((j + 1) as FeatureId, column[i])),
        );
        write_parts(out, qrel.rel, &qrel.qid, &vector, &qrel.output_docno())?;
    }
    log::debug!(
        "wrote {} rows x {} features columnwise",
        qrels.len(),
        features.len()
    );
    Ok(qrels.len())
}
