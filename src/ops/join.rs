use crate::error::{Error, Result};
use crate::observe::RowObserver;
use crate::preamble::Preamble;
use crate::reader::{Record, Records, VectorReader};
use crate::record::{FeatureId, Row, Vector};
use crate::writer::write_row;
use log::debug;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};

/// Per-input id translation plus the merged feature names, in output id order.
fn merged_features(preambles: &[Preamble]) -> (Vec<BTreeMap<FeatureId, FeatureId>>, Vec<String>) {
    let mut names = Vec::new();
    let translations = preambles
        .iter()
        .map(|p| {
            p.features()
                .into_iter()
                .map(|(id, name)| {
                    names.push(name);
                    (id, names.len() as FeatureId)
                })
                .collect()
        })
        .collect();
    (translations, names)
}

/// Merge parallel exports of the same rows into one file.
///
/// Every input must hold the same rows in the same order (same qid, relevance
/// and docno at each position); only the features differ. Features are
/// renumbered `1..` in input order, then by original id within each input.
/// Returns the number of rows written.
pub fn join<R, W>(inputs: Vec<R>, out: &mut W, observer: &mut dyn RowObserver) -> Result<usize>
where
    R: BufRead,
    W: Write + ?Sized,
{
    if inputs.len() < 2 {
        return Err(Error::TooFewInputs(inputs.len()));
    }

    let mut preambles = Vec::with_capacity(inputs.len());
    let mut streams: Vec<Records<R>> = Vec::with_capacity(inputs.len());
    for input in inputs {
        let (preamble, records) = VectorReader::new(input)?.into_parts();
        preambles.push(preamble);
        streams.push(records);
    }
    let (translations, names) = merged_features(&preambles);
    debug!(
        "join: {} inputs, {} merged features",
        streams.len(),
        names.len()
    );
    Preamble::from_features(&names).write_to(out)?;

    let mut step = 0;
    loop {
        let batch = streams
            .iter_mut()
            .map(|s| s.next().transpose())
            .collect::<Result<Vec<Option<Record>>>>()?;

        let exhausted: Vec<usize> = batch
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.is_none().then_some(i))
            .collect();
        if exhausted.len() == batch.len() {
            break;
        }
        if !exhausted.is_empty() {
            return Err(Error::StreamLengthMismatch { step, exhausted });
        }

        let records: Vec<Record> = batch.into_iter().flatten().collect();
        let row = merge_step(step, &records, &translations)?;
        observer.on_row("join", &row);
        write_row(out, &row)?;
        step += 1;
    }
    observer.on_finish("join", step);
    Ok(step)
}

fn merge_step(
    step: usize,
    records: &[Record],
    translations: &[BTreeMap<FeatureId, FeatureId>],
) -> Result<Row> {
    let meta = &records[0].row.meta;
    let mut vector = Vector::new();
    for (input, (record, trans)) in records.iter().zip(translations).enumerate() {
        if record.row.meta != *meta {
            return Err(Error::MetadataMismatch {
                step,
                input,
                expected: meta.to_string(),
                found: record.row.meta.to_string(),
            });
        }
        for (id, &value) in &record.row.vector {
            let new_id = trans.get(id).ok_or(Error::UndeclaredFeature {
                input,
                line: record.line_no,
                id: *id,
            })?;
            vector.insert(*new_id, value);
        }
    }
    Ok(Row::new(vector, meta.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translation_is_contiguous_in_input_order() {
        let a = Preamble::new(vec!["# 2: B".into(), "# 1: A".into()]);
        let b = Preamble::new(vec!["# x".into(), "# 5: E".into()]);
        let (trans, names) = merged_features(&[a, b]);
        assert_eq!(trans[0], BTreeMap::from([(1, 1), (2, 2)]));
        assert_eq!(trans[1], BTreeMap::from([(5, 3)]));
        assert_eq!(names, vec!["A", "B", "E"]);
    }

    #[test]
    fn needs_two_inputs() {
        let mut out = Vec::new();
        let err = join(vec!["# 1: A\n".as_bytes()], &mut out, &mut ()).unwrap_err();
        assert!(matches!(err, Error::TooFewInputs(1)));
    }
}
