use crate::error::Result;
use crate::observe::RowObserver;
use crate::random::SplitMix64;
use crate::reader::VectorReader;
use log::debug;
use std::collections::HashMap;
use std::io::{BufRead, Write};

#[derive(Clone, Copy, Debug, Default)]
pub struct ShuffleOptions {
    /// Fixed seed for a reproducible order; `None` draws one from entropy.
    pub seed: Option<u64>,
}

impl ShuffleOptions {
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }
}

/// Rows grouped by qid, groups in first-seen order, rows in file order.
struct QidGroups {
    index: HashMap<String, usize>,
    groups: Vec<(String, Vec<String>)>,
}

impl QidGroups {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            groups: Vec::new(),
        }
    }

    fn push(&mut self, qid: &str, line: String) {
        let slot = match self.index.get(qid) {
            Some(&i) => i,
            None => {
                self.index.insert(qid.to_string(), self.groups.len());
                self.groups.push((qid.to_string(), Vec::new()));
                self.groups.len() - 1
            }
        };
        self.groups[slot].1.push(line);
    }
}

/// Emit whole qid groups in random order.
///
/// All rows are buffered first. Groups are sorted by qid and then permuted,
/// so a given seed yields the same order regardless of input order. Rows keep
/// their original text and their relative order inside a group.
pub fn shuffle<R, W>(
    input: R,
    out: &mut W,
    options: &ShuffleOptions,
    observer: &mut dyn RowObserver,
) -> Result<usize>
where
    R: BufRead,
    W: Write + ?Sized,
{
    let (preamble, records) = VectorReader::new(input)?.into_parts();

    let mut buffer = QidGroups::new();
    let mut count = 0;
    for record in records {
        let record = record?;
        observer.on_row("shuffle", &record.row);
        buffer.push(&record.row.meta.qid, record.text);
        count += 1;
    }

    let mut groups = buffer.groups;
    groups.sort_by(|a, b| a.0.cmp(&b.0));
    SplitMix64::seeded_or_random(options.seed).shuffle(&mut groups);
    debug!("shuffle: {} rows in {} groups", count, groups.len());

    preamble.write_to(out)?;
    for (_, lines) in &groups {
        for line in lines {
            out.write_all(line.as_bytes())?;
            out.write_all(b"\n")?;
        }
    }
    observer.on_finish("shuffle", count);
    Ok(count)
}
