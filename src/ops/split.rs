use crate::error::{Error, Result};
use crate::io::{AtomicOutput, VectorSource};
use crate::observe::RowObserver;
use crate::random::SplitMix64;
use crate::reader::VectorReader;
use log::{debug, info};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug)]
pub struct SplitOptions {
    /// Number of folds, at least 1.
    pub k: usize,
    /// Shuffle qids before slicing them into folds.
    pub random: bool,
    /// Also produce a training output per fold (all other folds' rows).
    pub complete: bool,
    /// Seed for `random`; `None` draws one from entropy.
    pub seed: Option<u64>,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            k: 5,
            random: false,
            complete: false,
            seed: None,
        }
    }
}

impl SplitOptions {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn random(mut self, seed: Option<u64>) -> Self {
        self.random = true;
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn complete(mut self, complete: bool) -> Self {
        self.complete = complete;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FoldRole {
    Test,
    Training,
}

impl fmt::Display for FoldRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FoldRole::Test => "test",
            FoldRole::Training => "training",
        })
    }
}

/// qid to fold mapping for one `split` run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FoldAssignment {
    k: usize,
    /// qids of each fold, in assignment order.
    folds: Vec<Vec<String>>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl FoldAssignment {
    /// Slice `qids` into `k` contiguous chunks. The first `len % k` chunks get
    /// one extra qid, so chunk sizes differ by at most one.
    ///
    /// Chunks of a fixed `ceil(len / k)` would leave the last fold short
    /// (10 qids in 4 folds: 3,3,3,1). Balanced chunks give 3,3,2,2, so for
    /// the same input a qid near the end can land one fold earlier than with
    /// fixed-size slicing.
    pub fn new(qids: Vec<String>, k: usize) -> Result<Self> {
        if k == 0 {
            return Err(Error::InvalidFoldCount(k));
        }
        let (base, extra) = (qids.len() / k, qids.len() % k);
        let mut folds = Vec::with_capacity(k);
        let mut index = HashMap::with_capacity(qids.len());
        let mut rest = qids.into_iter();
        for fold in 0..k {
            let size = base + usize::from(fold < extra);
            let chunk: Vec<String> = rest.by_ref().take(size).collect();
            for qid in &chunk {
                index.insert(qid.clone(), fold);
            }
            folds.push(chunk);
        }
        Ok(Self { k, folds, index })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn fold_of(&self, qid: &str) -> Option<usize> {
        self.index.get(qid).copied()
    }

    pub fn qids(&self, fold: usize) -> &[String] {
        self.folds.get(fold).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn fold_sizes(&self) -> Vec<usize> {
        self.folds.iter().map(Vec::len).collect()
    }
}

/// First pass: collect distinct qids (first-seen order, optionally shuffled)
/// and assign folds.
pub fn assign_folds<S>(
    source: &S,
    options: &SplitOptions,
    observer: &mut dyn RowObserver,
) -> Result<FoldAssignment>
where
    S: VectorSource + ?Sized,
{
    if options.k == 0 {
        return Err(Error::InvalidFoldCount(options.k));
    }
    let mut seen = HashSet::new();
    let mut qids = Vec::new();
    let mut count = 0;
    for row in VectorReader::new(source.open()?)?.rows() {
        let row = row?;
        observer.on_row("split pass 1", &row);
        count += 1;
        if seen.insert(row.meta.qid.clone()) {
            qids.push(row.meta.qid);
        }
    }
    observer.on_finish("split pass 1", count);

    if options.random {
        SplitMix64::seeded_or_random(options.seed).shuffle(&mut qids);
    }
    let assignment = FoldAssignment::new(qids, options.k)?;
    info!(
        "split {}: {} qids into folds of sizes {:?}",
        source.describe(),
        seen.len(),
        assignment.fold_sizes()
    );
    Ok(assignment)
}

/// Outputs produced by [`split`]. `training` is empty unless `complete` was set.
pub struct FoldWriters<W> {
    pub test: Vec<W>,
    pub training: Vec<W>,
}

/// Split `source` into `k` query-disjoint folds.
///
/// Folds are balanced contiguous slices of the qid list (see
/// [`FoldAssignment::new`]), not fixed `ceil(n / k)` slices.
///
/// `open(fold, role)` is called once per output (folds are 0-based) before any
/// row is written. Every output starts with the input preamble. Each row goes
/// to its fold's test output and, when `complete`, to every other fold's
/// training output, keeping its original text.
pub fn split<S, W, F>(
    source: &S,
    options: &SplitOptions,
    mut open: F,
    observer: &mut dyn RowObserver,
) -> Result<(FoldAssignment, FoldWriters<W>)>
where
    S: VectorSource + ?Sized,
    W: Write,
    F: FnMut(usize, FoldRole) -> Result<W>,
{
    let assignment = assign_folds(source, options, observer)?;
    let k = assignment.k();

    let (preamble, records) = VectorReader::new(source.open()?)?.into_parts();
    let test = (0..k)
        .map(|fold| open(fold, FoldRole::Test))
        .collect::<Result<Vec<W>>>()?;
    let training = if options.complete {
        (0..k)
            .map(|fold| open(fold, FoldRole::Training))
            .collect::<Result<Vec<W>>>()?
    } else {
        Vec::new()
    };
    let mut writers = FoldWriters { test, training };
    for out in writers.test.iter_mut().chain(writers.training.iter_mut()) {
        preamble.write_to(out)?;
    }

    let mut count = 0;
    for record in records {
        let record = record?;
        observer.on_row("split pass 2", &record.row);
        let fold = assignment
            .fold_of(record.row.qid())
            .ok_or_else(|| Error::UnknownQid {
                qid: record.row.meta.qid.clone(),
                line: record.line_no,
            })?;
        let line = record.text.as_bytes();
        write_line(&mut writers.test[fold], line)?;
        for (other, out) in writers.training.iter_mut().enumerate() {
            if other != fold {
                write_line(out, line)?;
            }
        }
        count += 1;
    }
    observer.on_finish("split pass 2", count);
    debug!("split: routed {count} rows");
    Ok((assignment, writers))
}

fn write_line<W: Write>(out: &mut W, line: &[u8]) -> Result<()> {
    out.write_all(line)?;
    out.write_all(b"\n")?;
    Ok(())
}

/// `{prefix}.fold-{n}_{role}` with a 1-based fold number.
pub fn fold_path(prefix: impl AsRef<Path>, fold: usize, role: FoldRole) -> PathBuf {
    let mut name = prefix.as_ref().as_os_str().to_owned();
    name.push(format!(".fold-{}_{role}", fold + 1));
    PathBuf::from(name)
}

/// [`split`] a file into `{prefix}.fold-{n}_test` (and `_training`) files.
///
/// No output file appears unless the whole split succeeds.
pub fn split_files(
    input: &Path,
    prefix: impl AsRef<Path>,
    options: &SplitOptions,
    observer: &mut dyn RowObserver,
) -> Result<FoldAssignment> {
    let prefix = prefix.as_ref();
    let (assignment, writers) = split(
        input,
        options,
        |fold, role| AtomicOutput::create(fold_path(prefix, fold, role)),
        observer,
    )?;
    for out in writers.test.into_iter().chain(writers.training) {
        out.commit()?;
    }
    Ok(assignment)
}
