use crate::error::{Error, Result};
use crate::io::VectorSource;
use crate::observe::RowObserver;
use crate::reader::VectorReader;
use crate::record::{FeatureId, Row, Vector};
use crate::writer::write_row;
use log::{debug, warn};
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NormalizeMethod {
    /// `(v - min) / (max - min)` per qid and feature.
    #[default]
    MinMax,
}

impl FromStr for NormalizeMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "minmax" | "min-max" => Ok(Self::MinMax),
            other => Err(format!("unknown normalization method `{other}`")),
        }
    }
}

impl fmt::Display for NormalizeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("minmax")
    }
}

/// What to emit when every value of a feature within a qid is the same.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ZeroRangePolicy {
    /// Emit `0.0`.
    #[default]
    Zero,
    /// Leave the feature out of the row.
    Omit,
    /// Fail with [`Error::ZeroRange`].
    Error,
}

impl FromStr for ZeroRangePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "zero" => Ok(Self::Zero),
            "omit" | "skip" => Ok(Self::Omit),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown zero-range policy `{other}`")),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NormalizeOptions {
    pub method: NormalizeMethod,
    pub zero_range: ZeroRangePolicy,
}

/// Observed `(min, max)` per qid and feature id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ranges(HashMap<String, HashMap<FeatureId, (f64, f64)>>);

impl Ranges {
    pub fn observe(&mut self, row: &Row) {
        let group = self.0.entry(row.meta.qid.clone()).or_default();
        for (&id, &v) in &row.vector {
            group
                .entry(id)
                .and_modify(|(lo, hi)| {
                    *lo = lo.min(v);
                    *hi = hi.max(v);
                })
                .or_insert((v, v));
        }
    }

    pub fn get(&self, qid: &str, id: FeatureId) -> Option<(f64, f64)> {
        self.0.get(qid)?.get(&id).copied()
    }

    fn group(&self, qid: &str) -> Option<&HashMap<FeatureId, (f64, f64)>> {
        self.0.get(qid)
    }

    pub fn qid_count(&self) -> usize {
        self.0.len()
    }
}

/// First pass: per-qid feature ranges.
pub fn collect_ranges<S>(source: &S, observer: &mut dyn RowObserver) -> Result<Ranges>
where
    S: VectorSource + ?Sized,
{
    let mut ranges = Ranges::default();
    let mut count = 0;
    for row in VectorReader::new(source.open()?)?.rows() {
        let row = row?;
        observer.on_row("normalize pass 1", &row);
        ranges.observe(&row);
        count += 1;
    }
    observer.on_finish("normalize pass 1", count);
    debug!("normalize: ranges for {} qids", ranges.qid_count());
    Ok(ranges)
}

/// Rescale one row read from `line`; absent features stay absent.
pub fn rescale(row: &Row, line: usize, ranges: &Ranges, policy: ZeroRangePolicy) -> Result<Vector> {
    let group = ranges.group(row.qid()).ok_or_else(|| Error::UnknownQid {
        qid: row.meta.qid.clone(),
        line,
    })?;
    let mut out = Vector::new();
    for (&id, &v) in &row.vector {
        let &(lo, hi) = group.get(&id).ok_or_else(|| Error::MissingRange {
            qid: row.meta.qid.clone(),
            id,
            line,
        })?;
        if hi > lo {
            out.insert(id, (v - lo) / (hi - lo));
            continue;
        }
        match policy {
            ZeroRangePolicy::Zero => {
                out.insert(id, 0.0);
            }
            ZeroRangePolicy::Omit => {}
            ZeroRangePolicy::Error => {
                return Err(Error::ZeroRange {
                    qid: row.meta.qid.clone(),
                    id,
                });
            }
        }
    }
    Ok(out)
}

/// Min-max scale every feature within its qid group.
///
/// Reads `source` twice. The preamble is copied unchanged. Returns the number
/// of rows written.
pub fn normalize<S, W>(
    source: &S,
    out: &mut W,
    options: &NormalizeOptions,
    observer: &mut dyn RowObserver,
) -> Result<usize>
where
    S: VectorSource + ?Sized,
    W: Write + ?Sized,
{
    debug!(
        "normalize {} ({}, zero range: {:?})",
        source.describe(),
        options.method,
        options.zero_range
    );
    let ranges = collect_ranges(source, observer)?;

    let (preamble, records) = VectorReader::new(source.open()?)?.into_parts();
    preamble.write_to(out)?;

    let mut count = 0;
    let mut flat = 0;
    for record in records {
        let record = record?;
        let row = record.row;
        observer.on_row("normalize pass 2", &row);
        let vector = rescale(&row, record.line_no, &ranges, options.zero_range)?;
        flat += row.vector.len() - vector.len();
        write_row(out, &Row::new(vector, row.meta))?;
        count += 1;
    }
    if flat > 0 {
        warn!("normalize: omitted {flat} values with a zero range");
    }
    observer.on_finish("normalize pass 2", count);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Metadata;

    fn row(qid: &str, pairs: &[(FeatureId, f64)]) -> Row {
        Row::new(pairs.iter().copied().collect(), Metadata::new(qid, "d", 0))
    }

    #[test]
    fn ranges_are_per_qid() {
        let mut r = Ranges::default();
        r.observe(&row("a", &[(1, 2.0), (2, 5.0)]));
        r.observe(&row("a", &[(1, 6.0)]));
        r.observe(&row("b", &[(1, -1.0)]));
        assert_eq!(r.get("a", 1), Some((2.0, 6.0)));
        assert_eq!(r.get("a", 2), Some((5.0, 5.0)));
        assert_eq!(r.get("b", 1), Some((-1.0, -1.0)));
        assert_eq!(r.get("b", 2), None);
    }

    #[test]
    fn zero_range_policies() {
        let mut r = Ranges::default();
        let x = row("a", &[(1, 3.0), (2, 1.0)]);
        r.observe(&x);
        r.observe(&row("a", &[(1, 3.0), (2, 5.0)]));

        let zero = rescale(&x, 1, &r, ZeroRangePolicy::Zero).unwrap();
        assert_eq!(zero, Vector::from([(1, 0.0), (2, 0.0)]));
        let omit = rescale(&x, 1, &r, ZeroRangePolicy::Omit).unwrap();
        assert_eq!(omit, Vector::from([(2, 0.0)]));
        assert!(matches!(
            rescale(&x, 1, &r, ZeroRangePolicy::Error),
            Err(Error::ZeroRange { id: 1, .. })
        ));
    }

    #[test]
    fn unseen_qid_and_unseen_feature_are_distinct() {
        let mut r = Ranges::default();
        r.observe(&row("a", &[(1, 1.0)]));
        assert!(matches!(
            rescale(&row("b", &[(1, 1.0)]), 4, &r, ZeroRangePolicy::Zero),
            Err(Error::UnknownQid { line: 4, .. })
        ));
        assert!(matches!(
            rescale(&row("a", &[(1, 1.0), (2, 5.0)]), 5, &r, ZeroRangePolicy::Zero),
            Err(Error::MissingRange { id: 2, line: 5, .. })
        ));
        // A row with no features still needs a known qid.
        assert!(rescale(&row("a", &[]), 6, &r, ZeroRangePolicy::Zero).is_ok());
    }

    #[test]
    fn parses_names() {
        assert_eq!("MinMax".parse::<NormalizeMethod>(), Ok(NormalizeMethod::MinMax));
        assert_eq!("skip".parse::<ZeroRangePolicy>(), Ok(ZeroRangePolicy::Omit));
        assert!("zscore".parse::<NormalizeMethod>().is_err());
    }
}
