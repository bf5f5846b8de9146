use crate::error::{Error, Result};
use crate::observe::RowObserver;
use crate::reader::VectorReader;
use crate::record::{FeatureId, Row, Vector};
use crate::writer::write_row;
use log::debug;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::{BufRead, Write};
use std::str::FromStr;

/// A set of feature ids, written as `1,3,5-7`.
///
/// Held as sorted, disjoint inclusive ranges, so `1-4294967295` is one entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldList(Vec<(FeatureId, FeatureId)>);

impl FieldList {
    /// Zero is not a feature id and is ignored.
    pub fn new(ids: impl IntoIterator<Item = FeatureId>) -> Self {
        Self::from_ranges(ids.into_iter().filter(|&id| id > 0).map(|id| (id, id)).collect())
    }

    fn from_ranges(mut ranges: Vec<(FeatureId, FeatureId)>) -> Self {
        ranges.sort_unstable();
        let mut merged: Vec<(FeatureId, FeatureId)> = Vec::with_capacity(ranges.len());
        for (lo, hi) in ranges {
            match merged.last_mut() {
                Some(last) if lo <= last.1.saturating_add(1) => last.1 = last.1.max(hi),
                _ => merged.push((lo, hi)),
            }
        }
        Self(merged)
    }

    pub fn ranges(&self) -> &[(FeatureId, FeatureId)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of selected ids.
    pub fn len(&self) -> u64 {
        self.0.iter().map(|&(lo, hi)| u64::from(hi - lo) + 1).sum()
    }

    pub fn contains(&self, id: FeatureId) -> bool {
        self.position(id).is_some()
    }

    /// 1-based rank of `id` among the selected ids.
    pub fn position(&self, id: FeatureId) -> Option<FeatureId> {
        let mut before: FeatureId = 0;
        for &(lo, hi) in &self.0 {
            if id < lo {
                return None;
            }
            if id <= hi {
                return Some(before + (id - lo) + 1);
            }
            before += hi - lo + 1;
        }
        None
    }

    /// Output id of `id`, or `None` if it is not selected. With `renumber`,
    /// selected ids become `1..=n` in ascending order.
    pub fn target(&self, id: FeatureId, renumber: bool) -> Option<FeatureId> {
        self.position(id).map(|n| if renumber { n } else { id })
    }
}

fn parse_id(s: &str, list: &str) -> Result<FeatureId> {
    s.trim()
        .parse::<FeatureId>()
        .ok()
        .filter(|&id| id > 0)
        .ok_or_else(|| Error::InvalidFieldList(format!("`{s}` in `{list}` is not a positive id")))
}

impl FromStr for FieldList {
    type Err = Error;

    fn from_str(list: &str) -> Result<Self> {
        let mut ranges = Vec::new();
        for part in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.split_once('-') {
                Some((lo, hi)) => {
                    let (lo, hi) = (parse_id(lo, list)?, parse_id(hi, list)?);
                    if lo > hi {
                        return Err(Error::InvalidFieldList(format!(
                            "range `{part}` in `{list}` is reversed"
                        )));
                    }
                    ranges.push((lo, hi));
                }
                None => {
                    let id = parse_id(part, list)?;
                    ranges.push((id, id));
                }
            }
        }
        Ok(Self::from_ranges(ranges))
    }
}

impl fmt::Display for FieldList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, &(lo, hi)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            if lo == hi {
                write!(f, "{lo}")?;
            } else {
                write!(f, "{lo}-{hi}")?;
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct CutOptions {
    pub fields: FieldList,
    pub renumber: bool,
}

impl CutOptions {
    pub fn new(fields: FieldList) -> Self {
        Self {
            fields,
            renumber: false,
        }
    }

    #[must_use]
    pub fn renumber(mut self, renumber: bool) -> Self {
        self.renumber = renumber;
        self
    }
}

/// Keep the features of `vector` selected by `fields`, under their output ids.
pub fn select(vector: &Vector, fields: &FieldList, renumber: bool) -> Vector {
    vector
        .iter()
        .filter_map(|(&id, &v)| fields.target(id, renumber).map(|new| (new, v)))
        .collect()
}

/// Write only the selected features of every row, optionally renumbered.
///
/// Selected ids a row lacks are simply left out of that row. Returns the
/// number of rows written.
pub fn cut<R, W>(
    input: R,
    out: &mut W,
    options: &CutOptions,
    observer: &mut dyn RowObserver,
) -> Result<usize>
where
    R: BufRead,
    W: Write + ?Sized,
{
    if options.fields.is_empty() {
        return Err(Error::NoFieldsSelected);
    }
    let (fields, renumber) = (&options.fields, options.renumber);
    debug!(
        "cut: keeping fields {} (renumber: {})",
        options.fields, options.renumber
    );

    let (preamble, rows) = VectorReader::new(input)?.into_parts();
    // Only declared ids need an entry; the selection itself may be huge.
    let rename: BTreeMap<FeatureId, FeatureId> = preamble
        .features()
        .into_keys()
        .filter_map(|id| fields.target(id, renumber).map(|new| (id, new)))
        .collect();
    let keep: BTreeSet<FeatureId> = rename.keys().copied().collect();
    preamble.filter_and_renumber(&keep, &rename).write_to(out)?;

    let mut count = 0;
    for row in rows.rows() {
        let row = row?;
        observer.on_row("cut", &row);
        write_row(out, &Row::new(select(&row.vector, fields, renumber), row.meta))?;
        count += 1;
    }
    observer.on_finish("cut", count);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_lists() {
        let f: FieldList = "1, 3-5,9".parse().unwrap();
        assert_eq!(f.ranges(), &[(1, 1), (3, 5), (9, 9)]);
        assert_eq!(f.len(), 5);
        assert_eq!(f.to_string(), "1,3-5,9");
        let merged: FieldList = "4-8,3,1,6-7,9".parse().unwrap();
        assert_eq!(merged.to_string(), "1,3-9");
        assert!("".parse::<FieldList>().unwrap().is_empty());
        for bad in ["0", "a", "5-3", "1-", "2-x"] {
            assert!(
                matches!(bad.parse::<FieldList>(), Err(Error::InvalidFieldList(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn renumbers_in_id_order() {
        let f = FieldList::new([7, 2, 4]);
        let renumbered: Vec<_> = [2, 4, 7, 5].iter().map(|&id| f.target(id, true)).collect();
        assert_eq!(renumbered, vec![Some(1), Some(2), Some(3), None]);
        assert_eq!(f.target(7, false), Some(7));
        assert_eq!(f.target(0, false), None);
    }

    #[test]
    fn full_id_range_is_cheap() {
        let f: FieldList = "1-4294967295".parse().unwrap();
        assert_eq!(f.ranges().len(), 1);
        assert_eq!(f.len(), u64::from(u32::MAX));
        assert_eq!(f.position(u32::MAX), Some(u32::MAX));

        let g: FieldList = "2,10-4294967295".parse().unwrap();
        assert_eq!(g.position(10), Some(2));
        assert_eq!(g.position(u32::MAX), Some(u32::MAX - 8));
        assert!(!g.contains(5));
    }

    #[test]
    fn empty_selection_fails_before_reading() {
        let mut out = Vec::new();
        let err = cut("garbage".as_bytes(), &mut out, &CutOptions::default(), &mut ()).unwrap_err();
        assert!(matches!(err, Error::NoFieldsSelected));
        assert!(out.is_empty());
    }
}
