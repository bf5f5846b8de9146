//! Preamble codec: the leading `#` comment block of a vector file.
//!
//! Some preamble lines declare features (`# 3: TermOverlap()`); the rest are
//! opaque comments that format-preserving operations pass through unchanged.

use crate::record::FeatureId;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};
use std::iter::Peekable;
use std::sync::LazyLock;

static FEATURE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#\s*(\d+)\s*:\s*(\S.*?)\s*$").expect("valid feature line regex"));

/// Header line emitted in front of freshly numbered feature declarations.
pub const FEATURES_HEADER: &str = "# Features in use";

/// Ordered comment lines, stored without their line terminators.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Preamble {
    lines: Vec<String>,
}

/// Match a `# <id>: <name>` line. Ids must be positive.
pub fn parse_feature_line(line: &str) -> Option<(FeatureId, &str)> {
    let caps = FEATURE_LINE.captures(line)?;
    let id: FeatureId = caps.get(1)?.as_str().parse().ok()?;
    if id == 0 {
        return None;
    }
    Some((id, caps.get(2)?.as_str()))
}

impl Preamble {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Consume comment lines from `lines` up to (not including) the first
    /// non-comment line, which stays available to the caller.
    pub fn parse<I>(lines: &mut Peekable<I>) -> io::Result<Self>
    where
        I: Iterator<Item = io::Result<String>>,
    {
        let mut out = Vec::new();
        while let Some(Ok(line)) = lines.peek() {
            if !line.starts_with('#') {
                break;
            }
            if let Some(line) = lines.next().transpose()? {
                out.push(line);
            }
        }
        // An I/O error left on the iterator surfaces on the caller's next read.
        Ok(Self { lines: out })
    }

    /// A fresh preamble declaring `names` as features `1..=n`.
    pub fn from_features<S: ToString>(names: impl IntoIterator<Item = S>) -> Self {
        let mut lines = vec![FEATURES_HEADER.to_string()];
        lines.extend(
            names
                .into_iter()
                .enumerate()
                .map(|(i, name)| format!("# {}: {}", i + 1, name.to_string())),
        );
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The feature id to name mapping declared by this preamble.
    ///
    /// Later declarations of the same id win.
    pub fn features(&self) -> BTreeMap<FeatureId, String> {
        self.lines
            .iter()
            .filter_map(|l| parse_feature_line(l))
            .map(|(id, name)| (id, name.to_string()))
            .collect()
    }

    /// Keep declarations whose id is in `keep`, renumbered through `rename`.
    ///
    /// Lines that are not feature declarations pass through untouched. An id
    /// with no entry in `rename` keeps its original number.
    pub fn filter_and_renumber(
        &self,
        keep: &BTreeSet<FeatureId>,
        rename: &BTreeMap<FeatureId, FeatureId>,
    ) -> Self {
        let lines = self
            .lines
            .iter()
            .filter_map(|line| match parse_feature_line(line) {
                None => Some(line.clone()),
                Some((id, _)) if !keep.contains(&id) => None,
                Some((id, name)) => {
                    let new_id = rename.get(&id).copied().unwrap_or(id);
                    Some(format!("# {new_id}: {name}"))
                }
            })
            .collect();
        Self { lines }
    }

    /// Write every line followed by `\n`.
    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        for line in &self.lines {
            out.write_all(line.as_bytes())?;
            out.write_all(b"\n")?;
        }
        Ok(())
    }
}

impl From<Vec<String>> for Preamble {
    fn from(lines: Vec<String>) -> Self {
        Self::new(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<io::Result<String>> {
        text.lines().map(|l| Ok(l.to_string())).collect()
    }

    #[test]
    fn feature_line_shapes() {
        assert_eq!(parse_feature_line("# 1: A"), Some((1, "A")));
        assert_eq!(parse_feature_line("#12:B"), Some((12, "B")));
        assert_eq!(
            parse_feature_line("# 6: DirichletLanguageModelScore({'mu': 10.0})  "),
            Some((6, "DirichletLanguageModelScore({'mu': 10.0})"))
        );
        assert_eq!(parse_feature_line("# Features in use"), None);
        assert_eq!(parse_feature_line("# 0: zero"), None);
        assert_eq!(parse_feature_line("# 3:"), None);
    }

    #[test]
    fn parse_stops_at_first_data_line() {
        let mut it = lines("# a\n# 1: A\n1 qid:1 # docno:x\n# late").into_iter().peekable();
        let p = Preamble::parse(&mut it).unwrap();
        assert_eq!(p.lines(), &["# a".to_string(), "# 1: A".to_string()]);
        assert_eq!(it.next().unwrap().unwrap(), "1 qid:1 # docno:x");
    }

    #[test]
    fn filter_keeps_opaque_lines() {
        let p = Preamble::new(vec![
            "# generated by hand".into(),
            "# 1: A".into(),
            "# 2: B".into(),
            "# 3: C".into(),
        ]);
        let keep = BTreeSet::from([2, 3]);
        let rename = BTreeMap::from([(2, 1), (3, 2)]);
        let out = p.filter_and_renumber(&keep, &rename);
        assert_eq!(
            out.lines(),
            &["# generated by hand".to_string(), "# 1: B".into(), "# 2: C".into()]
        );
    }

    #[test]
    fn from_features_numbers_from_one() {
        let p = Preamble::from_features(["Len()", "Loc()"]);
        assert_eq!(p.lines()[0], FEATURES_HEADER);
        assert_eq!(p.features(), BTreeMap::from([(1, "Len()".into()), (2, "Loc()".into())]));
    }
}
