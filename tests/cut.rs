use anyhow::Result;
use svmlight_tools::ops::{CutOptions, FieldList, cut};
use svmlight_tools::testing::{SAMPLE, read_str};
use svmlight_tools::{Error, Row};

const SMALL: &str = "# 1: A\n# 2: B\n1 qid:10 1:2.0 2:4.0 # docno:d1\n0 qid:10 1:6.0 # docno:d2\n";

fn run(input: &str, fields: &str, renumber: bool) -> Result<String> {
    let mut out = Vec::new();
    let options = CutOptions::new(fields.parse()?).renumber(renumber);
    cut(input.as_bytes(), &mut out, &options, &mut ())?;
    Ok(String::from_utf8(out)?)
}

#[test]
fn cut_single_field_renumbered() -> Result<()> {
    assert_eq!(
        run(SMALL, "2", true)?,
        "# 1: B\n1 qid:10 1:4.0 # docno:d1\n0 qid:10 # docno:d2\n"
    );
    Ok(())
}

#[test]
fn cut_without_renumbering_keeps_ids() -> Result<()> {
    assert_eq!(
        run(SMALL, "2", false)?,
        "# 2: B\n1 qid:10 2:4.0 # docno:d1\n0 qid:10 # docno:d2\n"
    );
    Ok(())
}

#[test]
fn cut_ranges_and_opaque_preamble_lines() -> Result<()> {
    let input = format!("# Features in use\n{SAMPLE}");
    let out = run(&input, "2,4-5", true)?;
    let (preamble, rows) = read_str(&out)?;
    assert_eq!(preamble.lines()[0], "# Features in use");
    let names: Vec<String> = preamble.features().into_values().collect();
    assert_eq!(names, ["SentenceLocation()", "TermOverlap()", "SynonymOverlap()"]);
    assert_eq!(rows.len(), 6);
    assert!(rows.iter().all(|r| r.vector.keys().copied().eq(1..=3)));
    assert_eq!(rows[1].vector[&2], 0.25);
    assert_eq!(rows[1].vector[&3], 0.5);
    Ok(())
}

#[test]
fn cut_is_idempotent() -> Result<()> {
    let once = run(SAMPLE, "1,3,6", false)?;
    let twice = run(&once, "1,3,6", false)?;
    assert_eq!(once, twice);
    Ok(())
}

#[test]
fn cut_preserves_row_order_and_metadata() -> Result<()> {
    let out = run(SAMPLE, "6", true)?;
    let (_, cut_rows) = read_str(&out)?;
    let (_, rows) = read_str(SAMPLE)?;
    let meta = |rs: &[Row]| rs.iter().map(|r| r.meta.clone()).collect::<Vec<_>>();
    assert_eq!(meta(&cut_rows), meta(&rows));
    Ok(())
}

#[test]
fn cut_errors() -> Result<()> {
    let mut out = Vec::new();
    let empty = CutOptions::new(FieldList::default());
    assert!(matches!(
        cut(SMALL.as_bytes(), &mut out, &empty, &mut ()),
        Err(Error::NoFieldsSelected)
    ));

    let bad = "# 1: A\n1 qid:10 1:2.0 1:3.0 # docno:d1\n";
    let options = CutOptions::new(FieldList::new([1]));
    let err = cut(bad.as_bytes(), &mut out, &options, &mut ()).unwrap_err();
    assert!(matches!(err, Error::DuplicateFeatureId { line: 2, id: 1 }));

    Ok(())
}

#[test]
fn observer_sees_every_row() -> Result<()> {
    let mut seen = 0usize;
    let mut out = Vec::new();
    let options = CutOptions::new(FieldList::new([1]));
    cut(SAMPLE.as_bytes(), &mut out, &options, &mut |stage: &str, _row: &Row| {
        assert_eq!(stage, "cut");
        seen += 1;
    })?;
    assert_eq!(seen, 6);
    Ok(())
}

#[test]
fn cut_with_open_ended_range() -> Result<()> {
    let out = run(SAMPLE, "4-4294967295", true)?;
    let (preamble, rows) = read_str(&out)?;
    let names: Vec<String> = preamble.features().into_values().collect();
    assert_eq!(
        names,
        ["TermOverlap()", "SynonymOverlap()", "DirichletLanguageModelScore({'mu': 10.0})"]
    );
    assert_eq!(rows[0].vector.get(&3), Some(&-46.200555));
    assert!(rows.iter().all(|r| r.vector.len() == 3));
    Ok(())
}
