use anyhow::Result;
use svmlight_tools::Error;
use svmlight_tools::ops::{CutOptions, FieldList, cut, join};
use svmlight_tools::testing::{SAMPLE, read_bytes, read_str};

const LEFT: &str = "\
# 1: A
# 2: B
1 qid:1 1:0.5 2:2.0 # docno:a
0 qid:1 2:3.0 # docno:b
";

const RIGHT: &str = "\
# Features in use
# 1: C
1 qid:1 1:7.0 # docno:a
0 qid:1 # docno:b
";

fn run(inputs: &[&str]) -> svmlight_tools::Result<String> {
    let mut out = Vec::new();
    join(inputs.iter().map(|s| s.as_bytes()).collect(), &mut out, &mut ())?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

#[test]
fn join_two_files() -> Result<()> {
    assert_eq!(
        run(&[LEFT, RIGHT])?,
        "# Features in use\n# 1: A\n# 2: B\n# 3: C\n\
         1 qid:1 1:0.5 2:2.0 3:7.0 # docno:a\n\
         0 qid:1 2:3.0 # docno:b\n"
    );
    Ok(())
}

#[test]
fn join_then_cut_recovers_first_input() -> Result<()> {
    let other = "# 1: Extra\n# 2: More\n\
        0 qid:701 1:1 # docno:GX268-35-11839875-701.1\n\
        0 qid:701 2:2 # docno:GX268-35-11839875-701.2\n\
        0 qid:701 # docno:GX268-35-11839875-701.3\n\
        0 qid:702 1:1 2:1 # docno:GX267-05-8546339-702.201\n\
        0 qid:702 # docno:GX267-05-8546339-702.202\n\
        0 qid:702 # docno:GX267-05-8546339-702.203\n";
    let joined = run(&[SAMPLE, other])?;
    let (preamble, rows) = read_str(&joined)?;
    assert_eq!(preamble.features().len(), 8);
    assert_eq!(rows[3].vector.get(&7), Some(&1.0));
    assert_eq!(rows[3].vector.get(&8), Some(&1.0));

    let mut out = Vec::new();
    let options = CutOptions::new("1-6".parse::<FieldList>()?);
    cut(joined.as_bytes(), &mut out, &options, &mut ())?;
    let (cut_preamble, cut_rows) = read_bytes(&out)?;
    let (sample_preamble, sample_rows) = read_str(SAMPLE)?;
    assert_eq!(cut_preamble.features(), sample_preamble.features());
    assert_eq!(cut_rows, sample_rows);
    Ok(())
}

#[test]
fn join_rejects_mismatched_rows() {
    let other = RIGHT.replace("docno:b", "docno:z");
    match run(&[LEFT, other.as_str()]) {
        Err(Error::MetadataMismatch {
            step,
            input,
            expected,
            found,
        }) => {
            assert_eq!((step, input), (1, 1));
            assert!(expected.contains("docno=b"), "{expected}");
            assert!(found.contains("docno=z"), "{found}");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn join_rejects_unequal_lengths() {
    let short = "# 1: C\n1 qid:1 1:7.0 # docno:a\n";
    match run(&[LEFT, short, LEFT]) {
        Err(Error::StreamLengthMismatch { step, exhausted }) => {
            assert_eq!(step, 1);
            assert_eq!(exhausted, vec![1]);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn join_rejects_undeclared_ids() {
    let undeclared = "# 1: C\n1 qid:1 4:7.0 # docno:a\n0 qid:1 # docno:b\n";
    assert!(matches!(
        run(&[LEFT, undeclared]),
        Err(Error::UndeclaredFeature {
            input: 1,
            line: 2,
            id: 4
        })
    ));
}

#[test]
fn join_empty_inputs() -> Result<()> {
    assert_eq!(
        run(&["# 1: A\n", "# 1: B\n"])?,
        "# Features in use\n# 1: A\n# 2: B\n"
    );
    Ok(())
}
