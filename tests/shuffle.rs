use anyhow::Result;
use std::collections::BTreeMap;
use svmlight_tools::ops::{ShuffleOptions, shuffle};
use svmlight_tools::testing::{qid_runs, read_bytes};

/// 20 queries with 3 rows each, the first row carrying a trailing comment.
fn many_queries() -> String {
    let mut text = String::from("# 1: A\n# 2: B\n");
    for q in 0..20 {
        for d in 0..3 {
            let extra = if d == 0 { " first" } else { "" };
            text.push_str(&format!(
                "{} qid:{q} 1:{d} 2:{q}.5 # docno:q{q}d{d}{extra}\n",
                d % 2
            ));
        }
    }
    text
}

fn run(input: &str, seed: u64) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let n = shuffle(input.as_bytes(), &mut out, &ShuffleOptions::seeded(seed), &mut ())?;
    assert_eq!(n, 60);
    Ok(out)
}

#[test]
fn same_seed_same_output() -> Result<()> {
    let input = many_queries();
    assert_eq!(run(&input, 42)?, run(&input, 42)?);
    Ok(())
}

#[test]
fn groups_stay_whole_and_ordered() -> Result<()> {
    let input = many_queries();
    let (_, original) = read_bytes(input.as_bytes())?;
    let group = |rows: &[svmlight_tools::Row]| {
        let mut by_qid: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for row in rows {
            by_qid
                .entry(row.meta.qid.clone())
                .or_default()
                .push(row.meta.docno.clone());
        }
        by_qid
    };

    let mut orders = Vec::new();
    for seed in [1, 2, 3] {
        let out = run(&input, seed)?;
        let (preamble, rows) = read_bytes(&out)?;
        assert_eq!(preamble.features().len(), 2);
        let runs = qid_runs(&rows);
        assert_eq!(runs.len(), 20, "a qid group was split up");
        assert_eq!(group(&rows), group(&original));
        orders.push(runs);
    }
    assert!(orders[0] != orders[1] || orders[1] != orders[2]);
    Ok(())
}

#[test]
fn raw_lines_pass_through() -> Result<()> {
    let out = String::from_utf8(run(&many_queries(), 9)?)?;
    assert!(out.starts_with("# 1: A\n# 2: B\n"));
    assert!(out.contains("0 qid:7 1:0 2:7.5 # docno:q7d0 first\n"));
    assert_eq!(out.matches(" first\n").count(), 20);
    Ok(())
}

#[test]
fn shuffle_empty_file() -> Result<()> {
    let mut out = Vec::new();
    let n = shuffle("# 1: A\n".as_bytes(), &mut out, &ShuffleOptions::default(), &mut ())?;
    assert_eq!(n, 0);
    assert_eq!(out, b"# 1: A\n");
    Ok(())
}
