use assert_cmd::prelude::*;
use lazy_static::lazy_static;
use predicates::str::{contains, PredicateStrExt};
use regex::Regex;
use std::process::Command;

lazy_static! {
    static ref CO_MUT_VALUE_REGEX: Regex =
        Regex::new(r"A\[C>T\]G\tCO_MUT\t([0-9.]+)").unwrap();
}

const REF: &str = "tests/input/ref.fa";
const FRAGMENTS: &str = "tests/input/fragments.tsv";
const LOCI: &str = "tests/input/loci.tsv";

#[test]
fn cli_no_args() {
    Command::cargo_bin("fragsig").unwrap().assert().failure();
}

#[test]
fn cli_no_such_file() {
    Command::cargo_bin("fragsig")
        .unwrap()
        .args(&["-r", REF, "tests/no_such_file.tsv", LOCI])
        .assert()
        .failure()
        .stderr(contains("Error").trim());
}

#[test]
fn cli_raw_spectrum() {
    Command::cargo_bin("fragsig")
        .unwrap()
        .args(&["-r", REF, FRAGMENTS, LOCI])
        .assert()
        .success()
        .stdout(contains("channel\toverlap_type\tvalue"))
        .stdout(contains("A[C>T]G\tCO_MUT\t1"))
        .stdout(contains("A[C>T]G\tSO_MUT\t1"))
        .stdout(contains("A[C>A]G\tDO\t1"))
        .stdout(contains("\tDO\t1").count(1));
}

#[test]
fn cli_normalized_spectrum() {
    let output = Command::cargo_bin("fragsig")
        .unwrap()
        .args(&["-n", "-r", REF, FRAGMENTS, LOCI])
        .unwrap()
        .stdout;
    let output = String::from_utf8(output).unwrap();
    if let Some(captures) = CO_MUT_VALUE_REGEX.captures(&output) {
        let value: f64 = captures.get(1).unwrap().as_str().parse().unwrap();
        assert!(value < 1.0);
        assert!((value - 1.0 / 3.0).abs() < 1e-3);
    } else {
        panic!("No A[C>T]G CO_MUT row in output")
    }
}

#[test]
fn cli_consensus_table() {
    let path = std::env::temp_dir().join("fragsig_consensus_test.tsv");
    Command::cargo_bin("fragsig")
        .unwrap()
        .args(&["-r", REF, FRAGMENTS, LOCI])
        .args(&["-c", path.to_str().unwrap()])
        .assert()
        .success();
    let table = std::fs::read_to_string(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert!(table.starts_with("target_key\tCO_MUT\tSO_MUT\tCO_REF\tSO_REF\tDO\tSO_OTHER"));
    // readX/readX.1 style duplicates collapse, so CO_MUT stays at 2
    assert!(table.contains(
        "chr1:10:C:T\t2\t0\t0\t1\t1\t0\t0\t35.5\tNA\tNA\t25.0\t29.0\tNA\tNA\tchr1:10:T"
    ));
    // purine-reference locus reported with its original alleles
    assert!(table.contains(
        "chr1:19:G:A\t0\t1\t0\t0\t0\t0\t0\tNA\t33.0\tNA\tNA\tNA\tNA\tNA\tchr1:19:A"
    ));
    // discordant pair disambiguates to the known alternate
    assert!(table.contains(
        "chr1:30:C:A\t0\t0\t0\t0\t1\t0\t0\tNA\tNA\tNA\tNA\t28.0\tNA\tNA\tchr1:30:A"
    ));
}

#[test]
fn cli_seeded_runs_are_reproducible() {
    let run = || {
        Command::cargo_bin("fragsig")
            .unwrap()
            .args(&["-s", "11", "-r", REF, FRAGMENTS, LOCI])
            .unwrap()
            .stdout
    };
    assert_eq!(run(), run());
}
