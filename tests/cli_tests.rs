//! Command-Line Interface Tests
//!
//! Runs the `barcode-solver` binary against small layout, FASTQ and
//! signature files written to a temporary directory.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const Y1: &str = "GGAACCTT";
const Y2: &str = "CCTTGGAA";
const E1: &str = "ACGTTGCA";
const E2: &str = "TGCAACGT";
const O1: &str = "AACCGGTT";
const O2: &str = "TTGGCCAA";
const LINKER: &str = "CATGCATG";

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("Failed to write test file");
    path
}

fn fastq(records: &[(&str, &str)]) -> String {
    records
        .iter()
        .map(|(name, seq)| format!("@{name}\n{seq}\n+\n{}\n", "I".repeat(seq.len())))
        .collect()
}

/// Y barcode set, linker, even barcode set from a table file
fn write_layout(dir: &Path) -> PathBuf {
    write(dir, "even.txt", &format!("E1\t{E1}\nE2\t{E2}\n"));
    let layout = format!(
        r#"{{
  "read_length": 60,
  "elements": [
    {{ "kind": "barcode_set", "name": "y", "max_mismatches": 1,
       "barcodes": [ {{ "id": "Y1", "sequence": "{Y1}" }}, {{ "id": "Y2", "sequence": "{Y2}" }} ] }},
    {{ "kind": "fixed", "name": "linker", "sequence": "{LINKER}", "max_mismatches": 1 }},
    {{ "kind": "barcode_set", "name": "even", "table": "even.txt", "max_mismatches": 1 }}
  ]
}}"#
    );
    write(dir, "read2.json", &layout)
}

fn barcode_solver() -> Command {
    Command::cargo_bin("barcode-solver").expect("binary should build")
}

/// Test identify TSV output: one row per fragment
#[test]
fn test_identify_tsv() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let layout = write_layout(dir.path());
    let reads = write(
        dir.path(),
        "r2.fq",
        &fastq(&[
            ("frag1/2", &format!("{Y1}{LINKER}{E2}TTTTTTTTTT")),
            ("frag2/2", &format!("{Y1}{LINKER}{E2}GGGGGGGGGG")),
            ("frag3/2", &format!("{Y2}{LINKER}{E1}AAAAAAAAAA")),
            ("frag4/2", "TTTTTTTTTTTTTTTTTTTTTTTTTTTTTT"),
        ]),
    );

    barcode_solver()
        .args(["identify", "--format", "tsv", "--threads", "2", "--read2"])
        .arg(&reads)
        .arg("--layout2")
        .arg(&layout)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "fragment_id\tsignature\tswitches\n",
        ))
        .stdout(predicate::str::contains(format!(
            "frag1\t[Y1]{Y1}[E2]{E2}\t."
        )))
        .stdout(predicate::str::contains(format!(
            "frag3\t[Y2]{Y2}[E1]{E1}\t."
        )))
        .stdout(predicate::str::contains("frag4\t.\t."));
}

/// Test that output spans every batch and the group table counts members
/// across batches
#[test]
fn test_identify_more_reads_than_batch_size() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let layout = write_layout(dir.path());
    let reads = write(
        dir.path(),
        "r2.fq",
        &fastq(&[
            ("r1/2", &format!("{Y1}{LINKER}{E1}AAAA")),
            ("r2/2", &format!("{Y2}{LINKER}{E2}CCCC")),
            ("r3/2", &format!("{Y1}{LINKER}{E1}GGGG")),
            ("r4/2", "TTTTTTTTTTTTTTTTTTTTTTTTTTTT"),
            ("r5/2", &format!("{Y1}{LINKER}{E1}TTTT")),
        ]),
    );
    let groups = dir.path().join("groups.tsv");

    let output = barcode_solver()
        .args(["identify", "--format", "tsv", "--batch-size", "2", "--read2"])
        .arg(&reads)
        .arg("--layout2")
        .arg(&layout)
        .arg("--groups")
        .arg(&groups)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let stdout = String::from_utf8(output).expect("utf-8 output");
    let ids: Vec<&str> = stdout
        .lines()
        .skip(1)
        .filter_map(|line| line.split('\t').next())
        .collect();
    assert_eq!(ids, vec!["r1", "r2", "r3", "r4", "r5"]);
    assert_eq!(stdout.matches("fragment_id").count(), 1);

    let table = fs::read_to_string(&groups).expect("group table written");
    assert!(table.starts_with("signature\tsize\tmembers\n"));
    assert!(table.contains(&format!("[Y1]{Y1}[E1]{E1}\t3\tr1,r3,r5")));
    assert!(table.contains(&format!("[Y2]{Y2}[E2]{E2}\t1\tr2")));
}

/// Test streamed JSON output across batches is a single array
#[test]
fn test_identify_json_across_batches() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let layout = write_layout(dir.path());
    let reads = write(
        dir.path(),
        "r2.fq",
        &fastq(&[
            ("a", &format!("{Y1}{LINKER}{E1}")),
            ("b", &format!("{Y2}{LINKER}{E2}")),
            ("c", "TTTTTTTTTTTTTTTTTTTTTTTT"),
        ]),
    );

    let output = barcode_solver()
        .args(["identify", "--format", "json", "--batch-size", "1", "--read2"])
        .arg(&reads)
        .arg("--layout2")
        .arg(&layout)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value =
        serde_json::from_slice(&output).expect("identify should print JSON");
    let ids: Vec<&str> = json
        .as_array()
        .expect("array output")
        .iter()
        .filter_map(|f| f["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert!(json[2]["signature"].is_null());
}

/// Test that --skip-unmatched drops fragments with no barcodes
#[test]
fn test_identify_skip_unmatched() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let layout = write_layout(dir.path());
    let reads = write(
        dir.path(),
        "r2.fq",
        &fastq(&[
            ("kept", &format!("{Y1}{LINKER}{E1}")),
            ("dropped", "TTTTTTTTTTTTTTTTTTTTTTTT"),
        ]),
    );

    barcode_solver()
        .args(["identify", "--format", "tsv", "--skip-unmatched", "--read2"])
        .arg(&reads)
        .arg("--layout2")
        .arg(&layout)
        .assert()
        .success()
        .stdout(predicate::str::contains("kept\t"))
        .stdout(predicate::str::contains("dropped").not());
}

/// Test paired FASTQ input with a ligation design preset and JSON output
#[test]
fn test_identify_design_json() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let y = write(dir.path(), "y.txt", &format!("Y1  {Y1}\nY2  {Y2}\n"));
    let even = write(dir.path(), "even.txt", &format!("E1  {E1}\nE2  {E2}\n"));
    let odd = write(dir.path(), "odd.txt", &format!("O1  {O1}\nO2  {O2}\n"));
    let r1 = write(dir.path(), "r1.fq", &fastq(&[("pair1/1", "ACGTACGTACGTACGT")]));
    let r2 = write(
        dir.path(),
        "r2.fq",
        &fastq(&[("pair1/2", &format!("{Y1}{E1}{O1}{E2}{O2}ACGTACGTAC"))]),
    );

    let output = barcode_solver()
        .args(["identify", "--format", "json"])
        .arg("--read1")
        .arg(&r1)
        .arg("--read2")
        .arg(&r2)
        .args(["--design", "paired_design_april_2016_5_barcode"])
        .arg("--y-barcodes")
        .arg(&y)
        .arg("--even-barcodes")
        .arg(&even)
        .arg("--odd-barcodes")
        .arg(&odd)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value =
        serde_json::from_slice(&output).expect("identify should print JSON");
    assert_eq!(json[0]["id"], "pair1");
    assert_eq!(
        json[0]["signature"],
        format!("[Y1]{Y1}[E1]{E1}[O1]{O1}[E2]{E2}[O2]{O2}")
    );
    assert_eq!(json[0]["barcodes"].as_array().map(Vec::len), Some(5));
}

/// Test that an unknown design name lists the valid ones
#[test]
fn test_identify_unknown_design() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let reads = write(dir.path(), "r2.fq", &fastq(&[("a", "ACGT")]));

    barcode_solver()
        .args(["identify", "--read2"])
        .arg(&reads)
        .args([
            "--design",
            "single_design_2019",
            "--y-barcodes",
            "y.txt",
            "--even-barcodes",
            "e.txt",
            "--odd-barcodes",
            "o.txt",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("paired_design_april_2016_4_barcode"));
}

/// Test that identify requires a layout
#[test]
fn test_identify_requires_layout() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let reads = write(dir.path(), "r2.fq", &fastq(&[("a", "ACGT")]));

    barcode_solver()
        .args(["identify", "--read2"])
        .arg(&reads)
        .assert()
        .failure()
        .stderr(predicate::str::contains("layout is required"));
}

/// Test that a layout too long for its read length is rejected when matching
#[test]
fn test_identify_layout_exceeds_read_length() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let layout = write(
        dir.path(),
        "short.json",
        &format!(
            r#"{{ "read_length": 10, "elements": [
                {{ "kind": "barcode", "id": "Y1", "sequence": "{Y1}" }},
                {{ "kind": "fixed", "name": "linker", "sequence": "{LINKER}" }}
            ] }}"#
        ),
    );
    let reads = write(dir.path(), "r2.fq", &fastq(&[("a", &format!("{Y1}{LINKER}"))]));

    barcode_solver()
        .args(["identify", "--read2"])
        .arg(&reads)
        .arg("--layout2")
        .arg(&layout)
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 16 bases"));

    barcode_solver()
        .args(["identify", "--format", "tsv", "--no-read-length-check", "--read2"])
        .arg(&reads)
        .arg("--layout2")
        .arg(&layout)
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("a\t[Y1]{Y1}\t.")));
}

/// Test grouping a signature table
#[test]
fn test_group_tsv() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let table = write(
        dir.path(),
        "sigs.tsv",
        "fragment_id\tsignature\nf1\t[a]AC[b]GT\nf2\t[a]AC[b]GT\nf3\t[b]GT[a]AC\nf4\t.\n",
    );

    barcode_solver()
        .args(["group", "--format", "tsv"])
        .arg(&table)
        .assert()
        .success()
        .stdout(predicate::str::contains("[a]AC[b]GT\t2\tf1,f2"))
        .stdout(predicate::str::contains("[b]GT[a]AC\t1\tf3"))
        .stdout(predicate::str::contains("f4").not());
}

/// Test that a malformed signature names the offending input
#[test]
fn test_group_malformed_signature() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let table = write(dir.path(), "bad.tsv", "f1\t[a]AC[b\n");

    barcode_solver()
        .arg("group")
        .arg(&table)
        .assert()
        .failure()
        .stderr(predicate::str::contains("[a]AC[b"));
}

/// Test describing a layout file as JSON
#[test]
fn test_layout_json() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let layout = write_layout(dir.path());

    let output = barcode_solver()
        .args(["layout", "--format", "json", "--barcodes"])
        .arg(&layout)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value =
        serde_json::from_slice(&output).expect("layout should print JSON");
    assert_eq!(json["read_length"], 60);
    assert_eq!(json["min_span"], 21);
    assert_eq!(json["elements"][0]["kind"], "barcode_set");
    assert_eq!(json["elements"][1]["kind"], "fixed_sequence");
    assert_eq!(json["elements"][2]["num_variants"], 2);
    assert_eq!(json["num_barcodes"], 4);
}
