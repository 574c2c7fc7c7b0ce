#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use snpcons::genomics::{GoodDepthTally, PileupSummary, Strand};

fn snapshot_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("snapshots")
}

pub fn assert_snapshot(name: &str, actual: &str) {
    let path = snapshot_root().join(name);
    if std::env::var("SNPCONS_UPDATE_SNAPSHOTS").is_ok() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create snapshot directory");
        }
        fs::write(&path, actual).expect("write snapshot");
        return;
    }

    let expected =
        fs::read_to_string(&path).unwrap_or_else(|_| panic!("snapshot {:?} not found", path));
    if normalize(&expected) != normalize(actual) {
        panic!(
            "Snapshot mismatch for {:?}. Set SNPCONS_UPDATE_SNAPSHOTS=1 to regenerate.\nExpected:\n{}\nActual:\n{}",
            path,
            expected,
            actual
        );
    }
}

fn normalize(input: &str) -> String {
    input.replace("\r\n", "\n")
}

/// Build a summary from pileup-style base symbols, all treated as passing
/// quality: `.`/`,` match the reference on the forward/reverse strand,
/// uppercase letters are forward reads and lowercase letters reverse reads.
pub fn summary_from_bases(
    chrom: &str,
    position: u32,
    reference: u8,
    raw_depth: u32,
    bases: &str,
) -> PileupSummary {
    let mut tally = GoodDepthTally::new();
    for symbol in bases.bytes() {
        match symbol {
            b'.' => tally.observe(reference, Strand::Forward),
            b',' => tally.observe(reference, Strand::Reverse),
            b if b.is_ascii_uppercase() => tally.observe(b, Strand::Forward),
            b => tally.observe(b, Strand::Reverse),
        }
    }
    PileupSummary::new(chrom, position, reference, raw_depth, tally)
}

pub fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("snpcons-test-{}-{}", std::process::id(), name))
}
