//! Exit codes and output files of the two programs.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use internal_clock::export::{ACTIVITY_FILE, RASTER_FILE, READOUT_FILE};

const INTERNAL_CLOCK: &str = env!("CARGO_BIN_EXE_internal-clock");
const SIMILARITY_INDEX: &str = env!("CARGO_BIN_EXE_similarity-index");

const STEPS: usize = 12;
const NEURONS: usize = 20;

fn setup() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("net.json"),
        format!(r#"{{ "neurons": {NEURONS}, "steps": {STEPS} }}"#),
    )
    .unwrap();
    dir
}

fn run(bin: &str, dir: &Path, args: &[&str]) -> Output {
    Command::new(bin)
        .current_dir(dir)
        .env("RUST_LOG", "off")
        .args(args)
        .output()
        .unwrap()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

fn no_artifacts(dir: &Path) -> bool {
    [ACTIVITY_FILE, RASTER_FILE, READOUT_FILE]
        .iter()
        .all(|f| !dir.join(f).exists())
}

#[test]
fn internal_clock_rejects_wrong_argument_count() {
    let dir = setup();
    let cases: [&[&str]; 3] = [&[], &["1"], &["1", "2", "3"]];
    for args in cases {
        let out = run(INTERNAL_CLOCK, dir.path(), args);
        assert_eq!(out.status.code(), Some(1), "args {args:?}");
        assert!(!stderr(&out).is_empty());
        assert!(no_artifacts(dir.path()));
    }
}

#[test]
fn internal_clock_rejects_bad_reference_index() {
    let dir = setup();
    for isi in ["12", "-1", "1000"] {
        let out = run(INTERNAL_CLOCK, dir.path(), &["3", isi, "--config", "net.json"]);
        assert_eq!(out.status.code(), Some(1), "isi {isi}");
        assert!(stderr(&out).contains("out of range"), "{}", stderr(&out));
        assert!(no_artifacts(dir.path()));
    }
}

#[test]
fn internal_clock_writes_artifacts() {
    let dir = setup();
    let out = run(INTERNAL_CLOCK, dir.path(), &["3", "5", "--config", "net.json"]);
    assert!(out.status.success(), "{}", stderr(&out));

    let activity = fs::read_to_string(dir.path().join(ACTIVITY_FILE)).unwrap();
    assert_eq!(activity.lines().count(), STEPS * NEURONS);
    let readout = fs::read_to_string(dir.path().join(READOUT_FILE)).unwrap();
    assert_eq!(readout.lines().count(), STEPS);
    assert!(dir.path().join(RASTER_FILE).exists());
}

#[test]
fn internal_clock_honors_out_dir() {
    let dir = setup();
    let out = run(
        INTERNAL_CLOCK,
        dir.path(),
        &["3", "0", "--config", "net.json", "--out-dir", "runs/a"],
    );
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(no_artifacts(dir.path()));
    assert!(dir.path().join("runs/a").join(ACTIVITY_FILE).exists());
}

#[test]
fn help_exits_cleanly() {
    let dir = setup();
    for bin in [INTERNAL_CLOCK, SIMILARITY_INDEX] {
        let out = run(bin, dir.path(), &["--help"]);
        assert_eq!(out.status.code(), Some(0));
        assert!(!out.stdout.is_empty());
    }
}

#[test]
fn similarity_index_rejects_wrong_argument_count() {
    let dir = setup();
    let cases: [&[&str]; 3] = [&[], &["activity.dat"], &["activity.dat", "sim", "extra"]];
    for args in cases {
        let out = run(SIMILARITY_INDEX, dir.path(), args);
        assert_eq!(out.status.code(), Some(1), "args {args:?}");
    }
}

#[test]
fn similarity_index_reports_missing_input() {
    let dir = setup();
    let out = run(
        SIMILARITY_INDEX,
        dir.path(),
        &["absent.dat", "sim", "--config", "net.json"],
    );
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("absent.dat"), "{}", stderr(&out));
    assert!(!dir.path().join("sim.png").exists());
    assert!(!dir.path().join("sim.dat").exists());
}

#[test]
fn similarity_index_rejects_malformed_input() {
    let dir = setup();
    let mut text = "0.5\n".repeat(STEPS * NEURONS - 1);
    text.push_str("garbage\n");
    fs::write(dir.path().join(ACTIVITY_FILE), text).unwrap();

    let out = run(
        SIMILARITY_INDEX,
        dir.path(),
        &[ACTIVITY_FILE, "sim", "--config", "net.json"],
    );
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains(&format!("line {}", STEPS * NEURONS)));
    assert!(!dir.path().join("sim.png").exists());
    assert!(!dir.path().join("sim.dat").exists());
}

#[test]
fn similarity_index_rejects_zero_stride() {
    let dir = setup();
    let out = run(INTERNAL_CLOCK, dir.path(), &["3", "5", "--config", "net.json"]);
    assert!(out.status.success());

    let out = run(
        SIMILARITY_INDEX,
        dir.path(),
        &[ACTIVITY_FILE, "sim", "--config", "net.json", "--profile-stride", "0"],
    );
    assert_eq!(out.status.code(), Some(1));
    assert!(!dir.path().join("sim.png").exists());
}

#[test]
fn programs_chain_end_to_end() {
    let dir = setup();
    let out = run(INTERNAL_CLOCK, dir.path(), &["11", "4", "--config", "net.json"]);
    assert!(out.status.success(), "{}", stderr(&out));

    let out = run(
        SIMILARITY_INDEX,
        dir.path(),
        &[ACTIVITY_FILE, "sim", "--config", "net.json", "--profile-stride", "5"],
    );
    assert!(out.status.success(), "{}", stderr(&out));

    let img = image::open(dir.path().join("sim.png")).unwrap().to_luma8();
    assert_eq!(img.dimensions(), (STEPS as u32, STEPS as u32));
    // Row 0 is the silent initial state.
    assert_eq!(img.get_pixel(0, 0)[0], 0);

    // Reference rows 0, 5 and 10, each followed by a blank line.
    let profiles = fs::read_to_string(dir.path().join("sim.dat")).unwrap();
    assert_eq!(profiles.matches("\n\n\n").count(), 3);
    assert_eq!(profiles.lines().filter(|l| !l.is_empty()).count(), 3 * STEPS);
}
