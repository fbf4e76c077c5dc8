#![allow(dead_code)]

use std::fs;
use std::path::Path;

use tempfile::TempDir;

pub use scriptchain_test_utils::init_tracing;

/// Create an (empty) script file inside `dir` and return its path as a
/// string, the way it would appear in a chain file.
pub fn script_file(dir: &Path, name: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, b"").expect("writing script file");
    path.to_string_lossy().into_owned()
}

/// A temp dir holding one launchable `run.exe`.
pub fn script_dir() -> (TempDir, String) {
    let dir = tempfile::tempdir().expect("creating temp dir");
    let script = script_file(dir.path(), "run.exe");
    (dir, script)
}

/// Assert that `secs` seconds passed on the (paused) tokio clock since
/// `begin`, allowing for timer-wheel rounding.
pub fn assert_elapsed(begin: tokio::time::Instant, secs: u64) {
    let elapsed = begin.elapsed();
    let expected = std::time::Duration::from_secs(secs);
    assert!(
        elapsed >= expected && elapsed < expected + std::time::Duration::from_millis(500),
        "expected ~{expected:?} to pass, got {elapsed:?}"
    );
}

/// A temp dir under the current directory holding `name`, plus the script
/// path relative to the current directory.
pub fn relative_script(name: &str) -> (TempDir, String) {
    let cwd = std::env::current_dir().expect("reading current dir");
    let dir = tempfile::Builder::new()
        .prefix("scriptchain-rel")
        .tempdir_in(&cwd)
        .expect("creating temp dir");
    script_file(dir.path(), name);
    let relative = dir
        .path()
        .strip_prefix(&cwd)
        .expect("temp dir lives under the current dir")
        .join(name);
    (dir, relative.to_string_lossy().into_owned())
}
