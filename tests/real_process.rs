// tests/real_process.rs
//
// Runs real processes through the production spawner and process table.
#![cfg(unix)]

mod common;
use crate::common::{init_tracing, relative_script};

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{Child, Command};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use scriptchain::engine::Timings;
use scriptchain::exec::{
    LaunchCommand, LaunchResult, Launcher, ProcessSpawner, ProcessTable, SystemProcessTable,
    TokioSpawner,
};
use scriptchain::system::shutdown_args;
use scriptchain_test_utils::builders::StepConfigBuilder;

fn quick_timings() -> Timings {
    Timings {
        poll_interval: Duration::from_millis(50),
        launch_window: Duration::from_secs(2),
        survival_time: Duration::from_millis(300),
        ..Timings::default()
    }
}

fn write_script(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path.to_string_lossy().into_owned()
}

#[tokio::test]
async fn sleeping_script_counts_as_launched() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "sleeper.sh", "sleep 5");
    let spawner = TokioSpawner::new();
    let timings = quick_timings();
    let cancel = CancellationToken::new();
    let step = StepConfigBuilder::new(&script).build();

    let result = Launcher::new(&spawner, &timings, &cancel).launch(&step).await;

    let mut launched = match result {
        LaunchResult::Launched(launched) => launched,
        other => panic!("expected a launch, got {other:?}"),
    };
    assert!(launched.handle.id().is_some());
    launched.handle.kill().unwrap();
}

#[tokio::test]
async fn failing_script_is_never_launched() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "broken.sh", "exit 3");
    let spawner = TokioSpawner::new();
    let timings = quick_timings();
    let cancel = CancellationToken::new();
    let step = StepConfigBuilder::new(&script).build();

    let result = Launcher::new(&spawner, &timings, &cancel).launch(&step).await;

    assert!(matches!(result, LaunchResult::Failed));
}

#[tokio::test]
async fn spawned_script_reports_its_exit_code() {
    init_tracing();

    let command = LaunchCommand {
        program: "/bin/sh".into(),
        args: vec!["-c".to_string(), "exit 4".to_string()],
        working_dir: None,
    };

    let mut child = TokioSpawner::new().spawn(&command).unwrap();

    let mut code = None;
    for _ in 0..100 {
        code = child.try_exit_code().unwrap();
        if code.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(code, Some(4));
}

#[test]
fn process_table_handles_unknown_and_empty_names() {
    init_tracing();

    let table = SystemProcessTable::new();
    assert!(!table.exists(""));
    assert!(!table.exists("scriptchain-no-such-process"));
    assert_eq!(table.kill("scriptchain-no-such-process"), 0);
    assert_eq!(table.kill(""), 0);
}

#[test]
fn shutdown_arguments_round_up_to_minutes() {
    assert_eq!(shutdown_args(Duration::from_secs(60)), vec!["-h", "+1"]);
    assert_eq!(shutdown_args(Duration::from_secs(61)), vec!["-h", "+2"]);
    assert_eq!(shutdown_args(Duration::ZERO), vec!["-h", "now"]);
}

#[tokio::test]
async fn relative_script_path_launches_from_its_own_directory() {
    init_tracing();

    let (dir, script) = relative_script("sleeper.sh");
    write_script(dir.path(), "sleeper.sh", "sleep 5");

    let spawner = TokioSpawner::new();
    let timings = quick_timings();
    let cancel = CancellationToken::new();
    let step = StepConfigBuilder::new(&script).build();

    let result = Launcher::new(&spawner, &timings, &cancel).launch(&step).await;

    let mut launched = match result {
        LaunchResult::Launched(launched) => launched,
        other => panic!("expected a launch, got {other:?}"),
    };
    launched.handle.kill().unwrap();
}

/// Copy of `/bin/sleep` under `name`, so processes can be found by a name
/// nothing else on the machine uses.
fn sleep_binary(dir: &Path, name: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::copy("/bin/sleep", &path).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

/// Spawn `program`, retrying while another test thread's fork still holds
/// the freshly written file open (ETXTBSY).
fn spawn_sleeping(program: &Path) -> Child {
    for _ in 0..50 {
        match Command::new(program).arg("30").spawn() {
            Ok(child) => return child,
            Err(err) if err.raw_os_error() == Some(26) => {
                std::thread::sleep(Duration::from_millis(20));
            }
            Err(err) => panic!("spawning {}: {err}", program.display()),
        }
    }
    panic!("{} stayed busy", program.display());
}

fn reap(children: Vec<Child>) {
    for mut child in children {
        let _ = child.kill();
        let _ = child.wait();
    }
}

#[test]
fn names_longer_than_the_kernel_limit_are_found() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let name = "scriptchain_long_companion";
    let program = sleep_binary(dir.path(), name);
    let child = spawn_sleeping(&program);

    let table = SystemProcessTable::new();
    assert!(table.exists(name));
    assert_eq!(table.find(name), vec![child.id()]);
    assert!(!table.exists("scriptchain_long_compan"));

    reap(vec![child]);
}

#[test]
fn every_instance_is_killed_and_a_second_kill_is_harmless() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let name = "sc_twin.exe";
    let program = sleep_binary(dir.path(), name);
    let mut children = vec![spawn_sleeping(&program), spawn_sleeping(&program)];

    let table = SystemProcessTable::new();
    assert!(table.exists(name));
    assert_eq!(table.kill(name), 2);

    // Reap them so they don't linger as zombies.
    for child in &mut children {
        child.wait().unwrap();
    }
    assert!(!table.exists(name));
    assert_eq!(table.kill(name), 0);

    reap(children);
}
