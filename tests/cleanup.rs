// tests/cleanup.rs

mod common;
use crate::common::init_tracing;

use scriptchain::engine::{CleanupExecutor, CleanupReport};
use scriptchain::exec::{ChildHandle, LaunchCommand, ProcessSpawner};
use scriptchain_test_utils::builders::StepConfigBuilder;
use scriptchain_test_utils::fake_process::{FakeProcessTable, FakeSpawner};

fn spawn_child(spawner: &FakeSpawner) -> Box<dyn ChildHandle> {
    let step = StepConfigBuilder::new("C:/tools/runner.exe").build();
    spawner
        .spawn(&LaunchCommand::from_step(&step))
        .expect("fake spawn should succeed")
}

#[tokio::test]
async fn script_only_cleanup_kills_handle_and_named_processes() {
    init_tracing();

    let table = FakeProcessTable::new();
    table.start("runner.exe");
    table.start("runner.exe");
    table.start("game.exe");
    let spawner = FakeSpawner::new();
    let mut child = spawn_child(&spawner);

    let step = StepConfigBuilder::new("C:/tools/runner.exe")
        .script_process("runner.exe")
        .game_process("game.exe")
        .kill_script_after_done(true)
        .build();

    let report = CleanupExecutor::new(&table).cleanup(Some(child.as_mut()), &step);

    assert_eq!(
        report,
        CleanupReport {
            handle_killed: true,
            script_killed: 2,
            game_killed: 0,
        }
    );
    assert_eq!(spawner.kills(), 1);
    assert_eq!(table.running_count("runner.exe"), 0);
    assert_eq!(table.running_count("game.exe"), 1);
}

#[tokio::test]
async fn game_only_cleanup_leaves_the_script_alone() {
    init_tracing();

    let table = FakeProcessTable::new();
    table.start("runner.exe");
    table.start("game.exe");
    let spawner = FakeSpawner::new();
    let mut child = spawn_child(&spawner);

    let step = StepConfigBuilder::new("C:/tools/runner.exe")
        .script_process("runner.exe")
        .game_process("game.exe")
        .kill_game_after_done(true)
        .build();

    let report = CleanupExecutor::new(&table).cleanup(Some(child.as_mut()), &step);

    assert!(!report.handle_killed);
    assert_eq!(report.script_killed, 0);
    assert_eq!(report.game_killed, 1);
    assert_eq!(spawner.kills(), 0);
    assert_eq!(table.killed(), vec!["game.exe"]);
    assert_eq!(table.running_count("runner.exe"), 1);
}

#[tokio::test]
async fn no_cleanup_flags_touch_nothing() {
    init_tracing();

    let table = FakeProcessTable::new();
    table.start("runner.exe");
    table.start("game.exe");
    let spawner = FakeSpawner::new();
    let mut child = spawn_child(&spawner);

    let step = StepConfigBuilder::new("C:/tools/runner.exe")
        .script_process("runner.exe")
        .game_process("game.exe")
        .build();

    let report = CleanupExecutor::new(&table).cleanup(Some(child.as_mut()), &step);

    assert_eq!(report, CleanupReport::default());
    assert!(table.lookups().is_empty());
    assert!(table.killed().is_empty());
    assert_eq!(spawner.kills(), 0);
}

#[tokio::test]
async fn failing_handle_kill_does_not_block_name_kills() {
    init_tracing();

    let table = FakeProcessTable::new();
    table.start("runner.exe");
    table.start("game.exe");
    let spawner = FakeSpawner::new().with_failing_kill();
    let mut child = spawn_child(&spawner);

    let step = StepConfigBuilder::new("C:/tools/runner.exe")
        .script_process("runner.exe")
        .game_process("game.exe")
        .kill_script_after_done(true)
        .kill_game_after_done(true)
        .build();

    let report = CleanupExecutor::new(&table).cleanup(Some(child.as_mut()), &step);

    assert!(!report.handle_killed);
    assert_eq!(report.script_killed, 1);
    assert_eq!(report.game_killed, 1);
}

#[tokio::test]
async fn script_cleanup_without_a_process_name_only_kills_the_handle() {
    init_tracing();

    let table = FakeProcessTable::new();
    let spawner = FakeSpawner::new();
    let mut child = spawn_child(&spawner);

    let step = StepConfigBuilder::new("C:/tools/runner.exe")
        .kill_script_after_done(true)
        .build();

    let report = CleanupExecutor::new(&table).cleanup(Some(child.as_mut()), &step);

    assert!(report.handle_killed);
    assert_eq!(report.script_killed, 0);
    assert!(table.lookups().is_empty());
}

#[tokio::test]
async fn cleanup_without_handle_still_kills_by_name() {
    init_tracing();

    let table = FakeProcessTable::new();
    table.start("runner.exe");

    let step = StepConfigBuilder::new("C:/tools/runner.exe")
        .script_process("runner.exe")
        .kill_script_after_done(true)
        .build();

    let report = CleanupExecutor::new(&table).cleanup(None, &step);

    assert!(!report.handle_killed);
    assert_eq!(report.script_killed, 1);
}

#[tokio::test]
async fn repeated_cleanup_finds_nothing_left_to_kill() {
    init_tracing();

    let table = FakeProcessTable::new();
    table.start("runner.exe");
    table.start("game.exe");

    let step = StepConfigBuilder::new("C:/tools/runner.exe")
        .script_process("runner.exe")
        .game_process("game.exe")
        .kill_script_after_done(true)
        .kill_game_after_done(true)
        .build();
    let cleanup = CleanupExecutor::new(&table);

    let first = cleanup.cleanup(None, &step);
    let second = cleanup.cleanup(None, &step);

    assert_eq!(first.script_killed + first.game_killed, 2);
    assert_eq!(second, CleanupReport::default());
}

#[tokio::test]
async fn protected_processes_are_skipped() {
    init_tracing();

    let table = FakeProcessTable::new();
    table.start("game.exe");
    table.start("game.exe");
    table.deny_kill("game.exe");

    let step = StepConfigBuilder::new("C:/tools/runner.exe")
        .game_process("game.exe")
        .kill_game_after_done(true)
        .build();

    let report = CleanupExecutor::new(&table).cleanup(None, &step);

    assert_eq!(report.game_killed, 0);
    assert_eq!(table.running_count("game.exe"), 2);
}
