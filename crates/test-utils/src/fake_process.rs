use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use tokio::time::Instant;

use scriptchain::exec::{ChildHandle, KillStatus, LaunchCommand, ProcessSpawner, ProcessTable};

/// Pid reported for names driven by a timeline instead of real entries.
pub const TIMELINE_PID: u32 = u32::MAX;

#[derive(Default)]
struct TableState {
    next_pid: u32,
    running: Vec<(u32, String)>,
    timelines: HashMap<String, VecDeque<bool>>,
    denied: HashSet<String>,
    lookups: Vec<String>,
    killed: Vec<String>,
}

/// An in-memory process table.
///
/// Two ways to make a name "exist":
/// - `start(name)` adds a process that stays until killed or `stop`ped;
/// - `set_timeline(name, &[..])` scripts the answer of successive lookups
///   (one entry per lookup, the last entry repeats forever).
#[derive(Clone, Default)]
pub struct FakeProcessTable {
    inner: Arc<Mutex<TableState>>,
}

impl FakeProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self, name: &str) -> u32 {
        let mut state = self.inner.lock().unwrap();
        state.next_pid += 1;
        let pid = 1000 + state.next_pid;
        state.running.push((pid, name.to_string()));
        pid
    }

    /// The process exits on its own.
    pub fn stop(&self, pid: u32) {
        self.inner.lock().unwrap().running.retain(|(p, _)| *p != pid);
    }

    pub fn set_timeline(&self, name: &str, presence: &[bool]) {
        self.inner
            .lock()
            .unwrap()
            .timelines
            .insert(name.to_string(), presence.iter().copied().collect());
    }

    /// Make kills of processes with this name fail as if access was denied.
    pub fn deny_kill(&self, name: &str) {
        self.inner.lock().unwrap().denied.insert(name.to_string());
    }

    /// Names passed to `find`, in call order.
    pub fn lookups(&self) -> Vec<String> {
        self.inner.lock().unwrap().lookups.clone()
    }

    /// Names of the processes that were killed, in kill order.
    pub fn killed(&self) -> Vec<String> {
        self.inner.lock().unwrap().killed.clone()
    }

    pub fn running_count(&self, name: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .running
            .iter()
            .filter(|(_, n)| n == name)
            .count()
    }
}

impl ProcessTable for FakeProcessTable {
    fn find(&self, name: &str) -> Vec<u32> {
        let mut state = self.inner.lock().unwrap();
        state.lookups.push(name.to_string());

        if let Some(timeline) = state.timelines.get_mut(name) {
            let present = if timeline.len() > 1 {
                timeline.pop_front().unwrap_or(false)
            } else {
                timeline.front().copied().unwrap_or(false)
            };
            return if present { vec![TIMELINE_PID] } else { Vec::new() };
        }

        state
            .running
            .iter()
            .filter(|(_, n)| n == name)
            .map(|(pid, _)| *pid)
            .collect()
    }

    fn kill_pid(&self, pid: u32) -> KillStatus {
        let mut state = self.inner.lock().unwrap();
        let Some(pos) = state.running.iter().position(|(p, _)| *p == pid) else {
            return KillStatus::Gone;
        };
        if state.denied.contains(&state.running[pos].1) {
            return KillStatus::Denied;
        }
        let (_, name) = state.running.remove(pos);
        state.killed.push(name);
        KillStatus::Killed
    }
}

/// Scripted behaviour of one spawn attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeLaunch {
    /// `spawn` itself returns an error.
    FailToSpawn,
    RunForever,
    /// Exit with `code` once `after` has passed on the tokio clock.
    ExitAfter { after: Duration, code: i32 },
}

struct SpawnerState {
    script: VecDeque<FakeLaunch>,
    fallback: FakeLaunch,
    attempts: usize,
    spawned: Vec<LaunchCommand>,
    kills: usize,
    fail_kill: bool,
}

/// A spawner whose children follow a script of [`FakeLaunch`]es.
///
/// Each spawn attempt takes the next scripted entry; once the script is used
/// up every further attempt uses the fallback (`RunForever` by default).
#[derive(Clone)]
pub struct FakeSpawner {
    inner: Arc<Mutex<SpawnerState>>,
}

impl Default for FakeSpawner {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SpawnerState {
                script: VecDeque::new(),
                fallback: FakeLaunch::RunForever,
                attempts: 0,
                spawned: Vec::new(),
                kills: 0,
                fail_kill: false,
            })),
        }
    }
}

impl FakeSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(self, launch: FakeLaunch) -> Self {
        self.inner.lock().unwrap().script.push_back(launch);
        self
    }

    pub fn otherwise(self, launch: FakeLaunch) -> Self {
        self.inner.lock().unwrap().fallback = launch;
        self
    }

    /// Children refuse to be killed.
    pub fn with_failing_kill(self) -> Self {
        self.inner.lock().unwrap().fail_kill = true;
        self
    }

    /// Number of `spawn` calls, failed ones included.
    pub fn attempts(&self) -> usize {
        self.inner.lock().unwrap().attempts
    }

    /// Commands of the successful spawns.
    pub fn spawned(&self) -> Vec<LaunchCommand> {
        self.inner.lock().unwrap().spawned.clone()
    }

    /// Kill requests that reached a child.
    pub fn kills(&self) -> usize {
        self.inner.lock().unwrap().kills
    }
}

impl ProcessSpawner for FakeSpawner {
    fn spawn(&self, command: &LaunchCommand) -> anyhow::Result<Box<dyn ChildHandle>> {
        let mut state = self.inner.lock().unwrap();
        state.attempts += 1;
        let fallback = state.fallback;
        let launch = state.script.pop_front().unwrap_or(fallback);

        if launch == FakeLaunch::FailToSpawn {
            return Err(anyhow!("simulated spawn failure for {}", command.program.display()));
        }

        state.spawned.push(command.clone());
        let pid = state.attempts as u32;
        Ok(Box::new(FakeChild {
            pid,
            launch,
            spawned_at: Instant::now(),
            killed: false,
            state: Arc::clone(&self.inner),
        }))
    }
}

struct FakeChild {
    pid: u32,
    launch: FakeLaunch,
    spawned_at: Instant,
    killed: bool,
    state: Arc<Mutex<SpawnerState>>,
}

impl ChildHandle for FakeChild {
    fn id(&self) -> Option<u32> {
        Some(self.pid)
    }

    fn try_exit_code(&mut self) -> io::Result<Option<i32>> {
        if self.killed {
            return Ok(Some(-1));
        }
        Ok(match self.launch {
            FakeLaunch::ExitAfter { after, code } if self.spawned_at.elapsed() >= after => Some(code),
            _ => None,
        })
    }

    fn kill(&mut self) -> io::Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_kill {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "simulated kill failure"));
        }
        state.kills += 1;
        self.killed = true;
        Ok(())
    }
}
