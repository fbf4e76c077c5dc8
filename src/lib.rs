// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod notify;
pub mod system;
pub mod types;

use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::cli::{CliArgs, NotifierKind};
use crate::config::{default_config_dir, ChainConfig, ChainStore};
use crate::engine::{ChainDirectives, ChainDriver, ChainReport};
use crate::errors::Result;
use crate::exec::{SystemProcessTable, TokioSpawner};
use crate::notify::{DesktopNotifier, NoOpNotifier, Notifier};
use crate::system::HostSystem;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - the chain store and loading the requested chain
/// - the process table, spawner, notifier and host system
/// - the chain driver
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<ChainReport> {
    let store = ChainStore::new(config_dir(&args));

    if args.list {
        print_chain_list(&store)?;
        return Ok(ChainReport::default());
    }

    // A chain that can't be loaded is run as an empty chain: the
    // end-of-chain actions still happen.
    let chain = match store.load(&args.chain) {
        Ok(chain) => Some(chain),
        Err(err) => {
            error!(chain = %args.chain, error = %err, "failed to load chain");
            None
        }
    };

    if args.dry_run {
        print_dry_run(&store, &args.chain, chain.as_ref());
        return Ok(ChainReport::default());
    }

    let notifier: Arc<dyn Notifier> = match args.notifier {
        NotifierKind::Desktop => Arc::new(DesktopNotifier::new()),
        NotifierKind::None => Arc::new(NoOpNotifier::new()),
    };

    // Ctrl-C → stop the current wait, clean up, run end-of-chain actions.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            info!("Ctrl+C received; cancelling chain");
            cancel.cancel();
        });
    }

    let directives = ChainDirectives {
        shutdown: args.shutdown,
        close: args.close,
    };

    let mut driver = ChainDriver::new(
        Arc::new(SystemProcessTable::new()),
        Arc::new(TokioSpawner::new()),
        notifier,
        Arc::new(HostSystem::new()),
    )
    .with_cancel(cancel);

    let report = driver.run(&args.chain, chain.as_ref(), directives).await;
    debug!(?report, "chain run complete");
    Ok(report)
}

fn config_dir(args: &CliArgs) -> PathBuf {
    match &args.config_dir {
        Some(dir) => PathBuf::from(dir),
        None => default_config_dir(),
    }
}

fn print_chain_list(store: &ChainStore) -> Result<()> {
    let names = store.list()?;
    println!("chains in {} ({}):", store.dir().display(), names.len());
    for name in names {
        println!("  - {name}");
    }
    Ok(())
}

/// Simple dry-run output: print the chain and whether each step could run.
fn print_dry_run(store: &ChainStore, name: &str, chain: Option<&ChainConfig>) {
    println!("scriptchain dry-run");
    println!("  chain file = {}", store.path_for(name).display());

    let Some(chain) = chain else {
        println!("  chain '{name}' could not be loaded");
        return;
    };

    println!("  after_chain_done = {:?}", chain.after_chain_done);
    println!();

    println!("steps ({}):", chain.len());
    for step in chain.steps.iter() {
        println!("  {}. {}", step.idx, step.script_display());
        println!("      path: {}", step.script_path);
        if !step.script_arguments.trim().is_empty() {
            println!("      args: {:?}", step.argument_tokens());
        }
        if let Some(name) = step.script_process() {
            println!("      script process: {name}");
        }
        if let Some(name) = step.game_process() {
            println!("      game process: {name}");
        }
        println!("      check_done: {}", step.check_done);
        println!("      timeout: {}s", step.run_timeout_seconds);
        if step.kill_script_after_done {
            println!("      kill_script_after_done: true");
        }
        if step.kill_game_after_done {
            println!("      kill_game_after_done: true");
        }
        match step.validate() {
            Ok(()) => println!("      valid: yes"),
            Err(reason) => println!("      valid: no ({reason})"),
        }
    }

    debug!("dry-run complete (no execution)");
}
