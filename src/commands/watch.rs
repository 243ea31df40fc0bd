use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};

use targetsync::watcher::{watch, WatchEvent, WatchOptions};

use super::project::Project;

pub(crate) fn cmd_watch(project: &Project, json: bool) -> Result<()> {
    let session = &project.session;
    let mut roots: Vec<_> = session.workspaces().iter().map(|ws| ws.root.clone()).collect();
    if roots.is_empty() {
        roots.push(project.dir.clone());
    }
    let options = WatchOptions { roots, json };

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();
    let cancel = session.cancellation();
    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
        cancel.cancel();
    })
    .context("failed to install Ctrl+C handler")?;

    watch(session, options, running, |event| {
        if json {
            println!("{}", event.to_json());
            return;
        }
        match event {
            WatchEvent::WatchStarted { roots } => {
                println!("Watching {} (Ctrl+C to stop)", roots.join(", "))
            }
            WatchEvent::FileChanged { path } => println!("changed {}", path),
            WatchEvent::Deployed {
                target,
                succeeded,
                failed,
                ..
            } => println!("  -> {}: {} ok, {} failed", target, succeeded, failed),
            WatchEvent::DeployFailed {
                target, message, ..
            } => eprintln!("  -> {}: {}", target, message),
            WatchEvent::Error { message } => eprintln!("error: {}", message),
            WatchEvent::Shutdown => println!("Stopped"),
        }
    })?;
    Ok(())
}
