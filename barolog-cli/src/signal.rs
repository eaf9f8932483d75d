//! Ctrl-C handling
//!
//! The acquisition loop is synchronous, so the signal is awaited on a
//! small current-thread runtime in a helper thread that only flips the
//! stop flag. The loop sees it at the next cycle boundary.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
};

use anyhow::{Context, Result};

/// Set `stop` when the process receives Ctrl-C
pub fn stop_on_ctrl_c(stop: Arc<AtomicBool>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting signal runtime")?;

    thread::Builder::new()
        .name("ctrl-c".into())
        .spawn(move || {
            runtime.block_on(async {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        log::warn!("Interrupted, stopping after the current cycle");
                        stop.store(true, Ordering::Release);
                    }
                    Err(err) => log::error!("Cannot listen for Ctrl-C: {}", err),
                }
            })
        })
        .context("spawning signal thread")?;

    Ok(())
}
