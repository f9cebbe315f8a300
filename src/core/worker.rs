//! Background maintenance threads
//!
//! Each logger runs a sync loop and, with rotation enabled, a rotation loop.
//! Both wait on a shared shutdown channel between ticks; dropping the sender
//! wakes them immediately and they exit, after which [`Workers::stop`] joins
//! them.

use super::error::Result;
use super::logger::Shared;
use crate::appenders::rotation::{rotate_if_due, ROTATION_CHECK_INTERVAL};
use chrono::Local;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub(crate) struct Workers {
    shutdown: Option<Sender<()>>,
    handles: Vec<JoinHandle<()>>,
}

impl Workers {
    /// Spawn the sync loop, plus the rotation loop when `rotation` is set.
    pub(crate) fn start(shared: &Arc<Shared>, rotation: bool) -> Result<Self> {
        let (sender, receiver) = bounded::<()>(0);
        let mut workers = Workers {
            shutdown: Some(sender),
            handles: Vec::with_capacity(2),
        };

        let sync_shared = Arc::clone(shared);
        let sync_shutdown = receiver.clone();
        let handle = thread::Builder::new()
            .name("logger-sync".to_string())
            .spawn(move || sync_loop(&sync_shared, &sync_shutdown))?;
        workers.handles.push(handle);

        if rotation {
            let rotate_shared = Arc::clone(shared);
            let handle = thread::Builder::new()
                .name("logger-rotate".to_string())
                .spawn(move || rotation_loop(&rotate_shared, &receiver))?;
            workers.handles.push(handle);
        }

        Ok(workers)
    }

    pub(crate) fn is_running(&self) -> bool {
        self.shutdown.is_some()
    }

    /// Signal every loop to exit and wait for them. Safe to call twice.
    pub(crate) fn stop(&mut self) {
        drop(self.shutdown.take());

        for handle in self.handles.drain(..) {
            let name = handle.thread().name().unwrap_or("logger-worker").to_string();
            if let Err(e) = handle.join() {
                eprintln!("[LOGGER ERROR] Background thread {} panicked: {:?}", name, e);
            }
        }
    }
}

impl Drop for Workers {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Sleep for `interval` unless shutdown is signalled first.
/// Returns `false` when the loop should exit.
fn wait_tick(shutdown: &Receiver<()>, interval: Duration) -> bool {
    matches!(shutdown.recv_timeout(interval), Err(RecvTimeoutError::Timeout))
}

fn sync_loop(shared: &Shared, shutdown: &Receiver<()>) {
    loop {
        if let Err(e) = shared.sync_tick() {
            shared.metrics.record_sync_failure();
            eprintln!("[LOGGER ERROR] Periodic log sync failed: {}", e);
        }

        let interval = shared.settings.read().time_sync;
        if !wait_tick(shutdown, interval) {
            break;
        }
    }
}

fn rotation_loop(shared: &Shared, shutdown: &Receiver<()>) {
    while wait_tick(shutdown, ROTATION_CHECK_INTERVAL) {
        let mode = shared.settings.read().compress_mode;
        let result = rotate_if_due(&shared.file, Local::now(), mode);
        shared.record_rotation(&result);
    }
}
