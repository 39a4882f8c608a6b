use crate::error::BridgeError;

use common::ErrorLocation;
use models::{ExitInfo, ExitReason, TrackerInfo};
use tracker_core::config::TrackerConfig;
use tracker_core::launcher::OutputLog;

use std::panic::Location;
use std::sync::Arc;

use log::{debug, info, warn};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock, mpsc, oneshot};

const COMMAND_CHANNEL_CAPACITY: usize = 100;

/// Commands that mutate the tracker state.
///
/// All state mutations go through the state actor via these commands.
/// This ensures serialized access and prevents race conditions between the
/// HTTP handlers and the exit watcher.
#[derive(Debug, Clone)]
pub enum StateCommand {
    /// A script was launched and survived its startup grace period
    SetRunning(TrackerInfo),

    /// The exit watcher observed the script ending
    MarkExited(ExitInfo),

    /// The stop endpoint terminated the script
    MarkStopped(ExitInfo),
}

/// What the bridge currently knows about the tracking script.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrackerSnapshot {
    pub current: Option<TrackerInfo>,
    pub last_exit: Option<ExitInfo>,
}

type Envelope = (StateCommand, oneshot::Sender<()>);

/// Application state manager.
///
/// Uses an actor pattern to ensure all state mutations are serialized.
/// Reads go through `Arc<RwLock<T>>` and never wait for the actor.
#[derive(Clone)]
pub struct AppState {
    /// Channel to send state mutation commands to the actor
    command_tx: Arc<Mutex<Option<mpsc::Sender<Envelope>>>>,

    /// Shared read-only access to the tracker snapshot
    tracker: Arc<RwLock<TrackerSnapshot>>,

    /// Track if actor has been initialized
    actor_init: Arc<Mutex<bool>>,

    /// Held for the whole of a start or stop so they never interleave
    lifecycle: Arc<Mutex<()>>,

    config: Arc<TrackerConfig>,
    output: OutputLog,
}

impl AppState {
    /// Create a new state manager.
    ///
    /// The actor will be lazily spawned on first use within an async context.
    pub fn new(config: TrackerConfig) -> Self {
        let output = OutputLog::new(config.output_lines);

        Self {
            command_tx: Arc::new(Mutex::new(None)),
            tracker: Arc::new(RwLock::new(TrackerSnapshot::default())),
            actor_init: Arc::new(Mutex::new(false)),
            lifecycle: Arc::new(Mutex::new(())),
            config: Arc::new(config),
            output,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn output(&self) -> &OutputLog {
        &self.output
    }

    pub fn lifecycle(&self) -> &Mutex<()> {
        &self.lifecycle
    }

    /// Send a state update command and wait until the actor has applied it.
    ///
    /// Returns an error if the state actor has died (should never happen).
    pub async fn update(&self, cmd: StateCommand) -> Result<(), BridgeError> {
        self.ensure_actor().await;

        let (ack_tx, ack_rx) = oneshot::channel();
        {
            let tx_guard = self.command_tx.lock().await;
            let tx = tx_guard.as_ref().ok_or_else(|| BridgeError::Bridge {
                message: String::from("State actor not initialized"),
                location: ErrorLocation::from(Location::caller()),
            })?;
            tx.send((cmd, ack_tx))
                .await
                .map_err(|e| BridgeError::Bridge {
                    message: format!("State actor died: {e}"),
                    location: ErrorLocation::from(Location::caller()),
                })?;
        }

        ack_rx.await.map_err(|e| BridgeError::Bridge {
            message: format!("State actor dropped command: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// The currently running script, if any.
    pub async fn current(&self) -> Option<TrackerInfo> {
        self.tracker.read().await.current.clone()
    }

    pub async fn snapshot(&self) -> TrackerSnapshot {
        self.tracker.read().await.clone()
    }

    /// Ensure actor is spawned (called lazily from async context)
    async fn ensure_actor(&self) {
        let mut init_guard = self.actor_init.lock().await;
        if !*init_guard {
            let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
            let tracker_clone = Arc::clone(&self.tracker);

            // Store tx before spawning so no command can miss the actor
            let mut tx_guard = self.command_tx.lock().await;
            *tx_guard = Some(tx);
            drop(tx_guard);

            tokio::spawn(state_actor(rx, tracker_clone));
            *init_guard = true;
            debug!("State actor spawned");
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

/// The state actor task.
///
/// Owns the mutable state and processes commands sequentially.
async fn state_actor(
    mut command_rx: mpsc::Receiver<Envelope>,
    tracker: Arc<RwLock<TrackerSnapshot>>,
) {
    debug!("State actor started");

    while let Some((cmd, ack)) = command_rx.recv().await {
        {
            let mut snapshot = tracker.write().await;
            apply(&mut snapshot, cmd);
        }
        // The sender may have given up waiting; the command is applied regardless.
        let _ = ack.send(());
    }

    warn!("State actor stopped - this should not happen during normal operation");
}

fn apply(snapshot: &mut TrackerSnapshot, cmd: StateCommand) {
    match cmd {
        StateCommand::SetRunning(info) => {
            if let Some(ref existing) = snapshot.current {
                warn!(
                    "Replacing tracked RealSense module (PID {}) with PID {}",
                    existing.pid, info.pid
                );
            } else {
                info!(
                    "Tracking RealSense module: PID={}, run={}, server={}",
                    info.pid, info.run_id, info.server_address
                );
            }
            snapshot.current = Some(info);
        }
        StateCommand::MarkExited(exit) => {
            if is_current(snapshot, &exit) {
                info!(
                    "RealSense module exited on its own: PID={}, code={:?}, signal={:?}",
                    exit.pid, exit.code, exit.signal
                );
                snapshot.current = None;
                snapshot.last_exit = Some(exit);
            } else if let Some(last) = snapshot.last_exit.as_mut()
                && last.run_id == exit.run_id
            {
                // Stop already recorded this run; keep the reason, take the status.
                last.code = exit.code;
                last.signal = exit.signal;
            } else {
                debug!("Ignoring exit of untracked run {} (PID {})", exit.run_id, exit.pid);
            }
        }
        StateCommand::MarkStopped(exit) => {
            if is_current(snapshot, &exit) {
                info!("RealSense module stopped: PID={}", exit.pid);
                snapshot.current = None;
                snapshot.last_exit = Some(exit);
            } else if let Some(last) = snapshot.last_exit.as_mut()
                && last.run_id == exit.run_id
            {
                // The watcher got there first.
                last.reason = ExitReason::Stopped;
            } else {
                warn!("Stop recorded for untracked run {} (PID {})", exit.run_id, exit.pid);
            }
        }
    }
}

fn is_current(snapshot: &TrackerSnapshot, exit: &ExitInfo) -> bool {
    snapshot
        .current
        .as_ref()
        .is_some_and(|current| current.run_id == exit.run_id)
}
