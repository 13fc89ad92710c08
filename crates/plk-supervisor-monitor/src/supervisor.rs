// crates/plk-supervisor-monitor/src/supervisor.rs
//! The thread that owns the SDO transfer controller.
//!
//! Web handlers never touch the controller directly: they send a closure
//! to the owner thread and await its return value. Stack completions
//! arrive on the same thread through the [`CompletionReceiver`], so every
//! controller operation runs sequentially on one thread.

use crate::completion::CompletionReceiver;
use crate::model::{MonitorEvent, SdoView};
use crossbeam_channel::{Receiver, Sender, select};
use log::{debug, info};
use plk_supervisor::{SdoStack, SdoTransferController};
use std::fmt;
use std::thread::{self, JoinHandle};
use tokio::sync::{broadcast, oneshot};

type Command<S> = Box<dyn FnOnce(&mut SdoTransferController<S>) + Send>;

/// The owner thread has stopped and cannot serve requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorStopped;

impl fmt::Display for SupervisorStopped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Supervisor thread has stopped")
    }
}

impl std::error::Error for SupervisorStopped {}

/// Cloneable access to the controller living on the owner thread.
pub struct SupervisorHandle<S: SdoStack> {
    commands: Sender<Command<S>>,
}

impl<S: SdoStack> Clone for SupervisorHandle<S> {
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
        }
    }
}

impl<S: SdoStack + Send + 'static> SupervisorHandle<S> {
    /// Runs `f` on the owner thread and returns its result.
    pub async fn call<R, F>(&self, f: F) -> Result<R, SupervisorStopped>
    where
        R: Send + 'static,
        F: FnOnce(&mut SdoTransferController<S>) -> R + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let command: Command<S> = Box::new(move |controller| {
            let _ = reply_tx.send(f(controller));
        });
        self.commands.send(command).map_err(|_| SupervisorStopped)?;
        reply_rx.await.map_err(|_| SupervisorStopped)
    }
}

/// Moves `controller` onto a dedicated thread and returns the handle used to
/// reach it. The thread publishes the dialog state on `events` after every
/// command and every completion, and exits once all handles are dropped.
pub fn spawn_supervisor<S: SdoStack + Send + 'static>(
    mut controller: SdoTransferController<S>,
    completions: CompletionReceiver,
    events: broadcast::Sender<MonitorEvent>,
) -> std::io::Result<(SupervisorHandle<S>, JoinHandle<()>)> {
    let (commands, inbox) = crossbeam_channel::unbounded::<Command<S>>();
    let join = thread::Builder::new()
        .name("plk-supervisor".into())
        .spawn(move || {
            controller.refresh_node_ids();
            run(&mut controller, &inbox, &completions, &events);
            info!("Supervisor thread stopped.");
        })?;
    Ok((SupervisorHandle { commands }, join))
}

fn run<S: SdoStack>(
    controller: &mut SdoTransferController<S>,
    inbox: &Receiver<Command<S>>,
    completions: &CompletionReceiver,
    events: &broadcast::Sender<MonitorEvent>,
) {
    loop {
        select! {
            recv(inbox) -> command => match command {
                Ok(command) => command(controller),
                Err(_) => break,
            },
            recv(completions.receiver()) -> result => match result {
                Ok(result) => {
                    controller.handle_transfer_finished(result);
                    // Pick up anything else that queued meanwhile.
                    completions.drain_into(controller);
                }
                // Stack side is gone; keep serving commands.
                Err(_) => {
                    debug!("All completion senders dropped.");
                    drain_commands(controller, inbox, events);
                    break;
                }
            },
        }
        // No receivers is fine, the state is also available on request.
        let _ = events.send(MonitorEvent::Sdo(SdoView::from_controller(controller)));
    }
}

fn drain_commands<S: SdoStack>(
    controller: &mut SdoTransferController<S>,
    inbox: &Receiver<Command<S>>,
    events: &broadcast::Sender<MonitorEvent>,
) {
    for command in inbox.iter() {
        command(controller);
        let _ = events.send(MonitorEvent::Sdo(SdoView::from_controller(controller)));
    }
}
