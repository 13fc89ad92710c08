// crates/plk-supervisor-monitor/src/completion.rs
//! Marshals SDO results from the stack's thread onto the thread that owns
//! the transfer controller.
//!
//! The stack side only ever holds a [`CompletionSender`]. Results queue up
//! until the owner drains them into its [`SdoTransferCompletion`], so the
//! controller is never entered from two threads.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use log::{error, trace};
use plk_supervisor::{SdoTransferCompletion, SdoTransferResult};
use std::time::Duration;

/// Creates a connected sender/receiver pair.
///
/// The queue is unbounded: the stack delivers exactly one result per job and
/// dropping one would leave a transfer pending forever.
pub fn completion_channel() -> (CompletionSender, CompletionReceiver) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (CompletionSender { tx }, CompletionReceiver { rx })
}

#[derive(Clone, Debug)]
pub struct CompletionSender {
    tx: Sender<SdoTransferResult>,
}

impl CompletionSender {
    /// Queues a result. Returns `false` if the receiving side is gone.
    pub fn send(&self, result: SdoTransferResult) -> bool {
        let job_id = result.job_id();
        match self.tx.send(result) {
            Ok(()) => {
                trace!("Queued SDO result for job {}", job_id);
                true
            }
            Err(_) => {
                error!("SDO result for job {} dropped: controller is gone.", job_id);
                false
            }
        }
    }
}

#[derive(Debug)]
pub struct CompletionReceiver {
    rx: Receiver<SdoTransferResult>,
}

impl CompletionReceiver {
    /// Hands every queued result to `completion`, without blocking.
    /// Returns how many were delivered.
    pub fn drain_into<C: SdoTransferCompletion + ?Sized>(&self, completion: &mut C) -> usize {
        let mut delivered = 0;
        loop {
            match self.rx.try_recv() {
                Ok(result) => {
                    completion.transfer_finished(result);
                    delivered += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        delivered
    }

    /// Waits up to `timeout` for one result and hands it to `completion`.
    /// Returns `false` on timeout or if every sender is gone.
    pub fn recv_into<C: SdoTransferCompletion + ?Sized>(
        &self,
        completion: &mut C,
        timeout: Duration,
    ) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => {
                completion.transfer_finished(result);
                true
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Underlying channel, for use in a `select!` with other event sources.
    pub fn receiver(&self) -> &Receiver<SdoTransferResult> {
        &self.rx
    }
}
