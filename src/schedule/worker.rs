//! Timer thread driving scheduled drains.
//!
//! The worker owns the deadline computed by the [`SchedulingPolicy`] and
//! invokes the drain callback when it expires, when a flush is requested,
//! and once more on shutdown so nothing buffered is left behind.

use std::{
    sync::Arc,
    thread::{self, JoinHandle},
    time::Instant,
};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, bounded};

use super::policy::SchedulingPolicy;

/// Callback run whenever the schedule fires.
pub type DrainFn = Arc<dyn Fn() + Send + Sync>;

/// Commands processed by the worker thread.
#[derive(Debug)]
pub enum ScheduleCommand {
    /// An event was appended; arm or refresh the deadline.
    Trigger,
    /// Fire now and acknowledge once the drain has returned.
    Flush(Sender<()>),
    /// Fire one last time, acknowledge and exit.
    Shutdown(Sender<()>),
}

/// Spawns the timer thread for `policy`.
///
/// Returns the command sender and the join handle of the spawned thread.
pub fn spawn_worker(
    policy: SchedulingPolicy,
    capacity: usize,
    drain: DrainFn,
) -> (Sender<ScheduleCommand>, JoinHandle<()>) {
    let (tx, rx) = bounded(capacity);
    let handle = thread::spawn(move || TimerWorker::new(policy, drain).run(rx));
    (tx, handle)
}

struct TimerWorker {
    policy: SchedulingPolicy,
    deadline: Option<Instant>,
    drain: DrainFn,
}

impl TimerWorker {
    fn new(policy: SchedulingPolicy, drain: DrainFn) -> Self {
        Self {
            policy,
            deadline: None,
            drain,
        }
    }

    fn arm(&mut self, now: Instant) {
        self.deadline = Some(self.policy.next_deadline(self.deadline, now));
    }

    fn fire(&mut self) {
        self.deadline = None;
        (self.drain)();
    }

    fn next_command(
        &self,
        rx: &Receiver<ScheduleCommand>,
    ) -> Result<ScheduleCommand, RecvTimeoutError> {
        match self.deadline {
            Some(deadline) => rx.recv_deadline(deadline),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        }
    }

    /// Collect the acks of requests still queued behind a shutdown.
    fn drain_queued(&self, rx: &Receiver<ScheduleCommand>) -> Vec<Sender<()>> {
        let mut acks = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(ScheduleCommand::Trigger) => {}
                Ok(ScheduleCommand::Flush(ack)) | Ok(ScheduleCommand::Shutdown(ack)) => {
                    acks.push(ack);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        acks
    }

    fn run(mut self, rx: Receiver<ScheduleCommand>) {
        loop {
            match self.next_command(&rx) {
                Ok(ScheduleCommand::Trigger) => self.arm(Instant::now()),
                Ok(ScheduleCommand::Flush(ack)) => {
                    self.fire();
                    // Ignore send error: the requester may have timed out.
                    let _ = ack.send(());
                }
                Ok(ScheduleCommand::Shutdown(ack)) => {
                    let queued = self.drain_queued(&rx);
                    self.fire();
                    for waiting in queued.into_iter().chain(std::iter::once(ack)) {
                        let _ = waiting.send(());
                    }
                    break;
                }
                Err(RecvTimeoutError::Timeout) => self.fire(),
                Err(RecvTimeoutError::Disconnected) => {
                    self.fire();
                    break;
                }
            }
        }
    }
}
