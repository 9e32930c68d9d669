//! The operator's kill switch. The CLI's TUI posts a [`KillCommand`] onto
//! this channel; the engine loop polls it at the start of every tick, before
//! anything new is submitted.

use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillCommand {
    Kill,
}

/// Receiving half, owned by the engine loop. Once a kill is observed it
/// stays observed for the lifetime of this handle — there's no un-killing a
/// session, only a fresh one.
pub struct KillSwitch {
    rx: mpsc::Receiver<KillCommand>,
    killed: bool,
}

impl KillSwitch {
    #[must_use]
    pub fn channel(buffer: usize) -> (mpsc::Sender<KillCommand>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self { rx, killed: false })
    }

    /// Drains every command currently queued and reports whether a kill has
    /// ever been observed on this handle.
    pub fn poll(&mut self) -> bool {
        while let Ok(cmd) = self.rx.try_recv() {
            match cmd {
                KillCommand::Kill => self.killed = true,
            }
        }
        self.killed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_observes_a_queued_kill() {
        let (tx, mut switch) = KillSwitch::channel(4);
        assert!(!switch.poll());
        tx.try_send(KillCommand::Kill).unwrap();
        assert!(switch.poll());
    }

    #[test]
    fn kill_stays_observed_once_the_channel_goes_quiet() {
        let (tx, mut switch) = KillSwitch::channel(4);
        tx.try_send(KillCommand::Kill).unwrap();
        assert!(switch.poll());
        assert!(switch.poll());
    }
}
