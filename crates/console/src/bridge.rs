//! One-way channel from isolated contexts into the host inbox, and the single
//! subscriber that relays console traffic into the [`OutputLog`].

use crate::message::{HostMessage, console_payload};
use crate::output::OutputLog;
use crate::writer::ConsoleWriter;
use log::{debug, trace};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;

/// Create the host inbox: a cloneable sender for isolated contexts and the
/// listener that owns the receiving end.
pub fn console_bridge(log: OutputLog) -> (BridgeSender, ConsoleListener) {
    let (sender, inbox) = unbounded_channel();
    (BridgeSender { sender }, ConsoleListener { inbox, log })
}

/// Posting side of the host inbox. This is the only capability an isolated
/// context holds.
#[derive(Clone, Debug)]
pub struct BridgeSender {
    sender: UnboundedSender<HostMessage>,
}

impl BridgeSender {
    /// Post any message. Delivery failures are swallowed: the producer must
    /// never observe the host going away.
    pub fn post(&self, message: impl Into<HostMessage>) {
        if self.sender.send(message.into()).is_err() {
            debug!("Console bridge closed; dropping message");
        }
    }

    /// Post `payload` as tagged console output.
    #[inline]
    pub fn post_console(&self, payload: &str) {
        self.post(HostMessage::console(payload));
    }

    /// An `io::Write` sink posting every write as console output.
    #[inline]
    pub fn console_writer(&self) -> ConsoleWriter {
        ConsoleWriter::new(self.clone())
    }

    /// True once the listener has been dropped.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// The host's single long-lived inbox subscriber.
#[derive(Debug)]
pub struct ConsoleListener {
    inbox: UnboundedReceiver<HostMessage>,
    log: OutputLog,
}

impl ConsoleListener {
    /// Log this listener appends to.
    #[inline]
    pub fn log(&self) -> &OutputLog {
        &self.log
    }

    /// Relay one message. Returns true if it was console output.
    pub fn relay(&self, message: &HostMessage) -> bool {
        match console_payload(message) {
            Some(payload) => {
                trace!("[console]: {payload}");
                self.log.append_line(payload);
                true
            }
            None => false,
        }
    }

    /// Drain everything queued so far without waiting. Returns the number of
    /// lines appended.
    pub fn pump(&mut self) -> usize {
        let mut relayed = 0;
        loop {
            match self.inbox.try_recv() {
                Ok(message) => {
                    if self.relay(&message) {
                        relayed += 1;
                    }
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        relayed
    }

    /// Relay messages as they arrive until every sender is dropped.
    pub async fn run(mut self) {
        while let Some(message) = self.inbox.recv().await {
            self.relay(&message);
        }
        debug!("Console bridge: all senders dropped");
    }

    /// Run the listener on the current tokio runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
