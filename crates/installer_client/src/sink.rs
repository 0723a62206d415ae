use std::sync::mpsc;

use installer_core::Action;

/// Receives actions decoded off the network, in the order they were decoded.
pub trait ActionSink: Send + Sync {
    fn emit(&self, action: Action);
}

pub struct ChannelActionSink {
    tx: mpsc::Sender<Action>,
}

impl ChannelActionSink {
    pub fn new(tx: mpsc::Sender<Action>) -> Self {
        Self { tx }
    }
}

impl ActionSink for ChannelActionSink {
    fn emit(&self, action: Action) {
        let _ = self.tx.send(action);
    }
}
