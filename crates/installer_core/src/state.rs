use std::rc::Rc;

use crate::{InstallEvent, InstallId};

/// Everything observable about the current installation.
///
/// Transitions build a new value; a snapshot handed out by the store never
/// changes underneath its holder. `install_events` is shared between
/// snapshots until an event is appended.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InstallationState {
    pub install_events: Rc<[InstallEvent]>,
    pub install_id: Option<InstallId>,
    pub install_started: bool,
    pub install_done: bool,
    pub domain: Option<String>,
    pub dashboard_login_token: Option<String>,
    pub cert: Option<String>,
    pub install_error: Option<String>,
}

impl InstallationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh state for a launch that was just requested.
    pub(crate) fn launching() -> Self {
        Self {
            install_started: true,
            ..Self::default()
        }
    }

    pub fn is_idle(&self) -> bool {
        !self.install_started && !self.install_done
    }

    pub(crate) fn with_event(&self, event: InstallEvent) -> Self {
        let mut events = Vec::with_capacity(self.install_events.len() + 1);
        events.extend(self.install_events.iter().cloned());
        events.push(event);
        Self {
            install_events: events.into(),
            ..self.clone()
        }
    }
}
