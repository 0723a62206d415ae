use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::InstallationState;

const DASHBOARD_HOST_PREFIX: &str = "https://dashboard.";
const CA_CERT_URI_PREFIX: &str = "data:application/x-x509-ca-cert;base64,";

/// Everything a browser's `encodeURIComponent` escapes.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstallPhase {
    #[default]
    Idle,
    Running,
    Done,
    Failed,
}

/// What a launch form needs to render, derived from [`InstallationState`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InstallView {
    pub phase: InstallPhase,
    pub launch_enabled: bool,
    pub event_count: usize,
    pub latest_event: Option<String>,
    pub dashboard_url: Option<String>,
    pub ca_cert_uri: Option<String>,
    pub error: Option<String>,
}

impl InstallationState {
    pub fn phase(&self) -> InstallPhase {
        if self.install_done {
            InstallPhase::Done
        } else if self.install_started {
            InstallPhase::Running
        } else if self.install_error.is_some() {
            InstallPhase::Failed
        } else {
            InstallPhase::Idle
        }
    }

    pub fn view(&self) -> InstallView {
        InstallView {
            phase: self.phase(),
            launch_enabled: !self.install_started || self.install_done,
            event_count: self.install_events.len(),
            latest_event: self
                .install_events
                .last()
                .map(|event| event.description.clone()),
            dashboard_url: self.dashboard_url(),
            ca_cert_uri: self
                .cert
                .as_ref()
                .map(|cert| format!("{CA_CERT_URI_PREFIX}{cert}")),
            error: self.install_error.clone(),
        }
    }

    fn dashboard_url(&self) -> Option<String> {
        let domain = self.domain.as_deref()?;
        let token = self.dashboard_login_token.as_deref()?;
        let token = utf8_percent_encode(token, URI_COMPONENT);
        Some(format!("{DASHBOARD_HOST_PREFIX}{domain}?token={token}"))
    }
}
