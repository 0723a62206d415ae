use std::fmt;

use thiserror::Error;

/// Identifier the remote installer assigns to a launched install job.
pub type InstallId = String;

/// Cloud credentials entered by the user. Empty fields are passed through
/// as-is; the remote installer then falls back to its own environment.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    pub credentials: Credentials,
    pub region: String,
    pub instance_type: String,
    pub num_instances: u32,
}

/// Progress record reported by the remote installer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallEvent {
    pub description: String,
}

impl InstallEvent {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    YesNo,
    Text,
}

/// Interactive question raised by the remote installer mid-install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub message: String,
}

/// Answer sent back for a [`Prompt`]. `Input(None)` is a cancelled text prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptAnswer {
    Yes(bool),
    Input(Option<String>),
}

impl PromptAnswer {
    pub fn matches(&self, kind: PromptKind) -> bool {
        matches!(
            (self, kind),
            (PromptAnswer::Yes(_), PromptKind::YesNo) | (PromptAnswer::Input(_), PromptKind::Text)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchFailureKind {
    InvalidUrl,
    Network,
    Timeout,
    HttpStatus(u16),
    InvalidResponse,
}

impl fmt::Display for LaunchFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchFailureKind::InvalidUrl => write!(f, "invalid url"),
            LaunchFailureKind::Network => write!(f, "network error"),
            LaunchFailureKind::Timeout => write!(f, "timeout"),
            LaunchFailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            LaunchFailureKind::InvalidResponse => write!(f, "invalid response"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct LaunchError {
    pub kind: LaunchFailureKind,
    pub message: String,
}

impl LaunchError {
    pub fn new(kind: LaunchFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Everything that can happen to an installation, from user intent to
/// server-pushed records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// User asked to launch a new install.
    LaunchAws(LaunchConfig),
    /// Remote installer accepted the launch and assigned a job id.
    LaunchInstallSuccess { install_id: InstallId },
    /// The launch request itself failed.
    LaunchInstallFailure(LaunchError),
    Domain(String),
    DashboardLoginToken(String),
    /// Base64 encoded CA certificate.
    CaCert(String),
    InstallEvent(InstallEvent),
    InstallDone,
    InstallPromptRequested(Prompt),
    /// Terminal failure of a running install: server-reported error or a
    /// stream that could not be re-established.
    InstallFailed { message: String },
}

impl Action {
    /// Stable upper-case name, used for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Action::LaunchAws(_) => "LAUNCH_AWS",
            Action::LaunchInstallSuccess { .. } => "LAUNCH_INSTALL_SUCCESS",
            Action::LaunchInstallFailure(_) => "LAUNCH_INSTALL_FAILURE",
            Action::Domain(_) => "DOMAIN",
            Action::DashboardLoginToken(_) => "DASHBOARD_LOGIN_TOKEN",
            Action::CaCert(_) => "CA_CERT",
            Action::InstallEvent(_) => "INSTALL_EVENT",
            Action::InstallDone => "INSTALL_DONE",
            Action::InstallPromptRequested(_) => "INSTALL_PROMPT_REQUESTED",
            Action::InstallFailed { .. } => "INSTALL_FAILED",
        }
    }
}
