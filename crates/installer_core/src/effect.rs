use crate::{InstallId, LaunchConfig, LaunchError, Prompt};

/// Side effect requested by a transition; executed by the store after the
/// new state is installed and listeners have run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LaunchInstall(LaunchConfig),
    OpenEventStream(InstallId),
    CloseEventStream(InstallId),
    RequestPrompt { install_id: InstallId, prompt: Prompt },
    ReportLaunchFailure(LaunchError),
}
