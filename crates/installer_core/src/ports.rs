//! Boundaries between the store and the outside world. Implementations are
//! injected through [`StorePorts`], so tests can substitute fakes.

use std::rc::Rc;

use crate::{InstallId, LaunchConfig, LaunchError, PendingPrompt, PromptAnswer};

/// Submits launch requests. The outcome comes back later as
/// `LaunchInstallSuccess` or `LaunchInstallFailure`.
pub trait Launcher {
    fn launch_install(&self, config: LaunchConfig);
}

/// Server push channel for one install id plus the prompt-answer side channel.
pub trait EventStreamClient {
    fn open_event_stream(&self, install_id: &InstallId);

    /// Releases the channel once the install reached a terminal action.
    fn close_event_stream(&self, _install_id: &InstallId) {}

    /// Fire-and-forget; the remote installer owns retry policy for prompts.
    fn send_prompt_response(&self, install_id: &InstallId, answer: PromptAnswer);
}

/// UI adapter that shows prompts to the user and answers them later
/// through [`PendingPrompt::answer`].
pub trait PromptResponder {
    fn prompt_requested(&self, prompt: PendingPrompt);
}

/// Hook for stricter launch-failure handling (retry, backoff, UI).
pub trait LaunchFailureObserver {
    fn launch_failed(&self, error: &LaunchError);
}

pub struct StorePorts {
    pub launcher: Rc<dyn Launcher>,
    pub stream: Rc<dyn EventStreamClient>,
    pub prompts: Rc<dyn PromptResponder>,
    pub launch_failures: Option<Rc<dyn LaunchFailureObserver>>,
}
