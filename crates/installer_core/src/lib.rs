//! Installer core: action bus, installation state machine and the ports it
//! drives. Everything here runs on a single thread and performs no I/O.
mod action;
mod dispatcher;
mod effect;
mod listeners;
mod ports;
mod prompt;
mod state;
mod store;
mod update;
mod view_model;

pub use action::{
    Action, Credentials, InstallEvent, InstallId, LaunchConfig, LaunchError, LaunchFailureKind,
    Prompt, PromptAnswer, PromptKind,
};
pub use dispatcher::{DispatchError, DispatchToken, Dispatcher};
pub use effect::Effect;
pub use listeners::{ListenerRegistry, Subscription};
pub use ports::{EventStreamClient, LaunchFailureObserver, Launcher, PromptResponder, StorePorts};
pub use prompt::{PendingPrompt, PromptError};
pub use state::InstallationState;
pub use store::InstallStore;
pub use update::{update, Transition};
pub use view_model::{InstallPhase, InstallView};
