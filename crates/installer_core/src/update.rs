use installer_logging::installer_warn;

use crate::{Action, Effect, InstallationState};

/// Result of applying one action: the replacement state, if the action
/// changed anything, and the effects to run afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transition {
    pub state: Option<InstallationState>,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn none() -> Self {
        Self::default()
    }

    fn to(state: InstallationState) -> Self {
        Self {
            state: Some(state),
            effects: Vec::new(),
        }
    }

    fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Pure transition function: maps the current state and an action to the
/// next state and any effects. Never mutates `state`.
pub fn update(state: &InstallationState, action: &Action) -> Transition {
    match action {
        Action::LaunchAws(config) => {
            if state.install_started {
                installer_warn!(
                    "Ignoring launch request: install {:?} is still running",
                    state.install_id
                );
                return Transition::none();
            }
            Transition::to(InstallationState::launching())
                .with_effect(Effect::LaunchInstall(config.clone()))
        }
        Action::LaunchInstallSuccess { install_id } => Transition::to(InstallationState {
            install_id: Some(install_id.clone()),
            ..state.clone()
        })
        .with_effect(Effect::OpenEventStream(install_id.clone())),
        Action::LaunchInstallFailure(err) => {
            Transition::none().with_effect(Effect::ReportLaunchFailure(err.clone()))
        }
        Action::Domain(domain) => Transition::to(InstallationState {
            domain: Some(domain.clone()),
            ..state.clone()
        }),
        Action::DashboardLoginToken(token) => Transition::to(InstallationState {
            dashboard_login_token: Some(token.clone()),
            ..state.clone()
        }),
        Action::CaCert(cert) => Transition::to(InstallationState {
            cert: Some(cert.clone()),
            ..state.clone()
        }),
        Action::InstallEvent(event) => Transition::to(state.with_event(event.clone())),
        Action::InstallDone => {
            let next = InstallationState {
                install_done: true,
                install_started: false,
                ..state.clone()
            };
            close_stream(Transition::to(next), state)
        }
        Action::InstallPromptRequested(prompt) => match &state.install_id {
            Some(install_id) => Transition::none().with_effect(Effect::RequestPrompt {
                install_id: install_id.clone(),
                prompt: prompt.clone(),
            }),
            None => {
                installer_warn!("Dropping prompt without an active install: {}", prompt.message);
                Transition::none()
            }
        },
        Action::InstallFailed { message } => {
            let next = InstallationState {
                install_started: false,
                install_done: false,
                install_error: Some(message.clone()),
                ..state.clone()
            };
            close_stream(Transition::to(next), state)
        }
    }
}

fn close_stream(transition: Transition, state: &InstallationState) -> Transition {
    match &state.install_id {
        Some(install_id) => transition.with_effect(Effect::CloseEventStream(install_id.clone())),
        None => transition,
    }
}
