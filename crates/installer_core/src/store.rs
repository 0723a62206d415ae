use std::cell::RefCell;
use std::rc::{Rc, Weak};

use installer_logging::{installer_error, installer_info};

use crate::prompt::PromptSlot;
use crate::{
    update, Action, DispatchToken, Dispatcher, Effect, InstallationState, ListenerRegistry,
    PendingPrompt, StorePorts, Subscription,
};

/// Sole owner of [`InstallationState`].
///
/// Applies [`update`] to every dispatched action, swaps in the new state,
/// notifies listeners when something changed and then runs the resulting
/// effects against its ports.
pub struct InstallStore {
    state: RefCell<Rc<InstallationState>>,
    listeners: ListenerRegistry,
    ports: StorePorts,
    prompt_slot: Rc<PromptSlot>,
}

impl InstallStore {
    pub fn new(ports: StorePorts) -> Rc<Self> {
        Rc::new(Self {
            state: RefCell::new(Rc::new(InstallationState::new())),
            listeners: ListenerRegistry::new(),
            ports,
            prompt_slot: Rc::new(PromptSlot::default()),
        })
    }

    /// Registers the store's handler. The dispatcher only keeps a weak
    /// reference, so dropping the store silences the handler.
    pub fn register_with_dispatcher(self: &Rc<Self>, dispatcher: &Dispatcher) -> DispatchToken {
        let store: Weak<Self> = Rc::downgrade(self);
        dispatcher.register(move |action| {
            if let Some(store) = store.upgrade() {
                store.handle_action(action);
            }
        })
    }

    /// Read-only snapshot of the current state.
    pub fn state(&self) -> Rc<InstallationState> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self, listener: impl Fn() + 'static) -> Subscription {
        self.listeners.subscribe(listener)
    }

    pub fn handle_action(&self, action: &Action) {
        let transition = update(&self.state(), action);
        if let Some(next) = transition.state {
            *self.state.borrow_mut() = Rc::new(next);
            self.listeners.notify();
        }
        for effect in transition.effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(&self, effect: Effect) {
        match effect {
            Effect::LaunchInstall(config) => {
                installer_info!(
                    "Launching install region={} instance_type={} num_instances={}",
                    config.region,
                    config.instance_type,
                    config.num_instances
                );
                self.ports.launcher.launch_install(config);
            }
            Effect::OpenEventStream(install_id) => {
                installer_info!("Opening event stream for install {}", install_id);
                self.ports.stream.open_event_stream(&install_id);
            }
            Effect::CloseEventStream(install_id) => {
                self.prompt_slot.clear();
                self.ports.stream.close_event_stream(&install_id);
            }
            Effect::RequestPrompt { install_id, prompt } => {
                let pending = PendingPrompt::new(
                    prompt,
                    install_id,
                    self.prompt_slot.clone(),
                    self.ports.stream.clone(),
                );
                self.ports.prompts.prompt_requested(pending);
            }
            Effect::ReportLaunchFailure(err) => {
                installer_error!("Install launch failed: {}", err);
                if let Some(observer) = &self.ports.launch_failures {
                    observer.launch_failed(&err);
                }
            }
        }
    }
}
