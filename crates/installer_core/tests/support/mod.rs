#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use installer_core::{
    Credentials, Dispatcher, EventStreamClient, InstallId, InstallStore, LaunchConfig,
    LaunchError, LaunchFailureObserver, Launcher, PendingPrompt, PromptAnswer, PromptResponder,
    StorePorts,
};

pub fn init_logging() {
    installer_logging::initialize_for_tests();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Launch(LaunchConfig),
    Open(InstallId),
    Close(InstallId),
    Answer(InstallId, PromptAnswer),
    LaunchFailed(LaunchError),
}

/// Stands in for every port and records what the store asked of it.
#[derive(Default)]
pub struct Recorder {
    calls: RefCell<Vec<Call>>,
    prompts: RefCell<Vec<PendingPrompt>>,
}

impl Recorder {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn take_calls(&self) -> Vec<Call> {
        self.calls.borrow_mut().drain(..).collect()
    }

    pub fn take_prompts(&self) -> Vec<PendingPrompt> {
        self.prompts.borrow_mut().drain(..).collect()
    }
}

impl Launcher for Recorder {
    fn launch_install(&self, config: LaunchConfig) {
        self.calls.borrow_mut().push(Call::Launch(config));
    }
}

impl EventStreamClient for Recorder {
    fn open_event_stream(&self, install_id: &InstallId) {
        self.calls.borrow_mut().push(Call::Open(install_id.clone()));
    }

    fn close_event_stream(&self, install_id: &InstallId) {
        self.calls.borrow_mut().push(Call::Close(install_id.clone()));
    }

    fn send_prompt_response(&self, install_id: &InstallId, answer: PromptAnswer) {
        self.calls
            .borrow_mut()
            .push(Call::Answer(install_id.clone(), answer));
    }
}

impl PromptResponder for Recorder {
    fn prompt_requested(&self, prompt: PendingPrompt) {
        self.prompts.borrow_mut().push(prompt);
    }
}

impl LaunchFailureObserver for Recorder {
    fn launch_failed(&self, error: &LaunchError) {
        self.calls.borrow_mut().push(Call::LaunchFailed(error.clone()));
    }
}

pub struct Harness {
    pub dispatcher: Rc<Dispatcher>,
    pub store: Rc<InstallStore>,
    pub recorder: Rc<Recorder>,
}

impl Harness {
    pub fn new() -> Self {
        init_logging();
        let recorder = Rc::new(Recorder::default());
        let store = InstallStore::new(StorePorts {
            launcher: recorder.clone(),
            stream: recorder.clone(),
            prompts: recorder.clone(),
            launch_failures: Some(recorder.clone()),
        });
        let dispatcher = Rc::new(Dispatcher::new());
        store.register_with_dispatcher(&dispatcher);
        Self {
            dispatcher,
            store,
            recorder,
        }
    }

    pub fn dispatch(&self, action: installer_core::Action) {
        self.dispatcher.dispatch(&action).expect("dispatch");
    }
}

pub fn launch_config() -> LaunchConfig {
    LaunchConfig {
        credentials: Credentials {
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "secret".to_string(),
        },
        region: "us-east-1".to_string(),
        instance_type: "m3.medium".to_string(),
        num_instances: 1,
    }
}
