#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use installer_client::{ActionSink, ClientSettings};
use installer_core::Action;

#[derive(Default, Clone)]
pub struct TestSink {
    actions: Arc<Mutex<Vec<Action>>>,
}

impl TestSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Action> {
        self.actions.lock().unwrap().drain(..).collect()
    }
}

impl ActionSink for TestSink {
    fn emit(&self, action: Action) {
        self.actions.lock().unwrap().push(action);
    }
}

pub fn settings_for(uri: String) -> ClientSettings {
    ClientSettings {
        base_url: uri,
        reconnect_delay: Duration::from_millis(10),
        ..ClientSettings::default()
    }
}

/// Renders records the way the installer server frames them.
pub fn sse_body(records: &[&str]) -> String {
    records
        .iter()
        .map(|record| format!("data: {record}\n\n"))
        .collect()
}
