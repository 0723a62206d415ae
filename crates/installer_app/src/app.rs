use std::cell::{Cell, RefCell};
use std::process::ExitCode;
use std::rc::Rc;
use std::time::Duration;

use installer_client::InstallerClient;
use installer_core::{
    Action, Dispatcher, InstallPhase, InstallStore, LaunchError, LaunchFailureObserver,
    StorePorts,
};
use installer_logging::installer_info;

use crate::cli::Args;
use crate::prompts::TerminalPrompter;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Default)]
struct LaunchFailure {
    error: RefCell<Option<LaunchError>>,
}

impl LaunchFailureObserver for LaunchFailure {
    fn launch_failed(&self, error: &LaunchError) {
        *self.error.borrow_mut() = Some(error.clone());
    }
}

pub fn run(args: &Args) -> anyhow::Result<ExitCode> {
    let client = Rc::new(InstallerClient::new(args.client_settings())?);
    let prompter = Rc::new(TerminalPrompter::new());
    let launch_failure = Rc::new(LaunchFailure::default());
    let store = InstallStore::new(StorePorts {
        launcher: client.clone(),
        stream: client.clone(),
        prompts: prompter.clone(),
        launch_failures: Some(launch_failure.clone()),
    });
    let dispatcher = Dispatcher::new();
    store.register_with_dispatcher(&dispatcher);

    let printed = Rc::new(Cell::new(0));
    {
        let weak = Rc::downgrade(&store);
        let printed = printed.clone();
        store.subscribe(move || {
            let Some(store) = weak.upgrade() else { return };
            let state = store.state();
            for event in state.install_events.iter().skip(printed.get()) {
                println!("{}", event.description);
            }
            printed.set(state.install_events.len());
        });
    }

    installer_info!("Using installer at {}", args.url);
    println!(
        "Launching {} x {} in {}...",
        args.num_instances, args.instance_type, args.region
    );
    dispatcher.dispatch(&Action::LaunchAws(args.launch_config()))?;

    loop {
        if let Some(action) = client.recv_timeout(POLL_INTERVAL) {
            dispatcher.dispatch(&action)?;
        }
        client.pump(&dispatcher)?;
        prompter.poll();

        if let Some(err) = launch_failure.error.borrow_mut().take() {
            eprintln!("Launch failed: {err}");
            return Ok(ExitCode::FAILURE);
        }

        let state = store.state();
        match state.phase() {
            InstallPhase::Done => {
                let view = state.view();
                println!("Install complete.");
                if let Some(uri) = view.ca_cert_uri {
                    println!("CA certificate: {uri}");
                }
                if let Some(url) = view.dashboard_url {
                    println!("Dashboard: {url}");
                }
                return Ok(ExitCode::SUCCESS);
            }
            InstallPhase::Failed => {
                eprintln!(
                    "Install failed: {}",
                    state.install_error.as_deref().unwrap_or("unknown error")
                );
                return Ok(ExitCode::FAILURE);
            }
            InstallPhase::Idle | InstallPhase::Running => {}
        }
    }
}
