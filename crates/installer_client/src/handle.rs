use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use installer_core::{
    Action, DispatchError, Dispatcher, EventStreamClient, InstallId, LaunchConfig, Launcher,
    PromptAnswer,
};
use installer_logging::{installer_debug, installer_warn};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::sink::ChannelActionSink;
use crate::stream::follow_event_stream;
use crate::{ActionSink, ClientSettings, InstallerApi, ReqwestInstallerApi, RequestError};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build http client: {0}")]
    Http(#[from] RequestError),
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

enum ClientCommand {
    Launch(LaunchConfig),
    OpenStream(InstallId),
    CloseStream(InstallId),
    AnswerPrompt {
        install_id: InstallId,
        answer: PromptAnswer,
    },
}

/// Runs network I/O on a background runtime and hands results back as
/// actions, to be dispatched on the caller's thread via [`InstallerClient::pump`].
pub struct InstallerClient {
    cmd_tx: mpsc::Sender<ClientCommand>,
    action_rx: mpsc::Receiver<Action>,
}

impl InstallerClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        let api = ReqwestInstallerApi::new(settings.clone())?;
        Self::with_api(Arc::new(api), settings)
    }

    pub fn with_api(api: Arc<dyn InstallerApi>, settings: ClientSettings) -> Result<Self, ClientError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (action_tx, action_rx) = mpsc::channel();
        let sink: Arc<dyn ActionSink> = Arc::new(ChannelActionSink::new(action_tx));
        let settings = Arc::new(settings);

        thread::spawn(move || {
            let mut active_stream: Option<(InstallId, CancellationToken)> = None;
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    ClientCommand::Launch(config) => {
                        let api = api.clone();
                        let sink = sink.clone();
                        runtime.spawn(async move {
                            let action = match api.launch(&config).await {
                                Ok(install_id) => Action::LaunchInstallSuccess { install_id },
                                Err(err) => Action::LaunchInstallFailure(err.into()),
                            };
                            sink.emit(action);
                        });
                    }
                    ClientCommand::OpenStream(install_id) => {
                        if let Some((previous, token)) = active_stream.take() {
                            installer_debug!("Closing event stream for install {}", previous);
                            token.cancel();
                        }
                        let token = CancellationToken::new();
                        active_stream = Some((install_id.clone(), token.clone()));
                        let api = api.clone();
                        let sink = sink.clone();
                        let settings = settings.clone();
                        runtime.spawn(async move {
                            tokio::select! {
                                _ = token.cancelled() => {}
                                _ = follow_event_stream(api.as_ref(), &settings, &install_id, sink.as_ref()) => {}
                            }
                        });
                    }
                    ClientCommand::CloseStream(install_id) => {
                        match active_stream.take() {
                            Some((active, token)) if active == install_id => token.cancel(),
                            other => active_stream = other,
                        }
                    }
                    ClientCommand::AnswerPrompt { install_id, answer } => {
                        let api = api.clone();
                        runtime.spawn(async move {
                            if let Err(err) = api.answer_prompt(&install_id, &answer).await {
                                installer_warn!(
                                    "Failed to send prompt answer for install {}: {}",
                                    install_id,
                                    err
                                );
                            }
                        });
                    }
                }
            }
        });

        Ok(Self { cmd_tx, action_rx })
    }

    pub fn try_recv(&self) -> Option<Action> {
        self.action_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<Action> {
        self.action_rx.recv_timeout(timeout).ok()
    }

    /// Dispatches every action received so far, in arrival order.
    pub fn pump(&self, dispatcher: &Dispatcher) -> Result<usize, DispatchError> {
        let mut count = 0;
        while let Some(action) = self.try_recv() {
            dispatcher.dispatch(&action)?;
            count += 1;
        }
        Ok(count)
    }

    fn send(&self, command: ClientCommand) {
        if self.cmd_tx.send(command).is_err() {
            installer_warn!("Installer client runtime has stopped; dropping command");
        }
    }
}

impl Launcher for InstallerClient {
    fn launch_install(&self, config: LaunchConfig) {
        self.send(ClientCommand::Launch(config));
    }
}

impl EventStreamClient for InstallerClient {
    fn open_event_stream(&self, install_id: &InstallId) {
        self.send(ClientCommand::OpenStream(install_id.clone()));
    }

    fn close_event_stream(&self, install_id: &InstallId) {
        self.send(ClientCommand::CloseStream(install_id.clone()));
    }

    fn send_prompt_response(&self, install_id: &InstallId, answer: PromptAnswer) {
        self.send(ClientCommand::AnswerPrompt {
            install_id: install_id.clone(),
            answer,
        });
    }
}
