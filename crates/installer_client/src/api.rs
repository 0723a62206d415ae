use std::time::Duration;

use futures_util::StreamExt;
use installer_core::{InstallId, LaunchConfig, LaunchFailureKind, PromptAnswer};
use installer_logging::{installer_debug, installer_info, installer_warn};
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::record::{decode_record, is_terminal};
use crate::types::map_reqwest_error;
use crate::{ActionSink, ClientSettings, RequestError, SseDecoder, StreamEnd};

const EVENT_STREAM: &str = "text/event-stream";

/// Remote installer HTTP API.
#[async_trait::async_trait]
pub trait InstallerApi: Send + Sync {
    async fn launch(&self, config: &LaunchConfig) -> Result<InstallId, RequestError>;

    /// Connects to the event stream once and emits decoded actions until
    /// a terminal record arrives or the connection ends.
    async fn stream_events(
        &self,
        install_id: &str,
        sink: &dyn ActionSink,
    ) -> Result<StreamEnd, RequestError>;

    async fn answer_prompt(
        &self,
        install_id: &str,
        answer: &PromptAnswer,
    ) -> Result<(), RequestError>;
}

#[derive(Debug, Serialize)]
struct WireLaunch<'a> {
    creds: WireCredentials<'a>,
    region: &'a str,
    instance_type: &'a str,
    num_instances: u32,
}

#[derive(Debug, Serialize)]
struct WireCredentials<'a> {
    access_key_id: &'a str,
    secret_access_key: &'a str,
}

#[derive(Debug, Deserialize)]
struct WireLaunched {
    id: String,
}

#[derive(Debug, Deserialize)]
struct WireErrorBody {
    message: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WireAnswer<'a> {
    YesNo { yes: bool },
    Input { input: Option<&'a str> },
}

impl<'a> From<&'a PromptAnswer> for WireAnswer<'a> {
    fn from(answer: &'a PromptAnswer) -> Self {
        match answer {
            PromptAnswer::Yes(yes) => WireAnswer::YesNo { yes: *yes },
            PromptAnswer::Input(input) => WireAnswer::Input {
                input: input.as_deref(),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReqwestInstallerApi {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestInstallerApi {
    pub fn new(settings: ClientSettings) -> Result<Self, RequestError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| RequestError::new(LaunchFailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }
}

#[async_trait::async_trait]
impl InstallerApi for ReqwestInstallerApi {
    async fn launch(&self, config: &LaunchConfig) -> Result<InstallId, RequestError> {
        let url = self.settings.endpoint(&["install"])?;
        let body = WireLaunch {
            creds: WireCredentials {
                access_key_id: &config.credentials.access_key_id,
                secret_access_key: &config.credentials.secret_access_key,
            },
            region: &config.region,
            instance_type: &config.instance_type,
            num_instances: config.num_instances,
        };

        let response = self
            .client
            .post(url)
            .timeout(self.settings.request_timeout)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(status_error(status, &bytes));
        }

        let launched: WireLaunched = serde_json::from_slice(&bytes).map_err(|err| {
            RequestError::new(LaunchFailureKind::InvalidResponse, err.to_string())
        })?;
        installer_info!("Install launched with id {}", launched.id);
        Ok(launched.id)
    }

    async fn stream_events(
        &self,
        install_id: &str,
        sink: &dyn ActionSink,
    ) -> Result<StreamEnd, RequestError> {
        let url = self.settings.endpoint(&["events", install_id])?;
        let idle = self.settings.stream_idle_timeout;
        let request = self.client.get(url).header(ACCEPT, EVENT_STREAM).send();
        let response = tokio::time::timeout(idle, request)
            .await
            .map_err(|_| idle_error(idle))?
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            let bytes = response.bytes().await.unwrap_or_default();
            return Err(status_error(status, &bytes));
        }

        installer_info!("Streaming events for install {}", install_id);
        let mut decoder = SseDecoder::with_max_record_bytes(self.settings.max_record_bytes);
        let mut records = 0;
        let mut stream = response.bytes_stream();
        loop {
            let chunk = match tokio::time::timeout(idle, stream.next()).await {
                Ok(Some(Ok(chunk))) => chunk,
                Ok(Some(Err(err))) => {
                    return Ok(StreamEnd::Disconnected {
                        records,
                        error: Some(map_reqwest_error(err)),
                    });
                }
                Ok(None) => break,
                Err(_) => {
                    installer_warn!("Event stream for install {} went silent", install_id);
                    return Ok(StreamEnd::Disconnected {
                        records,
                        error: Some(idle_error(idle)),
                    });
                }
            };
            for event in decoder.feed(&chunk) {
                records += 1;
                let Some(action) = decode_record(&event) else {
                    continue;
                };
                installer_debug!("Stream record for {}: {}", install_id, action.name());
                let terminal = is_terminal(&action);
                sink.emit(action);
                if terminal {
                    return Ok(StreamEnd::Terminal);
                }
            }
            if let Err(err) = decoder.check_limit() {
                return Ok(StreamEnd::Disconnected {
                    records,
                    error: Some(RequestError::new(
                        LaunchFailureKind::InvalidResponse,
                        err.to_string(),
                    )),
                });
            }
        }
        Ok(StreamEnd::Disconnected {
            records,
            error: None,
        })
    }

    async fn answer_prompt(
        &self,
        install_id: &str,
        answer: &PromptAnswer,
    ) -> Result<(), RequestError> {
        let url = self.settings.endpoint(&["prompt", install_id])?;
        let response = self
            .client
            .post(url)
            .timeout(self.settings.request_timeout)
            .json(&WireAnswer::from(answer))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            let bytes = response.bytes().await.unwrap_or_default();
            return Err(status_error(status, &bytes));
        }
        Ok(())
    }
}

fn idle_error(idle: Duration) -> RequestError {
    RequestError::new(
        LaunchFailureKind::Timeout,
        format!("no data from installer for {idle:?}"),
    )
}

/// Prefers the `message` of a JSON error body over the bare status line.
fn status_error(status: StatusCode, body: &[u8]) -> RequestError {
    let message = serde_json::from_slice::<WireErrorBody>(body)
        .map(|body| body.message)
        .unwrap_or_else(|_| status.to_string());
    RequestError::new(LaunchFailureKind::HttpStatus(status.as_u16()), message)
}
