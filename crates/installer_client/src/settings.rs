use std::time::Duration;

use installer_core::LaunchFailureKind;
use reqwest::Url;

use crate::sse::DEFAULT_MAX_RECORD_BYTES;
use crate::RequestError;

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Root of the installer API, e.g. `http://localhost:4000`.
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Applies to launch and prompt requests. The event stream stays open
    /// for as long as the install runs.
    pub request_timeout: Duration,
    /// Longest silence tolerated on the event stream, both while waiting
    /// for the response head and between body chunks.
    pub stream_idle_timeout: Duration,
    /// Upper bound on one event-stream record, including any partial line.
    pub max_record_bytes: usize,
    /// Consecutive failed connections tolerated before the install is
    /// reported as failed.
    pub max_reconnects: u32,
    pub reconnect_delay: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            stream_idle_timeout: Duration::from_secs(300),
            max_record_bytes: DEFAULT_MAX_RECORD_BYTES,
            max_reconnects: 3,
            reconnect_delay: Duration::from_secs(1),
        }
    }
}

impl ClientSettings {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, RequestError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|err| {
                RequestError::new(LaunchFailureKind::InvalidUrl, err.to_string())
            })?;
        url.path_segments_mut()
            .map_err(|_| {
                RequestError::new(
                    LaunchFailureKind::InvalidUrl,
                    format!("{} cannot be a base url", self.base_url),
                )
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}
