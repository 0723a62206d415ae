use installer_core::{Action, InstallEvent, Prompt, PromptKind};
use installer_logging::installer_debug;
use serde::Deserialize;

use crate::SseEvent;

const ERROR_EVENT: &str = "error";
const YES_NO_PROMPT: &str = "yes_no";

#[derive(Debug, Deserialize)]
struct WireRecord {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    prompt: Option<WirePrompt>,
}

#[derive(Debug, Deserialize)]
struct WirePrompt {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct WireError {
    message: String,
}

/// Maps one server-sent event to the action it announces. Unknown record
/// types and malformed payloads yield `None`.
pub fn decode_record(event: &SseEvent) -> Option<Action> {
    if event.event.as_deref() == Some(ERROR_EVENT) {
        return Some(Action::InstallFailed {
            message: decode_error_message(&event.data),
        });
    }

    let record: WireRecord = match serde_json::from_str(&event.data) {
        Ok(record) => record,
        Err(err) => {
            installer_debug!("Skipping undecodable stream record: {}", err);
            return None;
        }
    };

    let action = match record.kind.as_str() {
        "status" => Action::InstallEvent(InstallEvent::new(
            record.description.unwrap_or_default(),
        )),
        "prompt" => {
            let prompt = record.prompt?;
            let kind = if prompt.kind == YES_NO_PROMPT {
                PromptKind::YesNo
            } else {
                PromptKind::Text
            };
            Action::InstallPromptRequested(Prompt {
                kind,
                message: prompt.message,
            })
        }
        "domain" => Action::Domain(record.description?),
        "dashboard_login_token" => Action::DashboardLoginToken(record.description?),
        "ca_cert" => Action::CaCert(record.description?),
        "done" => Action::InstallDone,
        other => {
            installer_debug!("Ignoring stream record of unknown type {:?}", other);
            return None;
        }
    };
    Some(action)
}

/// Error payloads come as a JSON string, a JSON object with a `message`
/// field, or plain text.
fn decode_error_message(data: &str) -> String {
    if let Ok(message) = serde_json::from_str::<String>(data) {
        return message;
    }
    if let Ok(error) = serde_json::from_str::<WireError>(data) {
        return error.message;
    }
    data.to_string()
}

pub(crate) fn is_terminal(action: &Action) -> bool {
    matches!(action, Action::InstallDone | Action::InstallFailed { .. })
}
