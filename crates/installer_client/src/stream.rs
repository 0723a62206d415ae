use installer_core::Action;
use installer_logging::{installer_error, installer_info, installer_warn};

use crate::{ActionSink, ClientSettings, InstallerApi, StreamEnd};

/// Keeps the event stream for `install_id` open until the install reaches
/// a terminal record.
///
/// A connection that ends early is re-established after
/// `reconnect_delay`. A connection that delivered at least one record resets
/// the failure count. Once more than `max_reconnects` consecutive
/// connections failed without delivering a record, `InstallFailed` is
/// emitted and the follower stops.
pub async fn follow_event_stream(
    api: &dyn InstallerApi,
    settings: &ClientSettings,
    install_id: &str,
    sink: &dyn ActionSink,
) {
    let mut failed_attempts: u32 = 0;
    loop {
        let (records, reason) = match api.stream_events(install_id, sink).await {
            Ok(StreamEnd::Terminal) => {
                installer_info!("Event stream for install {} finished", install_id);
                return;
            }
            Ok(StreamEnd::Disconnected { records, error }) => (
                records,
                error
                    .map(|err| err.to_string())
                    .unwrap_or_else(|| "stream closed before the install finished".to_string()),
            ),
            Err(err) => (0, err.to_string()),
        };

        // Delivered records reset the failure count.
        if records > 0 {
            failed_attempts = 0;
            installer_warn!(
                "Event stream for install {} interrupted after {} records ({}); reconnecting",
                install_id,
                records,
                reason
            );
            tokio::time::sleep(settings.reconnect_delay).await;
            continue;
        }

        failed_attempts += 1;
        if failed_attempts > settings.max_reconnects {
            installer_error!(
                "Giving up on event stream for install {} after {} attempts: {}",
                install_id,
                failed_attempts,
                reason
            );
            sink.emit(Action::InstallFailed {
                message: format!("lost connection to installer: {reason}"),
            });
            return;
        }

        installer_warn!(
            "Event stream for install {} interrupted ({}); reconnect {}/{}",
            install_id,
            reason,
            failed_attempts,
            settings.max_reconnects
        );
        tokio::time::sleep(settings.reconnect_delay).await;
    }
}
