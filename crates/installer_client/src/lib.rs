//! Installer client: HTTP launch requests, the server-sent event stream and
//! prompt answers, bridged onto the single-threaded core.
mod api;
mod handle;
mod record;
mod settings;
mod sink;
mod sse;
mod stream;
mod types;

pub use api::{InstallerApi, ReqwestInstallerApi};
pub use handle::{ClientError, InstallerClient};
pub use record::decode_record;
pub use settings::ClientSettings;
pub use sink::{ActionSink, ChannelActionSink};
pub use sse::{RecordTooLarge, SseDecoder, SseEvent};
pub use stream::follow_event_stream;
pub use types::{RequestError, StreamEnd};
