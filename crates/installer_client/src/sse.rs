use thiserror::Error;

pub(crate) const DEFAULT_MAX_RECORD_BYTES: usize = 1024 * 1024;

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SseEvent {
    /// Value of the last `event:` field, if any.
    pub event: Option<String>,
    /// All `data:` lines of the record joined with `\n`.
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("event-stream record exceeds {limit} bytes")]
pub struct RecordTooLarge {
    pub limit: usize,
}

/// Incremental `text/event-stream` parser. Bytes may arrive split at any
/// point; records are returned once their terminating blank line is seen.
#[derive(Debug)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Option<String>,
    max_record_bytes: usize,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::with_max_record_bytes(DEFAULT_MAX_RECORD_BYTES)
    }
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_record_bytes(max_record_bytes: usize) -> Self {
        Self {
            buffer: Vec::new(),
            event: None,
            data: None,
            max_record_bytes,
        }
    }

    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.buffer[start..].iter().position(|b| *b == b'\n') {
            let end = start + offset;
            let mut line = &self.buffer[start..end];
            if let Some(stripped) = line.strip_suffix(b"\r") {
                line = stripped;
            }
            let line = String::from_utf8_lossy(line).into_owned();
            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
            start = end + 1;
        }
        self.buffer.drain(..start);
        events
    }

    /// Bytes received but not yet terminated by a newline.
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    /// Fails once the record still being assembled outgrows the limit.
    /// Records already returned by [`SseDecoder::feed`] are unaffected.
    pub fn check_limit(&self) -> Result<(), RecordTooLarge> {
        let held = self.buffer.len()
            + self.data.as_ref().map_or(0, String::len)
            + self.event.as_ref().map_or(0, String::len);
        if held > self.max_record_bytes {
            return Err(RecordTooLarge {
                limit: self.max_record_bytes,
            });
        }
        Ok(())
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            let event = self.event.take();
            return self.data.take().map(|data| SseEvent { event, data });
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => match &mut self.data {
                Some(data) => {
                    data.push('\n');
                    data.push_str(value);
                }
                None => self.data = Some(value.to_string()),
            },
            // id and retry are not used by the installer protocol.
            _ => {}
        }
        None
    }
}
