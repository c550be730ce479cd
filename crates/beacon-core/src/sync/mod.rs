//! Latest-message synchronization against a single-slot remote inbox.
//!
//! The engine owns one [`SyncState`]: the message on screen, where it came
//! from, and whether the scroll presenter still has to pick it up. Sends
//! overwrite it locally before touching the network; polls only overwrite it
//! when the inbox holds something different.

mod envelope;
mod transport;

pub use envelope::{InboxContent, decode_inbox, encode_message};
pub use transport::{HttpResponse, Transport, is_success_status};

use log::{debug, info, warn};

use crate::{
    rate::RateLimiter,
    text_policy::{MessageText, Vocabulary, message_from},
};

pub const BOOT_SENTINEL: &str = "Starting...";
pub const POLL_INTERVAL_MS: u64 = 10_000;
pub const FAST_POLL_INTERVAL_MS: u64 = 5_000;
pub const RESPONSE_BYTES: usize = 2048;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Provenance {
    /// Sent from this device.
    Local,
    /// Fetched from the inbox.
    Remote,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SyncState {
    latest: MessageText,
    /// `latest` as it travels on the wire, before any receive-path words.
    wire: MessageText,
    provenance: Option<Provenance>,
    dirty: bool,
    last_fetch_ms: Option<u64>,
    last_send_ms: Option<u64>,
}

impl SyncState {
    /// Boot state: the sentinel is shown but nothing has been sent or fetched.
    pub fn booting(sentinel: &str) -> Self {
        Self {
            latest: message_from(sentinel),
            wire: MessageText::new(),
            provenance: None,
            dirty: true,
            last_fetch_ms: None,
            last_send_ms: None,
        }
    }

    pub fn latest_message(&self) -> &str {
        self.latest.as_str()
    }

    /// `None` until the first send or remote update.
    pub fn provenance(&self) -> Option<Provenance> {
        self.provenance
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn last_fetch_ms(&self) -> Option<u64> {
        self.last_fetch_ms
    }

    /// When the last online send was attempted, whatever its outcome.
    pub fn last_send_ms(&self) -> Option<u64> {
        self.last_send_ms
    }

    /// Clears the dirty flag, returning whether it was set.
    pub fn take_dirty(&mut self) -> bool {
        core::mem::replace(&mut self.dirty, false)
    }

    fn set_local(&mut self, text: &str, now_ms: u64) {
        self.latest = message_from(text);
        self.wire = self.latest.clone();
        self.provenance = Some(Provenance::Local);
        self.dirty = true;
        self.last_send_ms = Some(now_ms);
    }

    /// An echo of what is already shown, in either form, changes nothing.
    fn merge_remote(&mut self, received: Received) -> bool {
        if received.wire == self.wire || received.shown == self.latest {
            return false;
        }
        self.latest = received.shown;
        self.wire = received.wire;
        self.provenance = Some(Provenance::Remote);
        self.dirty = true;
        true
    }
}

/// Inbox text as fetched and as it will be shown.
#[derive(Clone, Debug, Eq, PartialEq)]
struct Received {
    wire: MessageText,
    shown: MessageText,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SyncConfig {
    pub poll_interval_ms: u64,
    pub sentinel: &'static str,
    pub vocabulary: Vocabulary,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: POLL_INTERVAL_MS,
            sentinel: BOOT_SENTINEL,
            vocabulary: Vocabulary::empty(),
        }
    }
}

impl SyncConfig {
    pub const fn with_poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    pub const fn with_sentinel(mut self, sentinel: &'static str) -> Self {
        self.sentinel = sentinel;
        self
    }

    pub const fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }
}

#[derive(Debug)]
pub enum SyncError<E> {
    Transport(E),
    /// Non-2xx HTTP status.
    Status(u16),
    Decode,
    Encode,
    /// Body length that did not fit the response buffer.
    Oversized(usize),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SendOutcome {
    /// No link; nothing changed.
    Offline,
    Delivered { status: u16 },
    Rejected { status: u16 },
    Failed,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PollOutcome {
    NotDue,
    Offline,
    Unchanged,
    Updated,
    /// The inbox answered but holds no message.
    Empty,
    DecodeFailed,
    /// Body larger than the response buffer; not decoded.
    Oversized,
    Failed,
}

pub struct SyncEngine<T>
where
    T: Transport,
{
    transport: T,
    state: SyncState,
    poll_gate: RateLimiter,
    vocabulary: Vocabulary,
    body: [u8; RESPONSE_BYTES],
}

impl<T> SyncEngine<T>
where
    T: Transport,
{
    pub fn new(transport: T, config: SyncConfig) -> Self {
        Self {
            transport,
            state: SyncState::booting(config.sentinel),
            poll_gate: RateLimiter::new(config.poll_interval_ms),
            vocabulary: config.vocabulary,
            body: [0u8; RESPONSE_BYTES],
        }
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SyncState {
        &mut self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn is_online(&self) -> bool {
        self.transport.is_connected()
    }

    /// Shows `text` as a local message and posts it once.
    pub async fn send(&mut self, text: &str, now_ms: u64) -> SendOutcome {
        if !self.transport.is_connected() {
            info!("sync: send skipped offline text={:?}", text);
            return SendOutcome::Offline;
        }

        self.state.set_local(text, now_ms);

        match self.post(text).await {
            Ok(status) => {
                info!("sync: sent text={:?} status={} at_ms={}", text, status, now_ms);
                SendOutcome::Delivered { status }
            }
            Err(SyncError::Status(status)) => {
                warn!("sync: send rejected text={:?} status={}", text, status);
                SendOutcome::Rejected { status }
            }
            Err(err) => {
                warn!("sync: send failed text={:?} err={:?}", text, err);
                SendOutcome::Failed
            }
        }
    }

    /// Fetches the inbox if the poll interval has elapsed.
    pub async fn poll(&mut self, now_ms: u64) -> PollOutcome {
        if !self.poll_gate.ready(now_ms) {
            return PollOutcome::NotDue;
        }
        if !self.transport.is_connected() {
            return PollOutcome::Offline;
        }

        self.poll_gate.mark(now_ms);
        self.state.last_fetch_ms = Some(now_ms);

        match self.fetch().await {
            Ok(Some(received)) => {
                if self.state.merge_remote(received) {
                    info!("sync: new remote message={:?}", self.state.latest_message());
                    PollOutcome::Updated
                } else {
                    debug!("sync: remote message unchanged");
                    PollOutcome::Unchanged
                }
            }
            Ok(None) => {
                debug!("sync: inbox empty");
                PollOutcome::Empty
            }
            Err(SyncError::Decode) => {
                warn!("sync: inbox body is not a message envelope");
                PollOutcome::DecodeFailed
            }
            Err(SyncError::Oversized(len)) => {
                warn!(
                    "sync: inbox body too large body_len={} capacity={}",
                    len, RESPONSE_BYTES
                );
                PollOutcome::Oversized
            }
            Err(err) => {
                warn!("sync: fetch failed err={:?}", err);
                PollOutcome::Failed
            }
        }
    }

    async fn post(&mut self, text: &str) -> Result<u16, SyncError<T::Error>> {
        let body = encode_message(text).map_err(|_| SyncError::Encode)?;
        let status = self
            .transport
            .post_json(&body)
            .await
            .map_err(SyncError::Transport)?;
        if !is_success_status(status) {
            return Err(SyncError::Status(status));
        }
        Ok(status)
    }

    async fn fetch(&mut self) -> Result<Option<Received>, SyncError<T::Error>> {
        let response = self
            .transport
            .get(&mut self.body)
            .await
            .map_err(SyncError::Transport)?;
        if !response.is_success() {
            return Err(SyncError::Status(response.status));
        }

        if response.body_len > self.body.len() {
            return Err(SyncError::Oversized(response.body_len));
        }

        match decode_inbox(&self.body[..response.body_len]).map_err(|_| SyncError::Decode)? {
            InboxContent::Message(message) => Ok(Some(Received {
                wire: message_from(&message),
                shown: self.vocabulary.substitute(&message),
            })),
            InboxContent::Empty => Ok(None),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing;
