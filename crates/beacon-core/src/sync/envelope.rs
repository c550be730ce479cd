//! `{"message": ...}` wire envelope.

use alloc::{borrow::Cow, vec::Vec};

use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct OutgoingEnvelope<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct IncomingEnvelope<'a> {
    #[serde(borrow)]
    message: Option<Cow<'a, str>>,
    #[serde(rename = "statusCode")]
    status_code: Option<u16>,
}

/// What the inbox slot currently holds.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InboxContent<'a> {
    Message(Cow<'a, str>),
    /// No `message` field, or the server flagged the slot as empty.
    Empty,
}

pub fn encode_message(text: &str) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&OutgoingEnvelope { message: text })
}

pub fn decode_inbox(body: &[u8]) -> Result<InboxContent<'_>, serde_json::Error> {
    let envelope: IncomingEnvelope<'_> = serde_json::from_slice(body)?;

    if envelope.status_code.is_some_and(|code| code != 200) {
        return Ok(InboxContent::Empty);
    }

    Ok(match envelope.message {
        Some(message) => InboxContent::Message(message),
        None => InboxContent::Empty,
    })
}
