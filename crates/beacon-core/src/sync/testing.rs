//! Scripted in-memory transport shared by the sync and app tests.

use std::collections::VecDeque;

use super::{HttpResponse, Transport};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum FakeError {
    Unreachable,
    Unscripted,
}

pub(crate) struct ScriptedTransport {
    pub connected: bool,
    pub get_replies: VecDeque<Result<(u16, &'static str), FakeError>>,
    pub post_replies: VecDeque<Result<u16, FakeError>>,
    pub posted: Vec<String>,
    pub get_calls: usize,
}

impl ScriptedTransport {
    pub fn online() -> Self {
        Self {
            connected: true,
            get_replies: VecDeque::new(),
            post_replies: VecDeque::new(),
            posted: Vec::new(),
            get_calls: 0,
        }
    }

    pub fn offline() -> Self {
        Self {
            connected: false,
            ..Self::online()
        }
    }

    pub fn reply_json(&mut self, body: &'static str) -> &mut Self {
        self.get_replies.push_back(Ok((200, body)));
        self
    }

    pub fn reply_get(&mut self, reply: Result<(u16, &'static str), FakeError>) -> &mut Self {
        self.get_replies.push_back(reply);
        self
    }

    pub fn reply_post(&mut self, reply: Result<u16, FakeError>) -> &mut Self {
        self.post_replies.push_back(reply);
        self
    }
}

impl Transport for ScriptedTransport {
    type Error = FakeError;

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn post_json(&mut self, body: &[u8]) -> Result<u16, Self::Error> {
        self.posted.push(String::from_utf8_lossy(body).into_owned());
        self.post_replies.pop_front().unwrap_or(Ok(200))
    }

    async fn get(&mut self, body: &mut [u8]) -> Result<HttpResponse, Self::Error> {
        self.get_calls += 1;
        let (status, json) = self
            .get_replies
            .pop_front()
            .unwrap_or(Err(FakeError::Unscripted))?;
        let len = json.len().min(body.len());
        body[..len].copy_from_slice(&json.as_bytes()[..len]);
        Ok(HttpResponse {
            status,
            body_len: json.len(),
        })
    }
}
