/// Result of a GET once the body has been copied into the caller's buffer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    /// Full body length. Only the first `body.len()` bytes are copied, so a
    /// value larger than the caller's buffer means the body was cut short.
    pub body_len: usize,
}

impl HttpResponse {
    pub const fn is_success(&self) -> bool {
        is_success_status(self.status)
    }
}

pub const fn is_success_status(status: u16) -> bool {
    status >= 200 && status < 300
}

/// Request/response link to the fixed inbox endpoint.
///
/// Calls are awaited inline by the loop, so an implementation stalls the
/// whole device until it returns. Connectivity is sampled before each call;
/// an offline transport is never asked to do I/O.
#[allow(async_fn_in_trait)]
pub trait Transport {
    type Error: core::fmt::Debug;

    fn is_connected(&self) -> bool;

    /// POSTs a JSON body and returns the HTTP status code.
    async fn post_json(&mut self, body: &[u8]) -> Result<u16, Self::Error>;

    /// GETs the inbox into `body`.
    async fn get(&mut self, body: &mut [u8]) -> Result<HttpResponse, Self::Error>;
}
