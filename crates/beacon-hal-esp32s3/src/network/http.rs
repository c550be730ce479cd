//! Minimal HTTP/1.1 client for the message inbox over an embassy-net TCP socket.
//!
//! One connection per request (`Connection: close`), response read to EOF
//! into a fixed buffer, `Content-Length` and chunked bodies understood.

use core::{fmt::Write as _, net::Ipv4Addr, ops::Range, str};

use embassy_net::{IpAddress, Stack, dns::DnsQueryType, tcp::TcpSocket};
use embassy_time::Duration;
use heapless::String;
use log::{debug, warn};

use beacon_core::sync::{HttpResponse, RESPONSE_BYTES, Transport};

use super::ConnectivityHandle;

pub const SOCKET_BUFFER_BYTES: usize = 1024;
/// Head room for the status line and headers on top of the core's body buffer.
pub const RESPONSE_HEAD_ROOM_BYTES: usize = 512;
pub const RESPONSE_BUFFER_BYTES: usize = RESPONSE_BYTES + RESPONSE_HEAD_ROOM_BYTES;
pub const REQUEST_TIMEOUT_MS: u64 = 5_000;
const HEAD_BYTES: usize = 256;
const USER_AGENT: &str = "beacon/0.1";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InboxEndpoint {
    pub host: &'static str,
    pub port: u16,
    pub path: &'static str,
}

impl InboxEndpoint {
    pub const fn new(host: &'static str, port: u16, path: &'static str) -> Self {
        Self { host, port, path }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

#[derive(Debug)]
pub enum HttpError {
    Dns(embassy_net::dns::Error),
    NoAddress,
    Connect(embassy_net::tcp::ConnectError),
    Io(embassy_net::tcp::Error),
    RequestTooLarge,
    MalformedResponse,
}

/// Status code and the body's byte range inside the response buffer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParsedResponse {
    pub status: u16,
    pub body: Range<usize>,
    /// `Content-Length`, which may exceed what fit in the buffer.
    pub declared_len: Option<usize>,
}

impl ParsedResponse {
    /// Length of the body as sent, not as received.
    pub fn full_body_len(&self) -> usize {
        self.declared_len.unwrap_or(0).max(self.body.len())
    }
}

pub fn write_request_head(
    out: &mut String<HEAD_BYTES>,
    method: Method,
    endpoint: &InboxEndpoint,
    body_len: usize,
) -> Result<(), HttpError> {
    write!(out, "{} {} HTTP/1.1\r\nHost: {}", method.as_str(), endpoint.path, endpoint.host)
        .map_err(|_| HttpError::RequestTooLarge)?;
    if endpoint.port != 80 {
        write!(out, ":{}", endpoint.port).map_err(|_| HttpError::RequestTooLarge)?;
    }
    write!(
        out,
        "\r\nUser-Agent: {}\r\nAccept: application/json\r\nConnection: close\r\n",
        USER_AGENT
    )
    .map_err(|_| HttpError::RequestTooLarge)?;

    if method == Method::Post {
        write!(
            out,
            "Content-Type: application/json\r\nContent-Length: {}\r\n",
            body_len
        )
        .map_err(|_| HttpError::RequestTooLarge)?;
    }

    out.push_str("\r\n").map_err(|_| HttpError::RequestTooLarge)
}

/// Parses a complete response held in `buf`, decoding a chunked body in place.
pub fn parse_response(buf: &mut [u8]) -> Result<ParsedResponse, HttpError> {
    let head_end = find(buf, b"\r\n\r\n").ok_or(HttpError::MalformedResponse)?;
    let body_start = head_end + 4;

    let (status, content_length, chunked) = {
        let head = str::from_utf8(&buf[..head_end]).map_err(|_| HttpError::MalformedResponse)?;
        let mut lines = head.split("\r\n");
        let status = parse_status_line(lines.next().unwrap_or(""))?;

        let mut content_length = None;
        let mut chunked = false;
        for line in lines {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.parse::<usize>().ok();
            } else if name.eq_ignore_ascii_case("transfer-encoding") {
                chunked = value.eq_ignore_ascii_case("chunked");
            }
        }
        (status, content_length, chunked)
    };

    if chunked {
        let len = dechunk_in_place(&mut buf[body_start..])?;
        return Ok(ParsedResponse {
            status,
            body: body_start..body_start + len,
            declared_len: None,
        });
    }

    let body_end = match content_length {
        Some(len) => body_start.saturating_add(len).min(buf.len()),
        None => buf.len(),
    };
    Ok(ParsedResponse {
        status,
        body: body_start..body_end,
        declared_len: content_length,
    })
}

fn parse_status_line(line: &str) -> Result<u16, HttpError> {
    let mut parts = line.split_whitespace();
    let version = parts.next().ok_or(HttpError::MalformedResponse)?;
    if !version.starts_with("HTTP/1.") {
        return Err(HttpError::MalformedResponse);
    }
    parts
        .next()
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or(HttpError::MalformedResponse)
}

/// Joins chunk payloads at the front of `data`. A body cut short by the
/// buffer yields whatever arrived.
pub fn dechunk_in_place(data: &mut [u8]) -> Result<usize, HttpError> {
    let mut read = 0usize;
    let mut write = 0usize;

    loop {
        let Some(line_len) = find(&data[read..], b"\r\n") else {
            return Ok(write);
        };
        let size_line =
            str::from_utf8(&data[read..read + line_len]).map_err(|_| HttpError::MalformedResponse)?;
        let size_hex = size_line.split(';').next().unwrap_or("").trim();
        let size = usize::from_str_radix(size_hex, 16).map_err(|_| HttpError::MalformedResponse)?;
        read += line_len + 2;

        if size == 0 {
            return Ok(write);
        }

        let take = size.min(data.len().saturating_sub(read));
        data.copy_within(read..read + take, write);
        write += take;
        if take < size {
            return Ok(write);
        }

        read += size + 2;
        if read >= data.len() {
            return Ok(write);
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

pub struct HttpTransport<'a> {
    stack: Stack<'a>,
    connectivity: &'a ConnectivityHandle,
    endpoint: InboxEndpoint,
    timeout: Duration,
    rx_buf: [u8; SOCKET_BUFFER_BYTES],
    tx_buf: [u8; SOCKET_BUFFER_BYTES],
    response: [u8; RESPONSE_BUFFER_BYTES],
}

impl<'a> HttpTransport<'a> {
    pub fn new(
        stack: Stack<'a>,
        connectivity: &'a ConnectivityHandle,
        endpoint: InboxEndpoint,
    ) -> Self {
        Self {
            stack,
            connectivity,
            endpoint,
            timeout: Duration::from_millis(REQUEST_TIMEOUT_MS),
            rx_buf: [0u8; SOCKET_BUFFER_BYTES],
            tx_buf: [0u8; SOCKET_BUFFER_BYTES],
            response: [0u8; RESPONSE_BUFFER_BYTES],
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout = Duration::from_millis(timeout_ms);
        self
    }

    pub fn endpoint(&self) -> InboxEndpoint {
        self.endpoint
    }

    async fn resolve(&self) -> Result<IpAddress, HttpError> {
        if let Ok(address) = self.endpoint.host.parse::<Ipv4Addr>() {
            return Ok(IpAddress::Ipv4(address));
        }

        let addresses = self
            .stack
            .dns_query(self.endpoint.host, DnsQueryType::A)
            .await
            .map_err(HttpError::Dns)?;
        addresses.first().copied().ok_or(HttpError::NoAddress)
    }

    async fn exchange(&mut self, method: Method, body: &[u8]) -> Result<ParsedResponse, HttpError> {
        let mut head = String::<HEAD_BYTES>::new();
        write_request_head(&mut head, method, &self.endpoint, body.len())?;

        let address = self.resolve().await?;
        let mut socket = TcpSocket::new(self.stack, &mut self.rx_buf, &mut self.tx_buf);
        socket.set_timeout(Some(self.timeout));
        socket
            .connect((address, self.endpoint.port))
            .await
            .map_err(HttpError::Connect)?;

        write_all(&mut socket, head.as_bytes()).await?;
        write_all(&mut socket, body).await?;
        socket.flush().await.map_err(HttpError::Io)?;

        let received = read_to_end(&mut socket, &mut self.response).await?;
        socket.close();

        let parsed = parse_response(&mut self.response[..received])?;
        debug!(
            "http: {} {} status={} body_bytes={}",
            method.as_str(),
            self.endpoint.path,
            parsed.status,
            parsed.body.len()
        );
        Ok(parsed)
    }
}

async fn write_all(socket: &mut TcpSocket<'_>, mut data: &[u8]) -> Result<(), HttpError> {
    while !data.is_empty() {
        let written = socket.write(data).await.map_err(HttpError::Io)?;
        if written == 0 {
            return Err(HttpError::Io(embassy_net::tcp::Error::ConnectionReset));
        }
        data = &data[written..];
    }
    Ok(())
}

async fn read_to_end(socket: &mut TcpSocket<'_>, buf: &mut [u8]) -> Result<usize, HttpError> {
    let mut total = 0usize;
    loop {
        let n = socket.read(&mut buf[total..]).await.map_err(HttpError::Io)?;
        if n == 0 {
            return Ok(total);
        }
        total += n;
        if total >= buf.len() {
            warn!("http: response truncated at {} bytes", total);
            return Ok(total);
        }
    }
}

impl Transport for HttpTransport<'_> {
    type Error = HttpError;

    fn is_connected(&self) -> bool {
        self.connectivity.is_online()
    }

    async fn post_json(&mut self, body: &[u8]) -> Result<u16, Self::Error> {
        let response = self.exchange(Method::Post, body).await?;
        Ok(response.status)
    }

    async fn get(&mut self, body: &mut [u8]) -> Result<HttpResponse, Self::Error> {
        let response = self.exchange(Method::Get, &[]).await?;
        let body_len = response.full_body_len();
        let payload = &self.response[response.body];
        let len = payload.len().min(body.len());
        body[..len].copy_from_slice(&payload[..len]);

        Ok(HttpResponse {
            status: response.status,
            body_len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENDPOINT: InboxEndpoint = InboxEndpoint::new("inbox.local", 80, "/api/message");

    #[test]
    fn get_head_has_no_body_headers() {
        let mut head = String::<HEAD_BYTES>::new();
        write_request_head(&mut head, Method::Get, &ENDPOINT, 0).unwrap();

        assert_eq!(
            head.as_str(),
            "GET /api/message HTTP/1.1\r\nHost: inbox.local\r\nUser-Agent: beacon/0.1\r\n\
             Accept: application/json\r\nConnection: close\r\n\r\n"
        );
    }

    #[test]
    fn post_head_carries_json_length_and_port() {
        let endpoint = InboxEndpoint::new("10.0.0.2", 8080, "/api/message");
        let mut head = String::<HEAD_BYTES>::new();
        write_request_head(&mut head, Method::Post, &endpoint, 17).unwrap();

        assert!(head.starts_with("POST /api/message HTTP/1.1\r\nHost: 10.0.0.2:8080\r\n"));
        assert!(head.contains("Content-Type: application/json\r\nContent-Length: 17\r\n"));
        assert!(head.ends_with("\r\n\r\n"));
    }

    #[test]
    fn content_length_bounds_the_body() {
        let mut raw = *b"HTTP/1.1 200 OK\r\nContent-Length: 16\r\n\r\n{\"message\":\"a\"}\ntrailing";
        let parsed = parse_response(&mut raw).unwrap();

        assert_eq!(parsed.status, 200);
        assert_eq!(&raw[parsed.body], b"{\"message\":\"a\"}\n");
    }

    #[test]
    fn declared_length_survives_a_cut_off_read() {
        let mut raw = *b"HTTP/1.1 200 OK\r\nContent-Length: 4096\r\n\r\n{\"message\":\"aaaa";
        let parsed = parse_response(&mut raw).unwrap();

        assert_eq!(parsed.body.len(), 16);
        assert_eq!(parsed.full_body_len(), 4096);
    }

    #[test]
    fn body_runs_to_eof_without_length() {
        let mut raw = *b"HTTP/1.0 404 Not Found\r\nServer: x\r\n\r\nnope";
        let parsed = parse_response(&mut raw).unwrap();

        assert_eq!(parsed.status, 404);
        assert_eq!(&raw[parsed.body], b"nope");
    }

    #[test]
    fn chunked_body_is_joined_in_place() {
        let mut raw = *b"HTTP/1.1 200 OK\r\ntransfer-encoding: Chunked\r\n\r\n\
            4\r\n{\"me\r\n\
            a;ext=1\r\nssage\":\"hi\r\n\
            2\r\n\"}\r\n\
            0\r\n\r\n";
        let parsed = parse_response(&mut raw).unwrap();

        assert_eq!(&raw[parsed.body], b"{\"message\":\"hi\"}");
    }

    #[test]
    fn truncated_chunk_keeps_received_bytes() {
        let mut data = *b"a\r\n01234";
        assert_eq!(dechunk_in_place(&mut data).unwrap(), 5);
        assert_eq!(&data[..5], b"01234");
    }

    #[test]
    fn garbage_is_rejected() {
        let mut missing_head_end = *b"HTTP/1.1 200 OK\r\n";
        assert!(matches!(
            parse_response(&mut missing_head_end),
            Err(HttpError::MalformedResponse)
        ));

        let mut bad_status = *b"SMTP 220 hello\r\n\r\n";
        assert!(matches!(
            parse_response(&mut bad_status),
            Err(HttpError::MalformedResponse)
        ));

        let mut bad_chunk = *b"zz\r\nabc";
        assert!(matches!(
            dechunk_in_place(&mut bad_chunk),
            Err(HttpError::MalformedResponse)
        ));
    }
}
