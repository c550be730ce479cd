//! Wi-Fi link state shared between the supervisor task and the UI loop.

pub mod http;

use core::sync::atomic::{AtomicU32, Ordering};

pub const WIFI_RETRY_BACKOFF_MIN_SECS: u64 = 2;
pub const WIFI_RETRY_BACKOFF_MAX_SECS: u64 = 120;

/// Delay before reconnect attempt number `consecutive_failures + 1`.
pub fn wifi_retry_backoff_secs(consecutive_failures: u32) -> u64 {
    // 2, 4, 8, 16, 32, 64, 120, 120, ...
    let shift = consecutive_failures.min(6);
    WIFI_RETRY_BACKOFF_MIN_SECS
        .saturating_mul(1u64 << shift)
        .min(WIFI_RETRY_BACKOFF_MAX_SECS)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConnectivityState {
    Disconnected,
    Connecting,
    LinkUpNoIp,
    Online,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WifiConfig {
    pub ssid: &'static str,
    pub password: &'static str,
}

impl WifiConfig {
    pub const fn new(ssid: &'static str, password: &'static str) -> Self {
        Self { ssid, password }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ConnectivitySnapshot {
    pub state: ConnectivityState,
    pub link_up: bool,
    pub has_ipv4: bool,
    /// Bumped on every change; wraps.
    pub revision: u32,
}

impl ConnectivitySnapshot {
    /// Requests can only go out with a link and an IPv4 lease.
    pub const fn is_online(self) -> bool {
        self.link_up && self.has_ipv4
    }
}

// Packed word: bit 0 link, bit 1 lease, bit 2 connecting, bits 3.. revision.
const LINK_BIT: u32 = 1 << 0;
const LEASE_BIT: u32 = 1 << 1;
const CONNECTING_BIT: u32 = 1 << 2;
const FLAG_MASK: u32 = LINK_BIT | LEASE_BIT | CONNECTING_BIT;
const REVISION_SHIFT: u32 = 3;

/// Lock-free connectivity status written by the Wi-Fi supervisor and read by
/// the transport. One atomic word, so readers never see a torn update.
#[derive(Debug)]
pub struct ConnectivityHandle {
    word: AtomicU32,
}

impl ConnectivityHandle {
    pub const fn new() -> Self {
        Self {
            word: AtomicU32::new(0),
        }
    }

    pub fn snapshot(&self) -> ConnectivitySnapshot {
        unpack(self.word.load(Ordering::Acquire))
    }

    pub fn is_online(&self) -> bool {
        self.snapshot().is_online()
    }

    /// Association in progress; link and lease are left as last reported.
    pub fn mark_connecting(&self) {
        self.update(|flags| flags | CONNECTING_BIT);
    }

    pub fn mark_disconnected(&self) {
        self.update(|_| 0);
    }

    pub fn update_link_ip(&self, link_up: bool, has_ipv4: bool) {
        let mut flags = 0;
        if link_up {
            flags |= LINK_BIT;
        }
        if has_ipv4 {
            flags |= LEASE_BIT;
        }
        self.update(|_| flags);
    }

    fn update(&self, next_flags: impl Fn(u32) -> u32) {
        let _ = self
            .word
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |word| {
                let flags = word & FLAG_MASK;
                let next = next_flags(flags) & FLAG_MASK;
                if next == flags {
                    return None;
                }
                let revision = (word >> REVISION_SHIFT).wrapping_add(1);
                Some((revision << REVISION_SHIFT) | next)
            });
    }
}

impl Default for ConnectivityHandle {
    fn default() -> Self {
        Self::new()
    }
}

fn unpack(word: u32) -> ConnectivitySnapshot {
    let link_up = word & LINK_BIT != 0;
    let has_ipv4 = word & LEASE_BIT != 0;
    let state = match (link_up, has_ipv4) {
        (true, true) => ConnectivityState::Online,
        (true, false) => ConnectivityState::LinkUpNoIp,
        (false, _) if word & CONNECTING_BIT != 0 => ConnectivityState::Connecting,
        (false, _) => ConnectivityState::Disconnected,
    };

    ConnectivitySnapshot {
        state,
        link_up,
        has_ipv4,
        revision: word >> REVISION_SHIFT,
    }
}
