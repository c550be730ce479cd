//! Button input abstraction layer.

pub mod mock;

/// Physical buttons a board may expose.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ButtonId {
    A,
    B,
    C,
}

impl ButtonId {
    pub const COUNT: usize = 3;
    pub const ALL: [ButtonId; Self::COUNT] = [ButtonId::A, ButtonId::B, ButtonId::C];

    pub const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EdgeKind {
    Down,
    Up,
}

/// A debounced press or release, stamped with the loop clock.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ButtonEdge {
    pub button: ButtonId,
    pub kind: EdgeKind,
    pub at_ms: u64,
}

impl ButtonEdge {
    pub const fn down(button: ButtonId, at_ms: u64) -> Self {
        Self {
            button,
            kind: EdgeKind::Down,
            at_ms,
        }
    }

    pub const fn up(button: ButtonId, at_ms: u64) -> Self {
        Self {
            button,
            kind: EdgeKind::Up,
            at_ms,
        }
    }
}

/// Polled edge provider.
///
/// Implementations return at most one edge per call; the app keeps polling
/// until `Ok(None)` within a single tick.
pub trait ButtonSource {
    type Error;

    fn poll_edge(&mut self, now_ms: u64) -> Result<Option<ButtonEdge>, Self::Error>;
}
