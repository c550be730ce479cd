use super::{ButtonEdge, ButtonSource};

/// Replays a fixed edge script against the loop clock.
///
/// An edge is released once `now_ms` reaches its timestamp, so a test can
/// drive the app with coarse ticks and still see edges in order.
#[derive(Debug, Clone, Copy)]
pub struct ScriptedButtons<'a> {
    edges: &'a [ButtonEdge],
    cursor: usize,
}

impl<'a> ScriptedButtons<'a> {
    pub const fn new(edges: &'a [ButtonEdge]) -> Self {
        Self { edges, cursor: 0 }
    }

    pub const fn idle() -> Self {
        Self::new(&[])
    }

    pub fn remaining(&self) -> usize {
        self.edges.len().saturating_sub(self.cursor)
    }
}

impl ButtonSource for ScriptedButtons<'_> {
    type Error = core::convert::Infallible;

    fn poll_edge(&mut self, now_ms: u64) -> Result<Option<ButtonEdge>, Self::Error> {
        let Some(edge) = self.edges.get(self.cursor).copied() else {
            return Ok(None);
        };
        if edge.at_ms > now_ms {
            return Ok(None);
        }
        self.cursor = self.cursor.saturating_add(1);
        Ok(Some(edge))
    }
}
