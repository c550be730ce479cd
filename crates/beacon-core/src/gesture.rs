//! Single, double and long press classification for one button.
//!
//! The classifier only sees edge kinds and timestamps. Long presses resolve on
//! release; short presses are held back until either a second release arrives
//! or the gap timeout expires, which is decided by [`GestureClassifier::poll`]
//! on every loop tick.

use log::debug;

use crate::input::EdgeKind;

pub const LONG_PRESS_MS: u64 = 1_000;
pub const SHORT_GAP_MS: u64 = 400;
pub const RELAXED_SHORT_GAP_MS: u64 = 600;

const MAX_PENDING_SHORT: u8 = 2;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GestureIntent {
    /// `1` or `2` short presses.
    Short(u8),
    Long,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GestureConfig {
    pub long_press_ms: u64,
    pub short_gap_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self::stick()
    }
}

impl GestureConfig {
    /// Tight double-press window used by the stick-style boards.
    pub const fn stick() -> Self {
        Self {
            long_press_ms: LONG_PRESS_MS,
            short_gap_ms: SHORT_GAP_MS,
        }
    }

    pub const fn relaxed() -> Self {
        Self {
            long_press_ms: LONG_PRESS_MS,
            short_gap_ms: RELAXED_SHORT_GAP_MS,
        }
    }

    pub const fn with_long_press_ms(mut self, long_press_ms: u64) -> Self {
        self.long_press_ms = long_press_ms;
        self
    }

    pub const fn with_short_gap_ms(mut self, short_gap_ms: u64) -> Self {
        self.short_gap_ms = short_gap_ms;
        self
    }
}

/// Edge history since the last resolved intent.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PressWindow {
    pub press_started_ms: Option<u64>,
    pub pending_short: u8,
    pub last_release_ms: u64,
}

impl PressWindow {
    pub const fn new() -> Self {
        Self {
            press_started_ms: None,
            pending_short: 0,
            last_release_ms: 0,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.press_started_ms.is_none() && self.pending_short == 0
    }
}

#[derive(Clone, Copy, Debug)]
pub struct GestureClassifier {
    config: GestureConfig,
    window: PressWindow,
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

impl GestureClassifier {
    pub const fn new(config: GestureConfig) -> Self {
        Self {
            config,
            window: PressWindow::new(),
        }
    }

    pub fn config(&self) -> GestureConfig {
        self.config
    }

    pub fn window(&self) -> &PressWindow {
        &self.window
    }

    pub fn reset(&mut self) {
        self.window = PressWindow::new();
    }

    /// Feeds one edge. Only a long press resolves here.
    pub fn on_edge(&mut self, kind: EdgeKind, now_ms: u64) -> Option<GestureIntent> {
        match kind {
            EdgeKind::Down => {
                if self.window.press_started_ms.is_none() {
                    self.window.press_started_ms = Some(now_ms);
                }
                None
            }
            EdgeKind::Up => {
                let started_ms = self.window.press_started_ms.take()?;
                let held_ms = now_ms.saturating_sub(started_ms);

                if held_ms >= self.config.long_press_ms {
                    debug!(
                        "gesture: long press held_ms={} dropped_short={}",
                        held_ms, self.window.pending_short
                    );
                    self.window = PressWindow::new();
                    return Some(GestureIntent::Long);
                }

                if self.window.pending_short >= MAX_PENDING_SHORT {
                    debug!("gesture: extra short press folded into double press");
                }
                self.window.pending_short = self
                    .window
                    .pending_short
                    .saturating_add(1)
                    .min(MAX_PENDING_SHORT);
                self.window.last_release_ms = now_ms;
                None
            }
        }
    }

    /// Resolves pending short presses; call once per loop tick.
    pub fn poll(&mut self, now_ms: u64) -> Option<GestureIntent> {
        match self.window.pending_short {
            0 => None,
            1 => {
                let gap_ms = now_ms.saturating_sub(self.window.last_release_ms);
                if gap_ms <= self.config.short_gap_ms {
                    return None;
                }
                self.window.pending_short = 0;
                Some(GestureIntent::Short(1))
            }
            _ => {
                self.window.pending_short = 0;
                Some(GestureIntent::Short(2))
            }
        }
    }
}
