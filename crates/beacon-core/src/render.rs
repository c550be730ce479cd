//! App-level view models consumed by the board renderer.

use crate::sync::Provenance;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TickResult {
    NoRender,
    RenderRequested,
}

impl TickResult {
    pub const fn or(self, other: TickResult) -> TickResult {
        match (self, other) {
            (Self::NoRender, Self::NoRender) => Self::NoRender,
            _ => Self::RenderRequested,
        }
    }
}

/// Emphasis for the badge drawn next to the marquee.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BadgeTone {
    Plain,
    Alert,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Badge<'a> {
    pub label: &'a str,
    pub tone: BadgeTone,
}

pub enum Screen<'a> {
    Message {
        title: &'a str,
        text: &'a str,
        /// Left edge of the text relative to the viewport.
        offset_px: i32,
        provenance: Option<Provenance>,
        badge: Option<Badge<'a>>,
    },
    Reconnecting {
        title: &'a str,
        /// 0..=3, advanced on a timer.
        dots: u8,
    },
}
