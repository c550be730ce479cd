//! Loop-level orchestration: buttons in, messages out, marquee on screen.

use heapless::Deque;
use log::{debug, info, warn};

use crate::{
    gesture::{GestureClassifier, GestureConfig, GestureIntent},
    input::{ButtonId, ButtonSource, EdgeKind},
    render::{Badge, BadgeTone, Screen, TickResult},
    scroll::{ScrollConfig, ScrollDirection, ScrollPresenter},
    sync::{
        FAST_POLL_INTERVAL_MS, PollOutcome, SendOutcome, SyncConfig, SyncEngine, SyncState,
        Transport,
    },
    text_policy::{EMOJI_WORDS, status_code_label},
};

const CUE_QUEUE: usize = 8;
const RECONNECT_FRAME_MS: u64 = 500;
const BADGE_BYTES: usize = 12;

/// Audible feedback requested by the app, drained by the board each tick.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Cue {
    Press,
    SendOk,
    SendError,
    Incoming,
}

/// Result of the most recent send, shown as a badge.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SendStatus {
    Idle,
    Delivered(u16),
    Rejected(u16),
    Failed,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IntentBinding {
    pub button: ButtonId,
    pub intent: GestureIntent,
    pub text: &'static str,
}

impl IntentBinding {
    pub const fn new(button: ButtonId, intent: GestureIntent, text: &'static str) -> Self {
        Self {
            button,
            intent,
            text,
        }
    }
}

const DEFAULT_BINDINGS: [IntentBinding; 3] = [
    IntentBinding::new(ButtonId::A, GestureIntent::Short(1), "OK"),
    IntentBinding::new(ButtonId::A, GestureIntent::Short(2), "Stay Home"),
    IntentBinding::new(ButtonId::A, GestureIntent::Long, "SOS"),
];

const STICK_BINDINGS: [IntentBinding; 3] = [
    IntentBinding::new(ButtonId::A, GestureIntent::Short(1), "good"),
    IntentBinding::new(ButtonId::A, GestureIntent::Short(2), "bad"),
    IntentBinding::new(ButtonId::A, GestureIntent::Long, "☆"),
];

const CORE2_BINDINGS: [IntentBinding; 2] = [
    IntentBinding::new(ButtonId::A, GestureIntent::Short(1), "OK"),
    IntentBinding::new(ButtonId::B, GestureIntent::Short(1), "NG"),
];

/// Static gesture-to-text lookup.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IntentMap {
    bindings: &'static [IntentBinding],
}

impl Default for IntentMap {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl IntentMap {
    pub const DEFAULT: Self = Self::new(&DEFAULT_BINDINGS);
    pub const STICK: Self = Self::new(&STICK_BINDINGS);
    pub const CORE2: Self = Self::new(&CORE2_BINDINGS);

    pub const fn new(bindings: &'static [IntentBinding]) -> Self {
        Self { bindings }
    }

    pub fn text_for(&self, button: ButtonId, intent: GestureIntent) -> Option<&'static str> {
        self.bindings
            .iter()
            .find(|binding| binding.button == button && binding.intent == intent)
            .map(|binding| binding.text)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BeaconConfig {
    pub title: &'static str,
    pub gesture: GestureConfig,
    pub sync: SyncConfig,
    pub scroll: ScrollConfig,
    pub intents: IntentMap,
    pub reconnect_frame_ms: u64,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            title: "Beacon",
            gesture: GestureConfig::default(),
            sync: SyncConfig::default(),
            scroll: ScrollConfig::default(),
            intents: IntentMap::DEFAULT,
            reconnect_frame_ms: RECONNECT_FRAME_MS,
        }
    }
}

impl BeaconConfig {
    /// One-button stick profile: emoji vocabulary, 400 ms gap, 10 s poll.
    pub fn stick() -> Self {
        Self {
            gesture: GestureConfig::stick(),
            sync: SyncConfig::default().with_vocabulary(EMOJI_WORDS),
            intents: IntentMap::STICK,
            ..Self::default()
        }
    }

    /// Two-button profile: 600 ms gap, 5 s poll.
    pub fn core2() -> Self {
        Self {
            gesture: GestureConfig::relaxed(),
            sync: SyncConfig::default().with_poll_interval_ms(FAST_POLL_INTERVAL_MS),
            intents: IntentMap::CORE2,
            ..Self::default()
        }
    }

    pub const fn with_title(mut self, title: &'static str) -> Self {
        self.title = title;
        self
    }

    pub const fn with_gesture(mut self, gesture: GestureConfig) -> Self {
        self.gesture = gesture;
        self
    }

    pub const fn with_sync(mut self, sync: SyncConfig) -> Self {
        self.sync = sync;
        self
    }

    pub const fn with_scroll(mut self, scroll: ScrollConfig) -> Self {
        self.scroll = scroll;
        self
    }

    pub const fn with_intents(mut self, intents: IntentMap) -> Self {
        self.intents = intents;
        self
    }
}

pub struct BeaconApp<IN, T>
where
    IN: ButtonSource,
    T: Transport,
{
    input: IN,
    config: BeaconConfig,
    classifiers: [GestureClassifier; ButtonId::COUNT],
    sync: SyncEngine<T>,
    presenter: ScrollPresenter,
    send_status: SendStatus,
    remote_unseen: bool,
    cues: Deque<Cue, CUE_QUEUE>,
    online: Option<bool>,
    pending_redraw: bool,
    last_reconnect_slot: Option<u64>,
}

include!("runtime.rs");
include!("view.rs");

#[cfg(test)]
mod tests;
