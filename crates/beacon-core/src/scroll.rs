//! Continuous single-line marquee for the latest message.
//!
//! Remote messages enter from the right edge and travel left; local ones
//! enter from the left and travel right, so the direction alone tells the
//! user whether the line on screen is theirs.

use log::debug;

use crate::{
    render::TickResult,
    sync::{Provenance, SyncState},
};

pub const SCROLL_CADENCE_MS: u64 = 30;
pub const SCROLL_STEP_PX: i32 = 2;
pub const VIEWPORT_PX: i32 = 400;
pub const GLYPH_ADVANCE_PX: i32 = 10;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ScrollConfig {
    pub cadence_ms: u64,
    pub step_px: i32,
    pub viewport_px: i32,
    pub glyph_advance_px: i32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            cadence_ms: SCROLL_CADENCE_MS,
            step_px: SCROLL_STEP_PX,
            viewport_px: VIEWPORT_PX,
            glyph_advance_px: GLYPH_ADVANCE_PX,
        }
    }
}

impl ScrollConfig {
    pub const fn with_cadence_ms(mut self, cadence_ms: u64) -> Self {
        self.cadence_ms = cadence_ms;
        self
    }

    pub const fn with_step_px(mut self, step_px: i32) -> Self {
        self.step_px = step_px;
        self
    }

    pub const fn with_viewport_px(mut self, viewport_px: i32) -> Self {
        self.viewport_px = viewport_px;
        self
    }

    pub const fn with_glyph_advance_px(mut self, glyph_advance_px: i32) -> Self {
        self.glyph_advance_px = glyph_advance_px;
        self
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScrollDirection {
    Leftward,
    Rightward,
}

impl ScrollDirection {
    /// Boot-time text has no provenance and scrolls like an incoming message.
    pub const fn for_provenance(provenance: Option<Provenance>) -> Self {
        match provenance {
            Some(Provenance::Local) => Self::Rightward,
            Some(Provenance::Remote) | None => Self::Leftward,
        }
    }

    const fn sign(self) -> i32 {
        match self {
            Self::Leftward => -1,
            Self::Rightward => 1,
        }
    }
}

/// Left edge of the text in viewport pixels.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ScrollState {
    pub offset_px: i32,
    pub last_advance_ms: u64,
}

#[derive(Clone, Copy, Debug)]
pub struct ScrollPresenter {
    config: ScrollConfig,
    state: ScrollState,
    direction: ScrollDirection,
    text_px: i32,
}

impl Default for ScrollPresenter {
    fn default() -> Self {
        Self::new(ScrollConfig::default())
    }
}

impl ScrollPresenter {
    pub fn new(mut config: ScrollConfig) -> Self {
        config.step_px = config.step_px.max(1);
        config.glyph_advance_px = config.glyph_advance_px.max(1);
        config.viewport_px = config.viewport_px.max(1);

        Self {
            config,
            state: ScrollState::default(),
            direction: ScrollDirection::Leftward,
            text_px: 0,
        }
    }

    pub fn config(&self) -> ScrollConfig {
        self.config
    }

    pub fn state(&self) -> ScrollState {
        self.state
    }

    pub fn offset_px(&self) -> i32 {
        self.state.offset_px
    }

    pub fn direction(&self) -> ScrollDirection {
        self.direction
    }

    pub fn text_width_px(&self, text: &str) -> i32 {
        let glyphs = text.chars().count().min(i32::MAX as usize) as i32;
        glyphs.saturating_mul(self.config.glyph_advance_px)
    }

    /// Off-screen start position for the current direction.
    pub fn entry_offset_px(&self) -> i32 {
        match self.direction {
            ScrollDirection::Leftward => self.config.viewport_px,
            ScrollDirection::Rightward => -self.text_px,
        }
    }

    /// Picks up a pending message or advances one step per cadence period.
    pub fn tick(&mut self, sync: &mut SyncState, now_ms: u64) -> TickResult {
        if sync.take_dirty() {
            self.direction = ScrollDirection::for_provenance(sync.provenance());
            self.text_px = self.text_width_px(sync.latest_message());
            self.state = ScrollState {
                offset_px: self.entry_offset_px(),
                last_advance_ms: now_ms,
            };
            debug!(
                "scroll: reset direction={:?} offset_px={} text_px={}",
                self.direction, self.state.offset_px, self.text_px
            );
            return TickResult::RenderRequested;
        }

        if now_ms.saturating_sub(self.state.last_advance_ms) < self.config.cadence_ms {
            return TickResult::NoRender;
        }

        self.state.last_advance_ms = now_ms;
        self.state.offset_px = self
            .state
            .offset_px
            .saturating_add(self.direction.sign() * self.config.step_px);

        if self.exited() {
            self.state.offset_px = self.entry_offset_px();
        }
        TickResult::RenderRequested
    }

    fn exited(&self) -> bool {
        match self.direction {
            ScrollDirection::Leftward => self.state.offset_px.saturating_add(self.text_px) <= 0,
            ScrollDirection::Rightward => self.state.offset_px >= self.config.viewport_px,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn narrow() -> ScrollPresenter {
        ScrollPresenter::new(
            ScrollConfig::default()
                .with_viewport_px(40)
                .with_glyph_advance_px(10)
                .with_step_px(5),
        )
    }

    #[test]
    fn boot_text_enters_from_the_right() {
        let mut presenter = narrow();
        let mut sync = SyncState::booting("Hi");

        assert_eq!(presenter.tick(&mut sync, 0), TickResult::RenderRequested);
        assert!(!sync.is_dirty());
        assert_eq!(presenter.direction(), ScrollDirection::Leftward);
        assert_eq!(presenter.offset_px(), 40);
    }

    #[test]
    fn advances_once_per_cadence() {
        let mut presenter = narrow();
        let mut sync = SyncState::booting("Hi");
        presenter.tick(&mut sync, 0);

        assert_eq!(presenter.tick(&mut sync, 29), TickResult::NoRender);
        assert_eq!(presenter.offset_px(), 40);
        assert_eq!(presenter.tick(&mut sync, 30), TickResult::RenderRequested);
        assert_eq!(presenter.offset_px(), 35);
        // A long stall still moves a single step.
        assert_eq!(presenter.tick(&mut sync, 500), TickResult::RenderRequested);
        assert_eq!(presenter.offset_px(), 30);
    }

    #[test]
    fn leftward_wraps_after_text_leaves_left_edge() {
        let mut presenter = narrow();
        let mut sync = SyncState::booting("Hi");
        presenter.tick(&mut sync, 0);

        // 20px of text from 40 to -20 takes 12 steps; the 12th wraps.
        let mut now = 0;
        for _ in 0..11 {
            now += 30;
            presenter.tick(&mut sync, now);
        }
        assert_eq!(presenter.offset_px(), -15);
        presenter.tick(&mut sync, now + 30);
        assert_eq!(presenter.offset_px(), 40);
    }

    #[test]
    fn local_text_enters_from_left_and_wraps_at_right_edge() {
        let mut presenter = narrow();
        let mut sync = SyncState::booting("Hi");
        presenter.tick(&mut sync, 0);

        // Only the provenance decides the direction.
        let mut local = SyncState::booting("Hi");
        local_send(&mut local);
        presenter.tick(&mut local, 10);
        assert_eq!(presenter.direction(), ScrollDirection::Rightward);
        assert_eq!(presenter.offset_px(), -20);

        let mut now = 10;
        for _ in 0..11 {
            now += 30;
            presenter.tick(&mut local, now);
        }
        assert_eq!(presenter.offset_px(), 35);
        presenter.tick(&mut local, now + 30);
        assert_eq!(presenter.offset_px(), -20);
    }

    #[test]
    fn clean_state_never_resets_offset() {
        let mut presenter = narrow();
        let mut sync = SyncState::booting("Hi");
        presenter.tick(&mut sync, 0);
        presenter.tick(&mut sync, 30);
        let offset = presenter.offset_px();

        assert_eq!(presenter.tick(&mut sync, 31), TickResult::NoRender);
        assert_eq!(presenter.offset_px(), offset);
    }

    fn local_send(state: &mut SyncState) {
        use crate::sync::{SyncConfig, SyncEngine, testing::ScriptedTransport};

        let mut engine = SyncEngine::new(ScriptedTransport::online(), SyncConfig::default());
        embassy_futures::block_on(engine.send("Hi", 0));
        *state = engine.state().clone();
    }
}
