//! Non-blocking cue playback on an active buzzer.

use embedded_hal::digital::OutputPin;

use beacon_core::app::Cue;

/// One tone: buzzer on for `on_ms`, then silent for `off_ms`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Beep {
    pub on_ms: u16,
    pub off_ms: u16,
}

const fn beep(on_ms: u16, off_ms: u16) -> Beep {
    Beep { on_ms, off_ms }
}

const PRESS: &[Beep] = &[beep(15, 0)];
const SEND_OK: &[Beep] = &[beep(60, 40), beep(60, 0)];
const SEND_ERROR: &[Beep] = &[beep(300, 0)];
const INCOMING: &[Beep] = &[beep(40, 60), beep(40, 60), beep(120, 0)];

pub fn pattern(cue: Cue) -> &'static [Beep] {
    match cue {
        Cue::Press => PRESS,
        Cue::SendOk => SEND_OK,
        Cue::SendError => SEND_ERROR,
        Cue::Incoming => INCOMING,
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Phase {
    On,
    Off,
}

#[derive(Debug)]
pub struct Buzzer<P> {
    pin: P,
    pattern: &'static [Beep],
    step: usize,
    phase: Phase,
    phase_started_ms: u64,
    playing: bool,
}

impl<P> Buzzer<P>
where
    P: OutputPin,
{
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            pattern: &[],
            step: 0,
            phase: Phase::Off,
            phase_started_ms: 0,
            playing: false,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Starts `cue`, cutting off whatever was playing.
    pub fn play(&mut self, cue: Cue, now_ms: u64) -> Result<(), P::Error> {
        self.pattern = pattern(cue);
        self.step = 0;
        self.playing = !self.pattern.is_empty();
        if self.playing {
            self.enter(Phase::On, now_ms)
        } else {
            self.pin.set_low()
        }
    }

    /// Advances the pattern; call every loop iteration.
    pub fn tick(&mut self, now_ms: u64) -> Result<(), P::Error> {
        while self.playing {
            let Some(beep) = self.pattern.get(self.step).copied() else {
                self.playing = false;
                return self.pin.set_low();
            };
            let elapsed = now_ms.saturating_sub(self.phase_started_ms);

            match self.phase {
                Phase::On if elapsed >= u64::from(beep.on_ms) => {
                    let at = self.phase_started_ms + u64::from(beep.on_ms);
                    self.enter(Phase::Off, at)?;
                }
                Phase::Off if elapsed >= u64::from(beep.off_ms) => {
                    let at = self.phase_started_ms + u64::from(beep.off_ms);
                    self.step += 1;
                    if self.step < self.pattern.len() {
                        self.enter(Phase::On, at)?;
                    }
                }
                _ => return Ok(()),
            }
        }
        Ok(())
    }

    fn enter(&mut self, phase: Phase, at_ms: u64) -> Result<(), P::Error> {
        self.phase = phase;
        self.phase_started_ms = at_ms;
        match phase {
            Phase::On => self.pin.set_high(),
            Phase::Off => self.pin.set_low(),
        }
    }
}
