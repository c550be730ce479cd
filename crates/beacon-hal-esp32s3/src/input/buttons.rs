use embedded_hal::digital::InputPin;
use heapless::Deque;

use beacon_core::input::{ButtonEdge, ButtonId, ButtonSource, EdgeKind};

const PENDING_EDGES: usize = 4;

#[derive(Debug, Clone, Copy)]
pub struct ButtonConfig {
    active_low: bool,
    debounce_polls: u8,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            active_low: true,
            debounce_polls: 3,
        }
    }
}

impl ButtonConfig {
    pub const fn with_active_low(mut self, active_low: bool) -> Self {
        self.active_low = active_low;
        self
    }

    pub const fn with_debounce_polls(mut self, debounce_polls: u8) -> Self {
        self.debounce_polls = debounce_polls;
        self
    }
}

#[derive(Debug)]
pub enum ButtonInputError<E> {
    Pin { button: ButtonId, error: E },
}

/// Per-pin debounce state.
///
/// A level must be read `debounce_polls` times in a row before it becomes the
/// stable level and produces an edge.
#[derive(Debug, Clone, Copy)]
struct Debouncer {
    raw: bool,
    stable: bool,
    stable_count: u8,
}

impl Debouncer {
    const fn settled(pressed: bool) -> Self {
        Self {
            raw: pressed,
            stable: pressed,
            stable_count: 0,
        }
    }

    fn sample(&mut self, pressed: bool, threshold: u8) -> Option<EdgeKind> {
        if pressed == self.raw {
            self.stable_count = self.stable_count.saturating_add(1);
        } else {
            self.raw = pressed;
            self.stable_count = 0;
        }

        if self.stable_count >= threshold.max(1) && self.stable != self.raw {
            self.stable = self.raw;
            return Some(if self.stable {
                EdgeKind::Down
            } else {
                EdgeKind::Up
            });
        }

        None
    }
}

/// `N` push buttons on plain GPIO inputs.
#[derive(Debug)]
pub struct GpioButtons<P, const N: usize> {
    pins: [P; N],
    ids: [ButtonId; N],
    debounce: [Debouncer; N],
    config: ButtonConfig,
    pending: Deque<ButtonEdge, PENDING_EDGES>,
}

impl<P, const N: usize> GpioButtons<P, N>
where
    P: InputPin,
{
    pub fn new(
        mut pins: [P; N],
        ids: [ButtonId; N],
        config: ButtonConfig,
    ) -> Result<Self, ButtonInputError<P::Error>> {
        let mut debounce = [Debouncer::settled(false); N];
        for (slot, pin) in pins.iter_mut().enumerate() {
            let high = pin.is_high().map_err(|error| ButtonInputError::Pin {
                button: ids[slot],
                error,
            })?;
            debounce[slot] = Debouncer::settled(pressed_from_level(high, config.active_low));
        }

        Ok(Self {
            pins,
            ids,
            debounce,
            config,
            pending: Deque::new(),
        })
    }

    fn sample_all(&mut self, now_ms: u64) -> Result<(), ButtonInputError<P::Error>> {
        for slot in 0..N {
            let button = self.ids[slot];
            let high = self.pins[slot]
                .is_high()
                .map_err(|error| ButtonInputError::Pin { button, error })?;
            let pressed = pressed_from_level(high, self.config.active_low);

            if let Some(kind) = self.debounce[slot].sample(pressed, self.config.debounce_polls) {
                let edge = ButtonEdge {
                    button,
                    kind,
                    at_ms: now_ms,
                };
                if self.pending.push_back(edge).is_err() {
                    log::warn!("buttons: edge queue full, dropped {:?}", edge);
                }
            }
        }
        Ok(())
    }
}

impl<P, const N: usize> ButtonSource for GpioButtons<P, N>
where
    P: InputPin,
{
    type Error = ButtonInputError<P::Error>;

    fn poll_edge(&mut self, now_ms: u64) -> Result<Option<ButtonEdge>, Self::Error> {
        if let Some(edge) = self.pending.pop_front() {
            return Ok(Some(edge));
        }

        self.sample_all(now_ms)?;
        Ok(self.pending.pop_front())
    }
}

#[inline]
fn pressed_from_level(high: bool, active_low: bool) -> bool {
    if active_low { !high } else { high }
}
