//! Interrupt-safe shared encoder.
//!
//! Channel edges arrive in interrupt context while the switch is polled
//! from the main loop, and every reader may be preempted mid-read. All
//! multi-field updates therefore run inside one short critical section
//! through an `embassy-sync` blocking mutex, and readers take a consistent
//! [`EncoderSnapshot`] instead of reading fields one by one.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::decoder::{Channel, Direction, PinCode};
use crate::encoder::Encoder;
use crate::error::EncoderError;
use crate::focus::Focus;
use crate::identity::Identity;
use crate::switch::{SwitchEvent, SwitchLevel};

/// Consistent copy of everything a consumer reads from an encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderSnapshot {
    pub position: i16,
    pub direction: Direction,
    pub rate: u8,
    pub switch_position: u8,
    pub switch_level: SwitchLevel,
    pub focus: Focus,
    pub identity: Identity,
}

impl EncoderSnapshot {
    fn capture(encoder: &Encoder) -> Self {
        Self {
            position: encoder.position(),
            direction: encoder.direction(),
            rate: encoder.rate(),
            switch_position: encoder.switch_position(),
            switch_level: encoder.switch_level(),
            focus: encoder.focus(),
            identity: encoder.identity(),
        }
    }
}

/// [`Encoder`] behind a critical-section mutex, shareable between interrupt
/// handlers, async tasks and the main loop.
///
/// Typically placed in a `static` through `static_cell::StaticCell`:
///
/// ```ignore
/// static KNOB: StaticCell<SharedEncoder> = StaticCell::new();
/// let knob = KNOB.init(SharedEncoder::new(Encoder::new(config, id)?));
/// ```
pub struct SharedEncoder {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Encoder>>,
}

impl SharedEncoder {
    pub const fn new(encoder: Encoder) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(encoder)),
        }
    }

    /// Run `f` with exclusive access inside one critical section. Keep `f`
    /// short: interrupts are masked for its whole duration.
    pub fn lock<R>(&self, f: impl FnOnce(&mut Encoder) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Interrupt entry point for a sampled channel edge.
    pub fn on_edge(&self, channel: Channel, code: PinCode, now_us: u32) -> Direction {
        self.lock(|encoder| encoder.on_edge(channel, code, now_us))
    }

    /// Poll-loop entry point for a sampled switch level.
    pub fn on_switch_sample(&self, level: SwitchLevel, now_ms: u32) -> Option<SwitchEvent> {
        self.lock(|encoder| encoder.on_switch_sample(level, now_ms))
    }

    pub fn snapshot(&self) -> EncoderSnapshot {
        self.lock(|encoder| EncoderSnapshot::capture(encoder))
    }

    pub fn position(&self) -> i16 {
        self.lock(|encoder| encoder.position())
    }

    pub fn set_position(&self, position: i16) {
        self.lock(|encoder| encoder.set_position(position));
    }

    pub fn set_switch_position(&self, position: u8) -> Result<(), EncoderError> {
        self.lock(|encoder| encoder.set_switch_position(position))
    }

    pub fn focus(&self) -> Focus {
        self.lock(|encoder| encoder.focus())
    }
}
