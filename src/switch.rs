//! Push-switch press/release/hold tracking.
//!
//! The switch is polled once per application tick rather than
//! interrupt-driven: a button tolerates 10 ms of latency, and comparing the
//! sampled level against the last known level is far less sensitive to
//! multi-millisecond contact bounce than counting interrupt edges.
//!
//! ```text
//!            press                    held > hold_ms
//! Released ─────────▶ Pressed ───────────────────────▶ (HoldReset, once)
//!     ▲                  │
//!     └──────────────────┘
//!           release
//! ```

use crate::config::SwitchConfig;

/// Logical switch level after polarity conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwitchLevel {
    Pressed,
    #[default]
    Released,
}

/// Transition detected by [`SwitchDebouncer::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwitchEvent {
    /// Press edge; the position advanced.
    Pressed,
    /// Release edge.
    Released,
    /// The current press outlasted the hold threshold; the position went
    /// back to the range minimum.
    HoldReset,
}

/// Polled switch state machine with a cyclic position counter.
#[derive(Debug, Clone, Copy)]
pub struct SwitchDebouncer {
    config: SwitchConfig,
    level: SwitchLevel,
    position: u8,
    pressed_at_ms: u32,
    /// Latched once the current press has fired its reset.
    hold_fired: bool,
}

impl SwitchDebouncer {
    /// Create a debouncer at position `config.min`.
    ///
    /// `initial` is the level sampled at start-up. A switch that is already
    /// held at start-up does not fire a hold reset for that press.
    pub fn new(config: SwitchConfig, initial: SwitchLevel) -> Self {
        Self {
            config,
            level: initial,
            position: config.min,
            pressed_at_ms: 0,
            hold_fired: initial == SwitchLevel::Pressed,
        }
    }

    pub fn level(&self) -> SwitchLevel {
        self.level
    }

    pub fn position(&self) -> u8 {
        self.position
    }

    /// Overwrite the position. Returns `false` (and leaves the position
    /// unchanged) if `position` lies outside the configured range.
    pub fn set_position(&mut self, position: u8) -> bool {
        if !self.config.contains(position) {
            return false;
        }
        self.position = position;
        true
    }

    /// Milliseconds the switch has been held at `now_ms`, or `None` when
    /// released.
    pub fn held_for(&self, now_ms: u32) -> Option<u32> {
        match self.level {
            SwitchLevel::Pressed => Some(now_ms.wrapping_sub(self.pressed_at_ms)),
            SwitchLevel::Released => None,
        }
    }

    /// Consume one sample taken at `now_ms`.
    ///
    /// The hold reset is only evaluated while the switch is still pressed
    /// and fires at most once per continuous press.
    pub fn poll(&mut self, level: SwitchLevel, now_ms: u32) -> Option<SwitchEvent> {
        match (self.level, level) {
            (SwitchLevel::Released, SwitchLevel::Pressed) => {
                self.level = SwitchLevel::Pressed;
                self.position = self.next_position();
                self.pressed_at_ms = now_ms;
                self.hold_fired = false;
                Some(SwitchEvent::Pressed)
            }
            (SwitchLevel::Pressed, SwitchLevel::Released) => {
                self.level = SwitchLevel::Released;
                Some(SwitchEvent::Released)
            }
            (SwitchLevel::Pressed, SwitchLevel::Pressed) => {
                let held = now_ms.wrapping_sub(self.pressed_at_ms);
                if !self.hold_fired && held > self.config.hold_ms {
                    self.hold_fired = true;
                    self.position = self.config.min;
                    Some(SwitchEvent::HoldReset)
                } else {
                    None
                }
            }
            (SwitchLevel::Released, SwitchLevel::Released) => None,
        }
    }

    fn next_position(&self) -> u8 {
        if self.position >= self.config.max {
            self.config.min
        } else {
            self.position + 1
        }
    }
}
