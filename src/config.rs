//! Construction-time configuration.
//!
//! All tunables live in [`EncoderConfig`]. [`EncoderConfig::default()`]
//! reproduces the original control-panel firmware: full-step table decode,
//! active-low pins, three velocity tiers, a six-position switch and a
//! three-second hold-to-reset.

use crate::decoder::{DecodeStrategy, Polarity};
use crate::error::EncoderError;

// ── Velocity ─────────────────────────────────────────────────────────────

/// One acceleration tier: edges closer together than `below_us` step by
/// `rate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RateTier {
    /// Exclusive upper bound on the edge interval, in microseconds.
    pub below_us: u32,
    /// Step multiplier applied inside this tier. Must be at least 1.
    pub rate: u8,
    /// Only apply this tier when the edge produced a direction.
    pub requires_direction: bool,
}

/// Velocity-to-multiplier policy. Tiers are checked fast first; anything
/// slower than every tier steps by 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VelocityConfig {
    /// Rapid twist. Default: `< 12 ms → 50`.
    pub fast: Option<RateTier>,
    /// Medium twist. Default: `< 20 ms with a direction → 10`.
    pub medium: Option<RateTier>,
}

impl VelocityConfig {
    /// Rates `{1, 10, 50}`.
    pub const fn three_tier() -> Self {
        Self {
            fast: Some(RateTier {
                below_us: 12_000,
                rate: 50,
                requires_direction: false,
            }),
            medium: Some(RateTier {
                below_us: 20_000,
                rate: 10,
                requires_direction: true,
            }),
        }
    }

    /// Rates `{1, 10}`: fine and coarse only.
    pub const fn two_tier() -> Self {
        Self {
            fast: None,
            medium: Some(RateTier {
                below_us: 20_000,
                rate: 10,
                requires_direction: true,
            }),
        }
    }

    /// Always step by 1.
    pub const fn fixed() -> Self {
        Self {
            fast: None,
            medium: None,
        }
    }

    /// Returns [`EncoderError::ZeroRate`] if any tier has `rate == 0`.
    pub fn validate(&self) -> Result<(), EncoderError> {
        let zero = [self.fast, self.medium]
            .iter()
            .flatten()
            .any(|tier| tier.rate == 0);
        if zero {
            return Err(EncoderError::ZeroRate);
        }
        Ok(())
    }
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self::three_tier()
    }
}

// ── Switch ───────────────────────────────────────────────────────────────

/// Push-switch cycle range and hold threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SwitchConfig {
    /// Lowest switch position (`SW_MIN`). Default: 0.
    pub min: u8,
    /// Highest switch position (`SW_MAX`). Default: 5.
    pub max: u8,
    /// A press held strictly longer than this fires a reset. Default: 3000.
    pub hold_ms: u32,
    /// Level meaning "pressed". Default: active-low.
    pub polarity: Polarity,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            min: 0,
            max: 5,
            hold_ms: 3000,
            polarity: Polarity::ActiveLow,
        }
    }
}

impl SwitchConfig {
    /// Returns [`EncoderError::InvalidSwitchRange`] if `min > max`.
    pub fn validate(&self) -> Result<(), EncoderError> {
        if self.min > self.max {
            return Err(EncoderError::InvalidSwitchRange);
        }
        Ok(())
    }

    /// Returns `true` if `position` lies in `[min, max]`.
    pub fn contains(&self, position: u8) -> bool {
        (self.min..=self.max).contains(&position)
    }
}

// ── Encoder ──────────────────────────────────────────────────────────────

/// Complete encoder configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderConfig {
    /// Decoder selection. Default: full-step table.
    pub strategy: DecodeStrategy,
    /// Level meaning "contact closed" on channels A and B. The switch has
    /// its own [`SwitchConfig::polarity`]. Default: active-low.
    pub channel_polarity: Polarity,
    /// Acceleration tiers. Default: three tiers.
    pub velocity: VelocityConfig,
    /// Switch range and hold threshold.
    pub switch: SwitchConfig,
    /// Encoder position to restore on a hold reset. Default: `None` (the
    /// position is left alone).
    pub reset_position: Option<i16>,
}

impl EncoderConfig {
    /// Check every section.
    pub fn validate(&self) -> Result<(), EncoderError> {
        self.switch.validate()?;
        self.velocity.validate()?;
        Ok(())
    }
}
