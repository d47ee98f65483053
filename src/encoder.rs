//! Pin-free encoder core.
//!
//! [`Encoder`] aggregates the decoder, velocity estimator, switch debouncer
//! and focus field, and owns the position/direction/rate state. It is fed
//! already-sampled [`PinCode`]s and [`SwitchLevel`]s with their timestamps,
//! which keeps it free of HAL types: [`RotaryEncoder`](crate::RotaryEncoder)
//! samples pins and forwards here, [`SharedEncoder`](crate::SharedEncoder)
//! guards it for interrupt use.

use crate::config::EncoderConfig;
use crate::decoder::{
    Channel, DecodeStrategy, Decoder, DecoderState, Direction, PinCode, QuadratureDecoder,
};
use crate::error::EncoderError;
use crate::focus::Focus;
use crate::identity::Identity;
use crate::switch::{SwitchDebouncer, SwitchEvent, SwitchLevel};
use crate::velocity::VelocityEstimator;

/// Encoder state machine for one knob with its push switch.
///
/// # Position
///
/// `position` is a signed cumulative count. A completed detent adds
/// `sign(direction) * rate`. Arithmetic saturates at `i16::MIN` and
/// `i16::MAX` so the value stays monotonic within range; only
/// [`set_position`](Self::set_position) or a configured hold reset moves it
/// otherwise.
///
/// # Examples
///
/// ```
/// use motion_encoders::{Channel, Direction, Encoder, EncoderConfig, Focus, Identity, PinCode};
///
/// let mut encoder = Encoder::new(EncoderConfig::default(), Identity::new(7)).unwrap();
/// let mut now_us = 0;
/// for bits in [0b10, 0b11, 0b01, 0b00] {
///     now_us += 100_000;
///     encoder.on_edge(Channel::A, PinCode::from_bits(bits), now_us);
/// }
/// assert_eq!(encoder.direction(), Direction::Cw);
/// assert_eq!(encoder.position(), 1);
/// assert_eq!(encoder.focus(), Focus::Encoder);
/// ```
#[derive(Debug)]
pub struct Encoder {
    config: EncoderConfig,
    identity: Identity,
    decoder: QuadratureDecoder,
    velocity: VelocityEstimator,
    switch: SwitchDebouncer,
    position: i16,
    direction: Direction,
    /// Multiplier of the last applied step.
    step_rate: u8,
    focus: Focus,
}

impl Encoder {
    /// Create an encoder with the switch initially released.
    ///
    /// # Errors
    /// Any [`EncoderConfig::validate`] failure.
    pub fn new(config: EncoderConfig, identity: Identity) -> Result<Self, EncoderError> {
        Self::with_switch_level(config, identity, SwitchLevel::Released)
    }

    /// Create an encoder whose switch was sampled at `initial_switch`.
    pub fn with_switch_level(
        config: EncoderConfig,
        identity: Identity,
        initial_switch: SwitchLevel,
    ) -> Result<Self, EncoderError> {
        config.validate()?;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "Encoder {} created: strategy={}, switch range {}..={}",
            identity,
            config.strategy,
            config.switch.min,
            config.switch.max
        );

        Ok(Self {
            config,
            identity,
            decoder: QuadratureDecoder::new(config.strategy),
            velocity: VelocityEstimator::new(config.velocity),
            switch: SwitchDebouncer::new(config.switch, initial_switch),
            position: 0,
            direction: Direction::None,
            step_rate: 1,
            focus: Focus::None,
        })
    }

    // ── Edge path (interrupt context) ────────────────────────────────

    /// Consume one channel edge sampled as `code` at `now_us`.
    ///
    /// Marks focus as [`Focus::Encoder`], runs the decoder and the velocity
    /// estimator, and applies the step when a direction was produced.
    /// Returns that direction ([`Direction::None`] for intermediate or
    /// rejected samples).
    ///
    /// The table strategy needs several edges per detent and only the last
    /// one steps, so it is timed detent to detent: phase edges and bounce
    /// inside a detent never reach the estimator. The signal-only strategy
    /// steps on every accepted edge and times every delivered edge.
    pub fn on_edge(&mut self, channel: Channel, code: PinCode, now_us: u32) -> Direction {
        self.focus = Focus::Encoder;

        let direction = self.decoder.on_edge(channel, code);
        let rate = match self.config.strategy {
            DecodeStrategy::Table(_) if !direction.is_some() => return direction,
            DecodeStrategy::Table(_) | DecodeStrategy::SignalOnly => {
                self.velocity.update(now_us, direction.is_some())
            }
        };

        if direction.is_some() {
            self.direction = direction;
            self.step_rate = rate;
            let step = direction.sign() * i16::from(rate);
            self.position = self.position.saturating_add(step);

            #[cfg(feature = "defmt")]
            defmt::debug!(
                "Encoder {}: {} x{} -> {}",
                self.identity,
                direction,
                rate,
                self.position
            );
        }

        direction
    }

    // ── Switch path (poll loop) ──────────────────────────────────────

    /// Consume one switch sample taken at `now_ms`.
    ///
    /// Press and release set focus to [`Focus::Switch`]. A hold reset sets
    /// [`Focus::SwitchReset`], clears the direction and, if
    /// [`EncoderConfig::reset_position`] is set, restores the position.
    pub fn on_switch_sample(&mut self, level: SwitchLevel, now_ms: u32) -> Option<SwitchEvent> {
        let event = self.switch.poll(level, now_ms)?;

        match event {
            SwitchEvent::Pressed | SwitchEvent::Released => {
                self.focus = Focus::Switch;
            }
            SwitchEvent::HoldReset => {
                self.focus = Focus::SwitchReset;
                self.direction = Direction::None;
                if let Some(position) = self.config.reset_position {
                    self.position = position;
                }

                #[cfg(feature = "defmt")]
                defmt::info!("Encoder {}: switch hold reset", self.identity);
            }
        }

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "Encoder {}: switch {} (position {})",
            self.identity,
            event,
            self.switch.position()
        );

        Some(event)
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn position(&self) -> i16 {
        self.position
    }

    /// Overwrite the position, e.g. to re-zero a control.
    pub fn set_position(&mut self, position: i16) {
        self.position = position;
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Multiplier of the last applied step (1 before any step). Never 0.
    ///
    /// Edges that step nothing do not change it.
    pub fn rate(&self) -> u8 {
        self.step_rate
    }

    pub fn switch_position(&self) -> u8 {
        self.switch.position()
    }

    /// Overwrite the switch position.
    ///
    /// # Errors
    /// [`EncoderError::SwitchPositionOutOfRange`] if `position` lies
    /// outside the configured switch range; the position is unchanged.
    pub fn set_switch_position(&mut self, position: u8) -> Result<(), EncoderError> {
        if !self.switch.set_position(position) {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "Encoder {}: switch position {} out of range",
                self.identity,
                position
            );
            return Err(EncoderError::SwitchPositionOutOfRange);
        }
        Ok(())
    }

    pub fn switch_level(&self) -> SwitchLevel {
        self.switch.level()
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn identity(&self) -> Identity {
        self.identity
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Table decoder node, or `None` for the signal-only strategy.
    pub fn decoder_state(&self) -> Option<DecoderState> {
        self.decoder.table_state()
    }

    /// Drop any detent in progress and forget the last edge time.
    pub fn reset_decoder(&mut self) {
        self.decoder.reset();
        self.velocity.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SwitchConfig, VelocityConfig};
    use crate::decoder::{DecodeStrategy, StepMode};

    const CW_CYCLE: [u8; 4] = [0b10, 0b11, 0b01, 0b00];
    const CCW_CYCLE: [u8; 4] = [0b01, 0b11, 0b10, 0b00];

    fn encoder(config: EncoderConfig) -> Encoder {
        Encoder::new(config, Identity::new(1)).unwrap()
    }

    // Helper: feed codes on channel A spaced `spacing_us` apart, starting at `start_us`.
    fn feed(encoder: &mut Encoder, codes: &[u8], start_us: u32, spacing_us: u32) -> u32 {
        let mut now = start_us;
        for &bits in codes {
            now += spacing_us;
            encoder.on_edge(Channel::A, PinCode::from_bits(bits), now);
        }
        now
    }

    // ── Construction ─────────────────────────────────────────────────

    #[test]
    fn default_state() {
        let encoder = encoder(EncoderConfig::default());
        assert_eq!(encoder.position(), 0);
        assert_eq!(encoder.direction(), Direction::None);
        assert_eq!(encoder.rate(), 1);
        assert_eq!(encoder.switch_position(), 0);
        assert_eq!(encoder.switch_level(), SwitchLevel::Released);
        assert_eq!(encoder.focus(), Focus::None);
        assert_eq!(encoder.identity(), Identity::new(1));
        assert_eq!(encoder.decoder_state(), Some(DecoderState::Start));
    }

    #[test]
    fn invalid_config_rejected() {
        let mut config = EncoderConfig::default();
        config.switch = SwitchConfig {
            min: 4,
            max: 2,
            ..SwitchConfig::default()
        };
        assert_eq!(
            Encoder::new(config, Identity::new(1)).err(),
            Some(EncoderError::InvalidSwitchRange)
        );
    }

    // ── Edge path ────────────────────────────────────────────────────

    #[test]
    fn cw_cycle_moves_position_once_at_end() {
        let mut encoder = encoder(EncoderConfig::default());
        let mut now = 0;
        for &bits in &CW_CYCLE[..3] {
            now += 100_000;
            assert_eq!(encoder.on_edge(Channel::A, PinCode::from_bits(bits), now), Direction::None);
            assert_eq!(encoder.position(), 0);
            assert_eq!(encoder.direction(), Direction::None);
        }
        assert_eq!(encoder.on_edge(Channel::A, PinCode::REST, now + 100_000), Direction::Cw);
        assert_eq!(encoder.direction(), Direction::Cw);
        assert_eq!(encoder.position(), i16::from(encoder.rate()));
        assert_eq!(encoder.position(), 1);
    }

    #[test]
    fn bounce_leaves_position_alone() {
        let mut encoder = encoder(EncoderConfig::default());
        feed(&mut encoder, &[0b10, 0b11, 0b10, 0b00], 0, 100_000);
        assert_eq!(encoder.position(), 0);
        assert_eq!(encoder.direction(), Direction::None);
        assert_eq!(encoder.decoder_state(), Some(DecoderState::Start));
        assert_eq!(encoder.focus(), Focus::Encoder);
    }

    #[test]
    fn direction_survives_rejected_samples() {
        let mut encoder = encoder(EncoderConfig::default());
        let now = feed(&mut encoder, &CCW_CYCLE, 0, 100_000);
        assert_eq!(encoder.direction(), Direction::Ccw);
        feed(&mut encoder, &[0b10, 0b00], now, 100_000);
        assert_eq!(encoder.direction(), Direction::Ccw);
        assert_eq!(encoder.position(), -1);
    }

    #[test]
    fn fast_twist_steps_by_fifty() {
        let mut encoder = encoder(EncoderConfig::default());
        // Edges 2 ms apart: detents complete 8 ms apart.
        let now = feed(&mut encoder, &CW_CYCLE, 0, 2_000);
        assert_eq!(encoder.position(), 1);
        feed(&mut encoder, &CW_CYCLE, now, 2_000);
        assert_eq!(encoder.rate(), 50);
        assert_eq!(encoder.position(), 51);
    }

    #[test]
    fn medium_twist_between_detents_steps_by_ten() {
        let mut encoder = encoder(EncoderConfig::default());
        // Edges 4 ms apart: detents complete 16 ms apart.
        let now = feed(&mut encoder, &CW_CYCLE, 0, 4_000);
        feed(&mut encoder, &CW_CYCLE, now, 4_000);
        assert_eq!(encoder.rate(), 10);
        assert_eq!(encoder.position(), 11);
    }

    #[test]
    fn stall_then_quick_detent_steps_by_one() {
        let mut encoder = encoder(EncoderConfig::default());
        let now = feed(&mut encoder, &CW_CYCLE, 0, 3_000);
        assert_eq!(encoder.position(), 1);

        // One second of rest, then a single quick click.
        feed(&mut encoder, &CW_CYCLE, now + 1_000_000, 3_000);
        assert_eq!(encoder.position(), 2);
        assert_eq!(encoder.rate(), 1);
    }

    #[test]
    fn bounce_before_completing_edge_does_not_accelerate() {
        let mut encoder = encoder(EncoderConfig::default());
        let now = feed(&mut encoder, &CW_CYCLE, 0, 100_000);
        // Slow detent with chatter between the last two phases.
        feed(&mut encoder, &[0b10, 0b11, 0b01, 0b11, 0b01, 0b00], now, 100_000);
        assert_eq!(encoder.position(), 2);
        assert_eq!(encoder.rate(), 1);
    }

    #[test]
    fn ignored_edge_keeps_last_step_rate() {
        let mut encoder = encoder(EncoderConfig {
            strategy: DecodeStrategy::SignalOnly,
            ..EncoderConfig::default()
        });
        encoder.on_edge(Channel::A, PinCode::from_bits(0b10), 0);
        // Repeated A edge 100 us later: swallowed by the guard, nothing steps.
        assert_eq!(encoder.on_edge(Channel::A, PinCode::from_bits(0b10), 100), Direction::None);
        assert_eq!(encoder.rate(), 1);
        assert_eq!(encoder.position(), 1);
    }

    #[test]
    fn signal_only_medium_twist_steps_by_ten() {
        let mut encoder = encoder(EncoderConfig {
            strategy: DecodeStrategy::SignalOnly,
            ..EncoderConfig::default()
        });
        // Signal-only: every accepted edge steps.
        encoder.on_edge(Channel::A, PinCode::from_bits(0b10), 0);
        assert_eq!(encoder.position(), 1);
        encoder.on_edge(Channel::B, PinCode::from_bits(0b11), 15_000);
        assert_eq!(encoder.rate(), 10);
        assert_eq!(encoder.position(), 11);
    }

    #[test]
    fn fixed_velocity_never_accelerates() {
        let mut encoder = encoder(EncoderConfig {
            velocity: VelocityConfig::fixed(),
            ..EncoderConfig::default()
        });
        feed(&mut encoder, &CW_CYCLE, 0, 1_000);
        feed(&mut encoder, &CW_CYCLE, 4_000, 1_000);
        assert_eq!(encoder.position(), 2);
    }

    #[test]
    fn position_saturates() {
        let mut encoder = encoder(EncoderConfig::default());
        let now = feed(&mut encoder, &CW_CYCLE, 0, 2_000);
        encoder.set_position(i16::MAX - 10);
        let now = feed(&mut encoder, &CW_CYCLE, now, 2_000);
        assert_eq!(encoder.rate(), 50);
        assert_eq!(encoder.position(), i16::MAX);

        encoder.set_position(i16::MIN + 3);
        feed(&mut encoder, &CCW_CYCLE, now, 2_000);
        assert_eq!(encoder.rate(), 50);
        assert_eq!(encoder.position(), i16::MIN);
    }

    #[test]
    fn half_step_counts_twice_per_cycle() {
        let mut encoder = encoder(EncoderConfig {
            strategy: DecodeStrategy::Table(StepMode::HalfStep),
            ..EncoderConfig::default()
        });
        feed(&mut encoder, &CW_CYCLE, 0, 100_000);
        assert_eq!(encoder.position(), 2);
    }

    #[test]
    fn reset_decoder_drops_partial_detent() {
        let mut encoder = encoder(EncoderConfig::default());
        feed(&mut encoder, &CW_CYCLE[..3], 0, 100_000);
        encoder.reset_decoder();
        assert_eq!(encoder.decoder_state(), Some(DecoderState::Start));
        encoder.on_edge(Channel::A, PinCode::REST, 500_000);
        assert_eq!(encoder.position(), 0);
    }

    // ── Switch path ──────────────────────────────────────────────────

    #[test]
    fn press_and_release_take_focus() {
        let mut encoder = encoder(EncoderConfig::default());
        feed(&mut encoder, &CW_CYCLE, 0, 100_000);
        assert_eq!(encoder.focus(), Focus::Encoder);

        assert_eq!(encoder.on_switch_sample(SwitchLevel::Pressed, 10), Some(SwitchEvent::Pressed));
        assert_eq!(encoder.focus(), Focus::Switch);
        assert_eq!(encoder.switch_position(), 1);

        feed(&mut encoder, &[0b10], 1_000_000, 1);
        assert_eq!(encoder.focus(), Focus::Encoder);

        assert_eq!(encoder.on_switch_sample(SwitchLevel::Released, 20), Some(SwitchEvent::Released));
        assert_eq!(encoder.focus(), Focus::Switch);
        assert_eq!(encoder.switch_position(), 1);
    }

    #[test]
    fn hold_sets_switch_reset_focus() {
        let mut encoder = encoder(EncoderConfig::default());
        encoder.on_switch_sample(SwitchLevel::Pressed, 0);
        assert_eq!(encoder.on_switch_sample(SwitchLevel::Pressed, 3_001), Some(SwitchEvent::HoldReset));
        assert_eq!(encoder.focus(), Focus::SwitchReset);
        assert_eq!(encoder.switch_position(), 0);
    }

    #[test]
    fn early_release_does_not_reset() {
        let mut encoder = encoder(EncoderConfig::default());
        encoder.on_switch_sample(SwitchLevel::Pressed, 0);
        encoder.on_switch_sample(SwitchLevel::Released, 2_000);
        assert_eq!(encoder.on_switch_sample(SwitchLevel::Released, 5_000), None);
        assert_eq!(encoder.focus(), Focus::Switch);
        assert_eq!(encoder.switch_position(), 1);
    }

    #[test]
    fn hold_restores_configured_position() {
        let mut encoder = encoder(EncoderConfig {
            reset_position: Some(15),
            ..EncoderConfig::default()
        });
        feed(&mut encoder, &CW_CYCLE, 0, 100_000);
        assert_eq!(encoder.position(), 1);

        encoder.on_switch_sample(SwitchLevel::Pressed, 0);
        encoder.on_switch_sample(SwitchLevel::Pressed, 3_500);
        assert_eq!(encoder.position(), 15);
        assert_eq!(encoder.direction(), Direction::None);
    }

    #[test]
    fn hold_without_reset_position_keeps_count() {
        let mut encoder = encoder(EncoderConfig::default());
        feed(&mut encoder, &CW_CYCLE, 0, 100_000);
        encoder.on_switch_sample(SwitchLevel::Pressed, 0);
        encoder.on_switch_sample(SwitchLevel::Pressed, 3_500);
        assert_eq!(encoder.position(), 1);
    }

    #[test]
    fn set_switch_position_validates() {
        let mut encoder = encoder(EncoderConfig::default());
        assert!(encoder.set_switch_position(5).is_ok());
        assert_eq!(encoder.switch_position(), 5);
        assert_eq!(
            encoder.set_switch_position(6),
            Err(EncoderError::SwitchPositionOutOfRange)
        );
        assert_eq!(encoder.switch_position(), 5);
    }
}
