//! Pin-owning encoder instance.
//!
//! [`RotaryEncoder`] binds three `embedded-hal` input pins (switch,
//! channel A, channel B) to an [`Encoder`] core. The pins are supplied once
//! at construction and never reassigned; the interrupt entry points sample
//! them directly, and [`tick`](RotaryEncoder::tick) samples the switch
//! from the application loop.

use embedded_hal::digital::{InputPin, PinState};

use crate::config::EncoderConfig;
use crate::decoder::{Channel, DecoderState, Direction, PinCode, Polarity};
use crate::encoder::Encoder;
use crate::error::{pin_error, EncoderError};
use crate::focus::Focus;
use crate::identity::Identity;
use crate::switch::{SwitchEvent, SwitchLevel};

/// One rotary encoder with push switch, wired to GPIO inputs.
///
/// # Wiring into interrupts
///
/// Bind the channel edges reported by
/// [`DecodeStrategy::edge_trigger`](crate::DecodeStrategy::edge_trigger)
/// to [`on_channel_a_edge`](Self::on_channel_a_edge) /
/// [`on_channel_b_edge`](Self::on_channel_b_edge), passing a microsecond
/// timestamp, and call [`tick`](Self::tick) once per loop iteration with a
/// millisecond timestamp. When the interrupt handlers and the loop share
/// the instance, keep it behind a critical section; see
/// [`SharedEncoder`](crate::SharedEncoder) for the pin-free equivalent.
///
/// ```ignore
/// let mut knob = RotaryEncoder::new(sw_pin, clk_pin, dt_pin, EncoderConfig::default(), id)?;
///
/// // In the channel A interrupt handler:
/// knob.on_channel_a_edge(micros())?;
///
/// // In the main loop:
/// if let Some(SwitchEvent::HoldReset) = knob.tick(millis())? {
///     knob.set_position(0);
/// }
/// ```
pub struct RotaryEncoder<SW, A, B> {
    switch_pin: SW,
    channel_a: A,
    channel_b: B,
    encoder: Encoder,
}

impl<SW, A, B> RotaryEncoder<SW, A, B>
where
    SW: InputPin,
    A: InputPin,
    B: InputPin,
{
    /// Take ownership of the pins and read the initial switch level.
    ///
    /// # Errors
    /// * [`EncoderError::Pin`] if the initial switch read fails
    /// * any [`EncoderConfig::validate`] failure
    pub fn new(
        mut switch_pin: SW,
        channel_a: A,
        channel_b: B,
        config: EncoderConfig,
        identity: Identity,
    ) -> Result<Self, EncoderError> {
        let initial = read_switch(&mut switch_pin, config.switch.polarity)?;
        let encoder = Encoder::with_switch_level(config, identity, initial)?;

        Ok(Self {
            switch_pin,
            channel_a,
            channel_b,
            encoder,
        })
    }

    // ── Entry points ─────────────────────────────────────────────────

    /// Channel A interrupt entry point. Samples both channels.
    pub fn on_channel_a_edge(&mut self, now_us: u32) -> Result<Direction, EncoderError> {
        self.on_channel_edge(Channel::A, now_us)
    }

    /// Channel B interrupt entry point. Samples both channels.
    pub fn on_channel_b_edge(&mut self, now_us: u32) -> Result<Direction, EncoderError> {
        self.on_channel_edge(Channel::B, now_us)
    }

    /// Poll the switch. Call once per application loop iteration.
    pub fn tick(&mut self, now_ms: u32) -> Result<Option<SwitchEvent>, EncoderError> {
        let level = read_switch(&mut self.switch_pin, self.encoder.config().switch.polarity)?;
        Ok(self.encoder.on_switch_sample(level, now_ms))
    }

    fn on_channel_edge(&mut self, channel: Channel, now_us: u32) -> Result<Direction, EncoderError> {
        let code = self.sample_channels()?;
        Ok(self.encoder.on_edge(channel, code, now_us))
    }

    fn sample_channels(&mut self) -> Result<PinCode, EncoderError> {
        let a = read_level(&mut self.channel_a)?;
        let b = read_level(&mut self.channel_b)?;
        Ok(PinCode::from_levels(a, b, self.encoder.config().channel_polarity))
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn position(&self) -> i16 {
        self.encoder.position()
    }

    pub fn set_position(&mut self, position: i16) {
        self.encoder.set_position(position);
    }

    pub fn direction(&self) -> Direction {
        self.encoder.direction()
    }

    pub fn rate(&self) -> u8 {
        self.encoder.rate()
    }

    pub fn switch_position(&self) -> u8 {
        self.encoder.switch_position()
    }

    pub fn set_switch_position(&mut self, position: u8) -> Result<(), EncoderError> {
        self.encoder.set_switch_position(position)
    }

    pub fn switch_level(&self) -> SwitchLevel {
        self.encoder.switch_level()
    }

    pub fn focus(&self) -> Focus {
        self.encoder.focus()
    }

    pub fn identity(&self) -> Identity {
        self.encoder.identity()
    }

    pub fn decoder_state(&self) -> Option<DecoderState> {
        self.encoder.decoder_state()
    }

    /// Borrow the pin-free core.
    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    /// Give the pins back.
    pub fn release(self) -> (SW, A, B) {
        (self.switch_pin, self.channel_a, self.channel_b)
    }
}

fn read_level<P: InputPin>(pin: &mut P) -> Result<PinState, EncoderError> {
    let high = pin.is_high().map_err(pin_error)?;
    Ok(PinState::from(high))
}

fn read_switch<P: InputPin>(pin: &mut P, polarity: Polarity) -> Result<SwitchLevel, EncoderError> {
    let level = read_level(pin)?;
    Ok(if polarity.is_asserted(level) {
        SwitchLevel::Pressed
    } else {
        SwitchLevel::Released
    })
}
