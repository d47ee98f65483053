//! Quadrature decoding: raw channel samples in, detent directions out.
//!
//! Two strategies implement the same [`Decoder`] contract:
//!
//! - **[`TableDecoder`]** — a transition table indexed by
//!   `[state][pin code]`. Any sample inconsistent with a clean quadrature
//!   sequence routes back to the start node, so contact bounce can abort a
//!   detent in progress but never fabricate a direction.
//! - **[`SignalDecoder`]** — compares the two channel levels on each edge,
//!   with an in-flight guard pairing the A edge with the following B edge.
//!   Cheaper, but only suitable for clean, hardware-filtered signals.
//!
//! [`QuadratureDecoder`] dispatches to either one and is what the encoder
//! core holds, so the strategy is chosen by configuration rather than by
//! type.
//!
//! # Pin codes
//!
//! Samples are expressed as [`PinCode`]s built from *asserted* contacts,
//! channel A in bit 1 and channel B in bit 0:
//!
//! ```text
//!  code   A  B
//!  00     -  -    detent rest position
//!  10     x  -
//!  11     x  x
//!  01     -  x
//! ```
//!
//! A clockwise detent walks `00 → 10 → 11 → 01 → 00`; counter-clockwise
//! walks the same ring backwards.

mod signal;
mod table;

pub use signal::SignalDecoder;
pub use table::{DecoderState, TableDecoder};

use embedded_hal::digital::PinState;

// ── Direction / Channel ──────────────────────────────────────────────────

/// Rotation direction produced by a completed transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Clockwise.
    Cw,
    /// Counter-clockwise.
    Ccw,
    /// No completed transition.
    #[default]
    None,
}

impl Direction {
    /// Signed unit step: `+1` for [`Cw`](Direction::Cw), `-1` for
    /// [`Ccw`](Direction::Ccw), `0` otherwise.
    pub fn sign(self) -> i16 {
        match self {
            Direction::Cw => 1,
            Direction::Ccw => -1,
            Direction::None => 0,
        }
    }

    /// Returns `true` for [`Cw`](Direction::Cw) or [`Ccw`](Direction::Ccw).
    pub fn is_some(self) -> bool {
        self != Direction::None
    }
}

/// Encoder channel whose edge triggered a decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// Channel A, sometimes labelled "clk".
    A,
    /// Channel B, sometimes labelled "data" or "dt".
    B,
}

// ── Polarity / PinCode ───────────────────────────────────────────────────

/// Electrical level that means "contact closed".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Pull-up input, contact to ground: `Low` is asserted.
    #[default]
    ActiveLow,
    /// Pull-down input, contact to supply: `High` is asserted.
    ActiveHigh,
}

impl Polarity {
    /// Returns `true` if `level` means the contact is closed.
    pub fn is_asserted(self, level: PinState) -> bool {
        match self {
            Polarity::ActiveLow => level == PinState::Low,
            Polarity::ActiveHigh => level == PinState::High,
        }
    }
}

/// Two-bit sample of both channels: A in bit 1, B in bit 0, `1` = asserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinCode(u8);

impl PinCode {
    /// Detent rest position: both contacts open.
    pub const REST: PinCode = PinCode(0b00);

    /// Build a code from asserted contacts.
    pub const fn new(a: bool, b: bool) -> Self {
        PinCode(((a as u8) << 1) | b as u8)
    }

    /// Build a code from the low two bits of `bits` (`0bAB`).
    pub const fn from_bits(bits: u8) -> Self {
        PinCode(bits & 0b11)
    }

    /// Build a code from electrical levels under the given polarity.
    pub fn from_levels(a: PinState, b: PinState, polarity: Polarity) -> Self {
        Self::new(polarity.is_asserted(a), polarity.is_asserted(b))
    }

    /// Channel A asserted.
    pub const fn a(self) -> bool {
        self.0 & 0b10 != 0
    }

    /// Channel B asserted.
    pub const fn b(self) -> bool {
        self.0 & 0b01 != 0
    }

    /// Raw code in `0..=3`.
    pub const fn bits(self) -> u8 {
        self.0
    }
}

// ── Strategy selection ───────────────────────────────────────────────────

/// Table resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepMode {
    /// One direction per full quadrature cycle (emitted at code `00`).
    #[default]
    FullStep,
    /// Two directions per cycle (emitted at codes `00` and `11`).
    HalfStep,
}

/// Which edges an integrator must deliver to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeTrigger {
    /// Rising edges only.
    Rising,
    /// Both edges; the table must see every transition to reject noise.
    Any,
}

/// Decoding strategy, selected once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeStrategy {
    /// Table-driven state machine with noise rejection.
    Table(StepMode),
    /// Per-edge level comparison with an in-flight guard.
    SignalOnly,
}

impl Default for DecodeStrategy {
    fn default() -> Self {
        DecodeStrategy::Table(StepMode::FullStep)
    }
}

impl DecodeStrategy {
    /// Edges the strategy expects to be interrupted on.
    pub fn edge_trigger(self) -> EdgeTrigger {
        match self {
            DecodeStrategy::Table(_) => EdgeTrigger::Any,
            DecodeStrategy::SignalOnly => EdgeTrigger::Rising,
        }
    }
}

// ── Decoder capability ───────────────────────────────────────────────────

/// Edge-in, direction-out decoding contract.
///
/// Implementations must be total: every `(channel, code)` pair yields a
/// [`Direction`], and samples must be fed in the order the edges occurred.
pub trait Decoder {
    /// Consume one edge on `channel` with the freshly sampled `code`.
    fn on_edge(&mut self, channel: Channel, code: PinCode) -> Direction;

    /// Return to the idle state, dropping any detent in progress.
    fn reset(&mut self);
}

/// Decoder chosen by [`DecodeStrategy`].
#[derive(Debug)]
pub enum QuadratureDecoder {
    Table(TableDecoder),
    Signal(SignalDecoder),
}

impl QuadratureDecoder {
    /// Build the decoder for `strategy`.
    pub fn new(strategy: DecodeStrategy) -> Self {
        match strategy {
            DecodeStrategy::Table(mode) => QuadratureDecoder::Table(TableDecoder::new(mode)),
            DecodeStrategy::SignalOnly => QuadratureDecoder::Signal(SignalDecoder::new()),
        }
    }

    /// Current table node, or `None` for the signal-only strategy.
    pub fn table_state(&self) -> Option<DecoderState> {
        match self {
            QuadratureDecoder::Table(table) => Some(table.state()),
            QuadratureDecoder::Signal(_) => None,
        }
    }
}

impl Decoder for QuadratureDecoder {
    fn on_edge(&mut self, channel: Channel, code: PinCode) -> Direction {
        match self {
            QuadratureDecoder::Table(table) => table.on_edge(channel, code),
            QuadratureDecoder::Signal(signal) => signal.on_edge(channel, code),
        }
    }

    fn reset(&mut self) {
        match self {
            QuadratureDecoder::Table(table) => table.reset(),
            QuadratureDecoder::Signal(signal) => signal.reset(),
        }
    }
}
