//! Quadrature rotary encoder and push-switch decoding for `no_std` targets.
//!
//! This crate turns the noisy, interrupt-delivered channel signals of a
//! mechanical rotary encoder, plus its polled push switch, into a stable
//! logical state: signed position, direction, a speed-dependent step
//! multiplier, a cyclic switch position, and a focus hint naming which
//! control last produced input.
//!
//! It targets human-operated detent knobs (≥ 10 ms between detents), not
//! high-RPM motor encoders.
//!
//! # Architecture
//!
//! - **[`decoder`]** — [`TableDecoder`] (noise-rejecting state table, full
//!   or half step) and [`SignalDecoder`] (per-edge level comparison), both
//!   behind the [`Decoder`] trait and selected by [`DecodeStrategy`].
//! - **[`VelocityEstimator`]** — edge interval → step multiplier.
//! - **[`SwitchDebouncer`]** — press / release / hold-to-reset with a
//!   wrapping position counter.
//! - **[`Encoder`]** — pin-free core composing the above with the
//!   [`Focus`] field.
//! - **[`RotaryEncoder`]** — owns three `embedded-hal` input pins and
//!   exposes the interrupt and tick entry points.
//! - **[`SharedEncoder`]** — [`Encoder`] behind a critical-section mutex for
//!   use from interrupt handlers and tasks.
//!
//! # Quick start
//!
//! ```ignore
//! use motion_encoders::{EncoderConfig, Identity, RotaryEncoder};
//!
//! let mut knob = RotaryEncoder::new(sw, clk, dt, EncoderConfig::default(), Identity::new(1))?;
//!
//! // Channel interrupt:
//! knob.on_channel_a_edge(micros())?;
//!
//! // Application loop:
//! knob.tick(millis())?;
//! let value = knob.position();
//! ```
//!
//! # Features
//!
//! - **`defmt`** — [`defmt::Format`] on public types and debug logging of
//!   detents and switch events.
//! - **`task`** — async [`task::channel_edge_task`] and
//!   [`task::switch_poll_task`] loops for Embassy executors.

#![no_std]

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod focus;
pub mod identity;
pub mod rotary;
pub mod shared;
pub mod switch;
#[cfg(feature = "task")]
pub mod task;
pub mod velocity;

// ── Re-exports for convenience ───────────────────────────────────────────

pub use config::{EncoderConfig, RateTier, SwitchConfig, VelocityConfig};
pub use decoder::{
    Channel, DecodeStrategy, Decoder, DecoderState, Direction, EdgeTrigger, PinCode, Polarity,
    QuadratureDecoder, SignalDecoder, StepMode, TableDecoder,
};
pub use encoder::Encoder;
pub use error::EncoderError;
pub use focus::Focus;
pub use identity::Identity;
pub use rotary::RotaryEncoder;
pub use shared::{EncoderSnapshot, SharedEncoder};
pub use switch::{SwitchDebouncer, SwitchEvent, SwitchLevel};
pub use velocity::VelocityEstimator;
