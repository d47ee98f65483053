//! Error types for the encoder crate.

use core::fmt;

use embedded_hal::digital::ErrorKind;

/// Errors that can occur when configuring or sampling an encoder.
///
/// Decoding itself never fails: bounce and out-of-order samples are an
/// expected operating condition and are absorbed by the decoder. Only pin
/// IO and configuration produce errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderError {
    /// Reading a switch or channel pin failed.
    Pin(ErrorKind),

    /// Switch range has `min > max`.
    InvalidSwitchRange,

    /// Switch position outside `[min, max]`.
    SwitchPositionOutOfRange,

    /// A velocity tier was configured with a multiplier of zero.
    ZeroRate,
}

impl fmt::Display for EncoderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EncoderError::Pin(kind) => write!(f, "Pin read error: {:?}", kind),
            EncoderError::InvalidSwitchRange => write!(f, "Switch range minimum exceeds maximum"),
            EncoderError::SwitchPositionOutOfRange => {
                write!(f, "Switch position outside configured range")
            }
            EncoderError::ZeroRate => write!(f, "Velocity rate must be at least 1"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for EncoderError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            EncoderError::Pin(_kind) => defmt::write!(f, "Pin read error"),
            EncoderError::InvalidSwitchRange => defmt::write!(f, "Invalid switch range"),
            EncoderError::SwitchPositionOutOfRange => {
                defmt::write!(f, "Switch position out of range")
            }
            EncoderError::ZeroRate => defmt::write!(f, "Zero velocity rate"),
        }
    }
}

/// Map any `embedded-hal` digital error into [`EncoderError::Pin`].
pub(crate) fn pin_error<E: embedded_hal::digital::Error>(error: E) -> EncoderError {
    EncoderError::Pin(error.kind())
}
