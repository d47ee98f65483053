//! Signal-only decoding for clean, hardware-filtered encoders.

use core::sync::atomic::{AtomicBool, Ordering};

use super::{Channel, Decoder, Direction, PinCode};

/// Per-edge decoder comparing the two channel levels directly.
///
/// A cycle visits channel A's edge first, then channel B's. The in-flight
/// guard is set by the A edge and cleared by the B edge, so a repeated A
/// edge (bounce) or an unpaired B edge is ignored instead of counted twice.
///
/// Each accepted edge produces a direction:
///
/// - on an A edge, channels that differ mean A leads B: clockwise;
/// - on a B edge, channels that agree mean A led B: clockwise.
///
/// Both rules compare the channels with each other, so they hold for either
/// [`Polarity`](super::Polarity).
///
/// No noise rejection beyond the guard: use
/// [`TableDecoder`](super::TableDecoder) for bouncy mechanical contacts.
///
/// [`accept`](Self::accept) takes `&self`, so one decoder can sit in a
/// `static` and be fed directly from separate A and B interrupt handlers.
/// The guard is a plain load then store (no compare-and-swap, which
/// `thumbv6m` lacks); the two handlers must not preempt each other.
///
/// ```
/// use motion_encoders::{Channel, Direction, PinCode, SignalDecoder};
///
/// static KNOB: SignalDecoder = SignalDecoder::new();
///
/// // Channel A interrupt, then channel B interrupt.
/// assert_eq!(KNOB.accept(Channel::A, PinCode::from_bits(0b10)), Direction::Cw);
/// assert_eq!(KNOB.accept(Channel::B, PinCode::from_bits(0b11)), Direction::Cw);
/// ```
#[derive(Debug, Default)]
pub struct SignalDecoder {
    in_flight: AtomicBool,
}

impl SignalDecoder {
    /// Create a decoder with the guard clear.
    pub const fn new() -> Self {
        Self {
            in_flight: AtomicBool::new(false),
        }
    }

    /// Returns `true` between an accepted A edge and its paired B edge.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Consume one edge through a shared reference.
    pub fn accept(&self, channel: Channel, code: PinCode) -> Direction {
        match channel {
            Channel::A => {
                if self.in_flight.load(Ordering::Acquire) {
                    return Direction::None;
                }
                self.in_flight.store(true, Ordering::Release);

                if code.a() != code.b() {
                    Direction::Cw
                } else {
                    Direction::Ccw
                }
            }
            Channel::B => {
                if !self.in_flight.load(Ordering::Acquire) {
                    return Direction::None;
                }
                self.in_flight.store(false, Ordering::Release);

                if code.a() == code.b() {
                    Direction::Cw
                } else {
                    Direction::Ccw
                }
            }
        }
    }

    /// Clear the guard through a shared reference.
    pub fn clear(&self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

impl Decoder for SignalDecoder {
    fn on_edge(&mut self, channel: Channel, code: PinCode) -> Direction {
        self.accept(channel, code)
    }

    fn reset(&mut self) {
        self.clear();
    }
}
