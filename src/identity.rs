//! Opaque per-instance token for telling encoders apart in logs.

use rand_core::RngCore;

/// Instance identity token.
///
/// Has no meaning to the decoder; it only disambiguates several encoders
/// on one panel in logs and telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Identity(u16);

impl Identity {
    /// Lowest token drawn by [`from_rng`](Self::from_rng).
    pub const RANDOM_MIN: u16 = 100;
    /// Exclusive upper bound of tokens drawn by [`from_rng`](Self::from_rng).
    pub const RANDOM_MAX: u16 = 1000;

    /// Use an explicit token.
    pub const fn new(token: u16) -> Self {
        Identity(token)
    }

    /// Draw a token in `[RANDOM_MIN, RANDOM_MAX)` from `rng`, once, at
    /// construction time.
    pub fn from_rng<R: RngCore>(rng: &mut R) -> Self {
        let span = u32::from(Self::RANDOM_MAX - Self::RANDOM_MIN);
        let offset = (rng.next_u32() % span) as u16;
        Identity(Self::RANDOM_MIN + offset)
    }

    pub const fn value(self) -> u16 {
        self.0
    }
}
