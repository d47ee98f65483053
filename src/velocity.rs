//! Twist-speed estimation.
//!
//! Human detent-to-detent timing ranges from roughly 500 ms for slow,
//! precise adjustment down to a couple of milliseconds for a flick. A
//! single step size cannot serve both, so the interval between edges picks
//! a multiplier tier from [`VelocityConfig`].

use crate::config::{RateTier, VelocityConfig};

/// Tracks the previous edge time and derives the step multiplier.
#[derive(Debug, Clone, Copy)]
pub struct VelocityEstimator {
    config: VelocityConfig,
    last_edge_us: Option<u32>,
    rate: u8,
}

impl VelocityEstimator {
    pub fn new(config: VelocityConfig) -> Self {
        Self {
            config,
            last_edge_us: None,
            rate: 1,
        }
    }

    /// Multiplier from the most recent [`update`](Self::update). Never 0.
    pub fn rate(&self) -> u8 {
        self.rate
    }

    /// Record an edge at `now_us` and return the new multiplier.
    ///
    /// The timestamp is stored on every call, whether or not the edge
    /// produced a direction, so a stall drops the next edge back to the
    /// slow rate. The first edge ever seen has no interval and steps by 1.
    /// The microsecond clock may wrap.
    pub fn update(&mut self, now_us: u32, direction_detected: bool) -> u8 {
        let interval = self.last_edge_us.map(|last| now_us.wrapping_sub(last));
        self.last_edge_us = Some(now_us);

        self.rate = match interval {
            Some(interval) => self.rate_for(interval, direction_detected),
            None => 1,
        };
        self.rate
    }

    /// Forget the previous edge so the next one starts slow.
    pub fn reset(&mut self) {
        self.last_edge_us = None;
        self.rate = 1;
    }

    fn rate_for(&self, interval_us: u32, direction_detected: bool) -> u8 {
        let applies = |tier: &RateTier| {
            interval_us < tier.below_us && (direction_detected || !tier.requires_direction)
        };

        [self.config.fast, self.config.medium]
            .iter()
            .flatten()
            .copied()
            .find(|tier| applies(tier))
            .map_or(1, |tier| tier.rate.max(1))
    }
}
