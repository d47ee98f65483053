//! Async driver loops for Embassy executors.
//!
//! These are regular `async fn`s, **not** Embassy `#[task]`s. Embassy tasks
//! cannot be generic, so callers wrap them in a thin concrete task:
//!
//! ```ignore
//! #[embassy_executor::task]
//! async fn knob_edges(a: Input<'static>, b: Input<'static>, knob: &'static SharedEncoder) {
//!     channel_edge_task(a, b, knob).await;
//! }
//!
//! #[embassy_executor::task]
//! async fn knob_switch(sw: Input<'static>, knob: &'static SharedEncoder) {
//!     switch_poll_task(sw, knob, SWITCH_POLL_PERIOD_MS).await;
//! }
//! ```
//!
//! The edge loop waits on GPIO edge interrupts through
//! `embedded-hal-async`'s [`Wait`], so the "interrupt handler" is the
//! task's wake-up; both loops feed the shared encoder inside a short
//! critical section.

use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Instant, Ticker};
use embedded_hal::digital::{InputPin, PinState};
use embedded_hal_async::digital::Wait;

use crate::decoder::{Channel, EdgeTrigger, PinCode};
use crate::error::{pin_error, EncoderError};
use crate::shared::SharedEncoder;
use crate::switch::SwitchLevel;

/// Default switch poll period. Button response tolerates 10 ms.
pub const SWITCH_POLL_PERIOD_MS: u64 = 10;

/// Drive the encoder from channel edges, forever.
///
/// Waits on the edges the configured strategy needs (see
/// [`DecodeStrategy::edge_trigger`](crate::DecodeStrategy::edge_trigger)),
/// samples both channels, and feeds the sample with a microsecond
/// timestamp. Pin errors are logged and the loop carries on.
pub async fn channel_edge_task<A, B>(mut channel_a: A, mut channel_b: B, encoder: &SharedEncoder)
where
    A: Wait + InputPin,
    B: Wait + InputPin,
{
    let (trigger, polarity) =
        encoder.lock(|e| (e.config().strategy.edge_trigger(), e.config().channel_polarity));

    #[cfg(feature = "defmt")]
    defmt::info!("Channel edge task started ({})", trigger);

    loop {
        let channel = match wait_for_edge(&mut channel_a, &mut channel_b, trigger).await {
            Ok(channel) => channel,
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::error!("Channel wait failed: {}", _e);
                continue;
            }
        };

        let code = match sample(&mut channel_a, &mut channel_b) {
            Ok((a, b)) => PinCode::from_levels(a, b, polarity),
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::error!("Channel read failed: {}", _e);
                continue;
            }
        };

        let now_us = Instant::now().as_micros() as u32;
        encoder.on_edge(channel, code, now_us);
    }
}

/// Poll the switch every `period_ms`, forever.
pub async fn switch_poll_task<SW>(mut switch_pin: SW, encoder: &SharedEncoder, period_ms: u64)
where
    SW: InputPin,
{
    let polarity = encoder.lock(|e| e.config().switch.polarity);
    let mut ticker = Ticker::every(Duration::from_millis(period_ms));

    loop {
        ticker.next().await;

        let level = match switch_pin.is_high() {
            Ok(high) => PinState::from(high),
            Err(e) => {
                let _e = pin_error(e);
                #[cfg(feature = "defmt")]
                defmt::error!("Switch read failed: {}", _e);
                continue;
            }
        };

        let level = if polarity.is_asserted(level) {
            SwitchLevel::Pressed
        } else {
            SwitchLevel::Released
        };

        let now_ms = Instant::now().as_millis() as u32;
        encoder.on_switch_sample(level, now_ms);
    }
}

async fn wait_for_edge<A, B>(
    channel_a: &mut A,
    channel_b: &mut B,
    trigger: EdgeTrigger,
) -> Result<Channel, EncoderError>
where
    A: Wait,
    B: Wait,
{
    let edge = match trigger {
        EdgeTrigger::Rising => {
            select(channel_a.wait_for_rising_edge(), channel_b.wait_for_rising_edge()).await
        }
        EdgeTrigger::Any => select(channel_a.wait_for_any_edge(), channel_b.wait_for_any_edge()).await,
    };

    match edge {
        Either::First(result) => result.map(|()| Channel::A).map_err(pin_error),
        Either::Second(result) => result.map(|()| Channel::B).map_err(pin_error),
    }
}

fn sample<A, B>(channel_a: &mut A, channel_b: &mut B) -> Result<(PinState, PinState), EncoderError>
where
    A: InputPin,
    B: InputPin,
{
    let a = channel_a.is_high().map_err(pin_error)?;
    let b = channel_b.is_high().map_err(pin_error)?;
    Ok((PinState::from(a), PinState::from(b)))
}
