//! Table-driven quadrature state machine.
//!
//! Based on Ben Buxton's rotary encoder state machine
//! (<http://www.buxtronix.net/2011/10/rotary-encoders-done-properly.html>),
//! re-indexed by asserted-contact codes so that `00` is the detent rest.

use super::{Channel, Decoder, Direction, PinCode, StepMode};

/// Direction flag carried by a table entry.
const DIR_CW: u8 = 0x10;
const DIR_CCW: u8 = 0x20;
const STATE_MASK: u8 = 0x0F;

// Full-step node indices.
const R_START: u8 = 0x0;
const R_CW_FINAL: u8 = 0x1;
const R_CW_BEGIN: u8 = 0x2;
const R_CW_NEXT: u8 = 0x3;
const R_CCW_BEGIN: u8 = 0x4;
const R_CCW_FINAL: u8 = 0x5;
const R_CCW_NEXT: u8 = 0x6;

/// Full-step table, columns are codes `00, 01, 10, 11`.
const FULL_STEP_TABLE: [[u8; 4]; 7] = [
    // R_START
    [R_START, R_CCW_BEGIN, R_CW_BEGIN, R_START],
    // R_CW_FINAL
    [R_START | DIR_CW, R_CW_FINAL, R_START, R_CW_NEXT],
    // R_CW_BEGIN
    [R_START, R_START, R_CW_BEGIN, R_CW_NEXT],
    // R_CW_NEXT
    [R_START, R_CW_FINAL, R_CW_BEGIN, R_CW_NEXT],
    // R_CCW_BEGIN
    [R_START, R_CCW_BEGIN, R_START, R_CCW_NEXT],
    // R_CCW_FINAL
    [R_START | DIR_CCW, R_START, R_CCW_FINAL, R_CCW_NEXT],
    // R_CCW_NEXT
    [R_START, R_CCW_BEGIN, R_CCW_FINAL, R_CCW_NEXT],
];

// Half-step node indices. `_M` nodes sit around the `11` mid-cycle rest.
const H_START: u8 = 0x0;
const H_CCW_BEGIN: u8 = 0x1;
const H_CW_BEGIN: u8 = 0x2;
const H_START_M: u8 = 0x3;
const H_CW_BEGIN_M: u8 = 0x4;
const H_CCW_BEGIN_M: u8 = 0x5;

/// Half-step table, columns are codes `00, 01, 10, 11`.
const HALF_STEP_TABLE: [[u8; 4]; 6] = [
    // H_START
    [H_START, H_CCW_BEGIN, H_CW_BEGIN, H_START_M],
    // H_CCW_BEGIN
    [H_START, H_CCW_BEGIN, H_START, H_START_M | DIR_CCW],
    // H_CW_BEGIN
    [H_START, H_START, H_CW_BEGIN, H_START_M | DIR_CW],
    // H_START_M
    [H_START, H_CW_BEGIN_M, H_CCW_BEGIN_M, H_START_M],
    // H_CW_BEGIN_M
    [H_START | DIR_CW, H_CW_BEGIN_M, H_START_M, H_START_M],
    // H_CCW_BEGIN_M
    [H_START | DIR_CCW, H_START_M, H_CCW_BEGIN_M, H_START_M],
];

/// Named decoder node, for inspection and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecoderState {
    /// Detent rest (`00`).
    Start,
    CwBegin,
    CwNext,
    CwFinal,
    CcwBegin,
    CcwNext,
    CcwFinal,
    /// Half-step only: mid-cycle rest (`11`).
    StartMid,
    /// Half-step only.
    CwBeginMid,
    /// Half-step only.
    CcwBeginMid,
}

/// Quadrature decoder backed by a fixed transition table.
///
/// A direction is reported only when a transition lands on a rest node
/// carrying a direction flag, i.e. when a clean detent (or half-detent in
/// [`StepMode::HalfStep`]) completed. Every other sample just moves the
/// cursor, and any inconsistent sample sends it back towards the rest node.
#[derive(Debug, Clone, Copy)]
pub struct TableDecoder {
    mode: StepMode,
    state: u8,
}

impl TableDecoder {
    /// Create a decoder resting at [`DecoderState::Start`].
    pub fn new(mode: StepMode) -> Self {
        Self {
            mode,
            state: R_START,
        }
    }

    /// Table resolution in use.
    pub fn mode(&self) -> StepMode {
        self.mode
    }

    /// Current node.
    pub fn state(&self) -> DecoderState {
        match self.mode {
            StepMode::FullStep => match self.state {
                R_CW_FINAL => DecoderState::CwFinal,
                R_CW_BEGIN => DecoderState::CwBegin,
                R_CW_NEXT => DecoderState::CwNext,
                R_CCW_BEGIN => DecoderState::CcwBegin,
                R_CCW_FINAL => DecoderState::CcwFinal,
                R_CCW_NEXT => DecoderState::CcwNext,
                _ => DecoderState::Start,
            },
            StepMode::HalfStep => match self.state {
                H_CCW_BEGIN => DecoderState::CcwBegin,
                H_CW_BEGIN => DecoderState::CwBegin,
                H_START_M => DecoderState::StartMid,
                H_CW_BEGIN_M => DecoderState::CwBeginMid,
                H_CCW_BEGIN_M => DecoderState::CcwBeginMid,
                _ => DecoderState::Start,
            },
        }
    }

    /// Advance the state machine by one sample.
    pub fn step(&mut self, code: PinCode) -> Direction {
        let column = code.bits() as usize;
        let row = self.state as usize;
        let entry = match self.mode {
            StepMode::FullStep => FULL_STEP_TABLE[row][column],
            StepMode::HalfStep => HALF_STEP_TABLE[row][column],
        };
        self.state = entry & STATE_MASK;

        match entry & !STATE_MASK {
            DIR_CW => Direction::Cw,
            DIR_CCW => Direction::Ccw,
            _ => Direction::None,
        }
    }
}

impl Decoder for TableDecoder {
    /// The table samples both channels, so the triggering channel is
    /// irrelevant.
    fn on_edge(&mut self, _channel: Channel, code: PinCode) -> Direction {
        self.step(code)
    }

    fn reset(&mut self) {
        self.state = R_START;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CW_CYCLE: [u8; 4] = [0b10, 0b11, 0b01, 0b00];
    const CCW_CYCLE: [u8; 4] = [0b01, 0b11, 0b10, 0b00];

    // Helper: feed a sequence and collect the emitted directions.
    fn feed(decoder: &mut TableDecoder, codes: &[u8]) -> ([Direction; 16], usize) {
        let mut out = [Direction::None; 16];
        let mut count = 0;
        for &bits in codes {
            let dir = decoder.step(PinCode::from_bits(bits));
            if dir.is_some() {
                out[count] = dir;
                count += 1;
            }
        }
        (out, count)
    }

    // ── Full step ────────────────────────────────────────────────────

    #[test]
    fn full_step_cw_cycle_emits_once_at_end() {
        let mut decoder = TableDecoder::new(StepMode::FullStep);
        assert_eq!(decoder.step(PinCode::from_bits(0b10)), Direction::None);
        assert_eq!(decoder.state(), DecoderState::CwBegin);
        assert_eq!(decoder.step(PinCode::from_bits(0b11)), Direction::None);
        assert_eq!(decoder.state(), DecoderState::CwNext);
        assert_eq!(decoder.step(PinCode::from_bits(0b01)), Direction::None);
        assert_eq!(decoder.state(), DecoderState::CwFinal);
        assert_eq!(decoder.step(PinCode::from_bits(0b00)), Direction::Cw);
        assert_eq!(decoder.state(), DecoderState::Start);
    }

    #[test]
    fn full_step_ccw_cycle() {
        let mut decoder = TableDecoder::new(StepMode::FullStep);
        let (dirs, count) = feed(&mut decoder, &CCW_CYCLE);
        assert_eq!(count, 1);
        assert_eq!(dirs[0], Direction::Ccw);
        assert_eq!(decoder.state(), DecoderState::Start);
    }

    #[test]
    fn full_step_consecutive_detents() {
        let mut decoder = TableDecoder::new(StepMode::FullStep);
        let mut codes = [0u8; 12];
        codes[..4].copy_from_slice(&CW_CYCLE);
        codes[4..8].copy_from_slice(&CW_CYCLE);
        codes[8..].copy_from_slice(&CCW_CYCLE);
        let (dirs, count) = feed(&mut decoder, &codes);
        assert_eq!(count, 3);
        assert_eq!(&dirs[..3], &[Direction::Cw, Direction::Cw, Direction::Ccw]);
    }

    #[test]
    fn reversed_sample_mid_cycle_emits_nothing() {
        let mut decoder = TableDecoder::new(StepMode::FullStep);
        // 11 bounces back to 10, then the knob settles at rest.
        let (_, count) = feed(&mut decoder, &[0b10, 0b11, 0b10, 0b00]);
        assert_eq!(count, 0);
        assert_eq!(decoder.state(), DecoderState::Start);
    }

    #[test]
    fn bounce_at_first_edge_returns_to_start() {
        let mut decoder = TableDecoder::new(StepMode::FullStep);
        let (_, count) = feed(&mut decoder, &[0b10, 0b00, 0b10, 0b00, 0b01, 0b00]);
        assert_eq!(count, 0);
        assert_eq!(decoder.state(), DecoderState::Start);
    }

    #[test]
    fn chatter_inside_detent_counts_once() {
        let mut decoder = TableDecoder::new(StepMode::FullStep);
        let (dirs, count) = feed(&mut decoder, &[0b10, 0b11, 0b10, 0b11, 0b01, 0b11, 0b01, 0b00]);
        assert_eq!(count, 1);
        assert_eq!(dirs[0], Direction::Cw);
    }

    #[test]
    fn skipped_phase_does_not_fabricate_direction() {
        let mut decoder = TableDecoder::new(StepMode::FullStep);
        // 10 straight to 01 is impossible for a clean encoder.
        let (_, count) = feed(&mut decoder, &[0b10, 0b01, 0b00]);
        assert_eq!(count, 0);
    }

    #[test]
    fn reset_drops_partial_detent() {
        let mut decoder = TableDecoder::new(StepMode::FullStep);
        feed(&mut decoder, &[0b10, 0b11, 0b01]);
        assert_eq!(decoder.state(), DecoderState::CwFinal);
        decoder.reset();
        assert_eq!(decoder.state(), DecoderState::Start);
        assert_eq!(decoder.step(PinCode::REST), Direction::None);
    }

    // ── Half step ────────────────────────────────────────────────────

    #[test]
    fn half_step_emits_twice_per_cycle() {
        let mut decoder = TableDecoder::new(StepMode::HalfStep);
        assert_eq!(decoder.step(PinCode::from_bits(0b10)), Direction::None);
        assert_eq!(decoder.step(PinCode::from_bits(0b11)), Direction::Cw);
        assert_eq!(decoder.state(), DecoderState::StartMid);
        assert_eq!(decoder.step(PinCode::from_bits(0b01)), Direction::None);
        assert_eq!(decoder.state(), DecoderState::CwBeginMid);
        assert_eq!(decoder.step(PinCode::from_bits(0b00)), Direction::Cw);
        assert_eq!(decoder.state(), DecoderState::Start);
    }

    #[test]
    fn half_step_ccw() {
        let mut decoder = TableDecoder::new(StepMode::HalfStep);
        let (dirs, count) = feed(&mut decoder, &CCW_CYCLE);
        assert_eq!(count, 2);
        assert_eq!(&dirs[..2], &[Direction::Ccw, Direction::Ccw]);
    }

    #[test]
    fn half_step_bounce_emits_nothing() {
        let mut decoder = TableDecoder::new(StepMode::HalfStep);
        let (_, count) = feed(&mut decoder, &[0b10, 0b00, 0b01, 0b00]);
        assert_eq!(count, 0);
        assert_eq!(decoder.state(), DecoderState::Start);
    }
}
