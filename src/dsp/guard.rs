//! End-of-block output guard.
//!
//! A broken filter state or a runaway resonance can produce NaN, infinity or
//! huge values. Those must never reach the speakers. Samples that are merely
//! a little hot are clamped; anything worse silences the whole block.

use log::warn;

/// Samples beyond this magnitude are treated as a fault rather than clipping.
const FAULT_LEVEL: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardAction {
    /// Every sample was already in range.
    Clean,
    /// Some samples were clamped to [-1, 1].
    Clamped,
    /// A fault was found and the block was zeroed.
    Silenced,
}

/// Clamp or silence `block` in place.
pub fn sanitize_block(block: &mut [f32]) -> GuardAction {
    let fault = block
        .iter()
        .position(|sample| !sample.is_finite() || sample.abs() > FAULT_LEVEL);

    if let Some(index) = fault {
        warn!(
            "sample {} at {index} is non-finite or out of range, silencing block",
            block[index]
        );
        block.fill(0.0);
        return GuardAction::Silenced;
    }

    let mut action = GuardAction::Clean;
    for sample in block.iter_mut() {
        if sample.abs() > 1.0 {
            *sample = sample.clamp(-1.0, 1.0);
            action = GuardAction::Clamped;
        }
    }

    action
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_clean_block_alone() {
        let mut block = [0.0, 0.5, -0.99, 1.0];
        assert_eq!(sanitize_block(&mut block), GuardAction::Clean);
        assert_eq!(block, [0.0, 0.5, -0.99, 1.0]);
    }

    #[test]
    fn clamps_hot_samples() {
        let mut block = [0.2, 1.5, -1.9];
        assert_eq!(sanitize_block(&mut block), GuardAction::Clamped);
        assert_eq!(block, [0.2, 1.0, -1.0]);
    }

    #[test]
    fn silences_on_nan() {
        let mut block = [0.3, 1.2, f32::NAN, 0.1];
        assert_eq!(sanitize_block(&mut block), GuardAction::Silenced);
        assert!(block.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn silences_on_infinity_and_extreme_values() {
        let mut block = [f32::INFINITY, 0.0];
        assert_eq!(sanitize_block(&mut block), GuardAction::Silenced);
        assert_eq!(block, [0.0, 0.0]);

        let mut block = [0.0, -2.5];
        assert_eq!(sanitize_block(&mut block), GuardAction::Silenced);
        assert_eq!(block, [0.0, 0.0]);
    }

    #[test]
    fn empty_block_is_clean() {
        let mut block: [f32; 0] = [];
        assert_eq!(sanitize_block(&mut block), GuardAction::Clean);
    }
}
