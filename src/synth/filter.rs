use crate::dsp::ladder::{LadderFilter, LadderMode};

/// Q value at which resonance reaches its maximum.
const MAX_Q: f32 = 30.0;

/// Per-voice low-pass: a 12 dB/octave tap of the ladder filter, driven by a
/// cutoff in Hz and a Q factor.
///
/// Call `update_coefficients` at most once per sample, before `render`, and
/// `reset` whenever the voice goes back to the free pool.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    ladder: LadderFilter,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prepare(&mut self, sample_rate: f32) {
        self.ladder.set_mode(LadderMode::Lpf12);
        self.ladder.prepare(sample_rate);
    }

    pub fn update_coefficients(&mut self, cutoff_hz: f32, q: f32) {
        self.ladder.set_cutoff_hz(cutoff_hz);
        self.ladder.set_resonance((q / MAX_Q).clamp(0.0, 1.0));
    }

    #[inline]
    pub fn render(&mut self, sample: f32) -> f32 {
        self.ladder.update_smoothers();
        self.ladder.process_sample(sample)
    }

    pub fn reset(&mut self) {
        self.ladder.reset();
    }

    pub fn cutoff_hz(&self) -> f32 {
        self.ladder.cutoff_hz()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepare_selects_two_pole_tap() {
        let mut filter = Filter::new();
        filter.ladder.set_mode(LadderMode::Lpf24);

        filter.prepare(48_000.0);

        assert_eq!(filter.ladder.mode(), LadderMode::Lpf12);
    }

    #[test]
    fn coefficients_set_cutoff() {
        let mut filter = Filter::new();
        filter.prepare(48_000.0);

        filter.update_coefficients(1_234.0, 2.0);

        assert_eq!(filter.cutoff_hz(), 1_234.0);
    }

    #[test]
    fn huge_q_is_clamped_and_stays_stable() {
        let mut filter = Filter::new();
        filter.prepare(48_000.0);
        filter.update_coefficients(800.0, 1_000.0);

        for n in 0..48_000 {
            let x = if n % 100 < 50 { 0.5 } else { -0.5 };
            let y = filter.render(x);
            assert!(y.is_finite() && y.abs() < 10.0, "unstable output {y}");
        }
    }

    #[test]
    fn reset_forgets_previous_note() {
        let mut filter = Filter::new();
        filter.prepare(48_000.0);
        filter.update_coefficients(5_000.0, 1.0);
        for _ in 0..256 {
            filter.render(0.8);
        }

        filter.reset();

        assert_eq!(filter.render(0.0), 0.0);
    }
}
