/// Linear ramp from the current value to a target over a fixed number of
/// samples. Used wherever a parameter jump would otherwise click: output
/// level, ladder cutoff and resonance.
#[derive(Debug, Clone, Default)]
pub struct LinearSmoother {
    current: f32,
    target: f32,
    step: f32,
    countdown: u32,
    steps_to_target: u32,
}

impl LinearSmoother {
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            ..Self::default()
        }
    }

    /// Set the ramp length and snap to the current target.
    pub fn reset(&mut self, sample_rate: f32, ramp_seconds: f32) {
        self.steps_to_target = (ramp_seconds * sample_rate).floor().max(0.0) as u32;
        self.set_current_and_target(self.target);
    }

    pub fn set_current_and_target(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.countdown = 0;
    }

    pub fn set_target(&mut self, value: f32) {
        if value == self.target {
            return;
        }

        if self.steps_to_target == 0 {
            self.set_current_and_target(value);
            return;
        }

        self.target = value;
        self.countdown = self.steps_to_target;
        self.step = (self.target - self.current) / self.countdown as f32;
    }

    #[inline]
    pub fn next_value(&mut self) -> f32 {
        if self.countdown == 0 {
            return self.target;
        }

        self.countdown -= 1;
        if self.countdown > 0 {
            self.current += self.step;
        } else {
            self.current = self.target;
        }

        self.current
    }

    pub fn is_smoothing(&self) -> bool {
        self.countdown > 0
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }
}
