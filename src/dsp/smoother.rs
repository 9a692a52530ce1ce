//! Linear parameter ramps.

/*
De-Zippering
============

Jumping a gain from 0.5 straight to 1.0 between two samples puts a step into
the waveform, which is heard as a click. Sweeping a knob produces a run of
such steps: "zipper noise". A smoother spreads every change over a short ramp.

    value
      1.0 ┤          ╭──────────
          │        ╱
          │      ╱     ramp (50 ms for gain)
      0.5 ┼────╯
               ↑ set_target(1.0)

The ramp is linear: the distance to the target is split into a fixed number
of equal steps. A new target mid-ramp starts a fresh ramp from wherever the
value currently is.
*/

#[derive(Debug, Clone)]
pub struct LinearSmoother {
    current: f32,
    target: f32,
    step: f32,
    steps_remaining: u32,
    ramp_length: u32,
}

impl LinearSmoother {
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            step: 0.0,
            steps_remaining: 0,
            ramp_length: 0,
        }
    }

    /// Set the ramp duration and snap to the current target.
    pub fn reset(&mut self, sample_rate: f32, ramp_seconds: f32) {
        let samples = (sample_rate * ramp_seconds).floor();
        self.ramp_length = if samples.is_finite() && samples > 0.0 {
            samples as u32
        } else {
            0
        };
        self.set_current_and_target(self.target);
    }

    /// Start a ramp towards `target`.
    pub fn set_target(&mut self, target: f32) {
        if target == self.target {
            return;
        }

        self.target = target;

        if self.ramp_length == 0 {
            self.set_current_and_target(target);
            return;
        }

        self.steps_remaining = self.ramp_length;
        self.step = (self.target - self.current) / self.ramp_length as f32;
    }

    /// Jump straight to `value` with no ramp.
    pub fn set_current_and_target(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.step = 0.0;
        self.steps_remaining = 0;
    }

    #[inline]
    pub fn next_value(&mut self) -> f32 {
        if self.steps_remaining == 0 {
            return self.target;
        }

        self.steps_remaining -= 1;
        if self.steps_remaining == 0 {
            self.current = self.target;
        } else {
            self.current += self.step;
        }

        self.current
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_smoothing(&self) -> bool {
        self.steps_remaining > 0
    }
}

impl Default for LinearSmoother {
    fn default() -> Self {
        Self::new(0.0)
    }
}
