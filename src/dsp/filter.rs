use std::f32::consts::PI;

/*
Resonant Low-Pass: Cytomic State-Variable Filter
================================================

Two trapezoidal integrators in a loop. The topology yields lowpass, bandpass
and highpass from shared state; the voices here only listen to the lowpass.

Vocabulary
----------

  cutoff   Frequency (Hz) where the response starts to roll off at
           12 dB/octave.

  Q        Resonance. Q ≈ 0.707 is flat; higher values put a peak at the
           cutoff. k = 1/Q is the damping term used by the math.

  g        Prewarped integrator gain: tan(π · cutoff / sample_rate). The
           tangent maps the analog cutoff onto the digital frequency axis so
           the filter lands where it was asked to, even near Nyquist.

  ic1eq    First integrator's memory (bandpass state).
  ic2eq    Second integrator's memory (lowpass state).


Coefficients
------------

    a1 = 1 / (1 + g(g + k))
    a2 = g · a1
    a3 = g · a2

These only change when cutoff or Q changes. The voices recompute them once per
LFO tick (every 32 samples), not every sample: the tangent is the expensive
part and cutoff moves slowly enough that nobody can hear the steps.


Per-Sample Update
-----------------

    v3 = x − ic2eq
    v1 = a1 · ic1eq + a2 · v3          (bandpass)
    v2 = ic2eq + a2 · ic1eq + a3 · v3  (lowpass)
    ic1eq = 2·v1 − ic1eq
    ic2eq = 2·v2 − ic2eq

Two multiplies per coefficient and no division: cheap enough for eight voices
at any sample rate.


Safe Ranges
-----------

The caller clamps cutoff to [30, 20000] Hz and keeps Q positive. Outside that,
tan() can blow up or go negative and the filter output becomes garbage. The
output guard downstream catches any NaN that results.

After a note finishes, the integrator memories still hold the tail of the old
signal. `reset()` clears them so the next note on this voice starts clean.
*/

#[derive(Debug, Clone)]
pub struct SVFilter {
    pub sample_rate: f32,

    g: f32,
    k: f32,
    a1: f32,
    a2: f32,
    a3: f32,

    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory
}

impl SVFilter {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            g: 0.0,
            k: 0.0,
            a1: 0.0,
            a2: 0.0,
            a3: 0.0,
            ic1eq: 0.0,
            ic2eq: 0.0,
        }
    }

    /// Recompute coefficients for a new cutoff (Hz) and Q.
    pub fn update_coefficients(&mut self, cutoff: f32, q: f32) {
        self.g = (PI * cutoff / self.sample_rate).tan();
        self.k = 1.0 / q;
        self.a1 = 1.0 / (1.0 + self.g * (self.g + self.k));
        self.a2 = self.g * self.a1;
        self.a3 = self.g * self.a2;
    }

    /// Filter one sample and return the lowpass output.
    #[inline]
    pub fn render(&mut self, x: f32) -> f32 {
        let v3 = x - self.ic2eq;
        let v1 = self.a1 * self.ic1eq + self.a2 * v3;
        let v2 = self.ic2eq + self.a2 * self.ic1eq + self.a3 * v3;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        v2
    }

    /// Filter a whole buffer in place.
    pub fn render_block(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.render(*sample);
        }
    }

    /// Zero coefficients and integrator memory. The sample rate is kept.
    pub fn reset(&mut self) {
        self.g = 0.0;
        self.k = 0.0;
        self.a1 = 0.0;
        self.a2 = 0.0;
        self.a3 = 0.0;

        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    /// Integrator memories `(ic1eq, ic2eq)`.
    pub fn state(&self) -> (f32, f32) {
        (self.ic1eq, self.ic2eq)
    }

    /// `(g, k)`: prewarped cutoff gain and damping.
    pub fn coefficients(&self) -> (f32, f32) {
        (self.g, self.k)
    }

    pub fn is_cleared(&self) -> bool {
        self.ic1eq == 0.0 && self.ic2eq == 0.0 && self.g == 0.0 && self.a1 == 0.0
    }
}
