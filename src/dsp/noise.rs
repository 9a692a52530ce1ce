//! Deterministic white noise.

/*
Linear-Congruential White Noise
===============================

A synth only needs noise that *sounds* random; it does not need noise that is
statistically strong. A 32-bit linear congruential generator is plenty:

    seed = seed × 196314165 + 907633515      (wrapping, mod 2³²)

Turning the integer into a float without a division uses the IEEE-754 layout
of an f32. Every float in [2.0, 4.0) has the bit pattern

    0 10000000 mmmmmmmmmmmmmmmmmmmmmmm
      exponent  23-bit mantissa

i.e. 0x40000000 ..= 0x407FFFFF. Dropping the low 23 bits of the seed into the
mantissa gives a uniformly distributed float in [2, 4); subtracting 3 moves it
to [-1, 1).

The sequence is fully determined by the seed, so two generators reset at the
same time produce identical audio. Tests rely on that.
*/

const RESET_SEED: u32 = 22222;
const MULTIPLIER: u32 = 196_314_165;
const INCREMENT: u32 = 907_633_515;

const MANTISSA_MASK: u32 = 0x007F_FFFF;
const TWO_AS_BITS: u32 = 0x4000_0000;

#[derive(Debug, Clone)]
pub struct NoiseGenerator {
    seed: u32,
}

impl NoiseGenerator {
    pub fn new() -> Self {
        Self { seed: RESET_SEED }
    }

    pub fn reset(&mut self) {
        self.seed = RESET_SEED;
    }

    /// Next noise sample, uniformly distributed in [-1, 1).
    #[inline]
    pub fn next_value(&mut self) -> f32 {
        self.seed = self.seed.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT);

        let bits = (self.seed & MANTISSA_MASK) + TWO_AS_BITS;
        f32::from_bits(bits) - 3.0
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl Default for NoiseGenerator {
    fn default() -> Self {
        Self::new()
    }
}
