/*
White Noise From Raw Bits
=========================

Every voice gets a little noise mixed into its oscillator sum, so the noise
source runs once per sample no matter how many voices are sounding. It has to
be cheap and it has to be deterministic (same seed, same hiss, every run and
every platform).

  seed        32-bit state of a linear congruential generator (LCG):
                  seed = seed * 196314165 + 907633515   (mod 2^32)

  mantissa    The low 23 bits of the state. An IEEE-754 f32 stores its
              fraction in exactly 23 bits.

  exponent    Adding 0x40000000 sets the exponent field so the value lands in
              [2.0, 4.0). Every mantissa pattern is a valid, evenly spaced
              float inside that octave.

Reinterpreting the bits directly (f32::from_bits) skips the int → float
conversion and the divide, and subtracting 3.0 centers the range:

    bits  = (seed & 0x7FFFFF) + 0x40000000    →  [2.0, 4.0)
    value = f32::from_bits(bits) - 3.0        →  [-1.0, 1.0)
*/

const SEED: u32 = 12_345;
const MULTIPLIER: u32 = 196_314_165;
const INCREMENT: u32 = 907_633_515;

const MANTISSA_MASK: u32 = 0x007F_FFFF;
const EXPONENT_TWO: u32 = 0x4000_0000;

#[derive(Debug, Clone)]
pub struct NoiseGenerator {
    seed: u32,
}

impl NoiseGenerator {
    pub fn new() -> Self {
        Self { seed: SEED }
    }

    /// Restart the sequence from the fixed seed.
    pub fn reset(&mut self) {
        self.seed = SEED;
    }

    #[inline]
    pub fn next_value(&mut self) -> f32 {
        self.seed = self.seed.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT);

        let bits = (self.seed & MANTISSA_MASK) + EXPONENT_TWO;
        f32::from_bits(bits) - 3.0
    }
}

impl Default for NoiseGenerator {
    fn default() -> Self {
        Self::new()
    }
}
