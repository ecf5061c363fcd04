//! Seeded xorshift32 generator
//!
//! Weight initialization has to be reproducible across runs and targets, and
//! the generator has to work without `std`. Xorshift32 covers both in a
//! handful of instructions.

/// Xorshift32 pseudo-random generator
#[derive(Debug, Clone)]
pub struct Rng {
    state: u32,
}

impl Rng {
    /// Create a generator; a zero seed is remapped since xorshift has a fixed
    /// point at zero
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9 } else { seed },
        }
    }

    /// Next 32 random bits
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform integer in `[-127, 127]`, the int8 weight range
    pub fn next_weight(&mut self) -> i8 {
        // 255 values: 0..=254 shifted down by 127
        ((self.next_u32() % 255) as i32 - 127) as i8
    }
}
