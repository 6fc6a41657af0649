//! Randomness source shared by every engine.

use rand::Rng;

/// Uniform random draws.
///
/// Engines only ever ask for a float in `[0, 1)` or an inclusive integer range, so tests
/// can substitute a scripted sequence and assert exact payouts.
pub trait RandomSource {
    /// Uniform float in `[0, 1)`.
    fn uniform(&mut self) -> f64;

    /// Uniform integer in `min..=max`.
    fn randint(&mut self, min: i64, max: i64) -> i64 {
        let span = (max - min + 1) as f64;
        let offset = (self.uniform() * span).floor() as i64;
        min + offset.clamp(0, max - min)
    }
}

/// Thread-local system RNG.
///
/// Zero-sized and `Send`, so services can hold it across awaits; each draw borrows the
/// thread RNG for just that call.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRandom;

impl RandomSource for SystemRandom {
    fn uniform(&mut self) -> f64 {
        rand::rng().random::<f64>()
    }

    fn randint(&mut self, min: i64, max: i64) -> i64 {
        rand::rng().random_range(min..=max)
    }
}

/// Scripted draws for tests.
///
/// `uniform` and `randint` pull from separate queues so a test can script coin flips and
/// dice rolls independently. Running out of scripted draws is a test bug and panics.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct SequenceRandom {
    uniforms: std::collections::VecDeque<f64>,
    ints: std::collections::VecDeque<i64>,
}

#[cfg(test)]
impl SequenceRandom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_uniforms(mut self, draws: impl IntoIterator<Item = f64>) -> Self {
        self.uniforms.extend(draws);
        self
    }

    pub fn with_ints(mut self, draws: impl IntoIterator<Item = i64>) -> Self {
        self.ints.extend(draws);
        self
    }
}

#[cfg(test)]
impl RandomSource for SequenceRandom {
    fn uniform(&mut self) -> f64 {
        self.uniforms.pop_front().expect("scripted uniform draws exhausted")
    }

    fn randint(&mut self, min: i64, max: i64) -> i64 {
        let value = self.ints.pop_front().expect("scripted int draws exhausted");
        assert!(
            (min..=max).contains(&value),
            "scripted draw {value} outside {min}..={max}"
        );
        value
    }
}
