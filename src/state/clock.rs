// Time and randomness capabilities injected into the engines

/// Milliseconds since the Unix epoch, as reported by the client.
pub type EpochMillis = u64;

pub trait Clock {
    fn now(&self) -> EpochMillis;
}

/// Wall clock of the hosting browser (`Date.now()`).
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserClock;

impl Clock for BrowserClock {
    fn now(&self) -> EpochMillis {
        js_sys::Date::now().max(0.0) as EpochMillis
    }
}

/// Source of uniform values in `[0, 1)`.
pub trait Entropy {
    fn next_unit(&mut self) -> f64;

    /// Uniform index in `[0, bound)`.
    fn next_index(&mut self, bound: usize) -> usize {
        let i = (self.next_unit() * bound as f64).floor() as usize;
        i.min(bound.saturating_sub(1))
    }
}

/// `Math.random()` of the hosting browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct MathRandom;

impl Entropy for MathRandom {
    fn next_unit(&mut self) -> f64 {
        js_sys::Math::random()
    }
}
