use crate::domain::ports::CodeSource;
use rand::Rng;
use std::ops::RangeInclusive;

/// Draws codes from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngCodeSource;

impl CodeSource for ThreadRngCodeSource {
    fn next_in(&self, range: RangeInclusive<u64>) -> u64 {
        rand::thread_rng().gen_range(range)
    }
}
