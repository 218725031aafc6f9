use rand::Rng;

/// Source of uniformly distributed integers, injected wherever the domain
/// needs randomness so tests can pin the sequence.
pub trait RandomSource: Send + Sync {
    /// Uniform integer in `low..=high`
    fn next_in_range(&self, low: i32, high: i32) -> i32;
}

/// Process-wide thread-local generator
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_in_range(&self, low: i32, high: i32) -> i32 {
        rand::thread_rng().gen_range(low..=high)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::RandomSource;
    use std::sync::Mutex;

    /// Replays a fixed sequence, cycling when exhausted
    pub struct SequenceRandom {
        values: Vec<i32>,
        cursor: Mutex<usize>,
    }

    impl SequenceRandom {
        pub fn new(values: Vec<i32>) -> Self {
            Self { values, cursor: Mutex::new(0) }
        }
    }

    impl RandomSource for SequenceRandom {
        fn next_in_range(&self, low: i32, high: i32) -> i32 {
            let mut cursor = self.cursor.lock().unwrap();
            let value = self.values[*cursor % self.values.len()];
            *cursor += 1;
            value.clamp(low, high)
        }
    }
}
