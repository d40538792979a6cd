//! Failure injection for the simulated upstream.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SUCCESS_ROLL_RANGE;

/// Decides whether a lookup attempt fails.
pub trait FailureInjector: Send + Sync {
    fn should_fail(&self, id: i64) -> bool;
}

/// Uniform random failures with a fixed success percentage.
///
/// Each attempt draws from `0..100`; draws at or above `success_rate` fail.
pub struct RandomInjector {
    rng: Mutex<StdRng>,
    success_rate: u8,
}

impl RandomInjector {
    pub fn new(success_rate: u8) -> Self {
        Self::with_rng(StdRng::from_entropy(), success_rate)
    }

    /// Reproducible failure sequence for a given seed.
    pub fn seeded(seed: u64, success_rate: u8) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), success_rate)
    }

    fn with_rng(rng: StdRng, success_rate: u8) -> Self {
        Self {
            rng: Mutex::new(rng),
            success_rate: success_rate.min(SUCCESS_ROLL_RANGE),
        }
    }

    pub fn success_rate(&self) -> u8 {
        self.success_rate
    }
}

impl FailureInjector for RandomInjector {
    fn should_fail(&self, _id: i64) -> bool {
        let roll: u8 = {
            // Generator state stays valid across a poisoned lock
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            rng.gen_range(0..SUCCESS_ROLL_RANGE)
        };
        roll >= self.success_rate
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::FailureInjector;

    /// Never fails.
    pub struct AlwaysSucceed;

    impl FailureInjector for AlwaysSucceed {
        fn should_fail(&self, _id: i64) -> bool {
            false
        }
    }

    /// Fails exactly the listed ids.
    pub struct FailIds(pub Vec<i64>);

    impl FailureInjector for FailIds {
        fn should_fail(&self, id: i64) -> bool {
            self.0.contains(&id)
        }
    }

    /// Replays a fixed sequence of decisions and records the ids it was asked about.
    #[derive(Default)]
    pub struct Scripted {
        script: Mutex<VecDeque<bool>>,
        seen: Mutex<Vec<i64>>,
    }

    impl Scripted {
        pub fn new(script: impl IntoIterator<Item = bool>) -> Self {
            Self {
                script: Mutex::new(script.into_iter().collect()),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub fn seen(&self) -> Vec<i64> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl FailureInjector for Scripted {
        fn should_fail(&self, id: i64) -> bool {
            self.seen.lock().unwrap().push(id);
            self.script.lock().unwrap().pop_front().unwrap_or(false)
        }
    }
}
