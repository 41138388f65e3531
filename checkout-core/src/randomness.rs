//! Seeded random source shared by a simulation run.
//!
//! Every stochastic choice in a run draws from one [`SimRng`]. Clones share
//! the same underlying generator, so the order of draws (and with it the whole
//! run) is fixed by the seed and the event order.

use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::rc::Rc;

/// Shared handle to a seeded [`StdRng`].
#[derive(Clone)]
pub struct SimRng {
    seed: u64,
    rng: Rc<RefCell<StdRng>>,
}

impl SimRng {
    pub fn seed_from_u64(seed: u64) -> Self {
        Self {
            seed,
            rng: Rc::new(RefCell::new(StdRng::seed_from_u64(seed))),
        }
    }

    /// Seed the generator was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn sample<D: Distribution<f64>>(&self, dist: &D) -> f64 {
        self.rng.borrow_mut().sample(dist)
    }

    /// Uniform draw from `[0, 1)`.
    pub fn unit(&self) -> f64 {
        self.rng.borrow_mut().gen::<f64>()
    }

    /// Returns `true` with probability `p`. Always consumes one draw.
    pub fn chance(&self, p: f64) -> bool {
        self.unit() < p
    }
}

impl std::fmt::Debug for SimRng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimRng").field("seed", &self.seed).finish_non_exhaustive()
    }
}
