//! Deterministic random number generation with per-path sub-seeding.
//!
//! Each simulated path owns an independent generator seeded from the run
//! seed and the path index through a splitmix64 mix. Path output therefore
//! depends only on `(run_seed, path_index)`, never on thread scheduling,
//! which is what makes parallel and sequential runs bit-identical.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, StandardNormal};

const SPLITMIX_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

fn splitmix64(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(SPLITMIX_GAMMA);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Sub-seed for one path, a pure function of run seed and path index.
pub fn path_seed(run_seed: u64, path_index: u64) -> u64 {
    splitmix64(run_seed ^ splitmix64(path_index))
}

/// Seeded standard-normal generator for one simulation path.
#[derive(Debug)]
pub struct PathRng {
    inner: StdRng,
}

impl PathRng {
    /// Generator seeded directly from a 64-bit seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// Generator for a specific path of a run.
    pub fn for_path(run_seed: u64, path_index: u64) -> Self {
        Self::from_seed(path_seed(run_seed, path_index))
    }

    /// Next standard normal draw.
    pub fn next_normal(&mut self) -> f64 {
        StandardNormal.sample(&mut self.inner)
    }

    /// Fill a buffer with independent standard normal draws.
    pub fn fill_normal(&mut self, buffer: &mut [f64]) {
        for value in buffer.iter_mut() {
            *value = StandardNormal.sample(&mut self.inner);
        }
    }
}
