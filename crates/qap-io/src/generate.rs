//! Deterministic random instance generation.
//!
//! Used by experiments and tests to produce reproducible instances without a
//! data file. A fixed 64-bit LCG keeps the streams identical across
//! platforms and releases; seed and bounds are part of the generated name so
//! an instance can be regenerated from its artifact alone.

use qap_core::{CostTensor, QapResult, SquareMatrix};

use crate::instance::Instance;

/// Minimal 64-bit LCG (Knuth's MMIX multiplier), top bits taken.
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        // offset keeps the stream head away from the all-zero state
        Self(seed.wrapping_add(0x9e3779b97f4a7c15))
    }

    fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 11
    }

    /// Uniform integer in `lb..ub`.
    fn int_in(&mut self, lb: u64, ub: u64) -> u64 {
        debug_assert!(ub > lb);
        lb + self.next_u64() % (ub - lb)
    }
}

/// Generate a random instance with integer costs in `lb..ub`.
///
/// Returns the instance with a name of the form
/// `random_n{n}_lb{lb}_ub{ub}_seed{seed}`.
pub fn random_instance(n: usize, lb: u64, ub: u64, seed: u64) -> QapResult<Instance> {
    let mut rng = Lcg::new(seed);
    let a = random_matrix(n, lb, ub, &mut rng);
    let b = random_matrix(n, lb, ub, &mut rng);
    Instance::new(format!("random_n{n}_lb{lb}_ub{ub}_seed{seed}"), a, b)
}

/// Generate a random cost tensor directly (all n^4 entries drawn
/// independently in `lb..ub`), with its instance name.
pub fn random_cost_tensor(n: usize, lb: u64, ub: u64, seed: u64) -> QapResult<(CostTensor, String)> {
    let mut rng = Lcg::new(seed);
    let data: Vec<f64> = (0..n * n * n * n)
        .map(|_| rng.int_in(lb, ub) as f64)
        .collect();
    let q = CostTensor::from_flat(n, data)?;
    Ok((q, format!("random_q_n{n}_lb{lb}_ub{ub}_seed{seed}")))
}

fn random_matrix(n: usize, lb: u64, ub: u64, rng: &mut Lcg) -> SquareMatrix {
    let mut m = SquareMatrix::zeros(n);
    for i in 0..n {
        for j in 0..n {
            m[(i, j)] = rng.int_in(lb, ub) as f64;
        }
    }
    m
}
