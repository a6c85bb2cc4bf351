//! Deterministic random number generation.
//!
//! RULE: Nothing in the suite may call any platform RNG.
//! Sample data and the dashboard series draw from `SampleRng` streams
//! derived from one master seed, so the same seed always renders the
//! same dashboard and writes the same demo files.
//!
//! Each consumer gets its own stream, seeded from
//! (master_seed XOR slot * golden-ratio constant). Adding a new slot never
//! changes existing streams.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG stream.
pub struct SampleRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl SampleRng {
    /// Create a stream from the master seed and a stable slot index.
    /// The index must never change once assigned.
    pub fn new(master_seed: u64, slot_index: u64) -> Self {
        let derived_seed = master_seed ^ (slot_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniform float in [low, high).
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64()
    }

    /// Normal sample via Box–Muller.
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-12);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
        mean + std_dev * z
    }

    /// Pick one element of a non-empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.next_u64_below(items.len() as u64) as usize]
    }
}

/// All streams for one seed, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_slot(&self, slot: StreamSlot) -> SampleRng {
        SampleRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable stream slot assignments.
/// NEVER reorder or remove entries — only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StreamSlot {
    Dashboard = 0,
    Ledger = 1,
    RiskProfiles = 2,
    Transactions = 3,
    Payroll = 4,
}

impl StreamSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Ledger => "ledger",
            Self::RiskProfiles => "risk_profiles",
            Self::Transactions => "transactions",
            Self::Payroll => "payroll",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = RngBank::new(42).for_slot(StreamSlot::Dashboard);
        let mut b = RngBank::new(42).for_slot(StreamSlot::Dashboard);
        for _ in 0..16 {
            assert_eq!(a.next_f64().to_bits(), b.next_f64().to_bits());
        }
    }

    #[test]
    fn slots_are_independent() {
        let mut a = RngBank::new(42).for_slot(StreamSlot::Dashboard);
        let mut b = RngBank::new(42).for_slot(StreamSlot::Ledger);
        let xs: Vec<u64> = (0..4).map(|_| a.next_u64_below(u64::MAX)).collect();
        let ys: Vec<u64> = (0..4).map(|_| b.next_u64_below(u64::MAX)).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn uniform_stays_in_range() {
        let mut rng = RngBank::new(7).for_slot(StreamSlot::Payroll);
        for _ in 0..1000 {
            let v = rng.uniform(100.0, 150.0);
            assert!((100.0..150.0).contains(&v), "{v}");
        }
    }
}
