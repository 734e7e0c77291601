//! Seeded RNG — Mulberry32, a fast 32-bit seedable PRNG.
//!
//! All randomness in the engine goes through `RngState` so that encounters
//! are reproducible for testing and replay. `RngStreams` partitions one
//! encounter seed into the named streams the resolution pipeline, loot, and
//! body-part selection each consume independently, so that no two consumers
//! ever share a stream and draw order elsewhere in the engine cannot perturb
//! another subsystem's sequence.

use serde::{Deserialize, Serialize};

/// RNG state. `counter` advances once per draw; `(seed, counter)` together
/// determine every subsequent value, so two states with equal fields produce
/// identical sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u32,
    pub counter: u32,
}

impl RngState {
    pub fn new(seed: u32) -> Self {
        Self { seed, counter: 0 }
    }

    /// Next value in [0, 1). Advances the counter by 1.
    pub fn next_f64(&mut self) -> f64 {
        self.counter = self.counter.wrapping_add(1);
        mulberry32(self.seed.wrapping_add(self.counter))
    }

    /// Next value in [0, 1) as `f32`, for hit-chance comparisons.
    pub fn next_f32(&mut self) -> f32 {
        self.next_f64() as f32
    }

    /// Random integer in `[min, max]` inclusive.
    pub fn next_int(&mut self, min: u32, max: u32) -> u32 {
        let value = self.next_f64();
        min + (value * (max - min + 1) as f64) as u32
    }

    /// Fisher-Yates shuffle.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let value = self.next_f64();
            let j = (value * (i + 1) as f64) as usize;
            slice.swap(i, j);
        }
    }

    /// Pick a random index from `[0, len)`. `None` if `len == 0`.
    pub fn random_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.next_int(0, len as u32 - 1) as usize)
    }
}

/// Mulberry32 PRNG: takes a 32-bit input (seed + counter), returns a value
/// in [0, 1). Uses explicit 32-bit wrapping arithmetic throughout so the
/// sequence is stable regardless of host word size.
fn mulberry32(input: u32) -> f64 {
    let mut t: i32 = input.wrapping_add(0x6D2B79F5) as i32;

    let lhs = ((t as u32) ^ ((t as u32) >> 15)) as i32;
    let rhs = t | 1;
    t = lhs.wrapping_mul(rhs);

    let lhs2 = ((t as u32) ^ ((t as u32) >> 7)) as i32;
    let rhs2 = t | 61;
    let mul = lhs2.wrapping_mul(rhs2);
    t ^= t.wrapping_add(mul);

    let result = (t as u32) ^ ((t as u32) >> 14);
    result as f64 / 4294967296.0
}

/// The three named streams an encounter partitions its seed into. Each
/// stream is an independent `RngState` derived from `(encounter_seed,
/// stream_tag)`, so consuming one stream never perturbs another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngStreams {
    pub combat: RngState,
    pub loot: RngState,
    pub body_part: RngState,
}

impl RngStreams {
    pub fn new(encounter_seed: u32) -> Self {
        Self {
            combat: RngState::new(encounter_seed.wrapping_mul(1).wrapping_add(0x1000_0001)),
            loot: RngState::new(encounter_seed.wrapping_mul(1).wrapping_add(0x2000_0003)),
            body_part: RngState::new(encounter_seed.wrapping_mul(1).wrapping_add(0x3000_0005)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED_42_EXPECTED: [f64; 10] = [
        0.9998110907617956,
        0.8361802322324365,
        0.03719550580717623,
        0.060074036940932274,
        0.62949686544016,
        0.8452139683067799,
        0.37396135926246643,
        0.5425962486770004,
        0.14702514582313597,
        0.2141944591421634,
    ];

    #[test]
    fn mulberry32_golden_sequence() {
        let mut rng = RngState::new(42);
        for (i, &expected) in SEED_42_EXPECTED.iter().enumerate() {
            let actual = rng.next_f64();
            assert!(
                (actual - expected).abs() < 1e-15,
                "seed=42, index={i}: expected {expected}, got {actual}"
            );
        }
    }

    #[test]
    fn deterministic_same_seed() {
        let mut rng1 = RngState::new(42);
        let mut rng2 = RngState::new(42);
        for _ in 0..100 {
            assert_eq!(rng1.next_f64().to_bits(), rng2.next_f64().to_bits());
        }
    }

    #[test]
    fn different_seeds_differ() {
        let mut rng1 = RngState::new(42);
        let mut rng2 = RngState::new(43);
        assert_ne!(rng1.next_f64().to_bits(), rng2.next_f64().to_bits());
    }

    #[test]
    fn values_in_range() {
        let mut rng = RngState::new(12345);
        for _ in 0..1000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v), "value {v} out of [0, 1)");
        }
    }

    #[test]
    fn next_int_in_range() {
        let mut rng = RngState::new(999);
        for _ in 0..1000 {
            let v = rng.next_int(3, 7);
            assert!((3..=7).contains(&v), "randomInt {v} out of [3, 7]");
        }
    }

    #[test]
    fn shuffle_empty_and_single_do_not_advance() {
        let mut rng = RngState::new(42);
        let mut empty: Vec<u32> = vec![];
        rng.shuffle(&mut empty);
        assert_eq!(rng.counter, 0);

        let mut single = vec![42u32];
        rng.shuffle(&mut single);
        assert_eq!(single, vec![42]);
        assert_eq!(rng.counter, 0);
    }

    #[test]
    fn random_index_empty_is_none_and_does_not_advance() {
        let mut rng = RngState::new(42);
        assert_eq!(rng.random_index(0), None);
        assert_eq!(rng.counter, 0);
    }

    #[test]
    fn streams_are_independent() {
        let mut streams = RngStreams::new(7);
        let combat_first = streams.combat.next_f64();
        let loot_first = streams.loot.next_f64();
        // draws from one stream never perturb another's counter
        assert_eq!(streams.body_part.counter, 0);
        assert_ne!(combat_first.to_bits(), loot_first.to_bits());
    }

    #[test]
    fn streams_reproduce_from_same_seed() {
        let a = RngStreams::new(123);
        let b = RngStreams::new(123);
        assert_eq!(a.combat, b.combat);
        assert_eq!(a.loot, b.loot);
        assert_eq!(a.body_part, b.body_part);
    }
}
