//! Tower height generation.
//!
//! Heights follow a geometric distribution with branching factor 2: a new node
//! reaches height `k` with probability `2^-k`, and no node exceeds
//! [`MAX_LEVEL`].
//!
//! The default source is [`Lcg`], a small deterministic generator, so that the
//! shape of a list built from the same inputs is identical run to run. It is
//! not suitable for anything that needs unpredictability. Any
//! [`RngCore`] can be substituted.

use rand_core::{RngCore, SeedableRng, impls};

/// Hard cap on tower height, and the number of head links.
pub const MAX_LEVEL: usize = 24;

/// Reciprocal of the probability of growing a tower by one more level.
pub const BRANCHING: u32 = 2;

/// Seed used by [`Lcg::default`] and substituted for degenerate seeds.
pub const DEFAULT_SEED: u32 = 0x2545_F491;

const MODULUS: u64 = (1 << 31) - 1;
const MULTIPLIER: u64 = 48_271;

// =============================================================================
// Lcg
// =============================================================================

/// Park-Miller multiplicative linear congruential generator.
///
/// Produces 31-bit outputs in `1..2^31 - 1`. The state is never zero: seeds
/// congruent to zero modulo `2^31 - 1` are replaced with [`DEFAULT_SEED`].
///
/// # Example
///
/// ```
/// use rand_core::RngCore;
/// use skipmap::Lcg;
///
/// let mut a = Lcg::new(7);
/// let mut b = Lcg::new(7);
/// assert_eq!(a.next_u32(), b.next_u32());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    /// Creates a generator from `seed`.
    pub const fn new(seed: u32) -> Self {
        let state = (seed as u64 % MODULUS) as u32;
        let state = if state == 0 { DEFAULT_SEED } else { state };
        Self { state }
    }
}

impl Default for Lcg {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl RngCore for Lcg {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.state = ((self.state as u64 * MULTIPLIER) % MODULUS) as u32;
        self.state
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        impls::fill_bytes_via_next(self, dst)
    }
}

impl SeedableRng for Lcg {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }
}

// =============================================================================
// LevelGenerator
// =============================================================================

/// Draws tower heights for new nodes.
#[derive(Debug, Clone)]
pub(crate) struct LevelGenerator<R> {
    rng: R,
}

impl<R: RngCore> LevelGenerator<R> {
    pub(crate) fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Returns a height in `1..=MAX_LEVEL`.
    ///
    /// Starts at one and flips a coin per extra level: one draw per level,
    /// continuing while the draw is divisible by [`BRANCHING`].
    #[inline]
    pub(crate) fn next_height(&mut self) -> usize {
        let mut height = 1;
        while height < MAX_LEVEL && self.rng.next_u32() % BRANCHING == 0 {
            height += 1;
        }
        height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng as _;
    use rand::rngs::SmallRng;

    /// Source that always returns the same word.
    struct Constant(u32);

    impl RngCore for Constant {
        fn next_u32(&mut self) -> u32 {
            self.0
        }

        fn next_u64(&mut self) -> u64 {
            self.0 as u64
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            impls::fill_bytes_via_next(self, dst)
        }
    }

    #[test]
    fn lcg_known_sequence() {
        // Park-Miller reference: seed 1, multiplier 48271.
        let mut rng = Lcg::new(1);
        assert_eq!(rng.next_u32(), 48_271);
        assert_eq!(rng.next_u32(), 182_605_794);
        assert_eq!(rng.next_u32(), 1_291_394_886);
    }

    #[test]
    fn lcg_zero_seed_is_remapped() {
        assert_eq!(Lcg::new(0), Lcg::default());
        assert_eq!(Lcg::new(MODULUS as u32), Lcg::default());
    }

    #[test]
    fn lcg_from_seed_matches_new() {
        let mut a = Lcg::from_seed(99u32.to_le_bytes());
        let mut b = Lcg::new(99);
        for _ in 0..16 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn lcg_stays_in_range() {
        let mut rng = Lcg::default();
        for _ in 0..10_000 {
            let v = rng.next_u32();
            assert!(v > 0 && (v as u64) < MODULUS);
        }
    }

    #[test]
    fn height_is_capped() {
        let mut levels = LevelGenerator::new(Constant(0));
        assert_eq!(levels.next_height(), MAX_LEVEL);
    }

    #[test]
    fn height_floor_is_one() {
        let mut levels = LevelGenerator::new(Constant(1));
        assert_eq!(levels.next_height(), 1);
    }

    #[test]
    fn heights_are_reproducible() {
        let mut a = LevelGenerator::new(Lcg::default());
        let mut b = LevelGenerator::new(Lcg::default());
        let xs: Vec<_> = (0..256).map(|_| a.next_height()).collect();
        let ys: Vec<_> = (0..256).map(|_| b.next_height()).collect();
        assert_eq!(xs, ys);
    }

    fn assert_geometric<R: RngCore>(rng: R) {
        const SAMPLES: usize = 100_000;

        let mut levels = LevelGenerator::new(rng);
        let mut counts = [0usize; MAX_LEVEL + 1];
        for _ in 0..SAMPLES {
            let h = levels.next_height();
            assert!((1..=MAX_LEVEL).contains(&h));
            counts[h] += 1;
        }

        // P(h = 1) = 1/2, P(h = 2) = 1/4, P(h = 3) = 1/8.
        for (h, expected) in [(1, 0.5), (2, 0.25), (3, 0.125)] {
            let observed = counts[h] as f64 / SAMPLES as f64;
            assert!(
                (observed - expected).abs() < 0.02,
                "height {h}: observed {observed}, expected {expected}"
            );
        }
    }

    #[test]
    fn lcg_heights_are_geometric() {
        assert_geometric(Lcg::default());
    }

    #[test]
    fn small_rng_heights_are_geometric() {
        assert_geometric(SmallRng::seed_from_u64(12345));
    }
}
