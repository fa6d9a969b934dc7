use std::num::Wrapping;

// Linear congruential generator parameters
const MUL: u64 = 6364136223846793005; // Knuth section 3.3.4 (p.108)
const INC: u64 = 1442695040888963407;

/// A source of uniform deviates. Everything random in a render (blob placement, blob outlines,
/// film grain) is drawn through this trait, so tests can substitute a fixed sequence.
pub trait Random {
    /// Picks a random value uniformly distributed between `0.0` (inclusive) and `1.0` (exclusive).
    fn rnd(&mut self) -> f64;

    /// Picks a random value uniformly distributed between `min` (inclusive) and `max` (exclusive).
    fn uniform(&mut self, min: f64, max: f64) -> f64 {
        self.rnd() * (max - min) + min
    }

    /// Picks an integer uniformly from `lo..=hi`.
    ///
    /// ```
    /// use meshgrad::rand::{Random, Rng};
    /// let mut rng = Rng::from_seed(b"");
    /// assert!((5..=9).contains(&rng.int_in(5, 9)));
    /// ```
    fn int_in(&mut self, lo: u32, hi: u32) -> u32 {
        let span = f64::from(hi - lo + 1);
        // `rnd` is strictly below 1.0, but guard the float product anyway.
        lo + ((self.rnd() * span) as u32).min(hi - lo)
    }
}

impl<R: Random + ?Sized> Random for &mut R {
    fn rnd(&mut self) -> f64 {
        (**self).rnd()
    }
}

/// Seedable PCG-XSH-RR generator. The same seed bytes always produce the same image.
#[derive(Clone, PartialEq)]
pub struct Rng {
    state: u64,
}

impl std::fmt::Debug for Rng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rng")
            .field("state", &format_args!("{:#018x}", self.state))
            .finish()
    }
}

impl Rng {
    pub fn from_seed(seed: &[u8]) -> Rng {
        // Both halves of the state come from the same bytes under different hash seeds; the byte
        // swap keeps the layout independent of host endianness.
        let lower = murmur2(seed, 1690382925).swap_bytes();
        let upper = murmur2(seed, 72970470).swap_bytes();
        let state = u64::from(lower) | (u64::from(upper) << 32);
        Rng { state }
    }

    /// Draws a fresh seed from the operating system and returns it together with the generator,
    /// so that callers can report the seed and reproduce the render later.
    pub fn from_entropy() -> ([u8; 32], Rng) {
        let seed: [u8; 32] = ::rand::random();
        (seed, Rng::from_seed(&seed))
    }
}

impl Random for Rng {
    fn rnd(&mut self) -> f64 {
        let old_state = self.state;
        // Advance internal state.
        self.state = old_state.wrapping_mul(MUL).wrapping_add(INC);
        // Calculate output function (XSH RR) using the old state. This is a PCG-XSH-RR generator
        // (O'Neill 2014, section 6.3.1) that drops 3 bits during the xorshift.
        let xorshifted = ((((old_state >> 18) & !(3 << 30)) ^ old_state) >> 27) as u32;
        let fac = xorshifted.rotate_right((old_state >> 59) as u32);
        2.0f64.powi(-32) * f64::from(fac)
    }
}

/// Replays a fixed list of deviates, wrapping around at the end. Useful for pinning down exact
/// shapes and placements.
#[derive(Debug, Clone)]
pub struct Sequence {
    values: Vec<f64>,
    next: usize,
}

impl Sequence {
    /// # Panics
    ///
    /// Panics if `values` is empty or holds anything outside `[0, 1)`.
    pub fn new(values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "no values");
        assert!(
            values.iter().all(|v| (0.0..1.0).contains(v)),
            "values must lie in [0, 1)"
        );
        Sequence { values, next: 0 }
    }

    /// How many values have been drawn so far.
    pub fn drawn(&self) -> usize {
        self.next
    }
}

impl Random for Sequence {
    fn rnd(&mut self) -> f64 {
        let v = self.values[self.next % self.values.len()];
        self.next += 1;
        v
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_seed_state() {
        assert_eq!(Rng::from_seed(b"").state, 0x381a85e943aeeb00);
        assert_eq!(
            Rng::from_seed(&hex!(
                "efa7bdd92b5e9cd9de9b54ac0e3dc60623f1c989a80ed9c5157fffff10c2a148"
            ))
            .state,
            0x506997572177a894
        );
    }

    #[test]
    fn test_rnd_sequence() {
        let mut rng = Rng::from_seed(b"");
        let us: [f64; 8] = std::array::from_fn(|_| rng.rnd());
        assert_eq!(
            us,
            [
                0.8438512671273202,
                0.43491613143123686,
                0.26782758394256234,
                0.9794597257860005,
                0.8957886048592627,
                0.5943453973159194,
                0.07430003909394145,
                0.37728449678979814
            ]
        );
    }

    #[test]
    fn test_uniform_sequence() {
        let mut rng = Rng::from_seed(b"");
        let vs: [f64; 8] = std::array::from_fn(|i| rng.uniform(i as f64, i as f64 * 2.0 + 3.0));
        assert_eq!(
            vs,
            [
                2.5315538013819605,
                2.7396645257249475,
                3.3391379197128117,
                8.876758354716003,
                10.270520234014839,
                9.754763178527355,
                6.668700351845473,
                10.772844967897981
            ]
        );
    }

    #[test]
    fn test_int_in_bounds() {
        let mut seq = Sequence::new(vec![0.0, 0.199, 0.2, 0.5, 0.999_999_999]);
        let vs: [u32; 5] = std::array::from_fn(|_| seq.int_in(5, 9));
        assert_eq!(vs, [5, 5, 6, 7, 9]);
    }

    #[test]
    fn test_int_in_covers_range() {
        let mut rng = Rng::from_seed(b"points");
        let mut seen = [false; 5];
        for _ in 0..1000 {
            seen[(rng.int_in(5, 9) - 5) as usize] = true;
        }
        assert_eq!(seen, [true; 5]);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = Rng::from_seed(b"mesh");
        let mut b = a.clone();
        let xs: [f64; 16] = std::array::from_fn(|_| a.rnd());
        let ys: [f64; 16] = std::array::from_fn(|_| b.rnd());
        assert_eq!(xs, ys);
        assert!(xs.iter().all(|x| (0.0..1.0).contains(x)));
    }

    #[test]
    fn test_sequence_wraps() {
        let mut seq = Sequence::new(vec![0.25, 0.5]);
        let vs: [f64; 5] = std::array::from_fn(|_| seq.rnd());
        assert_eq!(vs, [0.25, 0.5, 0.25, 0.5, 0.25]);
        assert_eq!(seq.drawn(), 5);
    }

    #[test]
    #[should_panic(expected = "values must lie in [0, 1)")]
    fn test_sequence_rejects_one() {
        Sequence::new(vec![1.0]);
    }

    #[test]
    fn test_entropy_seed_reproduces() {
        let (seed, mut rng) = Rng::from_entropy();
        let mut again = Rng::from_seed(&seed);
        assert_eq!(rng.rnd(), again.rnd());
    }
}

fn murmur2(bytes: &[u8], seed: u32) -> u32 {
    const K: usize = 16;
    const MASK: Wrapping<u32> = Wrapping(0xffff);
    const MASK_BYTE: Wrapping<u32> = Wrapping(0xff);
    const M: Wrapping<u32> = Wrapping(0x5bd1e995);

    let mut l: usize = bytes.len();
    let mut h = Wrapping(seed ^ (l as u32));
    let mut i = 0;

    let byte32 = |i: usize| Wrapping(u32::from(bytes[i]));

    while l >= 4 {
        let mut k = (byte32(i) & MASK_BYTE)
            | ((byte32(i + 1) & MASK_BYTE) << 8)
            | ((byte32(i + 2) & MASK_BYTE) << 16)
            | ((byte32(i + 3) & MASK_BYTE) << 24);
        i += 4;
        k = (k & MASK) * M + ((((k >> K) * M) & MASK) << K);
        k ^= k >> 24;
        k = (k & MASK) * M + ((((k >> K) * M) & MASK) << K);
        h = ((h & MASK) * M + ((((h >> K) * M) & MASK) << K)) ^ k;
        l -= 4;
    }
    if l >= 3 {
        h ^= (byte32(i + 2) & MASK_BYTE) << K;
    }
    if l >= 2 {
        h ^= (byte32(i + 1) & MASK_BYTE) << 8;
    }
    if l >= 1 {
        h ^= byte32(i) & MASK_BYTE;
        h = (h & MASK) * M + ((((h >> K) * M) & MASK) << K);
    }

    h ^= h >> 13;
    h = (h & MASK) * M + ((((h >> K) * M) & MASK) << K);
    h ^= h >> 15;

    h.0
}
