//! Seeded random streams for question sampling and option shuffling.
use hmac::{Hmac, Mac};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;

/// Random stream that counts how many draws it has served.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<ChaCha20Rng> {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: RngCore> RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

/// Independent streams derived from one user-visible seed, so that how many
/// option shuffles happened never changes which questions get sampled.
#[derive(Debug, Clone)]
pub struct RngBundle {
    seed: u64,
    sampling: CountingRng<ChaCha20Rng>,
    display: CountingRng<ChaCha20Rng>,
}

impl RngBundle {
    /// Construct the bundle from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            seed,
            sampling: CountingRng::new(derive_stream_seed(seed, b"sampling")),
            display: CountingRng::new(derive_stream_seed(seed, b"display")),
        }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Stream used for chapter sets and the daily pool.
    pub const fn sampling(&mut self) -> &mut CountingRng<ChaCha20Rng> {
        &mut self.sampling
    }

    /// Stream used for per-question option permutations.
    pub const fn display(&mut self) -> &mut CountingRng<ChaCha20Rng> {
        &mut self.display
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(&user_seed.to_le_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}
