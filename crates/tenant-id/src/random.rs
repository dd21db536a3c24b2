use rand::{Rng, RngCore, rng};

/// Entropy feeding the credential digests.
///
/// [`crate::CredentialGenerator`] draws a `u128` per application id, a `u64`
/// salt per API key and a 64-byte seed per API secret. Tests substitute a
/// constant source to pin the digest input.
///
/// # Example
/// ```
/// use tenant_id::{CredentialGenerator, RandSource, SECRET_SEED_LEN, SystemClock};
///
/// struct Zeroes;
/// impl RandSource<u64> for Zeroes {
///     fn rand(&self) -> u64 {
///         0
///     }
/// }
/// impl RandSource<u128> for Zeroes {
///     fn rand(&self) -> u128 {
///         0
///     }
/// }
/// impl RandSource<[u8; SECRET_SEED_LEN]> for Zeroes {
///     fn rand(&self) -> [u8; SECRET_SEED_LEN] {
///         [0; SECRET_SEED_LEN]
///     }
/// }
///
/// let generator = CredentialGenerator::new(Zeroes, SystemClock);
/// assert_eq!(generator.api_secret(), generator.api_secret());
/// ```
pub trait RandSource<T> {
    /// Draws the next value.
    fn rand(&self) -> T;
}

/// Default credential entropy: the calling thread's `rand::rng()`.
///
/// Each thread draws from its own OS-seeded CSPRNG instance, so concurrent
/// onboarding handlers share no generator state and cannot race on a draw.
/// The handle itself is zero-sized.
#[derive(Default, Clone, Copy, Debug)]
pub struct ThreadRandom;

impl RandSource<u64> for ThreadRandom {
    fn rand(&self) -> u64 {
        rng().random()
    }
}

impl RandSource<u128> for ThreadRandom {
    fn rand(&self) -> u128 {
        rng().random()
    }
}

impl<const N: usize> RandSource<[u8; N]> for ThreadRandom {
    fn rand(&self) -> [u8; N] {
        let mut bytes = [0_u8; N];
        rng().fill_bytes(&mut bytes);
        bytes
    }
}
