use base64::{Engine, engine::general_purpose::STANDARD};
use sha2::{Digest, Sha256};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{DEFAULT_TIME_LAYOUT, RandSource, SystemClock, ThreadRandom, TimeSource, format_millis};

/// Hex width of a SHA-256 digest, and the longest application id available.
pub const DIGEST_HEX_LEN: usize = 64;

/// Length of every generated API key.
pub const API_KEY_LEN: usize = 32;

/// Length of every generated API secret.
pub const API_SECRET_LEN: usize = 32;

/// Bytes of entropy drawn for each API secret.
pub const SECRET_SEED_LEN: usize = 64;

/// An API key and secret issued together.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ApiCredentials {
    /// 32 lowercase hex characters.
    pub api_key: String,
    /// 32 characters of the standard base64 alphabet.
    pub api_secret: String,
}

/// Produces application identifiers and API credentials for onboarding.
///
/// Every value is a SHA-256 digest over fresh entropy, so outputs are
/// unpredictable and collide only with negligible probability. The generator
/// keeps no record of what it issued: checking uniqueness against existing
/// rows, and retrying on a collision, is the persistence layer's job.
///
/// The default sources are the per-thread CSPRNG and the system clock, both of
/// which are safe to share across threads.
///
/// # Example
/// ```
/// use tenant_id::CredentialGenerator;
///
/// let generator: CredentialGenerator = CredentialGenerator::default();
/// let app_id = generator.app_id(8);
/// let credentials = generator.key_pair(&app_id);
///
/// assert_eq!(app_id.len(), 8);
/// assert_eq!(credentials.api_key.len(), 32);
/// assert_eq!(credentials.api_secret.len(), 32);
/// ```
#[derive(Clone, Debug, Default)]
pub struct CredentialGenerator<R = ThreadRandom, T = SystemClock> {
    rng: R,
    time: T,
}

impl<R, T> CredentialGenerator<R, T>
where
    R: RandSource<u64> + RandSource<u128> + RandSource<[u8; SECRET_SEED_LEN]>,
    T: TimeSource,
{
    /// Creates a generator drawing from the given sources.
    pub fn new(rng: R, time: T) -> Self {
        Self { rng, time }
    }

    /// Generates an application id of exactly `len` lowercase hex characters.
    ///
    /// The digest covers a fresh 128-bit random value followed by a
    /// nanosecond time sample.
    ///
    /// # Panics
    ///
    /// Panics unless `0 < len <= DIGEST_HEX_LEN`.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn app_id(&self, len: usize) -> String {
        assert!(
            (1..=DIGEST_HEX_LEN).contains(&len),
            "app id length must be in 1..={DIGEST_HEX_LEN}, got {len}"
        );

        let entropy = RandSource::<u128>::rand(&self.rng);
        let nanos = self.time.current_nanos();
        let digest = Sha256::new()
            .chain_update(entropy.to_be_bytes())
            .chain_update(nanos.to_be_bytes())
            .finalize();

        let mut app_id = hex::encode(digest);
        app_id.truncate(len);
        app_id
    }

    /// Generates a 32-character lowercase hex API key bound to `app_id`.
    ///
    /// The digest covers the app id, the formatted current time, and a random
    /// integer rendered in decimal.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn api_key(&self, app_id: &str) -> String {
        let now = format_millis(self.time.current_millis(), DEFAULT_TIME_LAYOUT);
        let salt = RandSource::<u64>::rand(&self.rng);
        let digest = Sha256::new()
            .chain_update(app_id)
            .chain_update(now)
            .chain_update(salt.to_string())
            .finalize();

        let mut api_key = hex::encode(digest);
        api_key.truncate(API_KEY_LEN);
        api_key
    }

    /// Generates a 32-character API secret.
    ///
    /// The digest covers 64 random bytes and is rendered in standard base64.
    /// A 32-byte digest encodes to 44 characters, of which only the last is
    /// padding, so the returned prefix never contains `=`.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn api_secret(&self) -> String {
        let seed = RandSource::<[u8; SECRET_SEED_LEN]>::rand(&self.rng);
        let mut api_secret = STANDARD.encode(Sha256::digest(seed));
        api_secret.truncate(API_SECRET_LEN);
        api_secret
    }

    /// Issues a fresh API key for `app_id` together with a fresh secret.
    pub fn key_pair(&self, app_id: &str) -> ApiCredentials {
        ApiCredentials {
            api_key: self.api_key(app_id),
            api_secret: self.api_secret(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};
    use std::thread::scope;

    #[derive(Clone, Copy)]
    struct FixedRand;

    impl RandSource<u64> for FixedRand {
        fn rand(&self) -> u64 {
            7
        }
    }

    impl RandSource<u128> for FixedRand {
        fn rand(&self) -> u128 {
            7
        }
    }

    impl RandSource<[u8; SECRET_SEED_LEN]> for FixedRand {
        fn rand(&self) -> [u8; SECRET_SEED_LEN] {
            [7; SECRET_SEED_LEN]
        }
    }

    #[derive(Clone, Copy)]
    struct FixedTime;

    impl TimeSource for FixedTime {
        fn current_millis(&self) -> u64 {
            1_672_574_400_000
        }
    }

    fn generator() -> CredentialGenerator {
        CredentialGenerator::default()
    }

    fn is_lower_hex(s: &str) -> bool {
        s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    }

    fn is_base64(s: &str) -> bool {
        s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/')
    }

    #[test]
    fn app_id_has_requested_length_for_every_valid_len() {
        let generator = generator();
        for len in 1..=DIGEST_HEX_LEN {
            let app_id = generator.app_id(len);
            assert_eq!(app_id.len(), len);
            assert!(is_lower_hex(&app_id), "{app_id}");
        }
    }

    #[test]
    fn app_ids_are_unique() {
        let generator = generator();
        for len in [8, 16, 24, 32] {
            let ids: HashSet<String> = (0..50).map(|_| generator.app_id(len)).collect();
            assert_eq!(ids.len(), 50, "len {len}");
        }
        assert_ne!(generator.app_id(32), generator.app_id(32));
    }

    #[test]
    #[should_panic(expected = "app id length must be in 1..=64, got 65")]
    fn app_id_longer_than_digest_panics() {
        generator().app_id(65);
    }

    #[test]
    #[should_panic(expected = "got 0")]
    fn empty_app_id_panics() {
        generator().app_id(0);
    }

    #[test]
    fn api_key_is_32_hex_characters() {
        let generator = generator();
        for app_id in [
            "test-app-123",
            "",
            "very-long-application-identifier-with-many-characters",
            "app!@#$%^&*()",
            "应用",
        ] {
            let key = generator.api_key(app_id);
            assert_eq!(key.len(), API_KEY_LEN);
            assert!(is_lower_hex(&key), "{key}");
            assert_ne!(key, generator.api_key(app_id));
        }
    }

    #[test]
    fn api_keys_for_same_app_are_unique() {
        let generator = generator();
        let keys: HashSet<String> = (0..100).map(|_| generator.api_key("test-app")).collect();
        assert_eq!(keys.len(), 100);
    }

    #[test]
    fn api_secret_is_32_base64_characters() {
        let generator = generator();
        let secrets: HashSet<String> = (0..100).map(|_| generator.api_secret()).collect();
        assert_eq!(secrets.len(), 100);
        for secret in &secrets {
            assert_eq!(secret.len(), API_SECRET_LEN);
            assert!(is_base64(secret), "{secret}");
        }
    }

    #[test]
    fn outputs_depend_only_on_sources() {
        let a = CredentialGenerator::new(FixedRand, FixedTime);
        let b = CredentialGenerator::new(FixedRand, FixedTime);
        assert_eq!(a.app_id(64), b.app_id(64));
        assert_eq!(a.api_key("app"), b.api_key("app"));
        assert_eq!(a.api_secret(), b.api_secret());

        // The key is bound to the app id.
        assert_ne!(a.api_key("app"), a.api_key("other"));
        // Shorter ids are prefixes of the full digest.
        assert!(a.app_id(64).starts_with(&a.app_id(8)));
    }

    #[test]
    fn app_id_digest_covers_random_and_time() {
        let generator = CredentialGenerator::new(FixedRand, FixedTime);
        let mut input = Vec::new();
        input.extend_from_slice(&7_u128.to_be_bytes());
        input.extend_from_slice(&(1_672_574_400_000_u128 * 1_000_000).to_be_bytes());
        assert_eq!(generator.app_id(64), hex::encode(Sha256::digest(&input)));
    }

    #[test]
    fn key_pair_fills_both_fields() {
        let generator = generator();
        let pair = generator.key_pair("app");
        assert_eq!(pair.api_key.len(), API_KEY_LEN);
        assert_eq!(pair.api_secret.len(), API_SECRET_LEN);
    }

    #[test]
    fn concurrent_generation_does_not_collide() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 256;

        let generator = Arc::new(generator());
        let keys = Arc::new(Mutex::new(HashSet::new()));
        let secrets = Arc::new(Mutex::new(HashSet::new()));

        scope(|s| {
            for _ in 0..THREADS {
                let generator = Arc::clone(&generator);
                let keys = Arc::clone(&keys);
                let secrets = Arc::clone(&secrets);
                s.spawn(move || {
                    for _ in 0..PER_THREAD {
                        assert!(keys.lock().unwrap().insert(generator.api_key("test-app")));
                        assert!(secrets.lock().unwrap().insert(generator.api_secret()));
                    }
                });
            }
        });

        assert_eq!(keys.lock().unwrap().len(), THREADS * PER_THREAD);
        assert_eq!(secrets.lock().unwrap().len(), THREADS * PER_THREAD);
    }
}
