use portable_atomic::{AtomicU32, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

/// Largest value a [`Sequencer`] hands out before wrapping to zero.
pub const MAX_SEQUENCE: u16 = u16::MAX;

/// A lock-free, wrapping 16-bit counter shared by all concurrent callers.
///
/// The counter lives in an [`AtomicU32`] and is advanced with a single
/// `fetch_add`. Because `2^32` is a multiple of `2^16`, the masked low half
/// wraps cleanly even when the wide counter itself overflows, so any `65_536`
/// consecutive calls observe pairwise distinct values.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Never blocks
/// - ❌ No ordering guarantee across a wrap boundary
///
/// Enable the `cache-padded` feature to keep the counter on its own cache
/// line when it sits next to other hot state.
#[derive(Debug)]
pub struct Sequencer {
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<AtomicU32>,
    #[cfg(not(feature = "cache-padded"))]
    state: AtomicU32,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequencer {
    /// Creates a sequencer whose first [`Self::next`] returns `1`.
    pub fn new() -> Self {
        Self::from_value(0)
    }

    /// Creates a sequencer that resumes after `value`, so the first
    /// [`Self::next`] returns `value + 1` (wrapping).
    ///
    /// Mostly useful to exercise the wrap boundary.
    pub fn from_value(value: u16) -> Self {
        let state = AtomicU32::new(u32::from(value));
        Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(state),
            #[cfg(not(feature = "cache-padded"))]
            state,
        }
    }

    /// Atomically increments the counter and returns the post-increment value
    /// masked to 16 bits.
    ///
    /// # Example
    /// ```
    /// use tenant_id::Sequencer;
    ///
    /// let sequencer = Sequencer::from_value(u16::MAX);
    /// assert_eq!(sequencer.next(), 0);
    /// assert_eq!(sequencer.next(), 1);
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    #[allow(clippy::should_implement_trait)]
    pub fn next(&self) -> u16 {
        let previous = self.state.fetch_add(1, Ordering::Relaxed);
        // Truncation is the mask.
        previous.wrapping_add(1) as u16
    }
}
