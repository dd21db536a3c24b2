use core::fmt;
use std::sync::OnceLock;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{ConfigError, GenerationError, GeneratorConfig, Sequencer, SystemClock, TimeSource};


/// Width of the caller tag segment, in bytes.
pub const SID_TAG_LEN: usize = 3;

/// Tag used when the caller passes an empty one.
pub const DEFAULT_SID_TAG: &str = "src";

/// Separator between the process-local and the host-global halves.
pub const SID_SEPARATOR: char = '@';

/// Byte length of the local half: tag, process tag, and sequence.
const LOCAL_LEN: usize = SID_TAG_LEN + 4 + 4;

/// Hex width of the millisecond timestamp. Fixed until the year 2527.
const TIMESTAMP_HEX_LEN: usize = 11;

/// A per-request correlation identifier.
///
/// Layout, with `{location}` taken verbatim from the deployment config:
///
/// ```text
/// {tag:3}{process:4x}{sequence:4x}@{location}{millis:11x}{address:4x}{port:4}{version}
/// ```
///
/// The half before `@` identifies the emitting process. The half after it
/// identifies the emitting host, deployment, and format version. A `Sid` can
/// only be produced by a [`SidGenerator`], so the layout always holds.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Sid(String);

impl Sid {
    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the identifier, returning the underlying string.
    pub fn into_string(self) -> String {
        self.0
    }

    /// The 3-byte caller tag segment, including any left padding.
    pub fn tag(&self) -> &str {
        &self.0[..SID_TAG_LEN]
    }

    /// Everything before the separator.
    pub fn local_part(&self) -> &str {
        &self.0[..LOCAL_LEN]
    }

    /// Everything after the separator.
    pub fn global_part(&self) -> &str {
        &self.0[LOCAL_LEN + SID_SEPARATOR.len_utf8()..]
    }
}

impl fmt::Display for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Sid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Sid> for String {
    fn from(sid: Sid) -> Self {
        sid.0
    }
}

/// Composes correlation identifiers for inbound requests.
///
/// A generator is created empty, configured exactly once with
/// [`Self::init`] during process bootstrap, and then shared (typically behind
/// an `Arc`) by every request handler. After initialization all state except
/// the [`Sequencer`] is read-only, so [`Self::new_sid`] never blocks.
///
/// Two identifiers from the same generator never collide while fewer than
/// `65_536` of them are minted within one millisecond.
///
/// # Example
/// ```
/// use tenant_id::{SidGenerator, SystemClock};
///
/// let generator = SidGenerator::new(SystemClock);
/// generator.init("BJ", "192.168.1.100", "8080").unwrap();
///
/// let sid = generator.new_sid("usr").unwrap();
/// assert_eq!(sid.tag(), "usr");
/// assert!(sid.global_part().starts_with("BJ"));
/// assert!(sid.as_str().ends_with("016480802"));
/// ```
#[derive(Debug)]
pub struct SidGenerator<T = SystemClock>
where
    T: TimeSource,
{
    config: OnceLock<GeneratorConfig>,
    sequencer: Sequencer,
    process_tag: String,
    time: T,
}

impl<T> SidGenerator<T>
where
    T: TimeSource,
{
    /// Creates an uninitialized generator reading timestamps from `time`.
    ///
    /// [`Self::new_sid`] fails with [`GenerationError::Uninitialized`] until
    /// [`Self::init`] succeeds.
    pub fn new(time: T) -> Self {
        Self::from_components(OnceLock::new(), Sequencer::new(), time)
    }

    /// Creates a generator that is ready to use with an already validated
    /// configuration.
    pub fn with_config(config: GeneratorConfig, time: T) -> Self {
        Self::from_components(OnceLock::from(config), Sequencer::new(), time)
    }

    fn from_components(config: OnceLock<GeneratorConfig>, sequencer: Sequencer, time: T) -> Self {
        Self {
            config,
            sequencer,
            process_tag: format!("{:04x}", std::process::id() & 0xFFFF),
            time,
        }
    }

    /// Validates and stores the deployment configuration.
    ///
    /// Must be called once during bootstrap, before any request handler can
    /// reach the generator.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidAddress`] or [`ConfigError::PortTooShort`] as
    ///   described in [`GeneratorConfig::new`].
    /// - [`ConfigError::AlreadyInitialized`] if a configuration is already
    ///   stored. The existing configuration is left untouched.
    pub fn init(&self, location: &str, host_address: &str, port: &str) -> Result<(), ConfigError> {
        let config = GeneratorConfig::new(location, host_address, port)?;
        self.config
            .set(config)
            .map_err(|_| ConfigError::AlreadyInitialized)
    }

    /// The stored configuration, if [`Self::init`] has succeeded.
    pub fn config(&self) -> Option<&GeneratorConfig> {
        self.config.get()
    }

    /// The 4-hex-digit process identity embedded in every identifier.
    pub fn process_tag(&self) -> &str {
        &self.process_tag
    }

    /// The byte length every identifier from this generator has, if
    /// initialized.
    pub fn sid_len(&self) -> Option<usize> {
        self.config.get().map(|config| {
            LOCAL_LEN
                + SID_SEPARATOR.len_utf8()
                + config.location().len()
                + TIMESTAMP_HEX_LEN
                + config.short_address().len()
                + config.port_tag().len()
                + 1
        })
    }

    /// Mints a new correlation identifier.
    ///
    /// `tag` is normalized by [`normalize_tag`].
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Uninitialized`] if called before
    /// [`Self::init`]. This is a programming defect and should not be
    /// retried.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn new_sid(&self, tag: &str) -> Result<Sid, GenerationError> {
        let config = self.config.get().ok_or(GenerationError::Uninitialized)?;
        let sequence = self.sequencer.next();
        let millis = self.time.current_millis();

        Ok(Sid(format!(
            "{tag}{process}{sequence:04x}{SID_SEPARATOR}{location}{millis:0ts_width$x}{address}{port}{version}",
            tag = normalize_tag(tag),
            process = self.process_tag,
            location = config.location(),
            ts_width = TIMESTAMP_HEX_LEN,
            address = config.short_address(),
            port = config.port_tag(),
            version = config.version(),
        )))
    }
}

/// Normalizes a caller tag to exactly [`SID_TAG_LEN`] bytes.
///
/// - An empty tag becomes [`DEFAULT_SID_TAG`].
/// - A longer tag is cut to its first 3 bytes. If that cut would split a
///   multi-byte character, the cut moves back to the previous character
///   boundary.
/// - The result is left-padded with spaces up to 3 bytes.
///
/// # Example
/// ```
/// use tenant_id::normalize_tag;
///
/// assert_eq!(normalize_tag(""), "src");
/// assert_eq!(normalize_tag("verylongtag"), "ver");
/// assert_eq!(normalize_tag("ab"), " ab");
/// assert_eq!(normalize_tag("é"), " é");
/// assert_eq!(normalize_tag("abé"), " ab");
/// ```
pub fn normalize_tag(tag: &str) -> String {
    if tag.is_empty() {
        return DEFAULT_SID_TAG.to_owned();
    }

    let mut end = tag.len().min(SID_TAG_LEN);
    while !tag.is_char_boundary(end) {
        end -= 1;
    }

    let mut normalized = String::with_capacity(SID_TAG_LEN);
    normalized.extend(core::iter::repeat_n(' ', SID_TAG_LEN - end));
    normalized.push_str(&tag[..end]);
    normalized
}
