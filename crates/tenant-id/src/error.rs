/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that `tenant-id` can produce.
///
/// Every failure in this crate is a deployment or programming defect. None of
/// them are transient, so callers should never retry on an `Error`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The generator was configured with invalid deployment parameters.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A correlation identifier could not be composed.
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Raised while building a [`crate::GeneratorConfig`].
///
/// These are fatal at startup: the process should abort rather than fall back
/// to defaulted values, which would corrupt the host and port fields of every
/// identifier produced afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The location is empty, longer than [`crate::MAX_LOCATION_LEN`], or
    /// contains anything but ASCII upper-case letters and digits.
    #[error("invalid location `{location}`")]
    InvalidLocation {
        /// The rejected input.
        location: String,
    },

    /// The host address is not a valid IPv4 or IPv6 literal.
    #[error("invalid host address `{address}`")]
    InvalidAddress {
        /// The rejected input.
        address: String,
    },

    /// The listening port string is shorter than the 4 bytes needed for the
    /// port tag, or its fourth byte falls inside a multi-byte character.
    #[error("port `{port}` is shorter than {min} characters", min = crate::PORT_TAG_LEN)]
    PortTooShort {
        /// The rejected input.
        port: String,
    },

    /// A stored short address is not exactly 4 lowercase hex characters.
    #[error("invalid short address `{short_address}`")]
    InvalidShortAddress {
        /// The rejected input.
        short_address: String,
    },

    /// A stored port tag is not exactly [`crate::PORT_TAG_LEN`] bytes.
    #[error("port tag `{port_tag}` must be exactly {len} bytes", len = crate::PORT_TAG_LEN)]
    InvalidPortTag {
        /// The rejected input.
        port_tag: String,
    },

    /// A stored format version differs from [`crate::SID_VERSION`].
    #[error("unsupported sid version {version}, expected {expected}", expected = crate::SID_VERSION)]
    UnsupportedVersion {
        /// The rejected input.
        version: u8,
    },

    /// [`crate::SidGenerator::init`] was called on a generator that already
    /// holds a configuration.
    #[error("sid generator is already initialized")]
    AlreadyInitialized,
}

/// Raised by [`crate::SidGenerator::new_sid`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum GenerationError {
    /// The generator was used before [`crate::SidGenerator::init`].
    #[error("sid generator used before initialization")]
    Uninitialized,
}
