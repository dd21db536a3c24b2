use core::net::IpAddr;

use crate::ConfigError;

/// Number of leading port characters carried in every identifier.
pub const PORT_TAG_LEN: usize = 4;

/// Format version appended to every identifier.
pub const SID_VERSION: u8 = 2;

/// Longest accepted deployment location code.
pub const MAX_LOCATION_LEN: usize = 8;

/// Deployment-time fragment shared by every identifier a process emits.
///
/// Built once at startup from a location code, the host address, and the
/// listening port. After construction it is never mutated, so any number of
/// request handlers may read it concurrently without synchronization.
///
/// The short address only discriminates hosts within one fleet or subnet for
/// log correlation. It is not a global uniqueness key.
///
/// With the `serde` feature, deserialization re-checks every field so a stored
/// config cannot smuggle in a layout that [`GeneratorConfig::new`] would never
/// produce.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "EncodedConfig"))]
pub struct GeneratorConfig {
    location: String,
    short_address: String,
    port_tag: String,
    version: u8,
}

impl GeneratorConfig {
    /// Validates the deployment parameters and precomputes the encoded
    /// fragments.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidLocation`] unless `location` is 1 to
    ///   [`MAX_LOCATION_LEN`] ASCII upper-case letters or digits.
    /// - [`ConfigError::InvalidAddress`] if `host_address` does not parse as
    ///   an IPv4 or IPv6 literal.
    /// - [`ConfigError::PortTooShort`] if `port` is shorter than
    ///   [`PORT_TAG_LEN`] bytes.
    ///
    /// # Example
    /// ```
    /// use tenant_id::GeneratorConfig;
    ///
    /// let config = GeneratorConfig::new("BJ", "192.168.1.100", "8080").unwrap();
    /// assert_eq!(config.short_address(), "0164");
    /// assert_eq!(config.port_tag(), "8080");
    /// ```
    pub fn new(location: &str, host_address: &str, port: &str) -> Result<Self, ConfigError> {
        validate_location(location)?;
        let address: IpAddr = host_address
            .parse()
            .map_err(|_| ConfigError::InvalidAddress {
                address: host_address.to_owned(),
            })?;

        let port_tag = port
            .get(..PORT_TAG_LEN)
            .ok_or_else(|| ConfigError::PortTooShort {
                port: port.to_owned(),
            })?;

        Ok(Self {
            location: location.to_owned(),
            short_address: encode_short_address(address),
            port_tag: port_tag.to_owned(),
            version: SID_VERSION,
        })
    }

    /// The deployment location code, verbatim.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Four lowercase hex characters derived from the host address.
    pub fn short_address(&self) -> &str {
        &self.short_address
    }

    /// The first [`PORT_TAG_LEN`] characters of the listening port.
    pub fn port_tag(&self) -> &str {
        &self.port_tag
    }

    /// The identifier format version.
    pub fn version(&self) -> u8 {
        self.version
    }
}

fn validate_location(location: &str) -> Result<(), ConfigError> {
    let valid = (1..=MAX_LOCATION_LEN).contains(&location.len())
        && location
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidLocation {
            location: location.to_owned(),
        })
    }
}

/// Serialized form of [`GeneratorConfig`], validated on the way in.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct EncodedConfig {
    location: String,
    short_address: String,
    port_tag: String,
    version: u8,
}

#[cfg(feature = "serde")]
impl TryFrom<EncodedConfig> for GeneratorConfig {
    type Error = ConfigError;

    fn try_from(encoded: EncodedConfig) -> Result<Self, Self::Error> {
        validate_location(&encoded.location)?;

        let short_address_ok = encoded.short_address.len() == 4
            && encoded
                .short_address
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !short_address_ok {
            return Err(ConfigError::InvalidShortAddress {
                short_address: encoded.short_address,
            });
        }
        if encoded.port_tag.len() != PORT_TAG_LEN {
            return Err(ConfigError::InvalidPortTag {
                port_tag: encoded.port_tag,
            });
        }
        if encoded.version != SID_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                version: encoded.version,
            });
        }

        Ok(Self {
            location: encoded.location,
            short_address: encoded.short_address,
            port_tag: encoded.port_tag,
            version: encoded.version,
        })
    }
}

/// Encodes the last two bytes of an address as four lowercase hex characters.
///
/// For IPv4 these are the last two octets, so `192.168.1.100` becomes `0164`.
/// For IPv6 they are the final two bytes of the 128-bit address.
pub fn encode_short_address(address: IpAddr) -> String {
    let [hi, lo] = match address {
        IpAddr::V4(v4) => {
            let [_, _, hi, lo] = v4.octets();
            [hi, lo]
        }
        IpAddr::V6(v6) => {
            let octets = v6.octets();
            [octets[14], octets[15]]
        }
    };
    hex::encode([hi, lo])
}
