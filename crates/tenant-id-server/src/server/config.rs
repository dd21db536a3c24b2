use std::net::SocketAddr;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use tenant_id::{DIGEST_HEX_LEN, GeneratorConfig};

/// Output format of the log subscriber.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, human-readable output.
    Pretty,
    /// One JSON object per line, including the active request span.
    Json,
}

/// Runtime configuration for the `tenant-id-server` binary.
///
/// All values are parsed from CLI arguments or environment variables (a `.env`
/// file is loaded first), with defaults suitable for local development.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "tenant-id-server",
    version,
    about = "Tenant application onboarding with per-request correlation ids"
)]
pub struct CliArgs {
    /// TCP address to listen on.
    ///
    /// Its port also feeds the port tag of every correlation id, so it must
    /// have at least 4 digits.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:8080"))]
    pub server_addr: String,

    /// Deployment location code embedded in every correlation id: 1 to 8
    /// ASCII upper-case letters or digits.
    ///
    /// Environment variable: `SID_LOCATION`
    #[arg(long, env = "SID_LOCATION", default_value_t = String::from("BJ"))]
    pub location: String,

    /// Host address whose last two bytes identify this instance in
    /// correlation ids. Defaults to the IP of `SERVER_ADDR`.
    ///
    /// Environment variable: `SID_HOST_IP`
    #[arg(long, env = "SID_HOST_IP")]
    pub host_ip: Option<String>,

    /// Subsystem tag that prefixes every correlation id (at most 3 bytes).
    ///
    /// Environment variable: `SID_TAG`
    #[arg(long, env = "SID_TAG", default_value_t = String::from("tnt"))]
    pub sid_tag: String,

    /// Length of generated application ids, in hex characters (1 to 64).
    ///
    /// Environment variable: `APP_ID_LEN`
    #[arg(long, env = "APP_ID_LEN", default_value_t = 8)]
    pub app_id_len: usize,

    /// Log output format.
    ///
    /// Environment variable: `LOG_FORMAT`
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: SocketAddr,
    pub generator: GeneratorConfig,
    pub sid_tag: String,
    pub app_id_len: usize,
    pub log_format: LogFormat,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let server_addr: SocketAddr = args
            .server_addr
            .parse()
            .with_context(|| format!("SERVER_ADDR `{}` is not a socket address", args.server_addr))?;

        if !(1..=DIGEST_HEX_LEN).contains(&args.app_id_len) {
            bail!(
                "APP_ID_LEN ({}) must be between 1 and {DIGEST_HEX_LEN}",
                args.app_id_len
            );
        }

        let host_ip = args
            .host_ip
            .unwrap_or_else(|| server_addr.ip().to_string());
        let generator =
            GeneratorConfig::new(&args.location, &host_ip, &server_addr.port().to_string())
                .context("invalid correlation id configuration")?;

        Ok(Self {
            server_addr,
            generator,
            sid_tag: args.sid_tag,
            app_id_len: args.app_id_len,
            log_format: args.log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tenant_id::ConfigError;

    fn args() -> CliArgs {
        CliArgs {
            server_addr: "192.168.1.100:8080".to_owned(),
            location: "BJ".to_owned(),
            host_ip: None,
            sid_tag: "tnt".to_owned(),
            app_id_len: 8,
            log_format: LogFormat::Pretty,
        }
    }

    #[test]
    fn host_ip_defaults_to_listen_address() {
        let config = ServerConfig::try_from(args()).unwrap();
        assert_eq!(config.generator.short_address(), "0164");
        assert_eq!(config.generator.port_tag(), "8080");
        assert_eq!(config.generator.location(), "BJ");
    }

    #[test]
    fn explicit_host_ip_wins() {
        let config = ServerConfig::try_from(CliArgs {
            server_addr: "0.0.0.0:9090".to_owned(),
            host_ip: Some("10.0.255.1".to_owned()),
            ..args()
        })
        .unwrap();
        assert_eq!(config.generator.short_address(), "ff01");
        assert_eq!(config.generator.port_tag(), "9090");
    }

    #[test]
    fn short_port_aborts_startup() {
        let err = ServerConfig::try_from(CliArgs {
            server_addr: "0.0.0.0:80".to_owned(),
            ..args()
        })
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::PortTooShort { .. })
        ));
    }

    #[test]
    fn invalid_host_ip_aborts_startup() {
        let err = ServerConfig::try_from(CliArgs {
            host_ip: Some("invalid.ip.address".to_owned()),
            ..args()
        })
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn malformed_location_aborts_startup() {
        let err = ServerConfig::try_from(CliArgs {
            location: "bj".to_owned(),
            ..args()
        })
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::InvalidLocation { .. })
        ));
    }

    #[test]
    fn app_id_len_is_bounded() {
        for app_id_len in [0, DIGEST_HEX_LEN + 1] {
            assert!(ServerConfig::try_from(CliArgs {
                app_id_len,
                ..args()
            })
            .is_err());
        }
    }

    #[test]
    fn malformed_server_addr_is_rejected() {
        assert!(ServerConfig::try_from(CliArgs {
            server_addr: "localhost".to_owned(),
            ..args()
        })
        .is_err());
    }

    #[test]
    fn cli_defaults_parse() {
        let args = CliArgs::try_parse_from(["tenant-id-server", "--log-format", "json"]).unwrap();
        assert_eq!(args.log_format, LogFormat::Json);
        assert!(!args.server_addr.is_empty());
    }
}
