use std::time::Duration;

use smart_default::SmartDefault;

use crate::constant::{DEFAULT_PAGE_SIZE, DEFAULT_PORT};
use crate::error::Error;

/// A configuration for connection
///
/// ```rs
/// let mut opts1 = Opts::default();
/// opts1.cache = "Person".to_string();
///
/// let mut opts2 = Opts::try_from("ignite://localhost:11443/Person?page_size=256")?;
/// opts2.distributed_joins = true;
/// ```
#[derive(Debug, Clone, SmartDefault)]
pub struct Opts {
    /// Hostname or IP address
    #[default(_code = "\"127.0.0.1\".to_owned()")]
    pub host: String,

    /// Port of the node's ODBC endpoint
    #[default(DEFAULT_PORT)]
    pub port: u16,

    /// Cache whose schema queries run against. Must not be empty.
    pub cache: String,

    /// Enable TCP_NODELAY socket option to disable Nagle's algorithm
    #[default(true)]
    pub tcp_nodelay: bool,

    /// Rows requested per page
    #[default(DEFAULT_PAGE_SIZE)]
    pub page_size: i32,

    /// Ask the node to run non-collocated joins
    pub distributed_joins: bool,

    /// Socket read timeout. `None` blocks indefinitely.
    pub read_timeout: Option<Duration>,

    /// Socket write timeout. `None` blocks indefinitely.
    pub write_timeout: Option<Duration>,
}

impl Opts {
    /// Default options for a host, port and cache
    pub fn new(host: &str, port: u16, cache: &str) -> Self {
        Self {
            host: host.to_owned(),
            port,
            cache: cache.to_owned(),
            ..Default::default()
        }
    }

    /// `host:port`, as reported in diagnostics
    pub fn server_name(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, Error> {
    value
        .parse()
        .map_err(|_| Error::BadConfigError(format!("Invalid value '{}' for '{}'", value, key)))
}

impl TryFrom<&str> for Opts {
    type Error = Error;

    fn try_from(url: &str) -> Result<Self, Self::Error> {
        let parsed = url::Url::parse(url)
            .map_err(|e| Error::BadConfigError(format!("Failed to parse Ignite URL: {}", e)))?;

        if parsed.scheme() != "ignite" {
            return Err(Error::BadConfigError(format!(
                "Invalid URL scheme '{}', expected 'ignite'",
                parsed.scheme()
            )));
        }

        let mut opts = Self::default();
        if let Some(host) = parsed.host_str() {
            opts.host = host.to_string();
        }
        opts.port = parsed.port().unwrap_or(DEFAULT_PORT);
        opts.cache = parsed
            .path()
            .strip_prefix('/')
            .unwrap_or_default()
            .to_string();

        for (key, value) in parsed.query_pairs() {
            match key.as_ref() {
                "page_size" => {
                    opts.page_size = parse_value(&key, &value)?;
                    if opts.page_size <= 0 {
                        return Err(Error::BadConfigError(format!(
                            "page_size must be positive, got {}",
                            opts.page_size
                        )));
                    }
                }
                "distributed_joins" => opts.distributed_joins = parse_value(&key, &value)?,
                "tcp_nodelay" => opts.tcp_nodelay = parse_value(&key, &value)?,
                "read_timeout_ms" => {
                    opts.read_timeout = Some(Duration::from_millis(parse_value(&key, &value)?));
                }
                "write_timeout_ms" => {
                    opts.write_timeout = Some(Duration::from_millis(parse_value(&key, &value)?));
                }
                other => {
                    return Err(Error::BadConfigError(format!(
                        "Unknown connection option '{}'",
                        other
                    )));
                }
            }
        }

        Ok(opts)
    }
}
