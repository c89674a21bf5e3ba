use clap::{Parser, builder::BoolishValueParser};
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_NCBI_TOOL: &str = "genome-mcp";
const DEFAULT_MCP_HTTP_ADDR: &str = "127.0.0.1:4020";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_ATTEMPTS: u32 = 4;
const DEFAULT_BACKOFF_BASE_MS: u64 = 500;
const DEFAULT_BACKOFF_MAX_MS: u64 = 8_000;
const DEFAULT_LITERATURE_CONCURRENCY: usize = 3;
const DEFAULT_CACHE_TTL_SECS: u64 = 900;
const DEFAULT_CACHE_MAX: usize = 256;

#[derive(Parser, Debug)]
#[command(name = "genome-mcpd", version, about = "Genome MCP daemon.")]
struct CliArgs {
    #[arg(long, env = "NCBI_API_KEY", hide_env_values = true)]
    ncbi_api_key: Option<String>,

    #[arg(long, env = "GENOME_NCBI_EMAIL")]
    ncbi_email: Option<String>,

    #[arg(long, env = "GENOME_NCBI_TOOL", default_value = DEFAULT_NCBI_TOOL)]
    ncbi_tool: String,

    #[arg(
        long,
        env = "GENOME_REQUEST_TIMEOUT_SECS",
        default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS
    )]
    request_timeout_secs: u64,

    #[arg(long, env = "GENOME_MAX_ATTEMPTS", default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u32,

    #[arg(long, env = "GENOME_BACKOFF_BASE_MS", default_value_t = DEFAULT_BACKOFF_BASE_MS)]
    backoff_base_ms: u64,

    #[arg(long, env = "GENOME_BACKOFF_MAX_MS", default_value_t = DEFAULT_BACKOFF_MAX_MS)]
    backoff_max_ms: u64,

    #[arg(
        long,
        env = "GENOME_LITERATURE_CONCURRENCY",
        default_value_t = DEFAULT_LITERATURE_CONCURRENCY
    )]
    literature_concurrency: usize,

    #[arg(long, env = "GENOME_CACHE_TTL_SECS", default_value_t = DEFAULT_CACHE_TTL_SECS)]
    cache_ttl_secs: u64,

    #[arg(long, env = "GENOME_CACHE_MAX", default_value_t = DEFAULT_CACHE_MAX)]
    cache_max_entries: usize,

    #[arg(
        long = "stdio",
        env = "GENOME_STDIO",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    enable_stdio: bool,

    #[arg(
        long,
        env = "GENOME_MCP_SERVE",
        default_value_t = true,
        value_parser = BoolishValueParser::new()
    )]
    mcp_serve: bool,

    #[arg(long, env = "GENOME_MCP_HTTP_ADDR", default_value = DEFAULT_MCP_HTTP_ADDR)]
    mcp_http_addr: SocketAddr,

    #[arg(long = "log-level", env = "GENOME_LOG", default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Clone)]
pub struct GenomeConfig {
    pub ncbi_api_key: Option<String>,
    pub ncbi_email: Option<String>,
    pub ncbi_tool: Option<String>,
    pub request_timeout: Duration,
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub backoff_max: Duration,
    pub literature_concurrency: usize,
    /// `None` disables the discovery report cache.
    pub cache_ttl: Option<Duration>,
    pub cache_max_entries: usize,
    pub enable_stdio: bool,
    pub mcp_serve: bool,
    pub mcp_http_addr: SocketAddr,
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidSetting { name: &'static str, value: String },
    NoTransport,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
            Self::NoTransport => {
                write!(f, "nothing to serve: enable GENOME_STDIO or GENOME_MCP_SERVE")
            }
        }
    }
}

impl Error for ConfigError {}

impl GenomeConfig {
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }

    /// User agent sent on every upstream request.
    pub fn user_agent(&self) -> String {
        let tool = self.ncbi_tool.as_deref().unwrap_or(DEFAULT_NCBI_TOOL);
        format!("{tool}/{}", env!("CARGO_PKG_VERSION"))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl TryFrom<CliArgs> for GenomeConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.max_attempts == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "GENOME_MAX_ATTEMPTS",
                value: args.max_attempts.to_string(),
            });
        }
        if args.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "GENOME_REQUEST_TIMEOUT_SECS",
                value: args.request_timeout_secs.to_string(),
            });
        }
        if args.backoff_max_ms < args.backoff_base_ms {
            return Err(ConfigError::InvalidSetting {
                name: "GENOME_BACKOFF_MAX_MS",
                value: args.backoff_max_ms.to_string(),
            });
        }
        if args.literature_concurrency == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "GENOME_LITERATURE_CONCURRENCY",
                value: args.literature_concurrency.to_string(),
            });
        }
        if !args.enable_stdio && !args.mcp_serve {
            return Err(ConfigError::NoTransport);
        }

        let cache_ttl = if args.cache_ttl_secs == 0 || args.cache_max_entries == 0 {
            None
        } else {
            Some(Duration::from_secs(args.cache_ttl_secs))
        };

        Ok(Self {
            ncbi_api_key: non_blank(args.ncbi_api_key),
            ncbi_email: non_blank(args.ncbi_email),
            ncbi_tool: non_blank(Some(args.ncbi_tool)),
            request_timeout: Duration::from_secs(args.request_timeout_secs),
            max_attempts: args.max_attempts,
            backoff_base: Duration::from_millis(args.backoff_base_ms),
            backoff_max: Duration::from_millis(args.backoff_max_ms),
            literature_concurrency: args.literature_concurrency,
            cache_ttl,
            cache_max_entries: args.cache_max_entries,
            enable_stdio: args.enable_stdio,
            mcp_serve: args.mcp_serve,
            mcp_http_addr: args.mcp_http_addr,
            log_level: args.log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> CliArgs {
        CliArgs {
            ncbi_api_key: None,
            ncbi_email: None,
            ncbi_tool: DEFAULT_NCBI_TOOL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
            backoff_max_ms: DEFAULT_BACKOFF_MAX_MS,
            literature_concurrency: DEFAULT_LITERATURE_CONCURRENCY,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            cache_max_entries: DEFAULT_CACHE_MAX,
            enable_stdio: false,
            mcp_serve: true,
            mcp_http_addr: DEFAULT_MCP_HTTP_ADDR.parse().expect("valid MCP addr"),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }

    #[test]
    fn defaults_parse() {
        let config = GenomeConfig::try_from(base_args()).expect("config should parse");
        assert_eq!(config.max_attempts, 4);
        assert_eq!(config.cache_ttl, Some(Duration::from_secs(900)));
        assert_eq!(config.ncbi_tool.as_deref(), Some("genome-mcp"));
        assert!(config.user_agent().starts_with("genome-mcp/"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let mut args = base_args();
        args.ncbi_api_key = Some("   ".to_string());
        let config = GenomeConfig::try_from(args).expect("config should parse");
        assert!(config.ncbi_api_key.is_none());
    }

    #[test]
    fn zero_ttl_disables_the_cache() {
        let mut args = base_args();
        args.cache_ttl_secs = 0;
        let config = GenomeConfig::try_from(args).expect("config should parse");
        assert!(config.cache_ttl.is_none());
    }

    #[test]
    fn rejects_inverted_backoff_and_zero_attempts() {
        let mut args = base_args();
        args.backoff_max_ms = 10;
        assert!(matches!(
            GenomeConfig::try_from(args),
            Err(ConfigError::InvalidSetting { name: "GENOME_BACKOFF_MAX_MS", .. })
        ));

        let mut args = base_args();
        args.max_attempts = 0;
        assert!(matches!(
            GenomeConfig::try_from(args),
            Err(ConfigError::InvalidSetting { name: "GENOME_MAX_ATTEMPTS", .. })
        ));
    }

    #[test]
    fn requires_some_transport() {
        let mut args = base_args();
        args.mcp_serve = false;
        assert!(matches!(GenomeConfig::try_from(args), Err(ConfigError::NoTransport)));
    }
}
