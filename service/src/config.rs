use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;
use std::str::FromStr;

/// Which transport backs the channel broadcaster.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BroadcastMode {
    /// In-memory fan-out to sessions held by this process only.
    Local,
    /// Redis pub/sub fan-out across all server processes.
    Redis,
}

#[derive(Debug, PartialEq, Eq)]
pub struct BroadcastModeParseError;

impl FromStr for BroadcastMode {
    type Err = BroadcastModeParseError;
    fn from_str(mode: &str) -> Result<BroadcastMode, Self::Err> {
        match mode.to_lowercase().as_str() {
            "local" => Ok(BroadcastMode::Local),
            "redis" => Ok(BroadcastMode::Redis),
            _ => Err(BroadcastModeParseError),
        }
    }
}

impl fmt::Display for BroadcastMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BroadcastMode::Local => write!(f, "local"),
            BroadcastMode::Redis => write!(f, "redis"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000,https://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// The broadcast transport backing the event fan-out.
    #[arg(
        long,
        env,
        default_value_t = BroadcastMode::Local,
        value_parser = clap::builder::PossibleValuesParser::new(["local", "redis"])
            .map(|s| s.parse::<BroadcastMode>().unwrap()),
    )]
    pub broadcast_mode: BroadcastMode,

    /// Sets the Redis URL used by the distributed broadcast transport
    #[arg(long, env, default_value = "redis://localhost:6379/0")]
    redis_url: Option<String>,

    /// Outbound event buffer capacity per stream session; a session that
    /// cannot drain this many events is disconnected as a slow consumer
    #[arg(long, env, default_value_t = 64)]
    pub session_buffer_capacity: usize,

    /// Seconds between keep-alive frames on idle stream connections
    #[arg(long, env, default_value_t = 15)]
    pub keepalive_interval_secs: u64,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn redis_url(&self) -> &str {
        self.redis_url.as_ref().expect("No Redis URL provided")
    }

    pub fn set_redis_url(mut self, redis_url: String) -> Self {
        self.redis_url = Some(redis_url);
        self
    }

    pub fn api_address(&self) -> String {
        format!(
            "{}:{}",
            self.interface.as_deref().unwrap_or("127.0.0.1"),
            self.port
        )
    }
}
