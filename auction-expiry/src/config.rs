use {
    crate::auction::{
        entities::{
            self,
            ClosingStrategy,
        },
        repository::expiry_cutoff,
        service,
    },
    anyhow::Result,
    clap::{
        crate_authors,
        crate_description,
        crate_name,
        crate_version,
        Args,
        Parser,
    },
    serde::{
        Deserialize,
        Serialize,
    },
    std::{
        fs,
        time::Duration,
    },
    time::OffsetDateTime,
};

pub mod server;

const DEFAULT_EXPIRATION_DELAY: Duration = Duration::from_secs(30);
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(10);
const DEFAULT_SWEEP_BATCH_SIZE: usize = 500;

#[derive(Parser, Debug)]
#[command(name = crate_name!())]
#[command(author = crate_authors!())]
#[command(about = crate_description!())]
#[command(version = crate_version!())]
pub enum Options {
    /// Run the auction expiry service.
    Run(RunOptions),
    /// Create an auction and wait until its expiry closes it.
    Create(CreateOptions),
    /// Close an auction right away. Safe to repeat.
    Close(AuctionOptions),
    /// Print the status of an auction.
    Status(AuctionOptions),
}

#[derive(Args, Clone, Debug)]
pub struct RunOptions {
    /// Server Options
    #[command(flatten)]
    pub server: server::Options,

    #[command(flatten)]
    pub config: ConfigOptions,
}

#[derive(Args, Clone, Debug)]
pub struct CreateOptions {
    #[command(flatten)]
    pub run: RunOptions,

    /// Identifier of the new auction. A random one is generated when omitted.
    #[arg(long = "id")]
    pub auction_id: Option<entities::AuctionId>,
}

#[derive(Args, Clone, Debug)]
pub struct AuctionOptions {
    #[command(flatten)]
    pub run: RunOptions,

    #[arg(long = "id")]
    pub auction_id: entities::AuctionId,
}

#[derive(Args, Clone, Debug)]
#[command(next_help_heading = "Config Options")]
#[group(id = "Config")]
pub struct ConfigOptions {
    /// Path to a configuration file with the expiry settings.
    #[arg(long = "config")]
    #[arg(env = "EXPIRY_CONFIG")]
    #[arg(default_value = "config.yaml")]
    pub config: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweeperConfig {
    pub enabled:    bool,
    #[serde(with = "humantime_serde")]
    pub interval:   Duration,
    pub batch_size: usize,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            enabled:    true,
            interval:   DEFAULT_SWEEP_INTERVAL,
            batch_size: DEFAULT_SWEEP_BATCH_SIZE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Time between the creation of an auction and its closure.
    #[serde(with = "humantime_serde")]
    pub expiration_delay: Duration,
    pub closing_strategy: ClosingStrategy,
    pub sweeper:          SweeperConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            expiration_delay: DEFAULT_EXPIRATION_DELAY,
            closing_strategy: ClosingStrategy::default(),
            sweeper:          SweeperConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Config> {
        let yaml_content = fs::read_to_string(path)?;
        Self::parse(&yaml_content)
    }

    fn parse(yaml_content: &str) -> Result<Config> {
        if yaml_content.trim().is_empty() {
            return Ok(Config::default());
        }
        let config: Config = serde_yaml::from_str(yaml_content)?;
        if expiry_cutoff(OffsetDateTime::now_utc(), config.expiration_delay).is_none() {
            anyhow::bail!(
                "expiration_delay of {:?} is out of range",
                config.expiration_delay
            );
        }
        if config.sweeper.enabled && config.sweeper.interval.is_zero() {
            anyhow::bail!("sweeper.interval must be greater than zero");
        }
        Ok(config)
    }
}

impl From<Config> for service::Config {
    fn from(config: Config) -> Self {
        Self {
            expiration_delay: config.expiration_delay,
            closing_strategy: config.closing_strategy,
            sweeper:          service::SweeperConfig {
                enabled:    config.sweeper.enabled,
                interval:   config.sweeper.interval,
                batch_size: config.sweeper.batch_size,
            },
        }
    }
}
