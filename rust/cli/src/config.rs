//! Layered configuration: defaults, then the TOML file named by
//! `BANKER_CONFIG`, then `BANKER_*` environment variables.

use serde::{Deserialize, Serialize};
use std::fs;

use banker_engine::offer::{BPS, MAX_AGGRESSIVENESS_BPS, MIN_AGGRESSIVENESS_BPS};

pub const CONFIG_ENV: &str = "BANKER_CONFIG";
pub const SEED_ENV: &str = "BANKER_SEED";
pub const AGGRESSIVENESS_ENV: &str = "BANKER_AGGRESSIVENESS";
pub const ACCEPT_RATIO_ENV: &str = "BANKER_ACCEPT_RATIO";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub seed: Option<u64>,
    /// Banker difficulty; 1.0 is neutral
    pub aggressiveness: f64,
    /// Simulation strategy: accept an offer worth this share of the expected value
    pub accept_ratio: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            aggressiveness: 1.0,
            accept_ratio: 0.9,
        }
    }
}

impl Config {
    /// Aggressiveness in basis points, as the offer engine takes it.
    pub fn aggressiveness_bps(&self) -> u32 {
        let bps = (self.aggressiveness * f64::from(BPS)).round();
        (bps as u32).clamp(MIN_AGGRESSIVENESS_BPS, MAX_AGGRESSIVENESS_BPS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub seed: ValueSource,
    pub aggressiveness: ValueSource,
    pub accept_ratio: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            seed: ValueSource::Default,
            aggressiveness: ValueSource::Default,
            accept_ratio: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: Config,
    pub sources: ConfigSources,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "cannot parse config file: {}", e),
            ConfigError::Invalid(msg) => f.write_str(msg),
        }
    }
}

pub fn load() -> Result<Config, ConfigError> {
    load_with_sources().map(|resolved| resolved.config)
}

pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    let mut cfg = Config::default();
    let mut sources = ConfigSources::default();

    if let Ok(path) = std::env::var(CONFIG_ENV)
        && !path.is_empty()
    {
        let s = fs::read_to_string(&path)?;
        let f: FileConfig = toml::from_str(&s)?;
        tracing::debug!(path = %path, "config file loaded");
        if let Some(v) = f.seed {
            cfg.seed = Some(v);
            sources.seed = ValueSource::File;
        }
        if let Some(v) = f.aggressiveness {
            cfg.aggressiveness = v;
            sources.aggressiveness = ValueSource::File;
        }
        if let Some(v) = f.accept_ratio {
            cfg.accept_ratio = v;
            sources.accept_ratio = ValueSource::File;
        }
    }

    if let Ok(seed) = std::env::var(SEED_ENV)
        && !seed.is_empty()
    {
        cfg.seed = Some(
            seed.parse()
                .map_err(|_| ConfigError::Invalid("Invalid seed".into()))?,
        );
        sources.seed = ValueSource::Env;
    }
    if let Ok(aggr) = std::env::var(AGGRESSIVENESS_ENV)
        && !aggr.is_empty()
    {
        cfg.aggressiveness = aggr
            .parse()
            .map_err(|_| ConfigError::Invalid("Invalid aggressiveness".into()))?;
        sources.aggressiveness = ValueSource::Env;
    }
    if let Ok(ratio) = std::env::var(ACCEPT_RATIO_ENV)
        && !ratio.is_empty()
    {
        cfg.accept_ratio = ratio
            .parse()
            .map_err(|_| ConfigError::Invalid("Invalid accept ratio".into()))?;
        sources.accept_ratio = ValueSource::Env;
    }

    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    aggressiveness: Option<f64>,
    #[serde(default)]
    accept_ratio: Option<f64>,
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if !(0.5..=1.5).contains(&cfg.aggressiveness) {
        return Err(ConfigError::Invalid(
            "Invalid configuration: aggressiveness must be within 0.5..=1.5".into(),
        ));
    }
    if !(0.0..=1.0).contains(&cfg.accept_ratio) {
        return Err(ConfigError::Invalid(
            "Invalid configuration: accept_ratio must be within 0.0..=1.0".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate(&Config::default()).is_ok());
        assert_eq!(Config::default().aggressiveness_bps(), BPS);
    }

    #[test]
    fn aggressiveness_converts_to_bps() {
        let cfg = Config {
            aggressiveness: 1.25,
            ..Config::default()
        };
        assert_eq!(cfg.aggressiveness_bps(), 12_500);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let too_soft = Config {
            aggressiveness: 0.4,
            ..Config::default()
        };
        assert!(matches!(validate(&too_soft), Err(ConfigError::Invalid(_))));
        let bad_ratio = Config {
            accept_ratio: 1.2,
            ..Config::default()
        };
        assert!(matches!(validate(&bad_ratio), Err(ConfigError::Invalid(_))));
        let nan = Config {
            accept_ratio: f64::NAN,
            ..Config::default()
        };
        assert!(validate(&nan).is_err());
    }

    #[test]
    fn file_config_rejects_unknown_keys() {
        assert!(toml::from_str::<FileConfig>("level = 3").is_err());
        let f: FileConfig = toml::from_str("seed = 9\naccept_ratio = 0.75").unwrap();
        assert_eq!(f.seed, Some(9));
        assert_eq!(f.accept_ratio, Some(0.75));
        assert!(f.aggressiveness.is_none());
    }
}
