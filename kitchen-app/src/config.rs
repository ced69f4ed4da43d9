use error_stack::{Report, ResultExt};
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use tracing::info;

const DEFAULT_MONGO_URL: &str = "mongodb://localhost:27017/smartkitchen";
const DEFAULT_PORT: u16 = 8001;

#[derive(Debug, thiserror::Error)]
#[error("the service is misconfigured")]
pub struct ConfigError;

#[derive(Debug, Clone)]
pub struct Config {
    /// The database named in the url is used, `smartkitchen` if it names none.
    pub mongo_url: String,
    pub port: u16,
    pub metrics_enabled: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, Report<ConfigError>> {
        Self::load(|key| env::var(key).ok())
    }

    fn load(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Report<ConfigError>> {
        Ok(Self {
            mongo_url: lookup("MONGO_URL").unwrap_or_else(|| {
                info!("MONGO_URL not set, using default: {DEFAULT_MONGO_URL}");
                DEFAULT_MONGO_URL.to_string()
            }),
            port: try_load(&lookup, "KITCHEN_PORT", DEFAULT_PORT)?,
            metrics_enabled: try_load(&lookup, "KITCHEN_METRICS", true)?,
        })
    }
}

fn try_load<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, Report<ConfigError>>
where
    T: FromStr + Display,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .change_context(ConfigError)
            .attach_with(|| format!("{key} has an invalid value '{value}'")),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}
