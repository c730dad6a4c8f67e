use crate::model::ConfigError;
use crate::normalizer::ListingSchema;
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub location: String,
    #[serde(default = "default_pages")]
    pub pages: u32,
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,
    #[serde(default = "default_download_delay_ms")]
    pub download_delay_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_obey_robots")]
    pub obey_robots: bool,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default)]
    pub schema: ListingSchema,
}

fn default_pages() -> u32 {
    100
}

fn default_concurrent_requests() -> usize {
    16
}

fn default_download_delay_ms() -> u64 {
    100
}

fn default_user_agent() -> String {
    "spareroom-scraper".into()
}

fn default_obey_robots() -> bool {
    true
}

fn default_output_dir() -> String {
    "data".into()
}

impl AppConfig {
    /// All defaults, searching `location`.
    pub fn for_location(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            pages: default_pages(),
            concurrent_requests: default_concurrent_requests(),
            download_delay_ms: default_download_delay_ms(),
            user_agent: default_user_agent(),
            obey_robots: default_obey_robots(),
            output_dir: default_output_dir(),
            schema: ListingSchema::default(),
        }
    }
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}

/// Command line: `[--config <path>] [location]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub config_path: String,
    pub location: Option<String>,
}

pub fn parse_args<I>(args: I) -> Result<CliArgs, ConfigError>
where
    I: IntoIterator<Item = String>,
{
    let mut config_path = None;
    let mut location = None;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-c" | "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| ConfigError::Usage("Missing value for --config".into()))?;
                config_path = Some(path);
            }
            flag if flag.starts_with('-') => {
                return Err(ConfigError::Usage(format!("Unknown arg: {}", flag)));
            }
            _ if location.is_some() => {
                return Err(ConfigError::Usage(format!("Unexpected arg: {}", arg)));
            }
            _ => location = Some(arg.clone()),
        }
    }

    Ok(CliArgs {
        config_path: config_path.unwrap_or_else(|| DEFAULT_CONFIG_PATH.into()),
        location,
    })
}

/// Reads the config file and applies the command line location on top.
/// Without a config file a location on the command line is enough.
pub fn resolve_config(args: &CliArgs) -> Result<AppConfig, ConfigError> {
    let loaded = if Path::new(&args.config_path).exists() {
        Some(load_config(&args.config_path)?)
    } else {
        None
    };

    match (loaded, &args.location) {
        (Some(mut config), Some(location)) => {
            config.location = location.clone();
            Ok(config)
        }
        (Some(config), None) => Ok(config),
        (None, Some(location)) => Ok(AppConfig::for_location(location.as_str())),
        (None, None) => Err(ConfigError::Usage(format!(
            "No {} found and no location given",
            args.config_path
        ))),
    }
}
