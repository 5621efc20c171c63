use std::path::PathBuf;

use clap::Parser;
use url::Url;

macro_rules! arg_env {
    ($v:literal) => {
        concat!("SHOWCAMRIP_", $v)
    };
}

/// Archive every video of the given performers, downloading each one only once.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// Performer pages to crawl or single video pages to download
    #[arg(required = true)]
    pub urls: Vec<Url>,

    /// The path to the configuration file.
    /// Defaults to `showcamrip/showcamrip_config.toml` in the user configuration directory
    #[arg(long, env=arg_env!("CONFIG"))]
    pub config: Option<PathBuf>,

    /// The maximum level of the logged messages
    #[arg(long, default_value_t=tracing::Level::INFO, env=arg_env!("LOG_LEVEL"))]
    pub log_level: tracing::Level,
}
