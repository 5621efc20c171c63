use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use indoc::formatdoc;
use miette::{Context, IntoDiagnostic};
use serde::Deserialize;
use tracing::info;

use crate::{
    result::{err_msg, Result},
    site::DEFAULT_BASE_URL,
};

const APP_NAME: &str = "showcamrip";
const CONFIG_FILE_NAME: &str = "showcamrip_config.toml";
const ENV_PREFIX: &str = "SHOWCAMRIP";

/// Process-wide settings, loaded once at startup and never modified afterwards
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Root of the downloaded videos
    pub downloads_folder: PathBuf,

    /// Folder of the per-performer archive ledgers
    pub archives_folder: PathBuf,

    /// Home page of the site, also used as the `Referer` of every request
    pub base_url: String,
}

impl Settings {
    /// The defaults used when neither the file nor the environment set a value
    pub fn defaults() -> Result<Self> {
        let downloads = dirs::download_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
            .ok_or_else(|| err_msg("Could not find the user download directory"))?;
        let downloads_folder = downloads.join("showcamrips");

        Ok(Self {
            archives_folder: downloads_folder.join("videos_archives"),
            downloads_folder,
            base_url: DEFAULT_BASE_URL.to_owned(),
        })
    }

    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| err_msg("Could not find the user configuration directory"))?;
        Ok(dir.join(APP_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load the settings from the file, writing the defaults to it first if it does not exist.
    ///
    /// `SHOWCAMRIP_*` environment variables override the file values.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        let defaults = Self::defaults()?;

        if !path.exists() {
            info!("Creating default configuration at {}", path.display());
            defaults.save(path)?;
        }

        let settings = Config::builder()
            .set_default("downloads_folder", path_str(&defaults.downloads_folder))
            .and_then(|b| b.set_default("archives_folder", path_str(&defaults.archives_folder)))
            .and_then(|b| b.set_default("base_url", defaults.base_url))
            .into_diagnostic()?
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .into_diagnostic()
            .wrap_err_with(|| format!("Could not read configuration {}", path.display()))?
            .try_deserialize()
            .into_diagnostic()
            .wrap_err_with(|| format!("Invalid configuration {}", path.display()))?;

        Ok(settings)
    }

    fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .into_diagnostic()
                .wrap_err("Could not create the configuration folder")?;
        }

        let content = formatdoc! {"
            downloads_folder = {}
            archives_folder = {}
            base_url = {}
            ",
            toml_string(&path_str(&self.downloads_folder)),
            toml_string(&path_str(&self.archives_folder)),
            toml_string(&self.base_url),
        };

        std::fs::write(path, content)
            .into_diagnostic()
            .wrap_err_with(|| format!("Could not write configuration {}", path.display()))?;
        Ok(())
    }

    /// Create the download and archive folders
    pub fn ensure_folders(&self) -> Result<()> {
        for folder in [&self.downloads_folder, &self.archives_folder] {
            std::fs::create_dir_all(folder)
                .into_diagnostic()
                .wrap_err_with(|| format!("Could not create {}", folder.display()))?;
        }
        Ok(())
    }

    pub fn archive_path(&self, performer: &str) -> PathBuf {
        self.archives_folder.join(format!("{performer}.txt"))
    }
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Quote a value as a TOML basic string
fn toml_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            c if c.is_control() => quoted.push_str(&format!("\\u{:04X}", c as u32)),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
