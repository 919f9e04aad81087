//! DiscForge configuration.
//!
//! Layered: built-in defaults, then an optional TOML file, then environment
//! variables. The CLI applies its own flags on top.

use std::path::{Path, PathBuf};

use redump_catalog::RedumpConfig;
use serde::{Deserialize, Serialize};

use crate::domain::{DiscForgeError, MediaType, Result};
use crate::grammar::DumpOptions;

pub const CONFIG_ENV: &str = "DISCFORGE_CONFIG";
pub const TOOL_ENV: &str = "DISCFORGE_TOOL";
pub const USERNAME_ENV: &str = "REDUMP_USERNAME";
pub const PASSWORD_ENV: &str = "REDUMP_PASSWORD";
pub const URL_ENV: &str = "REDUMP_URL";

/// Default read speed per media family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveSpeeds {
    pub cd: u32,
    pub dvd: u32,
    pub bd: u32,
    pub gd: u32,
}

impl Default for DriveSpeeds {
    fn default() -> Self {
        Self {
            cd: 24,
            dvd: 16,
            bd: 8,
            gd: 24,
        }
    }
}

/// Catalog login and location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogOptions {
    pub username: Option<String>,
    pub password: Option<String>,
    pub base_url: Option<String>,
    /// Skip the catalog lookup entirely.
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputOptions {
    /// Write `!submissionInfo.json.gz` rather than plain JSON.
    pub compress_json: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            compress_json: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub tool_path: PathBuf,
    pub speeds: DriveSpeeds,
    pub quiet: bool,
    pub paranoid: bool,
    pub reread_count: u32,
    pub catalog: CatalogOptions,
    pub output: OutputOptions,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            tool_path: PathBuf::from("DiscImageCreator"),
            speeds: DriveSpeeds::default(),
            quiet: false,
            paranoid: false,
            reread_count: 20,
            catalog: CatalogOptions::default(),
            output: OutputOptions::default(),
        }
    }
}

impl Options {
    /// Defaults, the file named by `path` or `DISCFORGE_CONFIG`, then env.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let mut options = match path.map(Path::to_path_buf).or(from_env) {
            Some(file) => Self::from_file(&file)?,
            None => Self::default(),
        };
        options.apply_env(|key| std::env::var(key).ok());
        Ok(options)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| DiscForgeError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
            .map_err(|e| DiscForgeError::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| DiscForgeError::Config(e.to_string()))
    }

    /// Overlay environment values; `lookup` stands in for `std::env::var`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(tool) = lookup(TOOL_ENV) {
            self.tool_path = PathBuf::from(tool);
        }
        if let Some(user) = lookup(USERNAME_ENV) {
            self.catalog.username = Some(user);
        }
        if let Some(pass) = lookup(PASSWORD_ENV) {
            self.catalog.password = Some(pass);
        }
        if let Some(url) = lookup(URL_ENV) {
            self.catalog.base_url = Some(url);
        }
    }

    pub fn dump_options(&self) -> DumpOptions {
        DumpOptions {
            quiet: self.quiet,
            paranoid: self.paranoid,
            reread_count: self.reread_count,
        }
    }

    /// Configured speed for a media type; 0 lets the drive decide.
    pub fn speed_for(&self, media: MediaType) -> u32 {
        match media {
            MediaType::CdRom => self.speeds.cd,
            MediaType::GdRom => self.speeds.gd,
            MediaType::Dvd
            | MediaType::HdDvd
            | MediaType::NintendoGameCubeGameDisc
            | MediaType::NintendoWiiOpticalDisc => self.speeds.dvd,
            MediaType::BluRay => self.speeds.bd,
            MediaType::FloppyDisk | MediaType::FlashDrive | MediaType::DataCartridge => 0,
        }
    }

    /// Credentials, if both halves are set.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        Some((
            self.catalog.username.as_deref()?,
            self.catalog.password.as_deref()?,
        ))
    }

    pub fn catalog_config(&self) -> RedumpConfig {
        match &self.catalog.base_url {
            Some(url) => {
                let defaults = RedumpConfig::default();
                RedumpConfig::new(url, &defaults.login_url)
            }
            None => RedumpConfig::default(),
        }
    }
}
