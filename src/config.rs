use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = "chisel.toml";

#[derive(Deserialize, Debug, Default)]
pub struct ChiselConfig {
    #[serde(default)]
    pub package: PackageConfig,
    pub build: Option<BuildConfig>,
}

#[derive(Deserialize, Debug)]
pub struct PackageConfig {
    #[serde(default = "default_name")]
    pub name: String,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct BuildConfig {
    pub compiler: Option<String>,
    pub cflags: Option<Vec<String>>,
    pub libs: Option<Vec<String>>,
    pub src_dirs: Option<Vec<String>>,
    pub out_dir: Option<String>,
}

fn default_name() -> String {
    "app".to_string()
}

/// Load `chisel.toml` from the current directory. The file is optional; a
/// missing file yields the defaults (project `app`, sources in `src`,
/// artifacts in `build`).
pub fn load_config() -> Result<ChiselConfig> {
    if !Path::new(CONFIG_FILE).exists() {
        return Ok(ChiselConfig::default());
    }

    let config_str = fs::read_to_string(CONFIG_FILE)
        .context("Failed to read chisel.toml - check file permissions")?;
    toml::from_str(&config_str)
        .context("Failed to parse chisel.toml - check for syntax errors (missing quotes, brackets)")
}
