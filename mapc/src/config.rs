use super::blockmap::DEFAULT_CELL_SIZE;
use super::errors::{ErrorKind, Result};
use failchain::{ensure, ResultExt};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use toml;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub directory: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            enabled: false,
            directory: PathBuf::from("mapcache"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub blockmap_cell_size: f64,
    pub window_effects: bool,
    pub cache: CacheConfig,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            blockmap_cell_size: DEFAULT_CELL_SIZE,
            window_effects: true,
            cache: CacheConfig::default(),
        }
    }
}

impl CompilerConfig {
    pub fn from_file<P: AsRef<Path>>(path: &P) -> Result<CompilerConfig> {
        let mut contents = String::new();
        let path = path.as_ref();
        File::open(path)
            .and_then(|mut file| file.read_to_string(&mut contents))
            .chain_err(|| ErrorKind::on_file_open(path))?;
        CompilerConfig::from_text(&contents)
    }

    pub fn from_text(text: &str) -> Result<CompilerConfig> {
        let config: CompilerConfig = toml::from_str(text).chain_err(ErrorKind::on_config_parse)?;
        ensure!(
            config.blockmap_cell_size.is_finite() && config.blockmap_cell_size > 0.0,
            ErrorKind::CorruptConfig(format!(
                "blockmap_cell_size must be positive, got {}.",
                config.blockmap_cell_size
            ))
        );
        Ok(config)
    }
}
