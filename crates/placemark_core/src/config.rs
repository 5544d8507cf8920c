//! Layered runtime settings.
//!
//! # Responsibility
//! - Merge built-in defaults, an optional TOML file and `PLACEMARK__*`
//!   environment variables into one typed `Settings`.
//! - Derive component settings (geocoder, tile source, log dir).
//!
//! # Invariants
//! - Loading never requires a file to exist unless one is named explicitly.
//! - Later layers override earlier ones key by key.

use crate::geocode::NominatimSettings;
use crate::logging::default_log_level;
use crate::map::{TileSource, DEFAULT_ATTRIBUTION, DEFAULT_TILE_URL};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CONFIG_BASENAME: &str = "placemark";
const ENV_PREFIX: &str = "PLACEMARK";
const DEFAULT_DB_PATH: &str = "placemark-data/placemark.sqlite3";
const DEFAULT_GEOCODE_ENDPOINT: &str = "https://nominatim.openstreetmap.org/reverse";
const DEFAULT_GEOCODE_TIMEOUT_SECS: i64 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub db_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    /// Absolute log directory. Defaults to `logs/` next to the database.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeSettings {
    pub enabled: bool,
    pub endpoint: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MapSettings {
    pub tile_url: String,
    pub attribution: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
    pub geocode: GeocodeSettings,
    pub map: MapSettings,
}

impl Settings {
    /// Loads settings.
    ///
    /// With `file = None`, `placemark.toml` in the working directory is used
    /// when present. A named file must exist.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let user_agent = format!("placemark/{}", env!("CARGO_PKG_VERSION"));
        let mut builder = Config::builder()
            .set_default("storage.db_path", DEFAULT_DB_PATH)?
            .set_default("logging.level", default_log_level())?
            .set_default("geocode.enabled", true)?
            .set_default("geocode.endpoint", DEFAULT_GEOCODE_ENDPOINT)?
            .set_default("geocode.user_agent", user_agent)?
            .set_default("geocode.timeout_secs", DEFAULT_GEOCODE_TIMEOUT_SECS)?
            .set_default("map.tile_url", DEFAULT_TILE_URL)?
            .set_default("map.attribution", DEFAULT_ATTRIBUTION)?;

        builder = match file {
            Some(path) => builder.add_source(File::from(path)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false)),
        };

        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn nominatim(&self) -> NominatimSettings {
        NominatimSettings {
            endpoint: self.geocode.endpoint.clone(),
            user_agent: self.geocode.user_agent.clone(),
            timeout: Duration::from_secs(self.geocode.timeout_secs),
        }
    }

    pub fn tile_source(&self) -> TileSource {
        TileSource {
            url_template: self.map.tile_url.clone(),
            attribution: self.map.attribution.clone(),
        }
    }

    /// Effective absolute log directory.
    ///
    /// Relative paths are resolved against `base` (usually the working
    /// directory).
    pub fn log_dir(&self, base: &Path) -> PathBuf {
        let dir = match self.logging.dir.as_ref() {
            Some(dir) => dir.clone(),
            None => self
                .storage
                .db_path
                .parent()
                .map(|parent| parent.join("logs"))
                .unwrap_or_else(|| PathBuf::from("logs")),
        };
        if dir.is_absolute() {
            dir
        } else {
            base.join(dir)
        }
    }
}
