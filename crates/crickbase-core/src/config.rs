// Configuration loading and parsing (crickbase.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the single configuration file under `config/` and `defaults/`.
pub const CONFIG_FILE: &str = "crickbase.toml";

/// Database file name used when no explicit path is configured.
pub const DEFAULT_DB_FILE: &str = "crickbase.db";

pub const DEFAULT_LOG_FILTER: &str = "crickbase=info,warn";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub predictor: PredictorDefaults,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
    /// Explicit database path. When omitted the platform data directory is
    /// used (see [`Config::db_path`]).
    pub path: Option<String>,
}

/// Team predictor parameters applied when a request leaves them out.
///
/// The values are kept as text here and parsed by the predictor crate, so
/// this crate stays unaware of the selection parameter types.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PredictorDefaults {
    pub format: String,
    pub pitch: String,
    pub strategy: String,
    pub max_xi: i64,
}

impl Default for PredictorDefaults {
    fn default() -> Self {
        PredictorDefaults {
            format: "ODI".into(),
            pitch: "balanced".into(),
            strategy: "balanced".into(),
            max_xi: 11,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Log file. When omitted logs go to stderr.
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: DEFAULT_LOG_FILTER.into(),
            file: None,
        }
    }
}

impl Config {
    /// Resolve the database location: the configured path, or
    /// `crickbase.db` in the platform data directory, or the working
    /// directory when no home directory can be determined.
    pub fn db_path(&self) -> PathBuf {
        if let Some(path) = self.database.path.as_deref().filter(|p| !p.trim().is_empty()) {
            return PathBuf::from(path);
        }
        match directories::ProjectDirs::from("", "", "crickbase") {
            Some(dirs) => dirs.data_dir().join(DEFAULT_DB_FILE),
            None => PathBuf::from(DEFAULT_DB_FILE),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/crickbase.toml` relative to `base_dir`.
///
/// This does not copy defaults; prefer [`load_config`].
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    validate(&config)?;

    Ok(config)
}

/// Copy every file in `base_dir/defaults/` that is missing from
/// `base_dir/config/`, skipping `*.example` templates. Existing config files
/// are never overwritten. Returns the paths that were written.
///
/// A missing `defaults/` is fine as long as `config/` exists.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.is_dir() {
        return if config_dir.is_dir() {
            Ok(Vec::new())
        } else {
            Err(copy_error(format!(
                "neither defaults/ nor config/ directory found in {}",
                base_dir.display()
            )))
        };
    }

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| copy_error(format!("cannot create {}: {e}", config_dir.display())))?;

    let mut sources = Vec::new();
    for entry in std::fs::read_dir(&defaults_dir)
        .map_err(|e| copy_error(format!("cannot list {}: {e}", defaults_dir.display())))?
    {
        let path = entry
            .map_err(|e| copy_error(format!("cannot list {}: {e}", defaults_dir.display())))?
            .path();
        let is_template = path.extension().is_some_and(|ext| ext == "example");
        if path.is_file() && !is_template {
            sources.push(path);
        }
    }
    sources.sort();

    let mut written = Vec::new();
    for source in sources {
        let Some(name) = source.file_name() else {
            continue;
        };
        let target = config_dir.join(name);
        if copy_if_absent(&source, &target)? {
            written.push(target);
        }
    }
    Ok(written)
}

/// Copy `source` to `target` unless `target` already exists.
fn copy_if_absent(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    use std::io::Write;

    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(copy_error(format!("cannot create {}: {e}", target.display()))),
    };
    let content = std::fs::read(source)
        .map_err(|e| copy_error(format!("cannot read {}: {e}", source.display())))?;
    dest.write_all(&content)
        .map_err(|e| copy_error(format!("cannot write {}: {e}", target.display())))?;
    Ok(true)
}

fn copy_error(message: String) -> ConfigError {
    ConfigError::DefaultsCopyError { message }
}

/// Copy missing defaults into `base_dir/config/`, then load from there.
pub fn load_config_in(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_files(base_dir)?;
    load_config_from(base_dir)
}

/// Convenience wrapper: loads config relative to the current working directory.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    load_config_in(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.predictor.max_xi <= 0 {
        return Err(ConfigError::ValidationError {
            field: "predictor.max_xi".into(),
            message: format!("must be greater than 0, got {}", config.predictor.max_xi),
        });
    }

    if config.logging.filter.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "logging.filter".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
