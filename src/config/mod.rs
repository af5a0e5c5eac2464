use crate::errors::{AppError, AppResult};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

/// Environment override for the configuration directory.
pub const HOME_ENV: &str = "KIOSKCLOCK_HOME";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteKind {
    Dir,
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_remote_kind")]
    pub kind: RemoteKind,
    /// Root directory for `kind: dir`
    #[serde(default)]
    pub path: Option<String>,
    /// Base URL for `kind: http`
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Which clock stamps the remote record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampSource {
    /// Capture time on the kiosk (correct for events captured offline)
    Device,
    /// Time the store receives the write
    Server,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    #[serde(default = "default_true")]
    pub delete_local_photo: bool,
    #[serde(default = "default_true")]
    pub purge_after_sync: bool,
    #[serde(default = "default_timestamp_source")]
    pub timestamp_source: TimestampSource,
    #[serde(default = "default_blob_prefix")]
    pub blob_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSettings {
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    /// Also look at local events not yet synced when resolving the next action
    #[serde(default)]
    pub consider_pending: bool,
    #[serde(default = "default_pin_length")]
    pub pin_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_photo_dir")]
    pub photo_dir: String,
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
    #[serde(default = "default_remote")]
    pub remote: RemoteConfig,
    #[serde(default = "default_sync")]
    pub sync: SyncSettings,
    #[serde(default = "default_capture")]
    pub capture: CaptureSettings,
}

fn default_true() -> bool {
    true
}
fn default_remote_kind() -> RemoteKind {
    RemoteKind::Dir
}
fn default_timeout_secs() -> u64 {
    20
}
fn default_interval_minutes() -> u64 {
    30
}
fn default_retry_delay_secs() -> u64 {
    60
}
fn default_timestamp_source() -> TimestampSource {
    TimestampSource::Device
}
fn default_blob_prefix() -> String {
    "logs".to_string()
}
fn default_lookback_days() -> u32 {
    2
}
fn default_pin_length() -> usize {
    6
}
fn default_photo_dir() -> String {
    Config::config_dir()
        .join("photos")
        .to_string_lossy()
        .to_string()
}
fn default_utc_offset() -> String {
    "+08:00".to_string()
}
fn default_remote() -> RemoteConfig {
    RemoteConfig {
        kind: default_remote_kind(),
        path: Some(
            Config::config_dir()
                .join("remote")
                .to_string_lossy()
                .to_string(),
        ),
        url: None,
        token: None,
        timeout_secs: default_timeout_secs(),
    }
}
fn default_sync() -> SyncSettings {
    SyncSettings {
        interval_minutes: default_interval_minutes(),
        retry_delay_secs: default_retry_delay_secs(),
        delete_local_photo: true,
        purge_after_sync: true,
        timestamp_source: default_timestamp_source(),
        blob_prefix: default_blob_prefix(),
    }
}
fn default_capture() -> CaptureSettings {
    CaptureSettings {
        lookback_days: default_lookback_days(),
        consider_pending: false,
        pin_length: default_pin_length(),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: Self::database_file().to_string_lossy().to_string(),
            photo_dir: default_photo_dir(),
            utc_offset: default_utc_offset(),
            remote: default_remote(),
            sync: default_sync(),
            capture: default_capture(),
        }
    }
}

/// Keys every config file is expected to carry (`config --check`).
pub const EXPECTED_KEYS: &[&str] = &[
    "database",
    "photo_dir",
    "utc_offset",
    "remote",
    "sync",
    "capture",
];

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if let Ok(dir) = env::var(HOME_ENV)
            && !dir.trim().is_empty()
        {
            return PathBuf::from(dir);
        }

        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("kioskclock")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".kioskclock")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("kioskclock.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("kioskclock.sqlite")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();

        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let cfg: Config = serde_yaml::from_str(&content)?;
            cfg.tz()?;
            Ok(cfg)
        } else {
            Ok(Config::default())
        }
    }

    /// Parsed `utc_offset`, the zone used for lookback windows and blob
    /// month buckets.
    pub fn tz(&self) -> AppResult<FixedOffset> {
        parse_offset(&self.utc_offset)
    }

    /// Keys from `EXPECTED_KEYS` absent in the config file on disk.
    pub fn missing_keys() -> AppResult<Vec<&'static str>> {
        let path = Self::config_file();
        if !path.exists() {
            return Ok(EXPECTED_KEYS.to_vec());
        }

        let content = fs::read_to_string(&path)?;
        let yaml: serde_yaml::Value = serde_yaml::from_str(&content)?;
        let map = yaml
            .as_mapping()
            .ok_or_else(|| AppError::Config("configuration is not a mapping".into()))?;

        Ok(EXPECTED_KEYS
            .iter()
            .filter(|k| !map.contains_key(serde_yaml::Value::String(k.to_string())))
            .copied()
            .collect())
    }

    /// Initialize configuration and database files
    pub fn init_all(custom_db: Option<String>, is_test: bool) -> AppResult<Config> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        // keep an existing file's settings, only the database may change
        let mut config = Self::load()?;

        if let Some(name) = custom_db {
            let p = std::path::Path::new(&name);
            let db_path = if p.is_absolute() {
                p.to_path_buf()
            } else {
                dir.join(p)
            };
            config.database = db_path.to_string_lossy().to_string();
        }

        fs::create_dir_all(crate::utils::path::expand_tilde(&config.photo_dir))?;

        if !is_test {
            let yaml = serde_yaml::to_string(&config)?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
        }

        Ok(config)
    }
}

/// Parse "+HH:MM" / "-HH:MM" (or "Z") into a fixed offset.
pub fn parse_offset(s: &str) -> AppResult<FixedOffset> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(|| AppError::InvalidOffset(s.into()));
    }

    let (sign, rest) = match s.as_bytes().first() {
        Some(b'+') => (1, &s[1..]),
        Some(b'-') => (-1, &s[1..]),
        _ => return Err(AppError::InvalidOffset(s.into())),
    };

    let (h, m) = rest
        .split_once(':')
        .ok_or_else(|| AppError::InvalidOffset(s.into()))?;
    let h: i32 = h.parse().map_err(|_| AppError::InvalidOffset(s.into()))?;
    let m: i32 = m.parse().map_err(|_| AppError::InvalidOffset(s.into()))?;
    if !(0..=14).contains(&h) || !(0..60).contains(&m) {
        return Err(AppError::InvalidOffset(s.into()));
    }

    FixedOffset::east_opt(sign * (h * 3600 + m * 60)).ok_or_else(|| AppError::InvalidOffset(s.into()))
}

/// Write a config file for tests and first-run tooling without touching
/// the user's real directory.
pub fn write_config(path: &std::path::Path, cfg: &Config) -> io::Result<()> {
    let yaml = serde_yaml::to_string(cfg).map_err(io::Error::other)?;
    fs::write(path, yaml)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_offsets() {
        assert_eq!(parse_offset("+08:00").unwrap().local_minus_utc(), 8 * 3600);
        assert_eq!(parse_offset("-05:30").unwrap().local_minus_utc(), -(5 * 3600 + 30 * 60));
        assert_eq!(parse_offset("Z").unwrap().local_minus_utc(), 0);
        assert!(parse_offset("08:00").is_err());
        assert!(parse_offset("+25:00").is_err());
    }

    #[test]
    fn partial_file_gets_defaults() {
        let yaml = "database: /tmp/k.sqlite\nsync:\n  interval_minutes: 5\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(cfg.sync.interval_minutes, 5);
        assert_eq!(cfg.sync.retry_delay_secs, 60);
        assert_eq!(cfg.sync.timestamp_source, TimestampSource::Device);
        assert_eq!(cfg.capture.lookback_days, 2);
        assert!(!cfg.capture.consider_pending);
        assert_eq!(cfg.utc_offset, "+08:00");
    }
}
