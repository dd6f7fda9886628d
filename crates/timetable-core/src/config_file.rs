use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub parsing: Option<ParsingSection>,
    pub recognizer: Option<RecognizerSection>,
    pub storage: Option<StorageSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsingSection {
    pub min_primary_entries: Option<usize>,
    pub header_min_ranges: Option<usize>,
    pub fallback_max_days: Option<usize>,
    pub fallback_slots_per_day: Option<usize>,
    pub fallback_max_times: Option<usize>,
    pub default_time: Option<String>,
    pub extra_subjects: Option<Vec<String>>,
    pub extra_rooms: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognizerSection {
    pub command: Option<String>,
    pub args: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageSection {
    pub data_dir: Option<String>,
    pub user: Option<String>,
}

/// Platform config directory path: `<config_dir>/timetable/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("timetable").join("config.toml"))
}

/// Load config by cascading CWD `.timetable.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".timetable.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let bp = base.parsing.unwrap_or_default();
    let op = overlay.parsing.unwrap_or_default();
    let brec = base.recognizer.unwrap_or_default();
    let orec = overlay.recognizer.unwrap_or_default();
    let bs = base.storage.unwrap_or_default();
    let os = overlay.storage.unwrap_or_default();

    ConfigFile {
        parsing: Some(ParsingSection {
            min_primary_entries: op.min_primary_entries.or(bp.min_primary_entries),
            header_min_ranges: op.header_min_ranges.or(bp.header_min_ranges),
            fallback_max_days: op.fallback_max_days.or(bp.fallback_max_days),
            fallback_slots_per_day: op.fallback_slots_per_day.or(bp.fallback_slots_per_day),
            fallback_max_times: op.fallback_max_times.or(bp.fallback_max_times),
            default_time: op.default_time.or(bp.default_time),
            extra_subjects: op.extra_subjects.or(bp.extra_subjects),
            extra_rooms: op.extra_rooms.or(bp.extra_rooms),
        }),
        recognizer: Some(RecognizerSection {
            command: orec.command.or(brec.command),
            args: orec.args.or(brec.args),
        }),
        storage: Some(StorageSection {
            data_dir: os.data_dir.or(bs.data_dir),
            user: os.user.or(bs.user),
        }),
    }
}

/// Save the config to the platform config directory.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf, CoreError> {
    let path = config_path()
        .ok_or_else(|| CoreError::Validation("could not determine config directory".into()))?;
    save_config_to(config, &path)?;
    Ok(path)
}

/// Write the config as TOML to `path`, creating parent directories.
pub fn save_config_to(config: &ConfigFile, path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, to_toml(config)?)?;
    Ok(())
}

/// Render a config as pretty TOML.
pub fn to_toml(config: &ConfigFile) -> Result<String, CoreError> {
    toml::to_string_pretty(config)
        .map_err(|e| CoreError::Validation(format!("failed to serialize config: {}", e)))
}
