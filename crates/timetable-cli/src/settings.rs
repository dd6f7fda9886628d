use std::path::PathBuf;

use timetable_core::JsonScheduleStore;
use timetable_core::config_file::{ConfigFile, ParsingSection, RecognizerSection, StorageSection};
use timetable_ocr::DEFAULT_OCR_PROGRAM;
use timetable_parsing::config::{
    DEFAULT_FALLBACK_MAX_DAYS, DEFAULT_FALLBACK_MAX_TIMES, DEFAULT_FALLBACK_SLOTS_PER_DAY,
    DEFAULT_HEADER_MIN_RANGES, DEFAULT_MIN_PRIMARY_ENTRIES, DEFAULT_TIME,
};
use timetable_parsing::{ParsingConfig, ParsingConfigBuilder};

/// User id used when none is configured anywhere.
pub const DEFAULT_USER: &str = "default";

pub const ENV_USER: &str = "TIMETABLE_USER";
pub const ENV_DATA_DIR: &str = "TIMETABLE_DATA_DIR";
pub const ENV_OCR_COMMAND: &str = "TIMETABLE_OCR_COMMAND";

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub user: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub ocr_command: Option<String>,
}

/// Values taken from the environment (after `.env` loading).
#[derive(Debug, Clone, Default)]
pub struct EnvVars {
    pub user: Option<String>,
    pub data_dir: Option<String>,
    pub ocr_command: Option<String>,
}

impl EnvVars {
    pub fn from_process() -> Self {
        let read = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        Self {
            user: read(ENV_USER),
            data_dir: read(ENV_DATA_DIR),
            ocr_command: read(ENV_OCR_COMMAND),
        }
    }
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub user: String,
    pub data_dir: PathBuf,
    pub ocr_command: String,
    pub ocr_args: Vec<String>,
    parsing: ParsingSection,
}

impl Settings {
    /// Resolve: CLI flag > env var > config file > default.
    pub fn resolve(flags: Overrides, env: EnvVars, file: ConfigFile) -> anyhow::Result<Self> {
        let storage = file.storage.unwrap_or_default();
        let recognizer = file.recognizer.unwrap_or_default();

        let user = flags
            .user
            .or(env.user)
            .or(storage.user)
            .unwrap_or_else(|| DEFAULT_USER.to_string());

        let data_dir = match flags
            .data_dir
            .or_else(|| env.data_dir.map(PathBuf::from))
            .or_else(|| storage.data_dir.map(PathBuf::from))
        {
            Some(dir) => dir,
            None => JsonScheduleStore::default_root().ok_or_else(|| {
                anyhow::anyhow!("could not determine a data directory; pass --data-dir")
            })?,
        };

        let ocr_command = flags
            .ocr_command
            .or(env.ocr_command)
            .or(recognizer.command)
            .unwrap_or_else(|| DEFAULT_OCR_PROGRAM.to_string());

        Ok(Self {
            user,
            data_dir,
            ocr_command,
            ocr_args: recognizer.args.unwrap_or_default(),
            parsing: file.parsing.unwrap_or_default(),
        })
    }

    pub fn store(&self) -> JsonScheduleStore {
        JsonScheduleStore::new(&self.data_dir)
    }

    /// Build the parsing config from the `[parsing]` section.
    pub fn parsing_config(&self) -> anyhow::Result<ParsingConfig> {
        let builder = ParsingConfigBuilder::from_section(&self.parsing)?;
        Ok(builder.build()?)
    }

    /// The effective configuration, with defaults filled in.
    pub fn to_config_file(&self) -> ConfigFile {
        let p = &self.parsing;
        ConfigFile {
            parsing: Some(ParsingSection {
                min_primary_entries: Some(
                    p.min_primary_entries.unwrap_or(DEFAULT_MIN_PRIMARY_ENTRIES),
                ),
                header_min_ranges: Some(p.header_min_ranges.unwrap_or(DEFAULT_HEADER_MIN_RANGES)),
                fallback_max_days: Some(p.fallback_max_days.unwrap_or(DEFAULT_FALLBACK_MAX_DAYS)),
                fallback_slots_per_day: Some(
                    p.fallback_slots_per_day
                        .unwrap_or(DEFAULT_FALLBACK_SLOTS_PER_DAY),
                ),
                fallback_max_times: Some(
                    p.fallback_max_times.unwrap_or(DEFAULT_FALLBACK_MAX_TIMES),
                ),
                default_time: Some(
                    p.default_time
                        .clone()
                        .unwrap_or_else(|| DEFAULT_TIME.to_string()),
                ),
                extra_subjects: p.extra_subjects.clone(),
                extra_rooms: p.extra_rooms.clone(),
            }),
            recognizer: Some(RecognizerSection {
                command: Some(self.ocr_command.clone()),
                args: Some(self.ocr_args.clone()),
            }),
            storage: Some(StorageSection {
                data_dir: Some(self.data_dir.display().to_string()),
                user: Some(self.user.clone()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_with(user: &str, dir: &str, command: &str) -> ConfigFile {
        ConfigFile {
            parsing: None,
            recognizer: Some(RecognizerSection {
                command: Some(command.into()),
                args: Some(vec!["--psm".into(), "6".into()]),
            }),
            storage: Some(StorageSection {
                data_dir: Some(dir.into()),
                user: Some(user.into()),
            }),
        }
    }

    #[test]
    fn test_flag_beats_env_and_file() {
        let settings = Settings::resolve(
            Overrides {
                user: Some("flag".into()),
                data_dir: Some(PathBuf::from("/flag")),
                ocr_command: Some("flag-ocr".into()),
            },
            EnvVars {
                user: Some("env".into()),
                data_dir: Some("/env".into()),
                ocr_command: Some("env-ocr".into()),
            },
            file_with("file", "/file", "file-ocr"),
        )
        .unwrap();
        assert_eq!(settings.user, "flag");
        assert_eq!(settings.data_dir, PathBuf::from("/flag"));
        assert_eq!(settings.ocr_command, "flag-ocr");
    }

    #[test]
    fn test_env_beats_file() {
        let settings = Settings::resolve(
            Overrides::default(),
            EnvVars {
                user: Some("env".into()),
                data_dir: None,
                ocr_command: Some("env-ocr".into()),
            },
            file_with("file", "/file", "file-ocr"),
        )
        .unwrap();
        assert_eq!(settings.user, "env");
        assert_eq!(settings.data_dir, PathBuf::from("/file"));
        assert_eq!(settings.ocr_command, "env-ocr");
        assert_eq!(settings.ocr_args, vec!["--psm", "6"]);
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let settings = Settings::resolve(
            Overrides {
                data_dir: Some(PathBuf::from("/tmp/tt")),
                ..Default::default()
            },
            EnvVars::default(),
            ConfigFile::default(),
        )
        .unwrap();
        assert_eq!(settings.user, DEFAULT_USER);
        assert_eq!(settings.ocr_command, "tesseract");
        assert!(settings.ocr_args.is_empty());
        assert_eq!(settings.parsing_config().unwrap().min_primary_entries(), 3);
    }

    #[test]
    fn test_parsing_section_applies() {
        let file = ConfigFile {
            parsing: Some(ParsingSection {
                min_primary_entries: Some(6),
                ..Default::default()
            }),
            ..Default::default()
        };
        let settings = Settings::resolve(
            Overrides {
                data_dir: Some(PathBuf::from("/tmp/tt")),
                ..Default::default()
            },
            EnvVars::default(),
            file,
        )
        .unwrap();
        assert_eq!(settings.parsing_config().unwrap().min_primary_entries(), 6);
    }

    #[test]
    fn test_bad_default_time_is_reported() {
        let file = ConfigFile {
            parsing: Some(ParsingSection {
                default_time: Some("noon".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let settings = Settings::resolve(
            Overrides {
                data_dir: Some(PathBuf::from("/tmp/tt")),
                ..Default::default()
            },
            EnvVars::default(),
            file,
        )
        .unwrap();
        assert!(settings.parsing_config().is_err());
    }

    #[test]
    fn test_effective_config_fills_defaults() {
        let settings = Settings::resolve(
            Overrides {
                data_dir: Some(PathBuf::from("/tmp/tt")),
                ..Default::default()
            },
            EnvVars::default(),
            ConfigFile::default(),
        )
        .unwrap();
        let effective = settings.to_config_file();
        let parsing = effective.parsing.unwrap();
        assert_eq!(parsing.min_primary_entries, Some(3));
        assert_eq!(parsing.fallback_slots_per_day, Some(2));
        assert_eq!(parsing.default_time.as_deref(), Some("09:00"));
        assert_eq!(effective.storage.unwrap().user.as_deref(), Some("default"));
    }
}
