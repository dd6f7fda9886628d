use std::path::PathBuf;

use crate::{CoreError, Schedule};

/// Key-value persistence for schedules, keyed by user id.
pub trait ScheduleStore {
    /// Load the schedule for `user`. A user with no saved data gets an empty schedule.
    fn load(&self, user: &str) -> Result<Schedule, CoreError>;

    fn save(&self, user: &str, schedule: &Schedule) -> Result<(), CoreError>;
}

/// Stores each user's schedule as `<root>/<user>/schedule.json`.
#[derive(Debug, Clone)]
pub struct JsonScheduleStore {
    root: PathBuf,
}

impl JsonScheduleStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Platform data directory: `<data_dir>/timetable`.
    pub fn default_root() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("timetable"))
    }

    /// Path of the schedule file for `user`.
    pub fn schedule_path(&self, user: &str) -> Result<PathBuf, CoreError> {
        validate_user(user)?;
        Ok(self.root.join(user).join("schedule.json"))
    }
}

impl ScheduleStore for JsonScheduleStore {
    fn load(&self, user: &str) -> Result<Schedule, CoreError> {
        let path = self.schedule_path(user)?;
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Schedule::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Schedule::new());
        }
        let schedule: Schedule = serde_json::from_str(&content)?;
        tracing::debug!(user, entries = schedule.len(), path = %path.display(), "loaded schedule");
        Ok(schedule)
    }

    fn save(&self, user: &str, schedule: &Schedule) -> Result<(), CoreError> {
        let path = self.schedule_path(user)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(schedule)?;
        std::fs::write(&path, content)?;
        tracing::debug!(user, entries = schedule.len(), path = %path.display(), "saved schedule");
        Ok(())
    }
}

/// User ids become directory names, so keep them to a safe character set.
fn validate_user(user: &str) -> Result<(), CoreError> {
    let valid = !user.is_empty()
        && user != "."
        && user != ".."
        && user
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(CoreError::InvalidUser(user.to_string()))
    }
}
