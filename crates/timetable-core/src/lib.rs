use thiserror::Error;

pub mod backend;
pub mod config_file;
pub mod schedule;
pub mod store;
pub mod time;
pub mod weekday;

// Re-export for convenience
pub use backend::{RecognitionError, RecognitionProgress, TextRecognizer};
pub use schedule::Schedule;
pub use store::{JsonScheduleStore, ScheduleStore};
pub use time::ClassTime;
pub use weekday::Weekday;

/// A single class in a timetable.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScheduleEntry {
    /// Opaque unique token; only compared for equality.
    pub id: String,
    pub day: Weekday,
    pub time: ClassTime,
    pub subject: String,
    /// Free-text room label, or [`ScheduleEntry::UNASSIGNED_ROOM`].
    pub room: String,
}

impl ScheduleEntry {
    /// Room label used when no room could be determined.
    pub const UNASSIGNED_ROOM: &'static str = "TBD";

    /// Create an entry with a freshly generated id.
    pub fn new(
        day: Weekday,
        time: ClassTime,
        subject: impl Into<String>,
        room: impl Into<String>,
    ) -> Self {
        Self {
            id: new_entry_id(),
            day,
            time,
            subject: subject.into(),
            room: room.into(),
        }
    }

    /// Composite key `day|time|subject` used to detect duplicate classes.
    pub fn key(&self) -> String {
        format!("{}|{}|{}", self.day, self.time, self.subject)
    }
}

/// Generate a new opaque entry id.
pub fn new_entry_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Text produced by a recognition engine, top-to-bottom.
///
/// Parsers only ever borrow it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecognizedText {
    raw: String,
}

impl RecognizedText {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Non-blank lines, trimmed, in their original order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        text_lines(&self.raw)
    }

    pub fn is_blank(&self) -> bool {
        self.lines().next().is_none()
    }
}

impl From<String> for RecognizedText {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for RecognizedText {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Split recognized text into non-blank trimmed lines, preserving order.
pub fn text_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty())
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("invalid user id {0:?}: only letters, digits, '_', '-' and '.' are allowed")]
    InvalidUser(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed schedule data: {0}")]
    Json(#[from] serde_json::Error),
}
