use regex::Regex;
use timetable_core::ClassTime;
use timetable_core::config_file::ParsingSection;

use crate::ParsingError;
use crate::vocabulary::{self, SubjectVocabulary};

/// Controls how a list of patterns/values is overridden from its defaults.
#[derive(Debug, Clone, Default)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }

    fn push(&mut self, value: T) {
        match self {
            ListOverride::Extend(v) | ListOverride::Replace(v) => v.push(value),
            ListOverride::Default => *self = ListOverride::Extend(vec![value]),
        }
    }
}

/// Fewer structural entries than this and the fallback parser takes over.
pub const DEFAULT_MIN_PRIMARY_ENTRIES: usize = 3;
/// Number of time ranges a line needs to count as the header row.
pub const DEFAULT_HEADER_MIN_RANGES: usize = 3;
/// Days the fallback parser spreads subjects across.
pub const DEFAULT_FALLBACK_MAX_DAYS: usize = 5;
/// Time slots the fallback parser fills per day.
pub const DEFAULT_FALLBACK_SLOTS_PER_DAY: usize = 2;
/// Recognized times the fallback parser keeps.
pub const DEFAULT_FALLBACK_MAX_TIMES: usize = 5;

/// Time used when a subject has no slot at all.
pub const DEFAULT_TIME: ClassTime = ClassTime::clamped(9, 0);
/// Slots the fallback parser uses when the text has no times.
pub const DEFAULT_SLOTS: [ClassTime; 5] = [
    ClassTime::clamped(9, 0),
    ClassTime::clamped(10, 0),
    ClassTime::clamped(11, 0),
    ClassTime::clamped(12, 0),
    ClassTime::clamped(14, 0),
];

/// Configuration for the timetable extraction pipeline.
///
/// Regex-backed fields are `Option`; `None` means "use the built-in default".
/// Use [`ParsingConfigBuilder`] to construct with custom lists and patterns.
#[derive(Debug, Clone)]
pub struct ParsingConfig {
    // ── extractor.rs ──
    pub(crate) min_primary_entries: usize,

    // ── time_slots.rs ──
    pub(crate) header_min_ranges: usize,

    // ── structural.rs ──
    pub(crate) default_time: ClassTime,

    // ── fallback.rs ──
    pub(crate) fallback_max_days: usize,
    pub(crate) fallback_slots_per_day: usize,
    pub(crate) fallback_max_times: usize,
    pub(crate) default_slots: Vec<ClassTime>,

    // ── tokens.rs ──
    /// Compiled subject vocabulary, when the default list was overridden.
    pub(crate) subjects: Option<SubjectVocabulary>,
    /// Compiled named-room pattern, when the default list was overridden.
    pub(crate) named_room_re: Option<Regex>,
    /// Replacement for the room-code pattern.
    pub(crate) room_code_re: Option<Regex>,
    /// Tokens never accepted as subjects (honorifics and similar).
    pub(crate) excluded_titles: Vec<String>,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            min_primary_entries: DEFAULT_MIN_PRIMARY_ENTRIES,
            header_min_ranges: DEFAULT_HEADER_MIN_RANGES,
            default_time: DEFAULT_TIME,
            fallback_max_days: DEFAULT_FALLBACK_MAX_DAYS,
            fallback_slots_per_day: DEFAULT_FALLBACK_SLOTS_PER_DAY,
            fallback_max_times: DEFAULT_FALLBACK_MAX_TIMES,
            default_slots: DEFAULT_SLOTS.to_vec(),
            subjects: None,
            named_room_re: None,
            room_code_re: None,
            excluded_titles: vocabulary::default_excluded_titles(),
        }
    }
}

impl ParsingConfig {
    pub fn min_primary_entries(&self) -> usize {
        self.min_primary_entries
    }

    pub(crate) fn subjects(&self) -> &SubjectVocabulary {
        self.subjects
            .as_ref()
            .unwrap_or(&vocabulary::DEFAULT_SUBJECTS)
    }

    pub(crate) fn named_room_re(&self) -> &Regex {
        self.named_room_re
            .as_ref()
            .unwrap_or(&vocabulary::DEFAULT_NAMED_ROOM_RE)
    }

    pub(crate) fn room_code_re(&self) -> &Regex {
        self.room_code_re
            .as_ref()
            .unwrap_or(&vocabulary::ROOM_CODE_RE)
    }

    pub(crate) fn is_excluded_title(&self, token: &str) -> bool {
        let token = token.trim_end_matches('.');
        self.excluded_titles
            .iter()
            .any(|t| t.eq_ignore_ascii_case(token))
    }
}

/// Builder for [`ParsingConfig`].
///
/// List overrides are compiled into regexes in [`build()`](Self::build).
/// Fails fast with `regex::Error` if any pattern is invalid.
#[derive(Debug, Clone, Default)]
pub struct ParsingConfigBuilder {
    min_primary_entries: Option<usize>,
    header_min_ranges: Option<usize>,
    default_time: Option<ClassTime>,
    fallback_max_days: Option<usize>,
    fallback_slots_per_day: Option<usize>,
    fallback_max_times: Option<usize>,
    default_slots: Option<Vec<ClassTime>>,
    subjects: ListOverride<String>,
    named_rooms: ListOverride<String>,
    excluded_titles: ListOverride<String>,
    room_code_re: Option<String>,
}

impl ParsingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the `[parsing]` section of a config file.
    pub fn from_section(section: &ParsingSection) -> Result<Self, ParsingError> {
        let mut builder = Self::new();
        builder.min_primary_entries = section.min_primary_entries;
        builder.header_min_ranges = section.header_min_ranges;
        builder.fallback_max_days = section.fallback_max_days;
        builder.fallback_slots_per_day = section.fallback_slots_per_day;
        builder.fallback_max_times = section.fallback_max_times;
        if let Some(ref t) = section.default_time {
            let time = ClassTime::parse(t).ok_or_else(|| ParsingError::InvalidTime(t.clone()))?;
            builder.default_time = Some(time);
        }
        for subject in section.extra_subjects.iter().flatten() {
            builder = builder.add_subject(subject.clone());
        }
        for room in section.extra_rooms.iter().flatten() {
            builder = builder.add_named_room(room.clone());
        }
        Ok(builder)
    }

    // ── Thresholds ──

    pub fn min_primary_entries(mut self, n: usize) -> Self {
        self.min_primary_entries = Some(n);
        self
    }

    pub fn header_min_ranges(mut self, n: usize) -> Self {
        self.header_min_ranges = Some(n);
        self
    }

    pub fn fallback_max_days(mut self, n: usize) -> Self {
        self.fallback_max_days = Some(n);
        self
    }

    pub fn fallback_slots_per_day(mut self, n: usize) -> Self {
        self.fallback_slots_per_day = Some(n);
        self
    }

    pub fn fallback_max_times(mut self, n: usize) -> Self {
        self.fallback_max_times = Some(n);
        self
    }

    // ── Defaults for missing values ──

    pub fn default_time(mut self, time: ClassTime) -> Self {
        self.default_time = Some(time);
        self
    }

    pub fn default_slots(mut self, slots: Vec<ClassTime>) -> Self {
        self.default_slots = Some(slots);
        self
    }

    // ── Subject vocabulary ──

    pub fn set_subjects(mut self, subjects: Vec<String>) -> Self {
        self.subjects = ListOverride::Replace(subjects);
        self
    }

    pub fn add_subject(mut self, subject: String) -> Self {
        self.subjects.push(subject);
        self
    }

    // ── Rooms ──

    pub fn set_named_rooms(mut self, rooms: Vec<String>) -> Self {
        self.named_rooms = ListOverride::Replace(rooms);
        self
    }

    pub fn add_named_room(mut self, room: String) -> Self {
        self.named_rooms.push(room);
        self
    }

    pub fn room_code_regex(mut self, pattern: &str) -> Self {
        self.room_code_re = Some(pattern.to_string());
        self
    }

    // ── Excluded titles ──

    pub fn set_excluded_titles(mut self, titles: Vec<String>) -> Self {
        self.excluded_titles = ListOverride::Replace(titles);
        self
    }

    pub fn add_excluded_title(mut self, title: String) -> Self {
        self.excluded_titles.push(title);
        self
    }

    /// Compile all lists and patterns and produce a [`ParsingConfig`].
    pub fn build(self) -> Result<ParsingConfig, regex::Error> {
        let subjects = match self.subjects {
            ListOverride::Default => None,
            ref other => {
                let words = other.resolve(&vocabulary::default_subject_list());
                Some(SubjectVocabulary::new(&words)?)
            }
        };

        let named_room_re = match self.named_rooms {
            ListOverride::Default => None,
            ref other => {
                let rooms = other.resolve(&vocabulary::default_named_room_list());
                Some(vocabulary::phrase_regex(&rooms)?)
            }
        };

        let room_code_re = self.room_code_re.map(|p| Regex::new(&p)).transpose()?;

        Ok(ParsingConfig {
            min_primary_entries: self
                .min_primary_entries
                .unwrap_or(DEFAULT_MIN_PRIMARY_ENTRIES),
            header_min_ranges: self.header_min_ranges.unwrap_or(DEFAULT_HEADER_MIN_RANGES),
            default_time: self.default_time.unwrap_or(DEFAULT_TIME),
            fallback_max_days: self.fallback_max_days.unwrap_or(DEFAULT_FALLBACK_MAX_DAYS),
            fallback_slots_per_day: self
                .fallback_slots_per_day
                .unwrap_or(DEFAULT_FALLBACK_SLOTS_PER_DAY),
            fallback_max_times: self
                .fallback_max_times
                .unwrap_or(DEFAULT_FALLBACK_MAX_TIMES),
            default_slots: self.default_slots.unwrap_or_else(|| DEFAULT_SLOTS.to_vec()),
            subjects,
            named_room_re,
            room_code_re,
            excluded_titles: self
                .excluded_titles
                .resolve(&vocabulary::default_excluded_titles()),
        })
    }
}
